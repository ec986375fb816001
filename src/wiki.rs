//! [`PageSource`] over a live MediaWiki site.

use crate::error::RaceError;
use crate::page::{Link, Page, PageSource};

use reqwest::blocking::Client;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

const USER_AGENT: &str = "glove_race/0.1";

pub struct WikiPageSource {
    client: Client,
    base: Url,
    title: Selector,
    content: Selector,
}

impl WikiPageSource {

    pub fn new(base_url: &str, title_selector: &str, content_selector: &str) -> Result<WikiPageSource, RaceError> {

        let base = Url::parse(base_url)
        .map_err(|e| RaceError::Config(format!("invalid base url '{}': {}", base_url, e)))?;
        let client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| RaceError::Config(format!("cannot build http client: {}", e)))?;

        Ok(Self {
            client: client,
            base: base,
            title: parse_selector(title_selector)?,
            content: parse_selector(content_selector)?
        })
    }

    /// Reads the title and content anchors out of an html document.
    pub fn extract(&self, html: &str) -> Page {

        let document = Html::parse_document(html);
        let title = document
        .select(&self.title)
        .next()
        .map(|el| el.text().collect::<String>())
        .unwrap_or_default();

        let links = document
        .select(&self.content)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let text = a.text().collect::<String>();
            Some(Link::new(&text, href, is_internal(href)))
        })
        .collect::<Vec<Link>>();

        Page { title: title, links: links }
    }
}

impl PageSource for WikiPageSource {

    fn fetch_and_extract_links(&self, reference: &str) -> Result<Page, RaceError> {

        let fetch_err = |reason: String| RaceError::Fetch { reference: reference.to_owned(), reason: reason };

        debug!("GET {}", reference);
        let body = self.client
        .get(reference)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .map_err(|e| fetch_err(e.to_string()))?;

        Ok(self.extract(&body))
    }

    fn resolve(&self, href: &str) -> Result<String, RaceError> {
        self.base
        .join(href)
        .map(|url| url.to_string())
        .map_err(|e| RaceError::Fetch { reference: href.to_owned(), reason: e.to_string() })
    }
}

/// Same-site links are rooted paths, `//host/...` is protocol relative and leaves the site.
fn is_internal(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

fn parse_selector(selector: &str) -> Result<Selector, RaceError> {
    Selector::parse(selector)
    .map_err(|e| RaceError::Config(format!("invalid selector '{}': {}", selector, e)))
}
