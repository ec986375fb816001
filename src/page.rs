use crate::error::RaceError;


/// A hyperlink as found on a page.
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub text: String,
    pub href: String,
    pub is_internal: bool,
}

impl Link {
    pub fn new(text: &str, href: &str, is_internal: bool) -> Link {
        Self {
            text: text.to_owned(),
            href: href.to_owned(),
            is_internal: is_internal
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub title: String,
    pub links: Vec<Link>,
}

/// Fetches pages and turns hrefs into references that can be fetched again.
pub trait PageSource {

    fn fetch_and_extract_links(&self, reference: &str) -> Result<Page, RaceError>;

    /// Maps an internal href found on a page to the next reference to fetch.
    fn resolve(&self, href: &str) -> Result<String, RaceError> {
        Ok(href.to_owned())
    }
}

impl<P: PageSource + ?Sized> PageSource for &P {
    fn fetch_and_extract_links(&self, reference: &str) -> Result<Page, RaceError> {
        (**self).fetch_and_extract_links(reference)
    }

    fn resolve(&self, href: &str) -> Result<String, RaceError> {
        (**self).resolve(href)
    }
}
