use crate::error::RaceError;
use crate::search::{BLACKLIST, DEFAULT_MAX_STEPS};

use clap::Parser;
use serde_json::Value;
use std::{fs::File, fmt::Display, io::BufReader, path::PathBuf};

pub const DEFAULT_VECTORS: &str = "data/glove.6B.100d.txt";
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
pub const DEFAULT_TITLE_SELECTOR: &str = "h1#firstHeading";
pub const DEFAULT_CONTENT_SELECTOR: &str = "#mw-content-text a";

/// Race from a page to a target word by following the closest link text.
#[derive(Parser, Debug, Clone)]
#[command(name = "glove_race", version)]
pub struct Cli {
    /// Page to start from, absolute url or a path on the base site.
    pub start: String,

    /// Word to race towards.
    pub target: String,

    /// Embedding table, `word v1 .. vN` per line (optionally .gz).
    #[arg(long)]
    pub vectors: Option<PathBuf>,

    /// Json index of a trained `.npy` matrix, used together with `--vectors`.
    #[arg(long)]
    pub words: Option<PathBuf>,

    #[arg(long)]
    pub base_url: Option<String>,

    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Link text never followed, repeatable. Replaces the built-in list.
    #[arg(long = "blacklist")]
    pub blacklist: Vec<String>,

    /// Json file with any of the options above.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Clone, Debug)]
pub struct Params {
    pub start: String,
    pub target: String,
    pub vectors: PathBuf,
    pub words: Option<PathBuf>,
    pub base_url: String,
    pub max_steps: usize,
    pub blacklist: Vec<String>,
    pub title_selector: String,
    pub content_selector: String,
}

impl Display for Params {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using params:
        start: {}
        target: {}
        vectors: {}
        words: {:?}
        base_url: {}
        max_steps: {}
        blacklist: {:?}
        title_selector: {}
        content_selector: {}",
        self.start, self.target, self.vectors.display(), self.words, self.base_url, self.max_steps, self.blacklist,
        self.title_selector, self.content_selector)
    }
}

impl Params {

    /// Flags win over the json file, the file wins over defaults.
    pub fn new(cli: &Cli) -> Result<Params, RaceError> {

        let json = match &cli.config {
            Some(path) => {
                let f = BufReader::new(File::open(path)?);
                let json: Value = serde_json::from_reader(f)?;
                if !json.is_object() {
                    return Err(RaceError::Config(format!("{} should hold a json object", path.display())));
                }
                json
            },
            None => Value::Null
        };

        let vectors = match &cli.vectors {
            Some(vectors) => vectors.to_owned(),
            None => PathBuf::from(json_str(&json, "vectors")?.unwrap_or(DEFAULT_VECTORS))
        };
        let words = match &cli.words {
            Some(words) => Some(words.to_owned()),
            None => json_str(&json, "words")?.map(PathBuf::from)
        };
        let base_url = match &cli.base_url {
            Some(base_url) => base_url.to_owned(),
            None => json_str(&json, "base_url")?.unwrap_or(DEFAULT_BASE_URL).to_owned()
        };
        let max_steps = match cli.max_steps {
            Some(max_steps) => max_steps,
            None => match json.get("max_steps") {
                Some(max_steps) => max_steps.as_u64().ok_or_else(|| not_type("max_steps", "a positive integer"))? as usize,
                None => DEFAULT_MAX_STEPS
            }
        };
        let blacklist = if !cli.blacklist.is_empty() {
            cli.blacklist.to_owned()
        } else {
            match json.get("blacklist") {
                Some(Value::Array(words)) => words
                .iter()
                .map(|w| w.as_str().map(|w| w.to_owned()).ok_or_else(|| not_type("blacklist", "a list of strings")))
                .collect::<Result<Vec<String>, RaceError>>()?,
                Some(_) => return Err(not_type("blacklist", "a list of strings")),
                None => BLACKLIST.iter().map(|w| w.to_string()).collect()
            }
        };
        let title_selector = json_str(&json, "title_selector")?.unwrap_or(DEFAULT_TITLE_SELECTOR).to_owned();
        let content_selector = json_str(&json, "content_selector")?.unwrap_or(DEFAULT_CONTENT_SELECTOR).to_owned();

        let target = cli.target.trim().to_lowercase();
        if target.is_empty() {
            return Err(RaceError::Config("target word is empty".to_owned()));
        }

        Ok(Params {
            start: cli.start.to_owned(),
            target: target,
            vectors: vectors,
            words: words,
            base_url: base_url,
            max_steps: max_steps,
            blacklist: blacklist,
            title_selector: title_selector,
            content_selector: content_selector
        })
    }

}

fn json_str<'a>(json: &'a Value, key: &str) -> Result<Option<&'a str>, RaceError> {
    match json.get(key) {
        Some(value) => value.as_str().map(Some).ok_or_else(|| not_type(key, "a string")),
        None => Ok(None)
    }
}

fn not_type(key: &str, expected: &str) -> RaceError {
    RaceError::Config(format!("{} should be {}", key, expected))
}
