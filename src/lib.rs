mod config;
mod embedding;
mod error;
mod page;
mod run;
mod search;
mod wiki;

pub use config::{Cli, Params};
pub use embedding::EmbeddingTable;
pub use error::RaceError;
pub use page::{Link, Page, PageSource};
pub use run::{init_logging, Run};
pub use search::{GreedyLinkSearch, Step, Traversal, BLACKLIST, DEFAULT_MAX_STEPS};
pub use wiki::WikiPageSource;
