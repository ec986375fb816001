use crate::config::{Cli, Params};
use crate::embedding::EmbeddingTable;
use crate::error::RaceError;
use crate::page::PageSource;
use crate::search::{GreedyLinkSearch, Traversal};
use crate::wiki::WikiPageSource;

use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};


pub struct Run {}

impl Run {

    // runs the race in 3 steps -
    // -> configuration of arguments
    // -> loading the embedding table
    // -> following links until found or stuck

    pub fn run(cli: Cli) -> Result<Traversal, RaceError> {

        init_logging(cli.verbose);

        info!("building parameters...");
        let params = Params::new(&cli)?;
        info!("{}", params);

        let timer = Instant::now();
        let table = match &params.words {
            Some(words) => EmbeddingTable::from_npy(&params.vectors, words)?,
            None => EmbeddingTable::from_path(&params.vectors)?
        };
        info!("loaded {}, took {} seconds ...", table, timer.elapsed().as_secs());

        let pages = WikiPageSource::new(&params.base_url, &params.title_selector, &params.content_selector)?;
        let start = if params.start.starts_with('/') {
            pages.resolve(&params.start)?
        } else {
            params.start.to_owned()
        };

        let timer = Instant::now();
        let traversal = GreedyLinkSearch::new(&table, &pages)
        .with_blacklist(params.blacklist.to_owned())
        .with_max_steps(params.max_steps)
        .run(&start, &params.target)?;

        info!("race finished after {} steps, took {} seconds ...", traversal.steps().len(), timer.elapsed().as_secs());
        Ok(traversal)
    }

}

pub fn init_logging(verbose: bool) {

    let default_level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
    .with_env_filter(filter)
    .with_target(false)
    .finish();

    // a second call keeps the first subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
}
