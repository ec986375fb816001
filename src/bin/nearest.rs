use clap::Parser;
use glove_race::{init_logging, EmbeddingTable, RaceError};
use std::{path::PathBuf, process::ExitCode};
use tracing::warn;


// prints the K nearest words to each given word, useful to see which links
// a race towards that word would prefer

/// Nearest words by euclidean distance in an embedding table.
#[derive(Parser, Debug)]
#[command(name = "nearest")]
struct Args {
    /// Embedding table, `word v1 .. vN` per line (optionally .gz).
    vectors: PathBuf,

    /// Words to look up.
    #[arg(required = true)]
    words: Vec<String>,

    #[arg(short, default_value_t = 10)]
    k: usize,
}

fn main() -> ExitCode {

    let args = Args::parse();
    init_logging(false);

    match run_similarity(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_similarity(args: &Args) -> Result<(), RaceError> {

    let table = EmbeddingTable::from_path(&args.vectors)?;

    for token in &args.words {
        let token = token.to_lowercase();
        let similarities = match table.nearest(&token, args.k) {
            Ok(similarities) => similarities,
            Err(RaceError::WordNotFound(w)) => {
                warn!("'{}' is not in the table, skipping", w);
                continue;
            },
            Err(e) => return Err(e)
        };

        println!("searching {} nearest words to {}", args.k, token);
        for (i, (similar_token, dist)) in similarities.iter().enumerate() {
            println!("{} : {} ? {} = {}", i, token, similar_token, dist);
        }
        println!();
    }

    Ok(())
}
