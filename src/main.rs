use clap::Parser;
use glove_race::{Cli, Run, Traversal};
use std::process::ExitCode;

fn main() -> ExitCode {

    let cli = Cli::parse();
    match Run::run(cli) {
        Ok(Traversal::Found { path, final_page, .. }) => {
            println!("found in {} words: {}", path.len(), path.join(" -> "));
            println!("{}", final_page);
            ExitCode::SUCCESS
        },
        Ok(Traversal::Stuck { path, .. }) => {
            println!("stuck after: {}", path.join(" -> "));
            ExitCode::from(2)
        },
        Ok(Traversal::StepLimit { path, .. }) => {
            println!("gave up after {} words: {}", path.len(), path.join(" -> "));
            ExitCode::from(3)
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
