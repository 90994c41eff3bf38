use clap::Parser;
use tradebuckets::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
