//! CLI entry point for tintmap

use clap::Parser;
use tintmap::cli::{Cli, run};

fn main() {
    let cli = Cli::parse();
    tintmap::logger::init(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
