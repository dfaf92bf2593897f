//! ngramlab executable.

use anyhow::Result;
use clap::Parser;
use ngramlab_cli::cli::{run_cli, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_cli(cli)
}
