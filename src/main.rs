//! # conhead
//!
//! A tool that keeps consistent, up-to-date headers at the top of source files.

use anyhow::Result;
use conhead::cli::{Cli, run};

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse_args();
  run(cli.args).await
}
