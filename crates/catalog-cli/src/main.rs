//! Design-asset catalog CLI
//!
//! # Usage
//!
//! ```bash
//! catalog topic create "Botanical"
//! catalog style create "Flat" --topic 1
//! catalog place create "North wall" --style 1
//! catalog item create "Poster" --place 1 --alias hero
//! catalog topic delete 1
//! catalog tree
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/catalog/config.toml)
//! 3. Environment variables (CATALOG_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use catalog_cli::{run, Cli};

fn main() -> Result<()> {
    run(Cli::parse())
}
