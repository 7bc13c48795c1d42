//! CLI argument parsing for the catalog.
//!
//! CLI flags override all other config sources.

use clap::{Parser, Subcommand};

/// Design-asset catalog
///
/// Manage topics, styles, places and items with positional aliases.
#[derive(Parser, Debug)]
#[command(name = "catalog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/catalog/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Topic management
    #[command(subcommand)]
    Topic(TopicCommands),

    /// Style management
    #[command(subcommand)]
    Style(StyleCommands),

    /// Place management
    #[command(subcommand)]
    Place(PlaceCommands),

    /// Item management
    #[command(subcommand)]
    Item(ItemCommands),

    /// Print the whole catalog as a nested tree
    Tree,

    /// Show the topic audit log
    History {
        /// Only rows for this topic id
        #[arg(long)]
        topic: Option<u64>,
    },

    /// Administrative commands
    #[command(subcommand)]
    Admin(AdminCommands),
}

/// Topic subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum TopicCommands {
    /// Create a topic (aliased A, B, C, ...)
    Create {
        /// Topic name
        name: String,
    },

    /// List topics in creation order
    List,

    /// Show one topic
    Show {
        /// Topic id
        id: u64,
    },

    /// Delete a topic with everything under it and re-alias the rest
    Delete {
        /// Topic id
        id: u64,
    },

    /// Re-alias topics to match their creation order
    Reindex,
}

/// Style subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum StyleCommands {
    /// Create a style under a topic (aliased 1, 2, 3, ...)
    Create {
        /// Style name
        name: String,

        /// Parent topic id
        #[arg(long)]
        topic: u64,
    },
}

/// Place subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum PlaceCommands {
    /// Create a place under a style (aliased I, II, III, ...)
    Create {
        /// Place name
        name: String,

        /// Parent style id
        #[arg(long)]
        style: u64,
    },
}

/// Item subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ItemCommands {
    /// Create an item under a place
    Create {
        /// Item name
        name: String,

        /// Parent place id
        #[arg(long)]
        place: u64,

        /// Optional alias, stored as given
        #[arg(long)]
        alias: Option<String>,

        #[arg(long)]
        width: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        /// Image location, recorded as given
        #[arg(long)]
        image_url: Option<String>,

        /// Playground document as JSON
        #[arg(long)]
        playground: Option<String>,
    },

    /// Show one item
    Show {
        /// Item id
        id: u64,
    },

    /// Replace an item's playground document
    Playground {
        /// Item id
        id: u64,

        /// Playground document as JSON
        json: String,
    },

    /// Delete one item
    Delete {
        /// Item id
        id: u64,
    },
}

/// Admin subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommands {
    /// Show database statistics
    Stats,

    /// Trigger RocksDB compaction
    Compact {
        /// Compact only specific column family
        #[arg(long)]
        cf: Option<String>,
    },
}
