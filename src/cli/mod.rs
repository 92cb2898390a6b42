//! Command-line interface, parsed with clap.

mod commands;

use clap::{Args, Parser, Subcommand};

use crate::domain::Condition;

/// Laptop catalog admin service
#[derive(Parser)]
#[command(name = "laptopstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    #[command(alias = "daemon")]
    Serve,

    /// Create a default config.toml in the working directory
    #[command(alias = "--init")]
    Init,

    /// Print the catalog, optionally filtered
    #[command(alias = "ls")]
    List(ListArgs),
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Case-insensitive brand substring
    #[arg(long)]
    pub brand: Option<String>,

    /// Highest price to include (default: the catalog maximum)
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Conditions to include, comma-separated (New,Used,Refurbished)
    #[arg(long, value_delimiter = ',')]
    pub condition: Vec<Condition>,

    /// Case-insensitive processor substring
    #[arg(long)]
    pub processor: Option<String>,

    /// Case-insensitive RAM substring
    #[arg(long)]
    pub ram: Option<String>,
}

pub use commands::*;
