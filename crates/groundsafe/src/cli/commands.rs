//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::catalog::CatalogFilter;
use crate::record::Category;

/// Cards command arguments.
#[derive(Debug, Args)]
pub struct CardsCommand {
    /// Highlight and filter by this text (title and content)
    #[arg(short = 's', long = "query", default_value = "")]
    pub query: String,

    /// Only show cases of this category
    #[arg(short = 't', long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Show a single case by id
    #[arg(long, conflicts_with_all = ["category"])]
    pub id: Option<i64>,

    /// Resolve image URLs against this directory and report their state
    #[arg(short, long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

impl CardsCommand {
    /// The catalog filter described by these arguments.
    #[must_use]
    pub fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            query: self.query.clone(),
            category: self.category.map(Category::from),
        }
    }
}

/// Dashboard command arguments.
#[derive(Debug, Args)]
pub struct DashboardCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Category argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    /// Best-practice cases
    Excellence,
    /// Incident cases
    General,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Excellence => Self::Excellence,
            CategoryArg::General => Self::General,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}
