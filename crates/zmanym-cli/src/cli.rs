//! Command-line interface definition.

use clap::{Parser, Subcommand};

/// zmanym - Shabbat, holiday and daily zmanim times
#[derive(Debug, Parser)]
#[command(name = "zmanym")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search for a location by name or postal code
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Candle lighting, havdalah, parsha and upcoming holidays
    Shabbat {
        /// Geoname identifier (defaults to the saved location)
        #[arg(long, conflicts_with = "zip")]
        id: Option<String>,

        /// Name to remember alongside the cached data
        #[arg(long)]
        name: Option<String>,

        /// Postal code instead of a geoname identifier
        #[arg(long)]
        zip: Option<String>,
    },

    /// Daily zmanim for one date
    Daily {
        /// Geoname identifier (defaults to the saved location)
        #[arg(long, conflicts_with = "zip")]
        id: Option<String>,

        /// Postal code instead of a geoname identifier
        #[arg(long)]
        zip: Option<String>,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Find the location nearest to coordinates
    Locate {
        #[arg(allow_negative_numbers = true)]
        latitude: f64,

        #[arg(allow_negative_numbers = true)]
        longitude: f64,

        /// Save the result as the preferred location
        #[arg(long)]
        save: bool,
    },

    /// Manage the saved location
    Location {
        #[command(subcommand)]
        action: LocationAction,
    },

    /// Inspect or maintain the local cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum LocationAction {
    /// Show the saved location
    Show,
    /// Forget the saved location
    Clear,
    /// Search and save the first match
    Set {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show what the weekly cache holds
    Info,
    /// Remove every cached entry
    Clear,
    /// Remove expired entries
    Prune,
}
