// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::colors;
use crate::help;

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// A kind of live entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    Route,
    Station,
    Vehicle,
}

/// An agency-wide listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ListingKind {
    Routes,
    Stations,
    Vehicles,
}

#[derive(Parser)]
#[command(name = "wayline")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Live transit routes, stations, and vehicles from a WAMP router")]
#[command(help_template = help::template())]
#[command(before_help = help::commands())]
#[command(after_help = help::quickstart())]
#[command(styles = help::styles())]
pub struct Cli {
    /// Configuration file (default: the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reduce an itinerary to its canonical route
    #[command(after_help = colors::examples("\
Examples:
  wayline canonical A B C A B C          Three constant stops
  wayline canonical A B C A B D C        D is conditional
  wayline canonical A B C -o json        Machine-readable output"))]
    Canonical {
        /// Stop codes in itinerary order
        #[arg(required = true, value_parser = non_empty_string)]
        stops: Vec<String>,

        #[arg(long, short, value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Decode a topic publication and print the typed event
    #[command(after_help = colors::examples("\
Examples:
  wayline decode --topic stations.A --event update '[{\"stop_code\": \"A\"}]'"))]
    Decode {
        /// Topic the publication arrived on
        #[arg(long, value_parser = non_empty_string)]
        topic: String,

        /// Event name from the publication header
        #[arg(long, value_parser = non_empty_string)]
        event: String,

        /// Originator from the publication header
        #[arg(long)]
        originator: Option<String>,

        /// Positional payload as a JSON array
        #[arg(value_name = "ARGS_JSON", default_value = "[]")]
        args: String,
    },

    /// List agency routes, stations, or vehicles
    List {
        #[arg(value_enum)]
        kind: ListingKind,
    },

    /// Follow a route, station, or vehicle until interrupted
    Watch {
        #[arg(value_enum)]
        kind: EntityKind,

        /// Route short name, stop code, or vehicle name
        #[arg(value_parser = non_empty_string)]
        id: String,
    },

    /// Show upcoming visits of a station
    Visits {
        /// Stop code
        #[arg(value_parser = non_empty_string)]
        stop: String,

        /// Maximum number of visits
        #[arg(long, short = 'n', default_value_t = 5)]
        limit: u32,
    },

    /// List stations within the agency search radius of a position
    Near {
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
