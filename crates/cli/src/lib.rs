// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! wlrs - the library behind the `wayline` command line.
//!
//! Offline commands (`canonical`, `decode`) run the wl-core reducer and
//! decoder directly. Live commands load the client configuration and talk
//! to the router through a [`wl_client::Client`].

mod cli;
pub mod colors;
mod commands;
pub mod error;
pub mod help;
pub mod logging;

pub use cli::{Cli, Command, EntityKind, ListingKind, OutputFormat};
pub use error::{Error, Result};

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let Cli {
        config, command, ..
    } = cli;
    match command {
        Command::Canonical { stops, output } => commands::canonical::run(&stops, output),
        Command::Decode {
            topic,
            event,
            originator,
            args,
        } => commands::decode::run(&topic, &event, originator.as_deref(), &args),
        Command::List { kind } => {
            let config = commands::load_config(config.as_deref())?;
            commands::list::run(&config, kind)
        }
        Command::Watch { kind, id } => {
            let config = commands::load_config(config.as_deref())?;
            commands::watch::run(&config, kind, &id)
        }
        Command::Visits { stop, limit } => {
            let config = commands::load_config(config.as_deref())?;
            commands::visits::run(&config, &stop, limit)
        }
        Command::Near { lat, lon } => {
            let config = commands::load_config(config.as_deref())?;
            commands::near::run(&config, lat, lon)
        }
        Command::Config => {
            let config = commands::load_config(config.as_deref())?;
            commands::config::run(&config)
        }
    }
}
