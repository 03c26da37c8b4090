// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Help text generation with colorization support.

use clap::builder::styling::Styles;

use crate::colors;

/// Clap styles matching [`colors`].
pub fn styles() -> Styles {
    if !colors::should_colorize() {
        return Styles::plain();
    }

    use anstyle::{Ansi256Color, Color, Style};

    let fg = |code| Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(code))));
    Styles::styled()
        .header(fg(colors::codes::HEADER))
        .usage(fg(colors::codes::HEADER))
        .literal(fg(colors::codes::LITERAL))
        .placeholder(fg(colors::codes::CONTEXT))
        .valid(fg(colors::codes::CONTEXT))
}

pub fn template() -> String {
    format!(
        "{{about-with-newline}}
{{usage-heading}} {{usage}}

{{before-help}}{}
{{options}}{{after-help}}",
        colors::header("Options:")
    )
}

/// Command overview shown before the options.
pub fn commands() -> String {
    format!(
        "\
{offline}
  {canonical}   Reduce an itinerary to its canonical route
  {decode}      Decode a topic publication

{live}
  {list}        List agency routes, stations, or vehicles
  {watch}       Follow a route, station, or vehicle
  {visits}      Show upcoming visits of a station
  {near}        List stations near a position
  {config}      Show the effective configuration
",
        offline = colors::header("Offline:"),
        live = colors::header("Live:"),
        canonical = colors::literal("canonical"),
        decode = colors::literal("decode"),
        list = colors::literal("list"),
        watch = colors::literal("watch"),
        visits = colors::literal("visits"),
        near = colors::literal("near"),
        config = colors::literal("config"),
    )
}

pub fn quickstart() -> String {
    colors::examples(
        "\
Examples:
  wayline canonical A B C A B D C    Canonical stop order of an itinerary
  wayline list routes                Routes served by the agency
  wayline watch station A            Follow arrivals at station A",
    )
}
