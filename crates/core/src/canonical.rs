// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Reduction of a raw itinerary to its canonical loop.
//!
//! A route's itinerary lists every stop of every traversal, so stations
//! repeat once per loop and loops may differ where stops are served only on
//! request. The canonical route lists each station exactly once, in loop
//! order, marking stations served on every loop as constant and the rest as
//! conditional.
//!
//! The reduction runs in two phases:
//!
//! 1. Walk until a station repeats. Everything seen so far forms the base
//!    loop; stations seen before the repeated station's first occurrence
//!    were visited before the loop settled and become conditional.
//! 2. Walk the remaining itinerary against the loop, wrapping around it.
//!    A match advances. A station found elsewhere in the loop marks the
//!    skipped span conditional and resumes after it. A never-seen station is
//!    inserted as conditional at the expected position.
//!
//! A conditional station met *behind* the expected position within the
//! current gap between constant stops contradicts the order established by
//! an earlier loop. Such stations keep their first-seen position and are
//! reported as [`OrderingConflict`]s instead of being silently reordered.

use std::collections::HashMap;
use std::fmt;

/// Whether a stop is served on every loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopKind {
    Constant,
    Conditional,
}

impl StopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopKind::Constant => "constant",
            StopKind::Conditional => "conditional",
        }
    }
}

impl fmt::Display for StopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One position of the canonical route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopMarker {
    pub station: String,
    pub kind: StopKind,
}

impl StopMarker {
    pub fn constant(station: impl Into<String>) -> Self {
        StopMarker {
            station: station.into(),
            kind: StopKind::Constant,
        }
    }

    pub fn conditional(station: impl Into<String>) -> Self {
        StopMarker {
            station: station.into(),
            kind: StopKind::Conditional,
        }
    }

    pub fn is_conditional(&self) -> bool {
        self.kind == StopKind::Conditional
    }
}

/// A conditional station met in an order contradicting an earlier loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingConflict {
    pub station: String,
    /// Index into the normalized itinerary where the contradiction occurred.
    pub index: usize,
}

/// The reduced route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CanonicalRoute {
    pub stops: Vec<StopMarker>,
    pub conflicts: Vec<OrderingConflict>,
}

impl CanonicalRoute {
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn stations(&self) -> impl Iterator<Item = &str> {
        self.stops.iter().map(|s| s.station.as_str())
    }
}

/// Collapse immediately-adjacent repeats (dwell-time artifacts).
pub fn normalize<S: AsRef<str>>(itinerary: &[S]) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::with_capacity(itinerary.len());
    for station in itinerary {
        let station = station.as_ref();
        if out.last() != Some(&station) {
            out.push(station);
        }
    }
    out
}

/// Reduce a raw itinerary to its canonical route.
pub fn reduce<S: AsRef<str>>(itinerary: &[S]) -> CanonicalRoute {
    let stations = normalize(itinerary);
    let mut reducer = Reducer::default();

    // Phase 1: base loop.
    let mut index = 0;
    let mut expected = None;
    while let Some(&station) = stations.get(index) {
        if let Some(position) = reducer.position(station) {
            for stop in reducer.stops.iter_mut().take(position) {
                stop.kind = StopKind::Conditional;
            }
            expected = Some(position);
            break;
        }
        reducer.push(StopMarker::constant(station));
        index += 1;
    }

    // Itinerary never closed a loop: every station is constant.
    let Some(expected) = expected else {
        return reducer.finish();
    };

    // Phase 2: validate the remaining loops.
    reducer.expected = expected;
    reducer.anchor = None;
    for (offset, &station) in stations.iter().enumerate().skip(index) {
        reducer.visit(station, offset);
    }
    reducer.finish()
}

#[derive(Default)]
struct Reducer {
    stops: Vec<StopMarker>,
    index: HashMap<String, usize>,
    conflicts: Vec<OrderingConflict>,
    /// Position the next itinerary station should match.
    expected: usize,
    /// Position of the last constant stop matched in order during phase 2.
    anchor: Option<usize>,
}

impl Reducer {
    fn position(&self, station: &str) -> Option<usize> {
        self.index.get(station).copied()
    }

    fn push(&mut self, marker: StopMarker) {
        self.index.insert(marker.station.clone(), self.stops.len());
        self.stops.push(marker);
    }

    fn insert(&mut self, at: usize, marker: StopMarker) {
        self.stops.insert(at, marker);
        for (position, stop) in self.stops.iter().enumerate().skip(at) {
            self.index.insert(stop.station.clone(), position);
        }
        if let Some(anchor) = self.anchor.as_mut() {
            if *anchor >= at {
                *anchor += 1;
            }
        }
    }

    fn len(&self) -> usize {
        self.stops.len()
    }

    /// Cyclic distance from `from` forward to `to`.
    fn distance(&self, from: usize, to: usize) -> usize {
        (to + self.len() - from) % self.len()
    }

    fn visit(&mut self, station: &str, offset: usize) {
        match self.position(station) {
            Some(found) if found == self.expected => {
                if self.stops[found].kind == StopKind::Constant {
                    self.anchor = Some(found);
                }
                self.expected = (found + 1) % self.len();
            }
            Some(found) => {
                if self.is_behind(found) {
                    self.conflicts.push(OrderingConflict {
                        station: station.to_string(),
                        index: offset,
                    });
                    return;
                }
                let mut position = self.expected;
                while position != found {
                    self.stops[position].kind = StopKind::Conditional;
                    position = (position + 1) % self.len();
                }
                self.expected = (found + 1) % self.len();
            }
            None => {
                // Between the last and first stop of the loop: append.
                let at = if self.expected == 0 { self.len() } else { self.expected };
                self.insert(at, StopMarker::conditional(station));
                self.expected = (at + 1) % self.len();
            }
        }
    }

    /// Whether a conditional stop at `found` lies between the last in-order
    /// constant stop and the expected position, i.e. was already passed in
    /// this gap.
    fn is_behind(&self, found: usize) -> bool {
        let Some(anchor) = self.anchor else {
            return false;
        };
        if self.stops[found].kind != StopKind::Conditional {
            return false;
        }
        let to_found = self.distance(anchor, found);
        to_found > 0 && to_found < self.distance(anchor, self.expected)
    }

    fn finish(self) -> CanonicalRoute {
        CanonicalRoute {
            stops: self.stops,
            conflicts: self.conflicts,
        }
    }
}

#[cfg(test)]
#[path = "canonical_tests.rs"]
mod tests;
