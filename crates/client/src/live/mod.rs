// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Live entities: identity-stable, observable mirrors of backend entities.
//!
//! A live entity is created once per identifier through the [`Registry`]
//! and updated in place, so everything holding it keeps seeing current
//! data. Associations own in one direction only (route to stations and
//! vehicles, station to vehicles); the reverse links are identifiers
//! resolved through the registry.

mod property;
mod reconcile;
mod registry;
mod route;
mod station;
mod tracker;
mod vehicle;

pub use property::Property;
pub use reconcile::{attach_or_apply_changes, check_identity, EntitySet, Reconcile};
pub use registry::Registry;
pub use route::LiveRoute;
pub use station::LiveStation;
pub use tracker::{track, ErrorChannel, Tracked, Tracker};
pub use vehicle::LiveVehicle;
