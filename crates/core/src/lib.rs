// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! wl-core: Shared, runtime-free building blocks for the wayline client.
//!
//! This crate holds everything that is a pure function of its inputs:
//! the tagged wire [`Value`], decoded entity [`snapshot`]s, topic naming,
//! the topic event decoder, and the canonical route reducer.

#[macro_use]
pub mod value;

pub mod canonical;
pub mod error;
pub mod event;
pub mod snapshot;
pub mod topic;

pub use canonical::{reduce, CanonicalRoute, OrderingConflict, StopKind, StopMarker};
pub use error::{DecodeError, DecodeResult};
pub use event::{
    decode_call_result, decode_publication, decode_publication_kwargs, last_event_request,
    Decoded, EventKind, Listing, RouteEvent, ScheduleResult, StationEvent, TopicEvent, VehicleEvent,
};
pub use snapshot::{
    Coordinate, RouteSnapshot, ScheduledVisit, Snapshot, StationSnapshot, Transition,
    TransitionKind, VehicleSnapshot,
};
pub use topic::{split_topic, Namespace, Procedures};
pub use value::{Args, Fields, Kwargs, Value};
