//! Traffic Module
//!
//! Synthetic load generation: arrival schedules, key selection, dispatch and
//! run lifecycle.

pub mod catalog;
pub mod controller;
pub mod dispatcher;
pub mod schedule;
pub mod target;

pub use catalog::{KeyCatalog, KeyPopularity};
pub use controller::{patterns, LoadPattern, RunConfig, RunController, RunStats, RunStatus};
pub use dispatcher::{Dispatcher, RunCounters};
pub use schedule::{ArrivalSchedule, Distribution};
pub use target::{HttpCacheTarget, RequestTarget};
