//! Materialized-file cache and in-flight tracking for Vellum.
//!
//! # Components
//!
//! - [`FileCache`] -- identifier to [`vellum_types::ResolvedFile`] mapping,
//!   valid for the process lifetime
//! - [`InMemoryFileCache`] -- `HashMap`-based cache
//! - [`InFlightTracker`] -- identifiers with a pipeline in progress, with
//!   parked waiters
//!
//! # Design Rules
//!
//! 1. The cache never evicts; entries leave only through a full reset.
//! 2. Only one pipeline per identifier may reach cache insertion; the tracker
//!    enforces this, so `put` is a plain overwrite.
//! 3. Tracker removal runs exactly once per admission, including on panics
//!    and early returns.

pub mod error;
pub mod inflight;
pub mod memory;
pub mod traits;

pub use error::{CacheError, CacheResult};
pub use inflight::{Admission, InFlightGuard, InFlightTracker};
pub use memory::InMemoryFileCache;
pub use traits::FileCache;
