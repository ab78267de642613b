//! # freebusy-engine
//!
//! Deterministic free/busy slot computation for AI calendar agents.
//!
//! Given a query window and an unordered list of busy intervals, the engine
//! produces an ordered sequence of free and busy slots that exactly tiles the
//! window. Overlapping and abutting busy periods are merged, and anything
//! outside the window is clipped away. LLMs are unreliable at this kind of
//! interval arithmetic, so callers hand it to the engine instead.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use freebusy_engine::{compute_time_slots, Interval};
//!
//! let at = |h| Utc.with_ymd_and_hms(2026, 3, 2, h, 0, 0).unwrap();
//! let window = Interval::new(at(9), at(17));
//! let busy = [Interval::new(at(10), at(11))];
//!
//! let slots = compute_time_slots(window, &busy).unwrap();
//! assert_eq!(slots.len(), 3);
//! assert!(slots[0].free && !slots[1].free && slots[2].free);
//! ```
//!
//! ## Modules
//!
//! - [`interval`] — `Interval` and `TimeSlot` value types
//! - [`freebusy`] — Merge-sweep over busy intervals into a tiled slot sequence
//! - [`error`] — Error types

pub mod error;
pub mod freebusy;
pub mod interval;

pub use error::FreeBusyError;
pub use freebusy::compute_time_slots;
pub use interval::{Interval, TimeSlot};
