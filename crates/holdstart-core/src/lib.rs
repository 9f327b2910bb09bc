//! # Holdstart Core Library
//!
//! Core state machine for a "hold-to-ready" quorum countdown: every
//! participant holds a button, holding it long enough marks them ready, and
//! the session may start once enough participants are simultaneously ready
//! and nobody is mid-button-press.
//!
//! The library is a pure, synchronous simulation. It owns no clock and no
//! threads -- the caller (a real-time loop or a test harness) calls
//! [`ReadinessCoordinator::advance`] once per time slice and polls the
//! per-participant and aggregate queries afterwards. Rendering, sleeping and
//! input debouncing all belong to that caller.
//!
//! ## Key Components
//!
//! - [`ParticipantTimer`]: one participant's hold timer, with release
//!   hysteresis so brief taps and brief releases do not flip readiness
//! - [`ReadinessCoordinator`]: the fleet of timers plus the group start
//!   decision
//! - [`HoldPolicy`]: the commit/ready/grace parameterization shared by every
//!   timer a coordinator creates

pub mod error;
pub mod readiness;

pub use error::{Result, StartError};
pub use readiness::{
    Classification, HoldPolicy, ParticipantId, ParticipantSnapshot, ParticipantTimer,
    ReadinessCoordinator, RosterSnapshot,
};
