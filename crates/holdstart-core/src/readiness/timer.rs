//! Per-participant hold timer.
//!
//! Tracks one button-holder's progress toward "ready". The timer is a pure
//! state machine with no internal clock - the owning coordinator forwards
//! `advance()` to it once per time slice.
//!
//! ## Classification
//!
//! ```text
//! OUT -> WAIT -> ACTIVE -> START
//!          ^-- blocks the group decision while anyone sits here
//! ```
//!
//! Classification is recomputed from the continuous state on every query, so
//! it can never diverge from the level.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StartError};

/// Classification of one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Fully settled at level zero.
    Out,
    /// Mid-transition: rising toward commitment, or not yet fully released.
    /// A participant in this state holds up the whole group's start decision.
    Wait,
    /// Provisionally committed for this press cycle.
    Active,
    /// Fully ready.
    Start,
}

/// How a timer accumulates and sheds hold time.
///
/// The observed mechanic has three near-equivalent formulations; a single
/// policy value covers them all so a coordinator's fleet stays one timer
/// type. Levels and delays are in seconds, but any unit works as long as the
/// caller's `advance` steps use the same one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoldPolicy {
    /// Level rises toward `start` while pressed; crossing `active` commits
    /// the participant. Releasing before commitment zeroes the level
    /// immediately, and a committed participant who decays below `active`
    /// drops fully out.
    Threshold { active: f64, start: f64 },
    /// Like [`HoldPolicy::Threshold`], but on release the level first snaps
    /// down to the `grace` floor before decaying. Letting go near full
    /// charge is felt at once while still leaving a short settle tail, so a
    /// single-tick flicker cannot toggle the classification.
    GraceThreshold { active: f64, start: f64, grace: f64 },
    /// Commitment is a full countdown instead of a threshold crossing: a
    /// press must outlast `join_delay` before the participant joins, and a
    /// release must outlast `leave_delay` before they retract. While the
    /// countdown runs the participant counts as [`Classification::Wait`]
    /// in either direction.
    DelayCounter { join_delay: f64, leave_delay: f64 },
}

impl HoldPolicy {
    /// Check the policy's numbers.
    ///
    /// Threshold variants require `0 < active < start` (and a finite grace
    /// floor); the delay variant requires both delays positive. NaN and
    /// infinities are rejected everywhere.
    pub fn validate(&self) -> Result<()> {
        match *self {
            HoldPolicy::Threshold { active, start } => validate_levels(active, start),
            HoldPolicy::GraceThreshold {
                active,
                start,
                grace,
            } => {
                validate_levels(active, start)?;
                if !grace.is_finite() {
                    return Err(StartError::InvalidConfiguration(format!(
                        "grace level must be a finite number (got {grace})"
                    )));
                }
                Ok(())
            }
            HoldPolicy::DelayCounter {
                join_delay,
                leave_delay,
            } => {
                for (name, value) in [("join delay", join_delay), ("leave delay", leave_delay)] {
                    if !value.is_finite() || value <= 0.0 {
                        return Err(StartError::InvalidConfiguration(format!(
                            "{name} must be a positive number (got {value})"
                        )));
                    }
                }
                Ok(())
            }
        }
    }
}

impl Default for HoldPolicy {
    /// The levels used by the arcade-cabinet demo setup: two seconds of
    /// holding to commit, five to become fully ready, one second of grace.
    fn default() -> Self {
        HoldPolicy::GraceThreshold {
            active: 2.0,
            start: 5.0,
            grace: 1.0,
        }
    }
}

fn validate_levels(active: f64, start: f64) -> Result<()> {
    if !active.is_finite() || !start.is_finite() || active <= 0.0 || start <= active {
        return Err(StartError::InvalidConfiguration(format!(
            "active level must be positive and less than the start level \
             (active: {active}, start: {start})"
        )));
    }
    Ok(())
}

/// One participant's hold timer.
///
/// Instances are created by [`ReadinessCoordinator`] with its shared policy;
/// the policy value is assumed valid here.
///
/// [`ReadinessCoordinator`]: crate::readiness::ReadinessCoordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantTimer {
    policy: HoldPolicy,
    /// Raw input signal as last reported by the caller.
    pressed: bool,
    /// Accumulated hold time, bounded to `[0, start]`. In the delay-counter
    /// variant this holds the remaining countdown instead.
    level: f64,
    /// Latched when the level crosses `active` on the way up; never revoked
    /// mid-press, cleared only when the level settles back to zero. In the
    /// delay-counter variant this is `joined`.
    committed: bool,
}

impl ParticipantTimer {
    pub(crate) fn new(policy: HoldPolicy) -> Self {
        let level = match policy {
            // The countdown sits fully armed while the participant is out.
            HoldPolicy::DelayCounter { join_delay, .. } => join_delay,
            _ => 0.0,
        };
        Self {
            policy,
            pressed: false,
            level,
            committed: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Progress toward readiness, for bar-graph style rendering.
    ///
    /// Threshold variants report the raw level in `[0, start]`; the
    /// delay-counter variant reports a normalized fraction in `[0, 1]`.
    pub fn level(&self) -> f64 {
        match self.policy {
            HoldPolicy::DelayCounter {
                join_delay,
                leave_delay,
            } => {
                if self.committed {
                    self.level / leave_delay
                } else {
                    1.0 - self.level / join_delay
                }
            }
            _ => self.level,
        }
    }

    pub fn classification(&self) -> Classification {
        match self.policy {
            HoldPolicy::Threshold { start, .. } | HoldPolicy::GraceThreshold { start, .. } => {
                if self.level >= start {
                    Classification::Start
                } else if self.committed {
                    Classification::Active
                } else if self.level > 0.0 {
                    Classification::Wait
                } else {
                    Classification::Out
                }
            }
            HoldPolicy::DelayCounter { .. } => {
                if self.pressed != self.committed {
                    Classification::Wait
                } else if self.committed {
                    Classification::Start
                } else {
                    Classification::Out
                }
            }
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set the raw input signal. No time advances.
    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    /// Step the timer by `elapsed` seconds.
    ///
    /// Rejects a non-positive or non-finite step with
    /// [`StartError::InvalidTimeStep`] without mutating anything.
    pub fn advance(&mut self, elapsed: f64) -> Result<()> {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return Err(StartError::InvalidTimeStep(elapsed));
        }
        match self.policy {
            HoldPolicy::Threshold { active, start } => {
                self.step_threshold(elapsed, active, start, None)
            }
            HoldPolicy::GraceThreshold {
                active,
                start,
                grace,
            } => self.step_threshold(elapsed, active, start, Some(grace)),
            HoldPolicy::DelayCounter {
                join_delay,
                leave_delay,
            } => self.step_delay(elapsed, join_delay, leave_delay),
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn step_threshold(&mut self, elapsed: f64, active: f64, start: f64, grace: Option<f64>) {
        if self.pressed {
            self.level = (self.level + elapsed).min(start);
            if self.level >= active {
                self.committed = true;
            }
            return;
        }
        match grace {
            Some(grace) => {
                // Quick-release rule: anything above the grace floor is
                // discarded before the decay starts.
                if self.level > grace {
                    self.level = grace;
                }
                self.level = (self.level - elapsed).max(0.0);
            }
            None => {
                if self.committed {
                    self.level = (self.level - elapsed).max(0.0);
                    if self.level < active {
                        // Decaying below the commit point drops the
                        // participant fully out.
                        self.level = 0.0;
                    }
                } else {
                    // An uncommitted press retracts instantly.
                    self.level = 0.0;
                }
            }
        }
        if self.level <= 0.0 {
            self.committed = false;
        }
    }

    fn step_delay(&mut self, elapsed: f64, join_delay: f64, leave_delay: f64) {
        if self.pressed != self.committed {
            self.level -= elapsed;
            if self.level <= 0.0 {
                // Countdown exhausted: the transition commits.
                self.committed = self.pressed;
                self.level = 0.0;
            }
        }
        if self.pressed == self.committed {
            // Settled: re-arm the countdown for the next direction change.
            // A release mid-join (or press mid-leave) lands here too, which
            // retracts the unfinished transition in full.
            self.level = if self.committed {
                leave_delay
            } else {
                join_delay
            };
        }
    }
}
