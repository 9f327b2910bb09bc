//! Aggregate readiness decision over a fleet of participant timers.
//!
//! The coordinator owns one [`ParticipantTimer`] per participant id, created
//! lazily with a shared, validated [`HoldPolicy`]. The external driver feeds
//! it press/release edges, calls [`ReadinessCoordinator::advance`] once per
//! time slice, and polls [`ReadinessCoordinator::should_start`] (or a full
//! [`RosterSnapshot`]) afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StartError};
use crate::readiness::timer::{Classification, HoldPolicy, ParticipantTimer};

/// Opaque, stable identifier for one button-holder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u32);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One participant's row in a [`RosterSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantSnapshot {
    pub id: ParticipantId,
    pub pressed: bool,
    pub level: f64,
    pub classification: Classification,
}

/// Full state snapshot for a polling driver: one row per tracked
/// participant (sorted by id) plus the aggregate decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub participants: Vec<ParticipantSnapshot>,
    pub should_start: bool,
}

/// Fleet of hold timers plus the group start decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessCoordinator {
    policy: HoldPolicy,
    timers: HashMap<ParticipantId, ParticipantTimer>,
}

impl ReadinessCoordinator {
    /// Create a coordinator with the grace-threshold policy: commit at
    /// `active_level`, fully ready at `start_level`, snap to `grace_level`
    /// on release.
    ///
    /// Fails with [`StartError::InvalidConfiguration`] unless
    /// `0 < active_level < start_level` and `grace_level` is finite.
    pub fn new(active_level: f64, start_level: f64, grace_level: f64) -> Result<Self> {
        Self::with_policy(HoldPolicy::GraceThreshold {
            active: active_level,
            start: start_level,
            grace: grace_level,
        })
    }

    /// Create a coordinator with an explicit policy (any of the three
    /// variants). Validates the policy first; a rejected policy leaves no
    /// coordinator behind.
    pub fn with_policy(policy: HoldPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            timers: HashMap::new(),
        })
    }

    pub fn policy(&self) -> HoldPolicy {
        self.policy
    }

    // ── Per-participant driving ──────────────────────────────────────

    /// Timer for `id`, created with the shared policy on first access.
    pub fn timer(&mut self, id: ParticipantId) -> &mut ParticipantTimer {
        self.timers
            .entry(id)
            .or_insert_with(|| ParticipantTimer::new(self.policy))
    }

    /// Set the raw input signal for `id`, creating its timer if absent.
    /// No time advances.
    pub fn set_pressed(&mut self, id: ParticipantId, pressed: bool) {
        self.timer(id).set_pressed(pressed);
    }

    pub fn press(&mut self, id: ParticipantId) {
        self.set_pressed(id, true);
    }

    pub fn release(&mut self, id: ParticipantId) {
        self.set_pressed(id, false);
    }

    /// Step every tracked timer by `elapsed` seconds.
    ///
    /// The step is validated before any timer is touched, so a rejected
    /// step leaves the whole fleet unchanged rather than applying time to
    /// a subset.
    pub fn advance(&mut self, elapsed: f64) -> Result<()> {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return Err(StartError::InvalidTimeStep(elapsed));
        }
        for timer in self.timers.values_mut() {
            timer.advance(elapsed)?;
        }
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────
    //
    // Queries never create timers; an untracked id reads as a fresh one.

    pub fn is_pressed(&self, id: ParticipantId) -> bool {
        self.timers.get(&id).is_some_and(ParticipantTimer::is_pressed)
    }

    pub fn classification(&self, id: ParticipantId) -> Classification {
        self.timers
            .get(&id)
            .map_or(Classification::Out, ParticipantTimer::classification)
    }

    pub fn level(&self, id: ParticipantId) -> f64 {
        self.timers.get(&id).map_or(0.0, ParticipantTimer::level)
    }

    /// Ids currently in the given classification, sorted for stable output.
    pub fn participants_in(&self, classification: Classification) -> Vec<ParticipantId> {
        let mut ids: Vec<ParticipantId> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.classification() == classification)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Number of tracked participants in the given classification.
    pub fn count_in(&self, classification: Classification) -> usize {
        self.timers
            .values()
            .filter(|timer| timer.classification() == classification)
            .count()
    }

    /// The authoritative roster of fully ready participants, handed to the
    /// surrounding session-creation logic when the group starts.
    pub fn startable_participants(&self) -> Vec<ParticipantId> {
        self.participants_in(Classification::Start)
    }

    /// The group start decision. True iff:
    ///
    /// 1. at least two participants are fully ready (the minimum quorum for
    ///    a multiplayer session),
    /// 2. at least one participant is fully ready,
    /// 3. nobody is mid-transition.
    ///
    /// Rule 2 is implied by rule 1 today; it stays a separate check so a
    /// future relaxation of the quorum cannot silently lose it. Rule 3 is
    /// the anti-flicker gate: a participant still settling holds up the
    /// whole group even though they do not count toward the quorum.
    pub fn should_start(&self) -> bool {
        let started = self.count_in(Classification::Start);
        let waiting = self.count_in(Classification::Wait);
        started > 1 && started > 0 && waiting == 0
    }

    pub fn participant_count(&self) -> usize {
        self.timers.len()
    }

    /// Build a full state snapshot for the polling driver.
    pub fn snapshot(&self) -> RosterSnapshot {
        let mut participants: Vec<ParticipantSnapshot> = self
            .timers
            .iter()
            .map(|(id, timer)| ParticipantSnapshot {
                id: *id,
                pressed: timer.is_pressed(),
                level: timer.level(),
                classification: timer.classification(),
            })
            .collect();
        participants.sort_unstable_by_key(|row| row.id);
        RosterSnapshot {
            participants,
            should_start: self.should_start(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Discard every timer; the coordinator returns to its just-constructed
    /// state with the policy retained.
    pub fn reset_all(&mut self) {
        self.timers.clear();
    }
}
