mod coordinator;
mod timer;

pub use coordinator::{
    ParticipantId, ParticipantSnapshot, ReadinessCoordinator, RosterSnapshot,
};
pub use timer::{Classification, HoldPolicy, ParticipantTimer};
