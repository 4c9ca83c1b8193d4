//! Simulation invariant violations

use thiserror::Error;

use super::entity::{EntityId, EntityKind};

/// Programming errors surfaced by the simulation core
///
/// Levels and ids are generated internally, so any of these indicates a bug
/// in the caller rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("{kind} level {level} outside permitted range {min}-{max}")]
    InvalidLevel {
        kind: EntityKind,
        level: u8,
        min: u8,
        max: u8,
    },
    #[error("{kind} {id} is not a member of its group")]
    NotAMember { kind: EntityKind, id: EntityId },
    #[error("simulation already started")]
    AlreadyStarted,
    #[error("simulation not started")]
    NotStarted,
}
