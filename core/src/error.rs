//! Error type shared by the engine, the entities and topology loading.
//!
//! Every variant is fatal for the run that raised it: the engine stops and
//! hands the error back to the caller, leaving entity state inspectable.

use crate::traits::EntityId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("cannot schedule event at t={requested} when current time is t={current}")]
    InvalidSchedule { requested: f64, current: f64 },

    #[error("dispatcher {dispatcher} has no candidate processing nodes")]
    NoAvailableNode { dispatcher: EntityId },

    #[error("entity {entity} cannot handle a {found} payload (expected {expected})")]
    MalformedPayload {
        entity: EntityId,
        expected: &'static str,
        found: &'static str,
    },

    #[error("entity {0} is not registered")]
    UnregisteredEntity(EntityId),

    #[error("entity {0} is already registered")]
    DuplicateEntity(EntityId),

    #[error("entity {0} registered after the simulation started")]
    RegistrationClosed(EntityId),

    #[error("entity {entity} is not a {expected}")]
    EntityTypeMismatch {
        entity: EntityId,
        expected: &'static str,
    },

    #[error("cannot link {from} -> {to}: {reason}")]
    InvalidLink {
        from: EntityId,
        to: EntityId,
        reason: String,
    },

    #[error("entity {0} has no downstream target")]
    Unlinked(EntityId),

    #[error("invalid virtual time or delay: {0}")]
    InvalidTime(f64),

    #[error("unknown component kind: {0}")]
    UnknownComponent(String),

    #[error("unknown offloading policy: {0}")]
    UnknownPolicy(String),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
