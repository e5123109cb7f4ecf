//! Common error infrastructure for combat-core.
//!
//! Only *invalid-state* conditions are errors here. Resource starvation is a
//! paused session, legality refusals are silent outcomes, and data-integrity
//! problems are sanitized before they reach the pipeline.

use crate::env::SpellId;
use crate::state::{ActorId, EquipSlot, ItemHandle};

/// Severity level of an error, used for categorization and logging priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the caller may try again later.
    Recoverable,

    /// Invalid input that should be rejected without retry.
    Validation,

    /// Unexpected state inconsistency. Logged and skipped, never fatal.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for all combat errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Static identifier for this error variant, for logs and tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Invalid-state errors raised by the request API and the tick loop.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatError {
    #[error("actor {0} is not registered")]
    ActorNotFound(ActorId),

    #[error("actor {0} is already spawned")]
    AlreadySpawned(ActorId),

    #[error("actor {0} cannot target itself")]
    SelfTarget(ActorId),

    #[error("item {0} is not in the catalog")]
    ItemNotFound(ItemHandle),

    #[error("spell {0} is not in the catalog")]
    SpellNotFound(SpellId),

    #[error("actor {actor} has nothing equipped in {slot:?}")]
    EmptySlot { actor: ActorId, slot: EquipSlot },

    #[error("item {item} cannot be equipped in {slot:?}")]
    SlotMismatch { item: ItemHandle, slot: EquipSlot },
}

impl GameError for CombatError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActorNotFound(_) | Self::ItemNotFound(_) | Self::SpellNotFound(_) => {
                ErrorSeverity::Internal
            }
            Self::AlreadySpawned(_) | Self::SelfTarget(_) | Self::SlotMismatch { .. } => {
                ErrorSeverity::Validation
            }
            Self::EmptySlot { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorNotFound(_) => "COMBAT_ACTOR_NOT_FOUND",
            Self::AlreadySpawned(_) => "COMBAT_ALREADY_SPAWNED",
            Self::SelfTarget(_) => "COMBAT_SELF_TARGET",
            Self::ItemNotFound(_) => "COMBAT_ITEM_NOT_FOUND",
            Self::SpellNotFound(_) => "COMBAT_SPELL_NOT_FOUND",
            Self::EmptySlot { .. } => "COMBAT_EMPTY_SLOT",
            Self::SlotMismatch { .. } => "COMBAT_SLOT_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_actor_is_internal() {
        let err = CombatError::ActorNotFound(ActorId(4));
        assert!(err.severity().is_internal());
        assert_eq!(err.error_code(), "COMBAT_ACTOR_NOT_FOUND");
        assert_eq!(err.to_string(), "actor #4 is not registered");
    }
}
