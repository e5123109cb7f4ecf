//! Unified error types surfaced by the runtime API.
//!
//! Wraps worker coordination failures and the engine's invalid-state errors
//! so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use combat_core::{CombatError, ErrorSeverity, GameError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires oracles to be configured before building")]
    MissingOracles,

    #[error("tick interval must be non-zero")]
    ZeroTickInterval,

    #[error(transparent)]
    Combat(#[from] CombatError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
            Self::MissingOracles | Self::ZeroTickInterval => ErrorSeverity::Validation,
            Self::Combat(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingOracles => "RUNTIME_MISSING_ORACLES",
            Self::ZeroTickInterval => "RUNTIME_ZERO_TICK_INTERVAL",
            Self::Combat(err) => err.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::ActorId;

    #[test]
    fn combat_errors_keep_their_classification() {
        let err = RuntimeError::from(CombatError::SelfTarget(ActorId(3)));
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(err.error_code(), "COMBAT_SELF_TARGET");
        assert_eq!(err.to_string(), "actor #3 cannot target itself");
    }

    #[test]
    fn channel_failures_are_internal() {
        assert!(RuntimeError::CommandChannelClosed.severity().is_internal());
    }
}
