//! Async server shell around [`combat_core::CombatEngine`].
//!
//! The runtime owns a single simulation worker that holds the engine, ticks it
//! on a fixed interval (or on demand) and publishes every [`combat_core::CombatEvent`]
//! to broadcast subscribers. Clients talk to the worker through a cloneable
//! [`RuntimeHandle`].
//!
//! Modules:
//! - [`api`] exposes the handle, the view types and the error surface.
//! - [`runtime`] holds the builder and the orchestrator.
//! - [`workers`] contains the simulation worker and its command set.
pub mod api;
pub mod runtime;
pub mod workers;

pub use api::{ActorView, Result, RuntimeError, RuntimeEvent, RuntimeHandle};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, TickMode};
