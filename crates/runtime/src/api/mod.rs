//! Public runtime API surface.
//!
//! Everything a client needs to drive the simulation lives here: the handle,
//! the published event envelope, read-only actor views and the error type.

pub mod errors;
pub mod events;
pub mod handle;

pub use errors::{Result, RuntimeError};
pub use events::{ActorView, RuntimeEvent};
pub use handle::RuntimeHandle;
