//! The domain-to-engine bridge.
//!
//! The domain core runs on the control side; an audio engine consumes
//! its state from the other end of a bounded queue. [`SyncController`]
//! listens on the event bus and translates domain events into
//! [`EngineUpdate`]s; [`EngineEndpoint`] drains them at block
//! boundaries into an engine-side shadow of the project, without ever
//! taking a domain lock.

mod endpoint;
mod sync;
mod update;

pub use endpoint::{EngineEndpoint, EngineState};
pub use sync::SyncController;
pub use update::{EngineUpdate, ParamKey};
