//! # cantata-core
//!
//! Headless project core for the Cantata DAW: a routing graph of
//! tracks, buses and plugins, clips and automation on a beat timeline,
//! undoable commands, and a lock-free bridge to an audio engine —
//! independent of any UI or audio backend.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cantata_core::command::Command;
//! use cantata_core::engine::SyncController;
//! use cantata_core::studio::Studio;
//! use cantata_types::NodeKind;
//!
//! // 1. Create a studio around an empty project (defaults from config)
//! let mut studio = Studio::new("my song");
//!
//! // 2. Attach the engine bridge; hand the endpoint to the audio thread
//! let (sync, mut endpoint) = SyncController::attach(studio.bus_mut(), 256);
//!
//! // 3. Mutate exclusively through commands; each one is undoable
//! studio.execute(Command::AddNode {
//!     name: "lead".into(),
//!     kind: NodeKind::InstrumentTrack,
//!     params: Vec::new(),
//! })?;
//! studio.undo()?;
//! studio.redo()?;
//!
//! // 4. The engine drains updates at block boundaries
//! endpoint.apply_pending();
//! ```
//!
//! ## Module Overview
//!
//! - [`studio`] — `Studio`, the facade: execute/undo/redo, macros,
//!   queries, event subscription
//! - [`command`] — `Command` (every mutation as data) and
//!   `CommandManager` (undo/redo history)
//! - [`bus`] — typed publish/subscribe `EventBus`
//! - [`router`] — connection validation (types, directions, cycles)
//!   and the deterministic render order
//! - [`timeline`] — clip and note validation, overlap rules
//! - [`engine`] — `SyncController`/`EngineEndpoint`, the bounded-queue
//!   bridge to the audio side
//! - [`project`] — the serializable root aggregate
//! - [`config`] — TOML configuration (embedded defaults + user override)
//! - [`error`] — `DomainError`, the failure taxonomy

pub mod bus;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod project;
pub mod router;
pub mod studio;
pub mod timeline;

pub use bus::{EventBus, EventQueue, SubscriptionToken};
pub use command::{Command, CommandManager};
pub use config::Config;
pub use engine::{EngineEndpoint, EngineState, EngineUpdate, SyncController};
pub use error::DomainError;
pub use project::Project;
pub use studio::Studio;
