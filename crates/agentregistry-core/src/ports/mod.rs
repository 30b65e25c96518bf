//! Port definitions (trait abstractions) for external systems.
//!
//! # Design Rules
//!
//! - Only domain and artifact types in signatures
//! - No process or filesystem implementation details
//! - Translation is synchronous and pure; engine operations are async

pub mod container_engine;
pub mod event_emitter;
pub mod translator;

pub use container_engine::{ComposeLocation, ContainerEngine, EngineError};
pub use event_emitter::{NoopEmitter, RuntimeEventEmitter};
pub use translator::{ResourceKind, RuntimeTranslator, TranslationError};
