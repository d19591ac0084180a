//! Action engine for deck.
//!
//! This crate turns menu entries into host operations:
//! - Resolution of an entry's declared actions into a plan
//! - Grouping of same-session shell runs
//! - Sequential and parallel executors
//! - The session registry owned by each executor
//! - Host traits the engine drives

pub mod executor;
pub mod grouper;
pub mod host;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use executor::{ActionExecutor, ExecutionOptions, ProgressFn};
pub use grouper::{flatten, group_actions, ActionGroup};
pub use host::{
    CommandDispatcher, HostServices, PathOpener, SessionHandle, SessionId, SessionOptions,
    ShellHost, TaskCatalog, TaskInfo,
};
pub use registry::SessionRegistry;
pub use resolver::{ActionResolver, ExecutionMode, Resolution};

// Re-export deck_core types for convenience
pub use deck_core::{
    ActionError, ActionFailure, ActionKind, ActionSpec, EngineConfig, ExecutionResult, HostError,
    HostResult, MenuEntry, ResolvedAction,
};
