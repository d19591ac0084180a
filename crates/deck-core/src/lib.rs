//! Core types for the deck action runner.
//!
//! This crate contains shared data structures that are used across all deck crates:
//! - Action kinds, declared action specs and resolved actions
//! - Menu entries and the command dictionary
//! - Execution results
//! - Configuration types
//! - Error types

mod action;
mod config;
mod entry;
mod error;
mod remote;
mod result;

pub use action::{ActionKind, ActionSpec, ResolvedAction};
pub use config::{config_dir, config_path, menu_path, EngineConfig, DEFAULT_SESSION_NAME};
pub use entry::{CommandDefinition, CommandDictionary, MenuEntry};
pub use error::{ActionError, ConfigError, HostError, HostResult};
pub use remote::RemoteLocation;
pub use result::{ActionFailure, ExecutionResult};
