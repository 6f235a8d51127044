//! Top-level error types for the driver/REPL boundary.
//!
//! The language itself follows a forgiving model (see `executor`/`evaluator`
//! docs): almost all operational mishaps degrade to a sentinel value and a
//! printed diagnostic rather than an `Err`. These types exist for the
//! minority of conditions that legitimately stop the driver: the script file
//! couldn't be read, the HTTP listener couldn't bind, or a call recursed past
//! the configured limit.

use std::fmt;

use crate::resource::ResourceError;

/// Failure from a host capability adapter (filesystem, HTTP, crypto, graphics).
#[derive(Debug, Clone)]
pub enum HostError {
    Io { path: String, message: String },
    BindAddress { addr: String, message: String },
    Adapter(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "I/O error on '{path}': {message}"),
            Self::BindAddress { addr, message } => write!(f, "could not bind '{addr}': {message}"),
            Self::Adapter(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for HostError {}

/// Top-level error returned by the driver/REPL loop.
#[derive(Debug, Clone)]
pub enum ReplError {
    Resource(ResourceError),
    Host(HostError),
    /// The requested script file could not be opened/read.
    ScriptRead { path: String, message: String },
}

impl fmt::Display for ReplError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource(error) => write!(f, "{error}"),
            Self::Host(error) => write!(f, "{error}"),
            Self::ScriptRead { path, message } => write!(f, "could not read script '{path}': {message}"),
        }
    }
}

impl std::error::Error for ReplError {}

impl From<ResourceError> for ReplError {
    fn from(error: ResourceError) -> Self {
        Self::Resource(error)
    }
}

impl From<HostError> for ReplError {
    fn from(error: HostError) -> Self {
        Self::Host(error)
    }
}
