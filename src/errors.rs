//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`Error`] covers every failure mode of an
//! import/merge/export cycle:
//! - Bundle parsing failures (malformed bytes, unresolvable buffers)
//! - Invalid synthetic animation parameters
//! - Serialization failures during export
//!
//! None of these are fatal: a [`crate::session::Workspace`] stays usable for the
//! next import or export after any of them.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, Error>`.
//!
//! ```rust,ignore
//! use clipmerge::errors::{Error, Result};
//!
//! fn check(duration: f32) -> Result<()> {
//!     if duration <= 0.0 {
//!         return Err(Error::invalid_parameter("duration", "must be positive"));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Boxed underlying cause attached to parse and export failures.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for clipmerge.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Import
    // ========================================================================
    /// The bundle bytes are malformed or use something we cannot resolve.
    ///
    /// The import is aborted and no partial state is retained.
    #[error("Failed to parse model bundle: {reason}")]
    ParseFailure {
        /// What went wrong
        reason: String,
        /// Underlying decoder error, if any
        #[source]
        source: Option<Cause>,
    },

    // ========================================================================
    // Synthesis
    // ========================================================================
    /// A synthetic animation parameter was rejected before synthesis.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    // ========================================================================
    // Export
    // ========================================================================
    /// Serialization of the scene and merged clip failed.
    ///
    /// Not retried; no payload is produced.
    #[error("Export failed: {reason}")]
    ExportFailure {
        /// What went wrong
        reason: String,
        /// Underlying serializer error, if any
        #[source]
        source: Option<Cause>,
    },

    // ========================================================================
    // Async
    // ========================================================================
    /// An offloaded import/export task did not complete.
    #[error("Task join error: {0}")]
    TaskJoin(String),
}

impl Error {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn parse_with(reason: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::ParseFailure {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }

    pub(crate) fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub(crate) fn export(reason: impl Into<String>) -> Self {
        Self::ExportFailure {
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn export_with(reason: impl Into<String>, source: impl Into<Cause>) -> Self {
        Self::ExportFailure {
            reason: reason.into(),
            source: Some(source.into()),
        }
    }

    /// Returns `true` for [`Error::ParseFailure`].
    #[must_use]
    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ParseFailure { .. })
    }

    /// Returns `true` for [`Error::InvalidParameter`].
    #[must_use]
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    /// Returns `true` for [`Error::ExportFailure`].
    #[must_use]
    pub fn is_export_failure(&self) -> bool {
        matches!(self, Self::ExportFailure { .. })
    }
}

// ============================================================================
// Convenient conversion implementations
// ============================================================================

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error::TaskJoin(err.to_string())
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
