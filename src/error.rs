//! Domain-specific error types for the materialization engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors ([`StateError`], [`RenderError`],
//! [`WriteError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! EtcgenError
//! ├── State(StateError)   — config store queries, state document parsing
//! ├── Render(RenderError) — template body construction
//! └── Write(WriteError)   — atomic file replacement
//! ```
//!
//! Note the taxonomy boundary: a template whose precondition fails is *not*
//! an error — it renders to a skip outcome.  Only state-read and write
//! failures travel through these types.

// The aggregate EtcgenError is part of the public API; library consumers
// (the administrative daemon) match on it even though the CLI itself only
// touches the sub-errors.
#![allow(dead_code)]

use thiserror::Error;

/// Top-level error type for the materialization engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum EtcgenError {
    /// Configuration store error (query failure, state document parsing).
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Template rendering error.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Filesystem output error.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

/// Errors that arise while reading administrative state.
#[derive(Error, Debug)]
pub enum StateError {
    /// An I/O error occurred while reading the state document.
    #[error("IO error reading state document {path}: {source}")]
    Io {
        /// Path to the document that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The state document is not valid JSON or does not match the schema.
    #[error("Invalid state document {path}: {source}")]
    Parse {
        /// Path to the malformed document.
        path: String,
        /// Underlying deserialization error.
        source: serde_json::Error,
    },

    /// A store query failed (store unreachable, backend fault).
    ///
    /// Distinct from a lookup that resolves to "not found" — missing
    /// optional references (e.g. a deleted certificate) are represented as
    /// `Ok(None)` by the store, never as this variant.
    #[error("Store query '{query}' failed: {message}")]
    Query {
        /// Name of the query that failed.
        query: String,
        /// Human-readable failure detail.
        message: String,
    },
}

/// Errors that arise while building a template body.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A template could not produce its body from the given snapshot.
    #[error("Template '{template}' failed to render: {message}")]
    Template {
        /// Name of the failing template.
        template: String,
        /// Human-readable failure detail.
        message: String,
    },
}

/// Errors that arise while applying a rendered outcome to disk.
#[derive(Error, Debug)]
pub enum WriteError {
    /// An I/O error on the target path or its parent directory.
    #[error("IO error writing {path}: {source}")]
    Io {
        /// Target path being written.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The atomic rename of the staged temp file failed.
    ///
    /// The previous file at the target path is left intact.
    #[error("Failed to replace {path}: {message}")]
    Persist {
        /// Target path that could not be replaced.
        path: std::path::PathBuf,
        /// Human-readable failure detail.
        message: String,
    },
}
