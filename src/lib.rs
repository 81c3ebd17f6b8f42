//! System configuration materialization engine.
//!
//! Materializes service configuration files (PAM stacks, nslcd, rrdcached
//! startup environment, Kerberos) from a snapshot of the administrative
//! configuration store.  Rendering is a pure, repeatable function from
//! "current administrative state" to "a set of files on disk": no caching
//! across passes, no service lifecycle management, no semantic validation
//! of the generated configs.
//!
//! The public API is organised into layers, leaves first:
//!
//! - **[`state`]** — read-only access to the config store, snapshot capture
//! - **[`directory`]** — directory-service backend resolution and fragments
//! - **[`templates`]** — the registry of output files and their render logic
//! - **[`writer`]** — atomic filesystem effects (write / skip / remove)
//! - **[`generator`]** — the render pass orchestrator
//! - **[`commands`]** — top-level subcommand handling (`generate`, `list`)

// The mockall-generated Store mock carries no docs.
#![cfg_attr(test, allow(missing_docs))]

pub mod cli;
pub mod commands;
pub mod directory;
pub mod error;
pub mod generator;
pub mod logging;
pub mod state;
pub mod templates;
pub mod writer;
