//! The template registry: logical outputs and their rendering logic.
//!
//! Each generated file is described by one [`Template`] implementation
//! pairing a target path with the context-binding logic that produces its
//! body.  [`registry`] returns the full set in declared order — the
//! orchestrator iterates it as-is, so intra-subsystem ordering (e.g. a
//! certificate file before the config referencing it) is guaranteed by
//! list position, not by locking.
//!
//! Rendering is deterministic: a template body is a pure function of the
//! snapshot and resolved backend.  No timestamps, no map iteration order,
//! no environment reads.

pub mod krb5;
pub mod nslcd;
pub mod pam_afpd;
pub mod rrdcached;

use crate::directory::DirectoryServiceBackend;
use crate::error::RenderError;
use crate::state::ConfigSnapshot;

/// Fixed header emitted at the top of every generated file.
pub const GENERATED_HEADER: &str = "# This file is automatically generated. Changes will be overwritten.";

/// Resolved context threaded into every template evaluation.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    /// The pass-wide administrative snapshot.
    pub snapshot: &'a ConfigSnapshot,
    /// The resolved directory-service backend.
    pub backend: &'a DirectoryServiceBackend,
}

/// Precondition verdict for a template, evaluated before the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Precondition holds — render the body.
    Render,
    /// Precondition fails — emit nothing, leave any existing file untouched.
    Skip(String),
    /// Precondition fails and the target must not exist — remove a stale
    /// copy if one is present.
    Absent(String),
}

/// Terminal outcome of rendering one template within a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A finished body ready for atomic replacement of the target.
    Written(String),
    /// Precondition failed; the target is left untouched.
    Skipped(String),
    /// Precondition demands absence; a stale target is removed.
    Absent(String),
}

/// One logical output file: identity, precondition, and render logic.
pub trait Template: Send + Sync {
    /// Short template name used in reports and `--only`/`--skip` filters.
    fn name(&self) -> &'static str;

    /// Target path relative to the output root.
    fn target(&self) -> &'static str;

    /// File mode applied after writing, when the target holds secrets.
    fn mode(&self) -> Option<u32> {
        None
    }

    /// Evaluate the precondition.  The default renders unconditionally.
    fn gate(&self, _input: &RenderInput<'_>) -> Gate {
        Gate::Render
    }

    /// Produce the full file body, including trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the body cannot be constructed from the
    /// snapshot.
    fn body(&self, input: &RenderInput<'_>) -> Result<String, RenderError>;
}

/// Render one template: precondition first, then the body.
///
/// A failing precondition is a legitimate outcome, not an error — only
/// body construction can fail.
///
/// # Errors
///
/// Returns [`RenderError`] if the template body cannot be constructed.
pub fn render(
    template: &dyn Template,
    input: &RenderInput<'_>,
) -> Result<RenderOutcome, RenderError> {
    match template.gate(input) {
        Gate::Skip(reason) => Ok(RenderOutcome::Skipped(reason)),
        Gate::Absent(reason) => Ok(RenderOutcome::Absent(reason)),
        Gate::Render => template.body(input).map(RenderOutcome::Written),
    }
}

/// The full template set, in the order the orchestrator renders it.
#[must_use]
pub fn registry() -> Vec<Box<dyn Template>> {
    vec![
        Box::new(pam_afpd::PamAfpd),
        Box::new(nslcd::NslcdConf),
        Box::new(rrdcached::RrdcachedDefault),
        Box::new(krb5::Krb5Conf),
    ]
}

/// Join non-empty lines with newlines, dropping empty fragments so that no
/// blank line marks the spot where an absent fragment would have gone.
#[must_use]
pub(crate) fn join_lines<I, S>(lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for line in lines {
        let line = line.as_ref();
        if line.is_empty() {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
