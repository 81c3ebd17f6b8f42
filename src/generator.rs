//! The render pass orchestrator.
//!
//! A pass captures one [`ConfigSnapshot`], resolves the directory-service
//! backend from it, then drives every registered template in declared
//! order: render, apply, record.  Failure of one template never blocks the
//! rest — all outcomes are collected into a [`PassReport`] and the caller
//! decides whether the aggregate warrants a retry of the whole pass.
//!
//! Concurrent passes serialize on a pass-level lock; within a pass
//! execution is strictly sequential, so file ordering follows registry
//! order.  A cancel flag is checked between templates, giving a superseded
//! pass a clean place to stop without abandoning a write mid-flight.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::directory::DirectoryServiceBackend;
use crate::state::{ConfigSnapshot, Store};
use crate::templates::{self, RenderInput, RenderOutcome, Template};
use crate::writer::{self, Effect};

/// Terminal status of one template within a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateStatus {
    /// Target replaced with new content.
    Written,
    /// Target already up to date.
    Unchanged,
    /// Precondition failed; target untouched.
    Skipped(String),
    /// Precondition demands absence; target absent (removed if stale).
    Absent(String),
    /// Render or write failed; previous file intact.
    Failed(String),
}

/// Outcome record for one template.
#[derive(Debug, Clone)]
pub struct TemplateReport {
    /// Template name.
    pub name: &'static str,
    /// Target path relative to the output root.
    pub target: &'static str,
    /// Terminal status.
    pub status: TemplateStatus,
}

/// Aggregated outcomes of one render pass.
#[derive(Debug, Default)]
pub struct PassReport {
    /// Per-template records, in render order.
    pub templates: Vec<TemplateReport>,
    /// Whether the pass stopped early because it was superseded.
    pub cancelled: bool,
}

impl PassReport {
    /// Whether any template failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.templates
            .iter()
            .any(|t| matches!(t.status, TemplateStatus::Failed(_)))
    }

    /// Names of the failed templates.
    #[must_use]
    pub fn failed_names(&self) -> Vec<&'static str> {
        self.templates
            .iter()
            .filter(|t| matches!(t.status, TemplateStatus::Failed(_)))
            .map(|t| t.name)
            .collect()
    }
}

/// Options for one render pass.
#[derive(Debug, Default, Clone)]
pub struct PassOptions {
    /// Render only templates whose name contains one of these strings.
    pub only: Vec<String>,
    /// Skip templates whose name contains one of these strings.
    pub skip: Vec<String>,
    /// Render and report without touching the filesystem.
    pub dry_run: bool,
}

impl PassOptions {
    fn selects(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if !self.only.is_empty() && !self.only.iter().any(|o| name.contains(&o.to_lowercase())) {
            return false;
        }
        // skip filters within the only selection, not instead of it
        !self.skip.iter().any(|s| name.contains(&s.to_lowercase()))
    }
}

/// Drives the template registry against a store.
pub struct Generator {
    root: PathBuf,
    /// Serializes whole passes; individual writes are already race-safe via
    /// atomic replace, but interleaved passes could reorder files within a
    /// subsystem.
    pass_lock: Mutex<()>,
    cancel: Arc<AtomicBool>,
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("root", &self.root)
            .field("cancelled", &self.cancel.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl Generator {
    /// Create a generator writing under `root`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            pass_lock: Mutex::new(()),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle used to abandon an in-flight pass at the next template
    /// boundary (e.g. when a newer state-change event supersedes it).
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run one render pass over the full registry.
    ///
    /// The snapshot is captured once at pass start; a store failure here
    /// fails the entire pass so the external scheduler can retry it with a
    /// consistent read later.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StateError`] if the snapshot cannot be
    /// captured.  Per-template render and write failures do *not* error —
    /// they are recorded in the report.
    pub fn run_pass(
        &self,
        store: &dyn Store,
        opts: &PassOptions,
    ) -> Result<PassReport, crate::error::StateError> {
        let _guard = self
            .pass_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        self.cancel.store(false, Ordering::SeqCst);

        let snapshot = ConfigSnapshot::capture(store)?;
        let backend = DirectoryServiceBackend::resolve(&snapshot);
        info!(backend = backend.name(), "render pass started");

        let input = RenderInput {
            snapshot: &snapshot,
            backend: &backend,
        };

        let mut report = PassReport::default();
        for template in templates::registry() {
            if self.cancel.load(Ordering::SeqCst) {
                info!("render pass superseded, stopping at template boundary");
                report.cancelled = true;
                break;
            }
            if !opts.selects(template.name()) {
                debug!(template = template.name(), "filtered out");
                continue;
            }
            let status = run_template(&self.root, template.as_ref(), &input, opts.dry_run);
            if let TemplateStatus::Failed(detail) = &status {
                warn!(template = template.name(), %detail, "template failed");
            }
            report.templates.push(TemplateReport {
                name: template.name(),
                target: template.target(),
                status,
            });
        }

        info!(
            total = report.templates.len(),
            failed = report.failed_names().len(),
            "render pass finished"
        );
        Ok(report)
    }
}

/// Render and apply one template.  All failures collapse into
/// [`TemplateStatus::Failed`] so the pass can continue.
fn run_template(
    root: &Path,
    template: &dyn Template,
    input: &RenderInput<'_>,
    dry_run: bool,
) -> TemplateStatus {
    let outcome = match templates::render(template, input) {
        Ok(outcome) => outcome,
        Err(err) => return TemplateStatus::Failed(err.to_string()),
    };
    match writer::apply(root, template, &outcome, dry_run) {
        Ok(effect) => status_for(&outcome, effect),
        Err(err) => TemplateStatus::Failed(err.to_string()),
    }
}

fn status_for(outcome: &RenderOutcome, effect: Effect) -> TemplateStatus {
    match (outcome, effect) {
        (RenderOutcome::Written(_), Effect::Unchanged) => TemplateStatus::Unchanged,
        (RenderOutcome::Written(_), _) => TemplateStatus::Written,
        (RenderOutcome::Skipped(reason), _) => TemplateStatus::Skipped(reason.clone()),
        (RenderOutcome::Absent(reason), _) => TemplateStatus::Absent(reason.clone()),
    }
}
