//! The `generate` command: one full render pass.

use anyhow::Result;
use tracing::info;

use crate::cli::{GenerateOpts, GlobalOpts};
use crate::generator::{Generator, PassOptions, TemplateStatus};
use crate::state::JsonStore;

/// Run the generate command.
///
/// Opens the state store, runs one render pass, and reports per-template
/// outcomes.  Skips and absences are informational; only failed templates
/// make the command exit non-zero, leaving the external scheduler to retry
/// the whole pass.
///
/// # Errors
///
/// Returns an error if the state document cannot be read or any template
/// failed.
pub fn run(global: &GlobalOpts, opts: &GenerateOpts) -> Result<()> {
    let store = JsonStore::open(&global.state)?;
    let generator = Generator::new(&global.root);

    // Ctrl-C abandons the pass at the next template boundary instead of
    // killing a write mid-flight.
    let cancel = generator.cancel_flag();
    let _ = ctrlc::set_handler(move || {
        cancel.store(true, std::sync::atomic::Ordering::SeqCst);
    });

    let pass_opts = PassOptions {
        only: opts.only.clone(),
        skip: opts.skip.clone(),
        dry_run: global.dry_run,
    };
    let report = generator.run_pass(&store, &pass_opts)?;

    for template in &report.templates {
        match &template.status {
            TemplateStatus::Written => info!("{}: written", template.target),
            TemplateStatus::Unchanged => info!("{}: unchanged", template.target),
            TemplateStatus::Skipped(reason) => info!("{}: skipped ({reason})", template.target),
            TemplateStatus::Absent(reason) => info!("{}: absent ({reason})", template.target),
            TemplateStatus::Failed(detail) => {
                tracing::error!("{}: failed ({detail})", template.target);
            }
        }
    }

    if report.cancelled {
        info!("render pass was cancelled before completing all templates");
    }

    if report.has_failures() {
        anyhow::bail!(
            "render pass failed for: {}",
            report.failed_names().join(", ")
        );
    }
    Ok(())
}
