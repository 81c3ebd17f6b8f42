//! Filesystem effects for rendered outcomes.
//!
//! The writer is the only component that mutates target paths, and it does
//! so exclusively through atomic replacement: the body is staged to a temp
//! file in the target's own directory, then renamed over the target, so an
//! external reader sees either the old content or the new content, never a
//! partial write.  Unchanged content (same digest) is not rewritten, which
//! keeps mtimes stable and avoids waking file watchers.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::WriteError;
use crate::templates::{RenderOutcome, Template};

/// What the writer actually did for one template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Target replaced with new content.
    Written,
    /// Target already held exactly this content; not rewritten.
    Unchanged,
    /// Skip outcome: target untouched, whether or not it exists.
    Skipped,
    /// Absent outcome: a stale target was removed.
    Removed,
    /// Absent outcome: the target was already absent.
    LeftAbsent,
}

/// Absolute target path for a template under `root`.
#[must_use]
pub fn target_path(root: &Path, template: &dyn Template) -> PathBuf {
    root.join(template.target())
}

/// Apply a rendered outcome to the filesystem.
///
/// In dry-run mode the decision logic runs (including the unchanged check)
/// but nothing on disk is created, replaced, or removed.
///
/// # Errors
///
/// Returns [`WriteError`] if the target's directory cannot be created, the
/// staged file cannot be written, or the atomic rename fails.  The previous
/// file at the target path is left intact on every error path.
pub fn apply(
    root: &Path,
    template: &dyn Template,
    outcome: &RenderOutcome,
    dry_run: bool,
) -> Result<Effect, WriteError> {
    let target = target_path(root, template);
    match outcome {
        RenderOutcome::Written(body) => write_atomic(&target, body, template.mode(), dry_run),
        RenderOutcome::Skipped(reason) => {
            debug!(target = %target.display(), %reason, "skip: target untouched");
            Ok(Effect::Skipped)
        }
        RenderOutcome::Absent(reason) => remove_stale(&target, reason, dry_run),
    }
}

fn write_atomic(
    target: &Path,
    body: &str,
    mode: Option<u32>,
    dry_run: bool,
) -> Result<Effect, WriteError> {
    if current_digest(target).is_some_and(|d| d == Sha256::digest(body.as_bytes()).to_vec()) {
        debug!(target = %target.display(), "content unchanged");
        return Ok(Effect::Unchanged);
    }

    if dry_run {
        debug!(target = %target.display(), "dry-run: would write");
        return Ok(Effect::Written);
    }

    let parent = target.parent().ok_or_else(|| WriteError::Persist {
        path: target.to_path_buf(),
        message: "target has no parent directory".to_string(),
    })?;
    std::fs::create_dir_all(parent).map_err(|source| WriteError::Io {
        path: parent.to_path_buf(),
        source,
    })?;

    // Stage in the target's directory so the final rename stays on one
    // filesystem and is atomic.
    let mut staged = tempfile::NamedTempFile::new_in(parent).map_err(|source| WriteError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    std::io::Write::write_all(&mut staged, body.as_bytes()).map_err(|source| WriteError::Io {
        path: target.to_path_buf(),
        source,
    })?;

    #[cfg(unix)]
    if let Some(mode) = mode {
        use std::os::unix::fs::PermissionsExt as _;
        staged
            .as_file()
            .set_permissions(std::fs::Permissions::from_mode(mode))
            .map_err(|source| WriteError::Io {
                path: target.to_path_buf(),
                source,
            })?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    staged
        .persist(target)
        .map_err(|err| WriteError::Persist {
            path: target.to_path_buf(),
            message: err.error.to_string(),
        })?;
    debug!(target = %target.display(), "written");
    Ok(Effect::Written)
}

fn remove_stale(target: &Path, reason: &str, dry_run: bool) -> Result<Effect, WriteError> {
    if !target.exists() {
        debug!(target = %target.display(), %reason, "already absent");
        return Ok(Effect::LeftAbsent);
    }
    if dry_run {
        debug!(target = %target.display(), %reason, "dry-run: would remove stale file");
        return Ok(Effect::Removed);
    }
    std::fs::remove_file(target).map_err(|source| WriteError::Io {
        path: target.to_path_buf(),
        source,
    })?;
    debug!(target = %target.display(), %reason, "stale file removed");
    Ok(Effect::Removed)
}

fn current_digest(target: &Path) -> Option<Vec<u8>> {
    let existing = std::fs::read(target).ok()?;
    Some(Sha256::digest(&existing).to_vec())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use crate::templates::RenderInput;

    struct Fixture {
        mode: Option<u32>,
    }

    impl Template for Fixture {
        fn name(&self) -> &'static str {
            "fixture"
        }

        fn target(&self) -> &'static str {
            "etc/fixture.conf"
        }

        fn mode(&self) -> Option<u32> {
            self.mode
        }

        fn body(&self, _input: &RenderInput<'_>) -> Result<String, RenderError> {
            Ok("value=1\n".to_string())
        }
    }

    const FIXTURE: Fixture = Fixture { mode: None };

    #[test]
    fn written_outcome_creates_parents_and_file() {
        let root = tempfile::tempdir().unwrap();
        let outcome = RenderOutcome::Written("value=1\n".to_string());
        let effect = apply(root.path(), &FIXTURE, &outcome, false).unwrap();
        assert_eq!(effect, Effect::Written);
        let content = std::fs::read_to_string(root.path().join("etc/fixture.conf")).unwrap();
        assert_eq!(content, "value=1\n");
    }

    #[test]
    fn unchanged_content_is_not_rewritten() {
        let root = tempfile::tempdir().unwrap();
        let outcome = RenderOutcome::Written("value=1\n".to_string());
        apply(root.path(), &FIXTURE, &outcome, false).unwrap();
        let effect = apply(root.path(), &FIXTURE, &outcome, false).unwrap();
        assert_eq!(effect, Effect::Unchanged);
    }

    #[test]
    fn replacement_leaves_no_staging_litter() {
        let root = tempfile::tempdir().unwrap();
        apply(
            root.path(),
            &FIXTURE,
            &RenderOutcome::Written("old\n".to_string()),
            false,
        )
        .unwrap();
        apply(
            root.path(),
            &FIXTURE,
            &RenderOutcome::Written("new\n".to_string()),
            false,
        )
        .unwrap();

        let entries: Vec<_> = std::fs::read_dir(root.path().join("etc"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("fixture.conf")]);
        let content = std::fs::read_to_string(root.path().join("etc/fixture.conf")).unwrap();
        assert_eq!(content, "new\n");
    }

    #[test]
    fn write_failure_leaves_prior_state_intact() {
        let root = tempfile::tempdir().unwrap();
        // a regular file occupies the target's parent path, so the
        // directory cannot be created
        std::fs::write(root.path().join("etc"), "occupied\n").unwrap();

        let outcome = RenderOutcome::Written("value=1\n".to_string());
        let err = apply(root.path(), &FIXTURE, &outcome, false).unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
        assert_eq!(
            std::fs::read_to_string(root.path().join("etc")).unwrap(),
            "occupied\n"
        );
    }

    #[test]
    fn skip_leaves_existing_file_untouched() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("etc/fixture.conf");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, "pre-existing\n").unwrap();

        let outcome = RenderOutcome::Skipped("precondition failed".to_string());
        let effect = apply(root.path(), &FIXTURE, &outcome, false).unwrap();
        assert_eq!(effect, Effect::Skipped);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "pre-existing\n");
    }

    #[test]
    fn absent_outcome_removes_stale_file() {
        let root = tempfile::tempdir().unwrap();
        let target = root.path().join("etc/fixture.conf");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, "stale\n").unwrap();

        let outcome = RenderOutcome::Absent("prerequisite failed".to_string());
        let effect = apply(root.path(), &FIXTURE, &outcome, false).unwrap();
        assert_eq!(effect, Effect::Removed);
        assert!(!target.exists());
    }

    #[test]
    fn absent_outcome_preserves_absence() {
        let root = tempfile::tempdir().unwrap();
        let outcome = RenderOutcome::Absent("prerequisite failed".to_string());
        let effect = apply(root.path(), &FIXTURE, &outcome, false).unwrap();
        assert_eq!(effect, Effect::LeftAbsent);
        assert!(!root.path().join("etc/fixture.conf").exists());
    }

    #[test]
    fn dry_run_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let outcome = RenderOutcome::Written("value=1\n".to_string());
        let effect = apply(root.path(), &FIXTURE, &outcome, true).unwrap();
        assert_eq!(effect, Effect::Written);
        assert!(!root.path().join("etc").exists());

        let target = root.path().join("etc/fixture.conf");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, "stale\n").unwrap();
        let outcome = RenderOutcome::Absent("gone".to_string());
        let effect = apply(root.path(), &FIXTURE, &outcome, true).unwrap();
        assert_eq!(effect, Effect::Removed);
        assert!(target.exists(), "dry-run must not remove files");
    }

    #[cfg(unix)]
    #[test]
    fn declared_mode_is_applied() {
        use std::os::unix::fs::PermissionsExt as _;
        let root = tempfile::tempdir().unwrap();
        let template = Fixture { mode: Some(0o400) };
        let outcome = RenderOutcome::Written("secret\n".to_string());
        apply(root.path(), &template, &outcome, false).unwrap();
        let mode = std::fs::metadata(root.path().join("etc/fixture.conf"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o400);
    }
}
