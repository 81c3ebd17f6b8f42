//! Startup environment for the rrdcached daemon.
//!
//! Pure fixed content — the interesting part is the precondition: when the
//! reporting subsystem never finished its setup the file must not exist at
//! all, so a failed gate demands absence rather than a plain skip.

use super::{GENERATED_HEADER, Gate, RenderInput, Template};
use crate::error::RenderError;

/// `etc/default/rrdcached` — rrdcached startup environment.
pub struct RrdcachedDefault;

impl Template for RrdcachedDefault {
    fn name(&self) -> &'static str {
        "rrdcached"
    }

    fn target(&self) -> &'static str {
        "etc/default/rrdcached"
    }

    fn gate(&self, input: &RenderInput<'_>) -> Gate {
        if input.snapshot.reporting_ready {
            Gate::Render
        } else {
            Gate::Absent("reporting subsystem setup did not complete".to_string())
        }
    }

    fn body(&self, _input: &RenderInput<'_>) -> Result<String, RenderError> {
        Ok(format!(
            "{GENERATED_HEADER}\n\
             RRDCACHED=/usr/bin/rrdcached\n\
             RRDCACHED_JOURNAL_DIR=/var/db/rrdcached/journal\n\
             RRDCACHED_PIDFILE=/var/run/rrdcached.pid\n\
             RRDCACHED_SOCKET=unix:/var/run/rrdcached.sock\n"
        ))
    }
}
