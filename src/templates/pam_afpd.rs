//! PAM service stack for the AFP file-sharing daemon.
//!
//! Each stanza is a fixed set of built-in lines with the directory-service
//! fragment inserted at a fixed position: after the environment module in
//! `auth`, and at the top of the remaining stanzas so that backend modules
//! are consulted before local files.  An empty fragment leaves no gap.

use super::{GENERATED_HEADER, RenderInput, Template, join_lines};
use crate::error::RenderError;

/// `etc/pam.d/afpd` — always written; the directory-service fragments
/// collapse to nothing when no backend is active.
pub struct PamAfpd;

impl Template for PamAfpd {
    fn name(&self) -> &'static str {
        "pam-afpd"
    }

    fn target(&self) -> &'static str {
        "etc/pam.d/afpd"
    }

    fn body(&self, input: &RenderInput<'_>) -> Result<String, RenderError> {
        let backend = input.backend;

        let auth = join_lines([
            "auth\trequired\tpam_env.so".to_string(),
            backend.pam_auth(),
            "auth\tsufficient\tpam_unix.so\ttry_first_pass nullok".to_string(),
            "auth\trequired\tpam_deny.so".to_string(),
        ]);
        let account = join_lines([
            backend.pam_account(),
            "account\trequired\tpam_unix.so".to_string(),
        ]);
        let session = join_lines([
            backend.pam_session(),
            "session\trequired\tpam_unix.so".to_string(),
        ]);
        let password = join_lines([
            backend.pam_password(),
            "password\tsufficient\tpam_unix.so\ttry_first_pass use_authtok nullok sha512 shadow"
                .to_string(),
            "password\trequired\tpam_deny.so".to_string(),
        ]);

        Ok(format!(
            "{GENERATED_HEADER}\n\n# auth\n{auth}\n# account\n{account}\n# session\n{session}\n# password\n{password}"
        ))
    }
}
