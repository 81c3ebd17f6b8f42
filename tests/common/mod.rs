//! Shared fixtures for the integration suite.

#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};

/// Write a state document into `dir` and return its path.
pub fn write_state(dir: &Path, document: &serde_json::Value) -> PathBuf {
    let path = dir.join("state.json");
    std::fs::write(&path, document.to_string()).expect("write state document");
    path
}

/// A state document with an enabled LDAP backend and ready reporting.
#[must_use]
pub fn ldap_state() -> serde_json::Value {
    serde_json::json!({
        "directory_services": {
            "enable": true,
            "kind": "ldap",
            "ldap": {
                "uris": ["ldap://a", "ldap://b"],
                "basedn": "dc=x",
                "ssl": "ON",
                "validate_certificates": true
            }
        },
        "certificates": [],
        "reporting": {"ready": true}
    })
}

/// A state document with the directory service switched off.
#[must_use]
pub fn disabled_state(reporting_ready: bool) -> serde_json::Value {
    serde_json::json!({
        "directory_services": {"enable": false},
        "certificates": [],
        "reporting": {"ready": reporting_ready}
    })
}
