//! nslcd (LDAP naming-service daemon) configuration.
//!
//! The fixed `uid`/`gid` header is always written so the daemon has a valid
//! config to refuse to start with; the directive body appears only when the
//! LDAP backend is active.  Directive order is fixed, and a directive whose
//! enabling condition does not hold is omitted entirely — never emitted
//! with an empty value.
//!
//! The file carries the bind password when one is configured, so it is
//! written mode 0400.

use super::{GENERATED_HEADER, RenderInput, Template, join_lines};
use crate::directory::DirectoryServiceBackend;
use crate::error::RenderError;

/// CA bundle consulted for peer verification whenever TLS is on.
const TLS_CACERT_PATH: &str = "/etc/ssl/cacerts.pem";

/// `etc/nslcd.conf` — LDAP naming-service daemon config.
pub struct NslcdConf;

impl Template for NslcdConf {
    fn name(&self) -> &'static str {
        "nslcd"
    }

    fn target(&self) -> &'static str {
        "etc/nslcd.conf"
    }

    fn mode(&self) -> Option<u32> {
        Some(0o400)
    }

    fn body(&self, input: &RenderInput<'_>) -> Result<String, RenderError> {
        let mut lines: Vec<String> = vec!["uid nslcd".to_string(), "gid nslcd".to_string()];

        if let DirectoryServiceBackend::Ldap {
            settings,
            certificate,
        } = input.backend
        {
            // Multi-valued uri joins in configured order on one line.  An
            // empty uri list or base dn is valid in the schema, so the
            // directive key is dropped rather than emitted bare.
            if !settings.uris.is_empty() {
                lines.push(format!("uri {}", settings.uris.join(" ")));
            }
            if !settings.basedn.is_empty() {
                lines.push(format!("base {}", settings.basedn));
            }

            if let Some(ssl) = settings.ssl.nslcd_value() {
                lines.push(format!("ssl {ssl}"));
                lines.push(format!("tls_cacert {TLS_CACERT_PATH}"));
                // Client cert sub-fragment degrades away when the referenced
                // certificate no longer resolves.
                if let Some(cert) = certificate {
                    lines.push(format!("tls_cert {}", cert.certificate_path.display()));
                    lines.push(format!("tls_key {}", cert.privatekey_path.display()));
                    lines.push("sasl_mech EXTERNAL".to_string());
                }
                let reqcert = if settings.validate_certificates {
                    "demand"
                } else {
                    "allow"
                };
                lines.push(format!("tls_reqcert {reqcert}"));
            }

            if let Some(binddn) = &settings.binddn {
                lines.push(format!("binddn {binddn}"));
                if let Some(bindpw) = &settings.bindpw {
                    lines.push(format!("bindpw {bindpw}"));
                }
            }

            if settings.disable_enumeration {
                lines.push("nss_disable_enumeration yes".to_string());
            }

            if let Some(realm) = &settings.kerberos_realm {
                lines.push(format!("sasl_realm {realm}"));
            }

            lines.push("scope sub".to_string());
            lines.push(format!("timelimit {}", settings.timeout));
            lines.push(format!("bind_timelimit {}", settings.bind_timeout));
            lines.push("map passwd loginShell \"/bin/sh\"".to_string());

            if let Some(aux) = &settings.auxiliary_parameters {
                // Verbatim block, one directive per line as entered.
                lines.push(aux.trim_end().to_string());
            }
        }

        Ok(format!("{GENERATED_HEADER}\n\n{}", join_lines(&lines)))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::state::{
        BackendKind, CertificateRef, ConfigSnapshot, DirectoryConfig, LdapSettings, SslMode,
    };
    use crate::templates::{RenderOutcome, render};
    use std::path::PathBuf;

    fn ldap_settings() -> LdapSettings {
        LdapSettings {
            uris: vec!["ldap://a".to_string(), "ldap://b".to_string()],
            basedn: "dc=x".to_string(),
            binddn: None,
            bindpw: None,
            ssl: SslMode::On,
            validate_certificates: true,
            certificate_id: None,
            kerberos_realm: None,
            disable_enumeration: false,
            timeout: 30,
            bind_timeout: 30,
            auxiliary_parameters: None,
        }
    }

    fn snapshot_for(ldap: Option<LdapSettings>, certificate: Option<CertificateRef>) -> ConfigSnapshot {
        let configured = ldap.is_some();
        ConfigSnapshot {
            directory: DirectoryConfig {
                enable: configured,
                kind: configured.then_some(BackendKind::Ldap),
                ldap,
                activedirectory: None,
                nis: None,
            },
            certificate,
            reporting_ready: true,
        }
    }

    fn render_body(snapshot: &ConfigSnapshot) -> String {
        let backend = DirectoryServiceBackend::resolve(snapshot);
        let input = RenderInput {
            snapshot,
            backend: &backend,
        };
        match render(&NslcdConf, &input).unwrap() {
            RenderOutcome::Written(body) => body,
            other => panic!("expected written outcome, got {other:?}"),
        }
    }

    #[test]
    fn worked_example_emits_expected_directives() {
        // enabled LDAP, two uris, ssl ON, validation on, no cert, no binddn
        let body = render_body(&snapshot_for(Some(ldap_settings()), None));
        insta::assert_snapshot!(body, @r#"
        # This file is automatically generated. Changes will be overwritten.

        uid nslcd
        gid nslcd
        uri ldap://a ldap://b
        base dc=x
        ssl on
        tls_cacert /etc/ssl/cacerts.pem
        tls_reqcert demand
        scope sub
        timelimit 30
        bind_timelimit 30
        map passwd loginShell "/bin/sh"
        "#);
        assert!(!body.contains("tls_cert "));
        assert!(!body.contains("tls_key "));
        assert!(!body.contains("binddn"));
        assert!(!body.contains("bindpw"));
    }

    #[test]
    fn disabled_service_reduces_to_builtin_lines() {
        let body = render_body(&snapshot_for(None, None));
        assert!(body.contains("uid nslcd\ngid nslcd\n"));
        assert!(!body.contains("uri "));
        assert!(!body.contains("base "));
    }

    #[test]
    fn resolved_certificate_adds_tls_client_lines() {
        let mut settings = ldap_settings();
        settings.certificate_id = Some(3);
        let cert = CertificateRef {
            certificate_path: PathBuf::from("/etc/certs/ldap.crt"),
            privatekey_path: PathBuf::from("/etc/certs/ldap.key"),
        };
        let body = render_body(&snapshot_for(Some(settings), Some(cert)));
        assert!(body.contains("tls_cert /etc/certs/ldap.crt"));
        assert!(body.contains("tls_key /etc/certs/ldap.key"));
        assert!(body.contains("sasl_mech EXTERNAL"));
    }

    #[test]
    fn deleted_certificate_degrades_gracefully() {
        let mut settings = ldap_settings();
        settings.certificate_id = Some(3);
        // lookup resolved to nothing: cert-dependent lines drop out,
        // everything else stays
        let body = render_body(&snapshot_for(Some(settings), None));
        assert!(body.contains("uri ldap://a ldap://b"));
        assert!(body.contains("base dc=x"));
        assert!(body.contains("ssl on"));
        assert!(body.contains("tls_cacert /etc/ssl/cacerts.pem"));
        assert!(body.contains("tls_reqcert demand"));
        assert!(!body.contains("tls_cert /"));
        assert!(!body.contains("tls_key /"));
        assert!(!body.contains("sasl_mech"));
    }

    #[test]
    fn bind_credentials_and_flags_emit_when_configured() {
        let mut settings = ldap_settings();
        settings.binddn = Some("cn=admin,dc=x".to_string());
        settings.bindpw = Some("hunter2".to_string());
        settings.disable_enumeration = true;
        settings.kerberos_realm = Some("X.EXAMPLE".to_string());
        settings.validate_certificates = false;
        settings.auxiliary_parameters = Some("referrals off\nidle_timelimit 60".to_string());
        let body = render_body(&snapshot_for(Some(settings), None));
        assert!(body.contains("binddn cn=admin,dc=x"));
        assert!(body.contains("bindpw hunter2"));
        assert!(body.contains("nss_disable_enumeration yes"));
        assert!(body.contains("sasl_realm X.EXAMPLE"));
        assert!(body.contains("tls_reqcert allow"));
        assert!(body.contains("referrals off\nidle_timelimit 60\n"));
    }

    #[test]
    fn empty_uri_list_and_base_drop_their_directives() {
        let mut settings = ldap_settings();
        settings.uris = vec![];
        settings.basedn = String::new();
        let body = render_body(&snapshot_for(Some(settings), None));
        assert!(!body.contains("uri"));
        assert!(!body.contains("base"));
        for line in body.lines() {
            assert_eq!(line, line.trim_end(), "directive emitted without a value: {line:?}");
        }
        // the rest of the directive body still renders
        assert!(body.contains("ssl on"));
        assert!(body.contains("scope sub"));
    }

    #[test]
    fn plain_ldap_omits_tls_directives() {
        let mut settings = ldap_settings();
        settings.ssl = SslMode::Off;
        let body = render_body(&snapshot_for(Some(settings), None));
        assert!(!body.contains("ssl "));
        assert!(!body.contains("tls_cacert"));
        assert!(!body.contains("tls_reqcert"));
    }

    #[test]
    fn secret_bearing_file_is_mode_0400() {
        assert_eq!(NslcdConf.mode(), Some(0o400));
    }
}
