//! Read-only access to the administrative configuration store.
//!
//! The engine never talks to the config database directly.  Everything it
//! needs arrives through the narrow [`Store`] trait: directory-service
//! settings, certificate records, and the reporting-subsystem readiness
//! signal.  Production code uses [`JsonStore`], which reads a JSON state
//! document exported by the administrative service; unit tests use the
//! generated `MockStore`.
//!
//! At the start of each render pass the orchestrator captures a
//! [`ConfigSnapshot`] — one consistent read of everything the templates
//! consume.  The snapshot is immutable and discarded at the end of the
//! pass, so every pass reflects the latest administrative state.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::StateError;

/// SSL/TLS transport mode for the LDAP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SslMode {
    /// Plain connection, no TLS.
    #[serde(rename = "OFF")]
    Off,
    /// LDAPS (TLS from the first byte).
    #[serde(rename = "ON")]
    On,
    /// StartTLS upgrade on a plain connection.
    #[serde(rename = "START_TLS")]
    StartTls,
}

impl SslMode {
    /// The `ssl` directive value for nslcd, or `None` when TLS is off and
    /// the directive must be omitted entirely.
    #[must_use]
    pub const fn nslcd_value(self) -> Option<&'static str> {
        match self {
            Self::Off => None,
            Self::On => Some("on"),
            Self::StartTls => Some("start_tls"),
        }
    }
}

/// Which identity backend the administrator selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum BackendKind {
    /// Active Directory (winbind).
    #[serde(rename = "activedirectory")]
    ActiveDirectory,
    /// Plain LDAP.
    #[serde(rename = "ldap")]
    Ldap,
    /// NIS / YP.
    #[serde(rename = "nis")]
    Nis,
}

/// Resolved certificate metadata looked up by id.
///
/// Absence of a certificate (deleted or never configured) is a valid,
/// non-fatal state — lookups return `Option<CertificateRef>`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CertificateRef {
    /// Path to the public certificate (PEM).
    pub certificate_path: PathBuf,
    /// Path to the private key (PEM).
    pub privatekey_path: PathBuf,
}

fn default_timeout() -> u32 {
    30
}

/// LDAP backend settings as stored by the administrative service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LdapSettings {
    /// Server URIs, in configured order.
    pub uris: Vec<String>,
    /// Search base DN.
    pub basedn: String,
    /// Bind DN; anonymous bind when absent.
    #[serde(default)]
    pub binddn: Option<String>,
    /// Bind password; only meaningful together with `binddn`.
    #[serde(default)]
    pub bindpw: Option<String>,
    /// TLS transport mode.
    pub ssl: SslMode,
    /// Whether peer certificates must validate (`tls_reqcert demand`).
    #[serde(default)]
    pub validate_certificates: bool,
    /// Id of the client certificate used for SASL EXTERNAL, if any.
    #[serde(default)]
    pub certificate_id: Option<u32>,
    /// Kerberos realm for SASL GSSAPI, if joined.
    #[serde(default)]
    pub kerberos_realm: Option<String>,
    /// Suppress full user/group enumeration in NSS.
    #[serde(default)]
    pub disable_enumeration: bool,
    /// Search time limit in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u32,
    /// Bind time limit in seconds.
    #[serde(default = "default_timeout")]
    pub bind_timeout: u32,
    /// Verbatim extra directives appended to the generated config.
    #[serde(default)]
    pub auxiliary_parameters: Option<String>,
}

/// Active Directory backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdSettings {
    /// The AD domain name.
    pub domainname: String,
    /// Kerberos realm, usually the upper-cased domain.
    #[serde(default)]
    pub kerberos_realm: Option<String>,
}

/// NIS backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NisSettings {
    /// NIS domain name.
    pub domain: String,
    /// NIS servers, in configured order.
    #[serde(default)]
    pub servers: Vec<String>,
}

/// Directory-service configuration: enable flag, selected backend kind,
/// and per-backend settings payloads.
///
/// At most one backend is authoritative.  A `kind` without its matching
/// settings payload is treated as unconfigured.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryConfig {
    /// Master enable flag for the directory service.
    #[serde(default)]
    pub enable: bool,
    /// Selected backend kind; `None` when nothing is configured.
    #[serde(default)]
    pub kind: Option<BackendKind>,
    /// LDAP settings, present when configured.
    #[serde(default)]
    pub ldap: Option<LdapSettings>,
    /// Active Directory settings, present when configured.
    #[serde(default)]
    pub activedirectory: Option<AdSettings>,
    /// NIS settings, present when configured.
    #[serde(default)]
    pub nis: Option<NisSettings>,
}

impl DirectoryConfig {
    /// A disabled, unconfigured directory service.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enable: false,
            kind: None,
            ldap: None,
            activedirectory: None,
            nis: None,
        }
    }
}

/// Narrow read-only interface to the administrative config store.
///
/// Implementations must be side-effect free: queries observe state, never
/// change it.  A failing query means the store itself is unreachable or
/// faulted; "not found" for optional references is a successful `None`.
#[cfg_attr(test, mockall::automock)]
pub trait Store: Send + Sync {
    /// Current directory-service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the store cannot be queried.
    fn directory_config(&self) -> Result<DirectoryConfig, StateError>;

    /// Look up a certificate record by id.
    ///
    /// Returns `Ok(None)` when the id does not resolve (certificate deleted
    /// or never created) — callers degrade gracefully in that case.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the store cannot be queried.
    fn certificate(&self, id: u32) -> Result<Option<CertificateRef>, StateError>;

    /// Whether the reporting subsystem completed its setup.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if the store cannot be queried.
    fn reporting_ready(&self) -> Result<bool, StateError>;
}

/// On-disk shape of the JSON state document backing [`JsonStore`].
#[derive(Debug, Deserialize)]
struct StateDocument {
    #[serde(default)]
    directory_services: Option<DirectoryConfig>,
    #[serde(default)]
    certificates: Vec<CertificateEntry>,
    #[serde(default)]
    reporting: ReportingState,
}

#[derive(Debug, Deserialize)]
struct CertificateEntry {
    id: u32,
    #[serde(flatten)]
    cert: CertificateRef,
}

#[derive(Debug, Default, Deserialize)]
struct ReportingState {
    #[serde(default)]
    ready: bool,
}

/// Production [`Store`] backed by a JSON state document on disk.
///
/// The document is parsed once in [`JsonStore::open`]; the orchestrator
/// re-opens the store for every render pass, so each pass sees a fresh
/// read of the document.
#[derive(Debug)]
pub struct JsonStore {
    document: StateDocument,
}

impl JsonStore {
    /// Read and parse the state document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Io`] if the file cannot be read and
    /// [`StateError::Parse`] if it is not a valid state document.
    pub fn open(path: &Path) -> Result<Self, StateError> {
        let raw = std::fs::read_to_string(path).map_err(|source| StateError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let document = serde_json::from_str(&raw).map_err(|source| StateError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { document })
    }
}

impl Store for JsonStore {
    fn directory_config(&self) -> Result<DirectoryConfig, StateError> {
        Ok(self
            .document
            .directory_services
            .clone()
            .unwrap_or_else(DirectoryConfig::disabled))
    }

    fn certificate(&self, id: u32) -> Result<Option<CertificateRef>, StateError> {
        Ok(self
            .document
            .certificates
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.cert.clone()))
    }

    fn reporting_ready(&self) -> Result<bool, StateError> {
        Ok(self.document.reporting.ready)
    }
}

/// One consistent read of everything the templates consume, taken at the
/// start of a render pass.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Directory-service configuration.
    pub directory: DirectoryConfig,
    /// Resolved LDAP client certificate, when configured and still present.
    pub certificate: Option<CertificateRef>,
    /// Reporting-subsystem readiness signal.
    pub reporting_ready: bool,
}

impl ConfigSnapshot {
    /// Capture a snapshot from the store.
    ///
    /// The LDAP certificate id, when configured, is resolved here so that
    /// the rest of the pass works purely on resolved data.  An id that does
    /// not resolve leaves `certificate` as `None` — the referenced
    /// certificate may have been deleted, which is not a fault.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] if any store query fails.
    pub fn capture(store: &dyn Store) -> Result<Self, StateError> {
        let directory = store.directory_config()?;
        let certificate = match directory.ldap.as_ref().and_then(|l| l.certificate_id) {
            Some(id) => store.certificate(id)?,
            None => None,
        };
        let reporting_ready = store.reporting_ready()?;
        Ok(Self {
            directory,
            certificate,
            reporting_ready,
        })
    }
}
