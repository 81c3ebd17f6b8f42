//! Directory-service backend resolution and PAM fragment generation.
//!
//! Several templates (the PAM stack, the nslcd config) depend on which
//! identity backend is active.  [`DirectoryServiceBackend`] is resolved
//! once per render pass from the captured snapshot and threaded into every
//! template evaluation — templates never consult ambient state.
//!
//! Fragments are pure functions of the resolved settings: no I/O, no
//! clocks, no caches.  The same snapshot always yields the same fragments.

use crate::state::{AdSettings, BackendKind, CertificateRef, ConfigSnapshot, LdapSettings, NisSettings};

/// The active identity backend for one render pass.
///
/// Backend-specific fields live only inside the matching variant's payload.
/// `None` covers both "directory service disabled" and "enabled but not
/// configured" — in either case every fragment is empty.
#[derive(Debug, Clone)]
pub enum DirectoryServiceBackend {
    /// No directory service.
    None,
    /// Active Directory via winbind.
    ActiveDirectory(AdSettings),
    /// Plain LDAP, with the client certificate resolved (or absent).
    Ldap {
        /// LDAP settings from the snapshot.
        settings: LdapSettings,
        /// Resolved client certificate; `None` when unset or deleted.
        certificate: Option<CertificateRef>,
    },
    /// NIS.  Relies on NSS for account resolution, so only the session
    /// phase contributes a PAM fragment.
    Nis(NisSettings),
}

impl DirectoryServiceBackend {
    /// Resolve the active backend from a snapshot.
    ///
    /// At most one of AD/LDAP/NIS is authoritative.  A selected kind whose
    /// settings payload is missing resolves to `None` rather than failing
    /// the pass.
    #[must_use]
    pub fn resolve(snapshot: &ConfigSnapshot) -> Self {
        let directory = &snapshot.directory;
        if !directory.enable {
            return Self::None;
        }
        match directory.kind {
            Some(BackendKind::ActiveDirectory) => directory
                .activedirectory
                .clone()
                .map_or(Self::None, Self::ActiveDirectory),
            Some(BackendKind::Ldap) => directory.ldap.clone().map_or(Self::None, |settings| {
                Self::Ldap {
                    settings,
                    certificate: snapshot.certificate.clone(),
                }
            }),
            Some(BackendKind::Nis) => directory.nis.clone().map_or(Self::None, Self::Nis),
            None => Self::None,
        }
    }

    /// Whether any backend is active.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Stable backend name, as used in log output and reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::ActiveDirectory(_) => "activedirectory",
            Self::Ldap { .. } => "ldap",
            Self::Nis(_) => "nis",
        }
    }

    /// PAM `auth` fragment, empty when the backend contributes nothing.
    ///
    /// NIS is deliberately excluded: NSS handles its account resolution,
    /// so no PAM auth module is inserted.
    #[must_use]
    pub fn pam_auth(&self) -> String {
        match self {
            Self::ActiveDirectory(_) => {
                "auth\tsufficient\tpam_winbind.so\tsilent try_first_pass krb5_auth krb5_ccache_type=FILE"
                    .to_string()
            }
            Self::Ldap { .. } => {
                "auth\tsufficient\tpam_ldap.so\tsilent no_warn try_first_pass".to_string()
            }
            Self::None | Self::Nis(_) => String::new(),
        }
    }

    /// PAM `account` fragment, empty when the backend contributes nothing.
    #[must_use]
    pub fn pam_account(&self) -> String {
        match self {
            Self::ActiveDirectory(_) => {
                "account\tsufficient\tpam_winbind.so\tkrb5_auth krb5_ccache_type=FILE".to_string()
            }
            Self::Ldap { .. } => {
                "account\tsufficient\tpam_ldap.so\tsilent no_warn ignore_authinfo_unavail ignore_unknown_user"
                    .to_string()
            }
            Self::None | Self::Nis(_) => String::new(),
        }
    }

    /// PAM `session` fragment, empty only when no backend is active.
    ///
    /// Every enabled backend (NIS included) creates home directories on
    /// first login.
    #[must_use]
    pub fn pam_session(&self) -> String {
        match self {
            Self::ActiveDirectory(_) | Self::Ldap { .. } | Self::Nis(_) => {
                "session\trequired\tpam_mkhomedir.so".to_string()
            }
            Self::None => String::new(),
        }
    }

    /// PAM `password` fragment, empty when the backend contributes nothing.
    #[must_use]
    pub fn pam_password(&self) -> String {
        match self {
            Self::ActiveDirectory(_) => {
                "password\tsufficient\tpam_winbind.so\ttry_first_pass krb5_auth krb5_ccache_type=FILE"
                    .to_string()
            }
            Self::Ldap { .. } => {
                "password\tsufficient\tpam_ldap.so\tno_warn try_first_pass".to_string()
            }
            Self::None | Self::Nis(_) => String::new(),
        }
    }

    /// The kerberos realm contributed by the active backend, if any.
    #[must_use]
    pub fn kerberos_realm(&self) -> Option<&str> {
        match self {
            Self::ActiveDirectory(ad) => ad.kerberos_realm.as_deref(),
            Self::Ldap { settings, .. } => settings.kerberos_realm.as_deref(),
            Self::None | Self::Nis(_) => None,
        }
    }
}
