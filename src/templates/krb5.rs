//! Kerberos client configuration.
//!
//! Rendered only when the active directory-service backend carries a
//! kerberos realm (AD always does after a join; LDAP optionally).  Without
//! a realm the template skips and any previously generated file is left
//! alone for the operator to clean up.

use super::{GENERATED_HEADER, Gate, RenderInput, Template};
use crate::error::RenderError;

/// `etc/krb5.conf` — Kerberos client defaults for the joined realm.
pub struct Krb5Conf;

impl Template for Krb5Conf {
    fn name(&self) -> &'static str {
        "krb5"
    }

    fn target(&self) -> &'static str {
        "etc/krb5.conf"
    }

    fn gate(&self, input: &RenderInput<'_>) -> Gate {
        if input.backend.kerberos_realm().is_some() {
            Gate::Render
        } else {
            Gate::Skip("no kerberos realm configured".to_string())
        }
    }

    fn body(&self, input: &RenderInput<'_>) -> Result<String, RenderError> {
        let realm = input
            .backend
            .kerberos_realm()
            .ok_or_else(|| RenderError::Template {
                template: self.name().to_string(),
                message: "kerberos realm vanished between gate and body".to_string(),
            })?;

        Ok(format!(
            "{GENERATED_HEADER}\n\
             [libdefaults]\n\
             \tdefault_realm = {realm}\n\
             \tdns_lookup_realm = false\n\
             \tdns_lookup_kdc = true\n\
             \tticket_lifetime = 24h\n\
             \tforwardable = true\n\
             \n\
             [realms]\n\
             \t{realm} = {{\n\
             \t}}\n"
        ))
    }
}
