//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only **env var NAMES** (e.g. `"HOLDED_API_KEY"`).
//! - Callers invoke [`resolve_secrets`] once at startup and pass the result
//!   into constructors; `std::env::var` is not called anywhere else.
//! - `Debug` impls **redact** values; errors name the env var, never the value.
//!
//! The Holded API key is always required. SMTP settings are required only
//! when email delivery is requested.

use anyhow::{bail, Result};
use serde_json::Value;

use crate::read_str_at;

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP delivery settings resolved from the environment.
#[derive(Clone)]
pub struct SmtpSecrets {
    pub host: String,
    /// 465 = implicit TLS, anything else = STARTTLS.
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    /// Recipients, split from a comma-separated list.
    pub to: Vec<String>,
}

impl std::fmt::Debug for SmtpSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSecrets")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &"<REDACTED>")
            .field("password", &"<REDACTED>")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// All runtime-resolved secrets for one invocation.
#[derive(Clone)]
pub struct ResolvedSecrets {
    pub holded_api_key: String,
    /// `None` unless email delivery was requested.
    pub smtp: Option<SmtpSecrets>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("holded_api_key", &"<REDACTED>")
            .field("smtp", &self.smtp)
            .finish()
    }
}

/// Env var NAMES extracted from the config JSON.
struct SecretEnvNames {
    holded_api_key_var: String,
    smtp_host_var: String,
    smtp_port_var: String,
    smtp_user_var: String,
    smtp_password_var: String,
    mail_from_var: String,
    mail_to_var: String,
}

fn parse_env_names(config_json: &Value) -> SecretEnvNames {
    let name = |pointer: &str, fallback: &str| {
        read_str_at(config_json, pointer).unwrap_or_else(|| fallback.to_string())
    };
    SecretEnvNames {
        holded_api_key_var: name("/holded/api_key_env", "HOLDED_API_KEY"),
        smtp_host_var: name("/smtp/host_env", "SMTP_HOST"),
        smtp_port_var: name("/smtp/port_env", "SMTP_PORT"),
        smtp_user_var: name("/smtp/user_env", "SMTP_USER"),
        smtp_password_var: name("/smtp/password_env", "SMTP_PASS"),
        mail_from_var: name("/smtp/from_env", "MAIL_FROM"),
        mail_to_var: name("/smtp/to_env", "MAIL_TO"),
    }
}

/// Resolve a named environment variable; blank counts as unset.
fn resolve_env(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Resolve secrets from the process environment.
///
/// # Errors
/// `SECRETS_MISSING` naming the first required env var that is unset or blank.
pub fn resolve_secrets(config_json: &Value, send_email: bool) -> Result<ResolvedSecrets> {
    resolve_secrets_with(config_json, send_email, resolve_env)
}

/// Same as [`resolve_secrets`] with an injectable lookup (tests).
pub fn resolve_secrets_with<F>(config_json: &Value, send_email: bool, lookup: F) -> Result<ResolvedSecrets>
where
    F: Fn(&str) -> Option<String>,
{
    let names = parse_env_names(config_json);
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
    let require = |var: &str, what: &str| -> Result<String> {
        match get(var) {
            Some(v) => Ok(v),
            None => bail!("SECRETS_MISSING: required env var '{var}' ({what}) is not set or empty"),
        }
    };

    let holded_api_key = require(&names.holded_api_key_var, "Holded api key")?;

    let smtp = if send_email {
        let port = match get(&names.smtp_port_var) {
            None => DEFAULT_SMTP_PORT,
            Some(raw) => match raw.trim().parse::<u16>() {
                Ok(p) => p,
                Err(_) => bail!(
                    "SECRETS_INVALID: env var '{}' must be a TCP port number",
                    names.smtp_port_var
                ),
            },
        };
        let to: Vec<String> = require(&names.mail_to_var, "notification recipients")?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if to.is_empty() {
            bail!(
                "SECRETS_MISSING: env var '{}' holds no recipient address",
                names.mail_to_var
            );
        }
        Some(SmtpSecrets {
            host: require(&names.smtp_host_var, "SMTP host")?,
            port,
            user: require(&names.smtp_user_var, "SMTP user")?,
            password: require(&names.smtp_password_var, "SMTP password")?,
            from: require(&names.mail_from_var, "sender address")?,
            to,
        })
    } else {
        None
    };

    Ok(ResolvedSecrets {
        holded_api_key,
        smtp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn api_key_required() {
        let vars = env(&[]);
        let err = resolve_secrets_with(&json!({}), false, |k| vars.get(k).cloned()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SECRETS_MISSING"));
        assert!(msg.contains("HOLDED_API_KEY"));
    }

    #[test]
    fn smtp_skipped_without_send_email() {
        let vars = env(&[("HOLDED_API_KEY", "abc")]);
        let s = resolve_secrets_with(&json!({}), false, |k| vars.get(k).cloned()).unwrap();
        assert_eq!(s.holded_api_key, "abc");
        assert!(s.smtp.is_none());
    }

    #[test]
    fn smtp_resolved_with_custom_names_and_recipient_split() {
        let vars = env(&[
            ("MY_KEY", "abc"),
            ("SMTP_HOST", "smtp.example.com"),
            ("SMTP_PORT", "465"),
            ("SMTP_USER", "bot"),
            ("SMTP_PASS", "pw"),
            ("MAIL_FROM", "bot@example.com"),
            ("MAIL_TO", "a@example.com, b@example.com ,"),
        ]);
        let cfg = json!({"holded": {"api_key_env": "MY_KEY"}});
        let s = resolve_secrets_with(&cfg, true, |k| vars.get(k).cloned()).unwrap();
        let smtp = s.smtp.unwrap();
        assert_eq!(smtp.port, 465);
        assert_eq!(smtp.to, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn debug_redacts_values() {
        let vars = env(&[("HOLDED_API_KEY", "super-secret-key")]);
        let s = resolve_secrets_with(&json!({}), false, |k| vars.get(k).cloned()).unwrap();
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("super-secret-key"));
        assert!(dbg.contains("<REDACTED>"));
    }

    #[test]
    fn invalid_port_names_the_variable() {
        let vars = env(&[
            ("HOLDED_API_KEY", "abc"),
            ("SMTP_PORT", "smtp"),
            ("MAIL_TO", "a@example.com"),
        ]);
        let err = resolve_secrets_with(&json!({}), true, |k| vars.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("SMTP_PORT"));
    }
}
