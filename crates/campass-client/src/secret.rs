//! Secret references in credential settings.
//!
//! A campus password should not sit in `config.toml` in the clear. The
//! `[credentials]` values accept a reference in place of a literal, and the
//! reference is only dereferenced when a login actually needs it:
//!
//! - `env::CAMPASS_PASSWORD` reads the named environment variable
//! - `pass::cdut/portal` looks the entry up in the `pass` store
//! - any other value is taken literally

use std::process::Command;

use crate::error::{ClientError, ClientResult};

/// Where a credential value comes from.
enum SecretRef<'a> {
    Env(&'a str),
    Pass(&'a str),
    Literal(&'a str),
}

impl<'a> SecretRef<'a> {
    fn parse(value: &'a str) -> Self {
        if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var)
        } else if let Some(entry) = value.strip_prefix("pass::") {
            Self::Pass(entry)
        } else {
            Self::Literal(value)
        }
    }
}

/// Dereferences a credential setting, naming the field in any error.
pub fn resolve(field: &str, value: &str) -> ClientResult<String> {
    match SecretRef::parse(value) {
        SecretRef::Literal(text) => Ok(text.to_string()),
        SecretRef::Env(var) => std::env::var(var).map_err(|_| {
            ClientError::Config(format!(
                "{field} references environment variable `{var}`, which is not set"
            ))
        }),
        SecretRef::Pass(entry) => pass_entry(field, entry),
    }
}

/// First line of `pass show <entry>`; by `pass` convention that line is the
/// secret itself.
fn pass_entry(field: &str, entry: &str) -> ClientResult<String> {
    let output = Command::new("pass")
        .arg("show")
        .arg(entry)
        .output()
        .map_err(|e| {
            ClientError::Config(format!("could not run `pass show {entry}` for {field}: {e}"))
        })?;
    if !output.status.success() {
        return Err(ClientError::Config(format!(
            "`pass show {entry}` exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(str::to_string)
        .ok_or_else(|| {
            ClientError::Config(format!("`pass show {entry}` printed nothing for {field}"))
        })
}
