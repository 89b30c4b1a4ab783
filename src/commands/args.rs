//! `-flag=value` token parsing.
//!
//! Each command declares the flags it understands; anything else is an
//! [`ArgsError`]. Both `-name=value` and `--name=value` are accepted and the
//! last occurrence of a flag wins.

use std::collections::HashMap;

use crate::error::ArgsError;

/// Parsed flags of one command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Flags {
    values: HashMap<String, String>,
}

impl Flags {
    /// Parses `tokens` against the flag names `allowed` for `command`.
    pub fn parse<S: AsRef<str>>(
        command: &str,
        allowed: &[&str],
        tokens: &[S],
    ) -> Result<Self, ArgsError> {
        let mut values = HashMap::new();
        for token in tokens {
            let token = token.as_ref();
            let Some(body) = token
                .strip_prefix("--")
                .or_else(|| token.strip_prefix('-'))
            else {
                return Err(ArgsError::NotAFlag {
                    command: command.to_string(),
                    token: token.to_string(),
                });
            };

            let (name, value) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            if !allowed.contains(&name) {
                return Err(ArgsError::UnknownFlag {
                    command: command.to_string(),
                    flag: name.to_string(),
                });
            }
            let Some(value) = value else {
                return Err(ArgsError::MissingValue {
                    command: command.to_string(),
                    flag: name.to_string(),
                });
            };
            values.insert(name.to_string(), value.to_string());
        }
        Ok(Self { values })
    }

    /// Value of `name`, or `""` when absent.
    pub fn get(&self, name: &str) -> &str {
        self.get_or(name, "")
    }

    /// Value of `name`, or `default` when absent.
    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.values.get(name).map(String::as_str).unwrap_or(default)
    }
}
