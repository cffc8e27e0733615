//! # Environment Snapshot
//!
//! The pipeline never reads the process environment ad hoc: a snapshot is
//! captured once when the [`crate::Loader`] is constructed and passed into
//! the expansion and override stages. This keeps the pipeline a pure
//! function of (bytes, snapshot, overrides) and lets tests inject a
//! synthetic environment without mutating process-global state.

use std::collections::BTreeMap;

/// An immutable snapshot of environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Builds a snapshot from explicit key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Iterates variables whose name starts with `prefix`, in sorted order.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.vars
            .iter()
            .filter(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
