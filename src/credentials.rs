use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialRecord {
    pub name: String,
    pub api_key: String,
}

/// Provider name to API key, read once at startup and never modified.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    keys: HashMap<String, String>,
}

impl CredentialStore {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read credential file {}", path.display()))?;
        let records: Vec<CredentialRecord> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse credential file {}", path.display()))?;

        Ok(Self::from_records(records))
    }

    /// Later records win when a name appears more than once.
    pub fn from_records(records: impl IntoIterator<Item = CredentialRecord>) -> Self {
        let keys = records
            .into_iter()
            .map(|record| (record.name, record.api_key))
            .collect();
        Self { keys }
    }

    pub fn api_key(&self, name: &str) -> Option<&str> {
        self.keys.get(name).map(String::as_str)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names = self.keys.keys().map(String::as_str).collect::<Vec<_>>();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
