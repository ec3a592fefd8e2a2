use std::collections::{BTreeMap, HashMap};

/// Name of the file read when no other name is given.
pub const DEFAULT_FILE_NAME: &str = ".env";

/// A parsed `KEY=VALUE` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    /// File or resource name the entry was read from, if any.
    pub source: Option<String>,
    /// 1-based line of the occurrence that won.
    pub line: u32,
}

/// Summary of the apply step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped_existing: usize,
}

/// Options for [`load_env`](crate::load_env) and
/// [`load_env_from_fs`](crate::load_env_from_fs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Replace variables that already exist in the target.
    pub override_existing_vars: bool,
    /// File or resource to read. Empty means [`DEFAULT_FILE_NAME`].
    pub file_name: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            override_existing_vars: true,
            file_name: DEFAULT_FILE_NAME.to_owned(),
        }
    }
}

impl LoadOptions {
    /// The file name to read, with an empty name meaning [`DEFAULT_FILE_NAME`].
    pub fn effective_file_name(&self) -> &str {
        if self.file_name.is_empty() {
            DEFAULT_FILE_NAME
        } else {
            &self.file_name
        }
    }
}

/// Options for [`load_env_from_reader`](crate::load_env_from_reader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Replace variables that already exist in the target.
    pub override_existing_vars: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            override_existing_vars: true,
        }
    }
}

/// Default options for the file and filesystem loaders:
/// override existing variables, read `.env`.
pub fn default_load_options() -> LoadOptions {
    LoadOptions::default()
}

/// Default options for the reader loader: override existing variables.
pub fn default_reader_options() -> ReaderOptions {
    ReaderOptions::default()
}

/// Everything a source contained, plus what happened when it was applied.
///
/// Entries skipped by the override policy are still listed here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadedEnv {
    entries: Vec<Entry>,
    report: LoadReport,
}

impl LoadedEnv {
    pub(crate) fn new(entries: Vec<Entry>, report: LoadReport) -> Self {
        Self { entries, report }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn into_map(self) -> HashMap<String, String> {
        self.entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }

    pub fn into_sorted_map(self) -> BTreeMap<String, String> {
        self.entries
            .into_iter()
            .map(|entry| (entry.key, entry.value))
            .collect()
    }
}
