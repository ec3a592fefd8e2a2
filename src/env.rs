use std::collections::BTreeMap;

use crate::error::{ApplyErrorKind, Error};

/// Environment variable table that loaded entries are applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEnv {
    kind: TargetEnvKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TargetEnvKind {
    /// Apply entries to the current process environment.
    ///
    /// This writes through [`std::env::set_var`], which mutates global process
    /// state and is not thread-safe for concurrent environment access.
    Process,
    /// Apply entries to an in-memory map.
    Memory(BTreeMap<String, String>),
}

impl Default for TargetEnv {
    fn default() -> Self {
        Self::memory()
    }
}

impl TargetEnv {
    /// Create a process-environment target.
    ///
    /// # Safety
    ///
    /// The caller must ensure no other threads concurrently read or write the
    /// process environment for the duration of operations that may mutate this
    /// target.
    pub unsafe fn process() -> Self {
        Self {
            kind: TargetEnvKind::Process,
        }
    }

    /// Create an in-memory environment target.
    ///
    /// Use this to avoid mutating the process environment.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    /// Create an in-memory environment target from an existing map.
    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: TargetEnvKind::Memory(map),
        }
    }

    /// Snapshot the current process environment into an in-memory target.
    ///
    /// Variables whose name or value is not valid UTF-8 are converted lossily.
    pub fn from_process_snapshot() -> Self {
        let map = std::env::vars_os()
            .map(|(key, value)| {
                (
                    key.to_string_lossy().into_owned(),
                    value.to_string_lossy().into_owned(),
                )
            })
            .collect();
        Self::from_memory(map)
    }

    pub fn is_process(&self) -> bool {
        matches!(self.kind, TargetEnvKind::Process)
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    pub fn as_memory_mut(&mut self) -> Option<&mut BTreeMap<String, String>> {
        match &mut self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    pub fn into_memory(self) -> Option<BTreeMap<String, String>> {
        match self.kind {
            TargetEnvKind::Memory(map) => Some(map),
            TargetEnvKind::Process => None,
        }
    }

    /// Whether `key` is set, even to an empty value.
    pub fn contains_key(&self, key: &str) -> bool {
        match &self.kind {
            TargetEnvKind::Process => {
                is_valid_lookup_key(key) && std::env::var_os(key).is_some()
            }
            TargetEnvKind::Memory(map) => map.contains_key(key),
        }
    }

    pub fn get_var(&self, key: &str) -> Option<String> {
        match &self.kind {
            TargetEnvKind::Process => {
                if !is_valid_lookup_key(key) {
                    return None;
                }
                std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
            }
            TargetEnvKind::Memory(map) => map.get(key).cloned(),
        }
    }

    /// Set `key` to `value`, overwriting any previous value.
    ///
    /// Both targets reject what the host would: an empty name, a name with
    /// `=` or NUL, or a value with NUL.
    pub fn set_var(&mut self, key: &str, value: &str) -> Result<(), Error> {
        validate(key, value).map_err(|kind| Error::Apply {
            key: key.to_owned(),
            kind,
        })?;

        match &mut self.kind {
            TargetEnvKind::Process => unsafe { std::env::set_var(key, value) },
            TargetEnvKind::Memory(map) => {
                map.insert(key.to_owned(), value.to_owned());
            }
        }
        Ok(())
    }
}

fn validate(key: &str, value: &str) -> Result<(), ApplyErrorKind> {
    if key.is_empty() {
        return Err(ApplyErrorKind::EmptyKey);
    }
    if key.contains(['=', '\0']) {
        return Err(ApplyErrorKind::InvalidKey);
    }
    if value.contains('\0') {
        return Err(ApplyErrorKind::InvalidValue);
    }
    Ok(())
}

// Names the host can never store are reported as unset without asking it.
fn is_valid_lookup_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['=', '\0'])
}
