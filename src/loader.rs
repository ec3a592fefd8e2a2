use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::env::TargetEnv;
use crate::error::Error;
use crate::fs::FileSystem;
use crate::model::{Entry, LoadOptions, LoadReport, LoadedEnv, ReaderOptions};
use crate::parser::parse_reader_with_source;

/// Load the file named by `options` (default `.env`) into the process
/// environment.
///
/// # Safety
///
/// Mutates the process environment. The caller must ensure no other threads
/// concurrently read or write it.
pub unsafe fn load_env(options: LoadOptions) -> Result<LoadedEnv, Error> {
    let mut loader = unsafe { process_loader(options.override_existing_vars) };
    loader.load_path(options.effective_file_name())
}

/// Load a named resource from `fs` into the process environment.
///
/// # Safety
///
/// Same contract as [`load_env`].
pub unsafe fn load_env_from_fs<F: FileSystem>(
    fs: F,
    options: LoadOptions,
) -> Result<LoadedEnv, Error> {
    let mut loader = unsafe { process_loader(options.override_existing_vars) };
    loader.load_fs(fs, options.effective_file_name())
}

/// Load entries read from `reader` into the process environment.
///
/// # Safety
///
/// Same contract as [`load_env`].
pub unsafe fn load_env_from_reader<R: Read>(
    reader: R,
    options: ReaderOptions,
) -> Result<LoadedEnv, Error> {
    let mut loader = unsafe { process_loader(options.override_existing_vars) };
    loader.load_reader(reader)
}

unsafe fn process_loader(override_existing: bool) -> EnvLoader {
    EnvLoader::new()
        .override_existing(override_existing)
        .target(unsafe { TargetEnv::process() })
}

/// Builder-style loader.
///
/// Parsing always finishes before the target is touched, so a source that
/// cannot be opened or read leaves the target unchanged. Applying is not
/// transactional: when the target rejects a variable, the ones applied
/// before it stay applied.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    override_existing: bool,
    target: TargetEnv,
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn override_existing(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn target(mut self, target: TargetEnv) -> Self {
        self.target = target;
        self
    }

    pub fn target_env(&self) -> &TargetEnv {
        &self.target
    }

    pub fn target_env_mut(&mut self) -> &mut TargetEnv {
        &mut self.target
    }

    pub fn into_target(self) -> TargetEnv {
        self.target
    }

    /// Parse a file without applying it.
    pub fn parse_path(&self, path: impl AsRef<Path>) -> Result<Vec<Entry>, Error> {
        let path = path.as_ref();
        let name = path.display().to_string();
        tracing::debug!(path = %name, "reading env file");

        let file = File::open(path).map_err(|err| Error::source_error(&name, err))?;
        parse_reader_with_source(BufReader::new(file), Some(&name))
    }

    /// Parse a resource from `fs` without applying it.
    pub fn parse_fs<F: FileSystem>(&self, fs: F, name: &str) -> Result<Vec<Entry>, Error> {
        tracing::debug!(name, "reading env resource");

        let contents = fs
            .read_file(name)
            .map_err(|err| Error::source_error(name, err))?;
        parse_reader_with_source(&contents[..], Some(name))
    }

    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<LoadedEnv, Error> {
        let entries = self.parse_path(path)?;
        self.apply(entries)
    }

    pub fn load_fs<F: FileSystem>(&mut self, fs: F, name: &str) -> Result<LoadedEnv, Error> {
        let entries = self.parse_fs(fs, name)?;
        self.apply(entries)
    }

    pub fn load_reader<R: Read>(&mut self, reader: R) -> Result<LoadedEnv, Error> {
        let entries = parse_reader_with_source(BufReader::new(reader), None)?;
        self.apply(entries)
    }

    /// Write `entries` into the target, honoring the override policy.
    ///
    /// Stops at the first variable the target rejects; earlier entries are
    /// not rolled back.
    pub fn apply(&mut self, entries: Vec<Entry>) -> Result<LoadedEnv, Error> {
        let mut report = LoadReport::default();

        for entry in &entries {
            if !self.override_existing && self.target.contains_key(&entry.key) {
                report.skipped_existing += 1;
                tracing::debug!(key = %entry.key, "skipping existing key");
                continue;
            }

            self.target.set_var(&entry.key, &entry.value)?;
            report.loaded += 1;
        }

        tracing::debug!(
            loaded = report.loaded,
            skipped_existing = report.skipped_existing,
            "applied env entries"
        );
        Ok(LoadedEnv::new(entries, report))
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self {
            override_existing: true,
            target: TargetEnv::memory(),
        }
    }
}
