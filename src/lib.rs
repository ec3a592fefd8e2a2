//! Load `KEY=VALUE` files into the environment.
//!
//! [`EnvLoader`] is the safe default and applies entries to an in-memory
//! [`TargetEnv`].
//!
//! The convenience loaders (`load_env`, `load_env_from_fs`,
//! `load_env_from_reader`) mutate the process environment and are `unsafe`,
//! because callers must guarantee no concurrent process-environment access.
//!
//! Each line is either blank, a `#` comment, or `KEY=VALUE`. The key is
//! everything before the first `=`. One leading and one trailing `"` are
//! stripped from the value, except that a value ending in `\"` keeps it.
//! Repeated keys take their last value.

mod env;
mod error;
mod fs;
mod loader;
mod model;
mod parser;

pub use env::TargetEnv;
pub use error::{ApplyErrorKind, Error};
#[cfg(feature = "embed")]
pub use fs::Embedded;
pub use fs::{DirFs, FileSystem, MemoryFs, is_valid_name};
pub use loader::{EnvLoader, load_env, load_env_from_fs, load_env_from_reader};
pub use model::{
    DEFAULT_FILE_NAME, Entry, LoadOptions, LoadReport, LoadedEnv, ReaderOptions,
    default_load_options, default_reader_options,
};
pub use parser::{parse_bytes, parse_reader, parse_str};
