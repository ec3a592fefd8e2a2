//! Read-only filesystems that named env files can be loaded from.
//!
//! Names are slash-separated and relative (`config/app.env`), never rooted
//! and never containing `.` or `..` elements. The same name therefore means
//! the same thing for a directory on disk, an in-memory table, or a bundle
//! compiled into the binary.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

/// A source of named, fully-readable resources.
pub trait FileSystem {
    /// Read the whole resource called `name`.
    fn read_file(&self, name: &str) -> io::Result<Cow<'_, [u8]>>;
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn read_file(&self, name: &str) -> io::Result<Cow<'_, [u8]>> {
        (**self).read_file(name)
    }
}

impl<T: FileSystem + ?Sized> FileSystem for Box<T> {
    fn read_file(&self, name: &str) -> io::Result<Cow<'_, [u8]>> {
        (**self).read_file(name)
    }
}

/// Whether `name` is an acceptable resource name.
///
/// `.` on its own names the root and is valid; every other name must be
/// non-empty elements joined by `/`, none of them `.` or `..`.
pub fn is_valid_name(name: &str) -> bool {
    if name == "." {
        return true;
    }
    !name.is_empty()
        && name
            .split('/')
            .all(|element| !element.is_empty() && element != "." && element != "..")
}

pub(crate) fn check_name(name: &str) -> io::Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid resource name `{name}`"),
        ))
    }
}

/// Resources under a directory on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl FileSystem for DirFs {
    fn read_file(&self, name: &str) -> io::Result<Cow<'_, [u8]>> {
        check_name(name)?;
        let path = name
            .split('/')
            .fold(self.root.clone(), |path, element| path.join(element));
        std::fs::read(path).map(Cow::Owned)
    }
}

/// Resources held in memory, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoryFs {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), contents.into());
    }

    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(name, contents);
        self
    }
}

impl FileSystem for MemoryFs {
    fn read_file(&self, name: &str) -> io::Result<Cow<'_, [u8]>> {
        check_name(name)?;
        self.files
            .get(name)
            .map(|contents| Cow::Borrowed(contents.as_slice()))
            .ok_or_else(|| not_found(name))
    }
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("`{name}` does not exist"))
}

#[cfg(feature = "embed")]
pub use embedded::Embedded;

#[cfg(feature = "embed")]
mod embedded {
    use std::borrow::Cow;
    use std::io;
    use std::marker::PhantomData;

    use super::{FileSystem, check_name, not_found};

    /// Resources compiled into the binary with [`rust_embed`].
    ///
    /// ```ignore
    /// #[derive(rust_embed::Embed)]
    /// #[folder = "config/"]
    /// struct Config;
    ///
    /// let fs = loadenv::Embedded::<Config>::new();
    /// ```
    pub struct Embedded<E> {
        marker: PhantomData<fn() -> E>,
    }

    impl<E: rust_embed::Embed> Embedded<E> {
        pub fn new() -> Self {
            Self {
                marker: PhantomData,
            }
        }
    }

    impl<E: rust_embed::Embed> Default for Embedded<E> {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<E> std::fmt::Debug for Embedded<E> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("Embedded")
                .field("bundle", &std::any::type_name::<E>())
                .finish()
        }
    }

    impl<E: rust_embed::Embed> FileSystem for Embedded<E> {
        fn read_file(&self, name: &str) -> io::Result<Cow<'_, [u8]>> {
            check_name(name)?;
            E::get(name)
                .map(|file| file.data)
                .ok_or_else(|| not_found(name))
        }
    }
}
