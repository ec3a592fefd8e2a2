use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The named file or resource could not be opened or read.
    #[error("failed to read `{name}`: {source}")]
    Source {
        name: String,
        #[source]
        source: std::io::Error,
    },
    /// The input stream failed while lines were being read.
    #[error("read error at line {line}: {source}")]
    Scan {
        line: u32,
        #[source]
        source: std::io::Error,
    },
    /// The target environment rejected a variable.
    ///
    /// Variables applied before this one are left in place.
    #[error("cannot set `{key}`: {kind}")]
    Apply { key: String, kind: ApplyErrorKind },
}

impl Error {
    pub(crate) fn source_error(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Source {
            name: name.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ApplyErrorKind {
    #[error("empty variable name")]
    EmptyKey,
    #[error("variable name contains `=` or NUL")]
    InvalidKey,
    #[error("value contains NUL")]
    InvalidValue,
}
