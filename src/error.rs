//! Error types for the volume formatter.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for formatter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while formatting or restoring a volume.
///
/// Every variant is fatal. Nothing is retried: a partially written image is
/// left as-is and the operator re-runs the formatter.
#[derive(Error, Debug)]
pub enum Error {
    /// Size suffix is none of `T`, `G`, `M`.
    #[error("unknown size suffix '{0}'")]
    InvalidUnit(char),

    /// Size magnitude cannot be represented.
    #[error("invalid size: {0}")]
    InvalidSize(String),

    /// Target is an existing regular file and force was not given.
    #[error("file {} already exists - use -x to force", .0.display())]
    AlreadyExists(PathBuf),

    /// Target can never host a volume.
    #[error("unable to create a volume on {} ({kind})", .path.display())]
    UnsupportedTarget { path: PathBuf, kind: &'static str },

    /// Target could not be opened or created.
    #[error("could not open {}: {source}", .path.display())]
    OpenFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Another process holds the write lock on the target.
    #[error("{} is locked by another process", .0.display())]
    Locked(PathBuf),

    /// Requested volume is smaller than one size unit.
    #[error("cannot have a volume with size < 1MB (got {units}MB)")]
    TooSmall { units: u64 },

    /// I/O error while writing noise or the superblock.
    #[error("write failed: {0}")]
    WriteFailure(#[source] std::io::Error),

    /// I/O error while reading back an existing image.
    #[error("read failed: {0}")]
    ReadFailure(#[source] std::io::Error),

    /// Block zero does not carry a valid superblock.
    #[error("invalid superblock: {0}")]
    InvalidSuperblock(String),
}

impl Error {
    /// Process exit status for this error.
    ///
    /// I/O errors propagate their OS error code; everything else maps to a
    /// fixed errno value so each condition exits with a distinct status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidUnit(_) => libc::EINVAL,
            Error::InvalidSize(_) => libc::ERANGE,
            Error::AlreadyExists(_) => libc::EEXIST,
            Error::UnsupportedTarget { .. } => libc::EOPNOTSUPP,
            Error::Locked(_) => libc::EWOULDBLOCK,
            Error::TooSmall { .. } => libc::EDOM,
            Error::OpenFailure { source, .. } => source.raw_os_error().unwrap_or(libc::EACCES),
            Error::WriteFailure(e) | Error::ReadFailure(e) => e.raw_os_error().unwrap_or(libc::EIO),
            Error::InvalidSuperblock(_) => libc::EBADMSG,
        }
    }
}
