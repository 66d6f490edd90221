//! Target classification and raw access to the volume image.
//!
//! A volume lives either on a raw block device or in a regular file. The
//! handle holds an exclusive `flock` for as long as it is open, so two
//! formatters can never write the same target at once.

use crate::config::{FormatOptions, BLOCK_SIZE};
use crate::error::{Error, Result};
use crate::volume::Block;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::os::unix::fs::{FileExt, FileTypeExt, OpenOptionsExt};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// What the target path currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// Raw block device; sized from the device itself.
    BlockDevice,
    /// Existing regular file.
    RegularFile,
    /// Nothing at the path yet.
    Missing,
}

impl TargetKind {
    /// Classify `path` without following symlinks.
    ///
    /// Directories, symlinks, sockets, FIFOs and character devices can never
    /// host a volume and are rejected here.
    pub fn probe(path: &Path) -> Result<Self> {
        let metadata = match std::fs::symlink_metadata(path) {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TargetKind::Missing),
            Err(e) => {
                return Err(Error::OpenFailure {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };

        let ft = metadata.file_type();
        let unsupported = if ft.is_block_device() {
            return Ok(TargetKind::BlockDevice);
        } else if ft.is_file() {
            return Ok(TargetKind::RegularFile);
        } else if ft.is_dir() {
            "directory"
        } else if ft.is_symlink() {
            "symbolic link"
        } else if ft.is_char_device() {
            "character device"
        } else if ft.is_fifo() {
            "fifo"
        } else if ft.is_socket() {
            "socket"
        } else {
            "unknown file type"
        };

        Err(Error::UnsupportedTarget {
            path: path.to_path_buf(),
            kind: unsupported,
        })
    }
}

/// Locked handle to the volume image.
#[derive(Debug)]
pub struct Device {
    file: File,
    path: PathBuf,
}

impl Device {
    /// Open the target described by `opts`, which was classified as `kind`.
    ///
    /// An existing regular file is refused unless force (or restore) is in
    /// effect. Files are truncated after the lock is taken, except when
    /// restoring, where the existing data blocks must survive.
    pub fn open(opts: &FormatOptions, kind: TargetKind) -> Result<Self> {
        let path = opts.path.as_path();
        let mut options = OpenOptions::new();
        // The path was classified without following symlinks; open it the same way.
        options
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOFOLLOW);

        match kind {
            TargetKind::BlockDevice => {}
            TargetKind::RegularFile if !opts.overwrite_allowed() => {
                return Err(Error::AlreadyExists(path.to_path_buf()));
            }
            TargetKind::RegularFile | TargetKind::Missing => {
                options.create(true).mode(0o600);
            }
        }

        let file = options.open(path).map_err(|e| Error::OpenFailure {
            path: path.to_path_buf(),
            source: e,
        })?;

        let device = Self {
            file,
            path: path.to_path_buf(),
        };
        device.lock()?;

        if kind != TargetKind::BlockDevice && !opts.restore {
            device.file.set_len(0).map_err(Error::WriteFailure)?;
        }

        Ok(device)
    }

    /// Path the handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current end offset of the image in bytes.
    pub fn end_offset(&self) -> Result<u64> {
        let mut file = &self.file;
        file.seek(SeekFrom::End(0)).map_err(Error::ReadFailure)
    }

    /// Whole blocks that fit in the image as it is now.
    pub fn block_count(&self) -> Result<u64> {
        Ok(self.end_offset()? / BLOCK_SIZE as u64)
    }

    /// Write `data` at an absolute byte offset.
    pub fn write_at(&self, offset: u64, data: &[u8]) -> Result<()> {
        self.file
            .write_all_at(data, offset)
            .map_err(Error::WriteFailure)
    }

    /// Read block `index`.
    pub fn read_block(&self, index: u64) -> Result<Block> {
        let mut buf = [0u8; BLOCK_SIZE];
        self.file
            .read_exact_at(&mut buf, Block::offset(index))
            .map_err(Error::ReadFailure)?;
        Ok(Block::from_bytes(&buf))
    }

    /// Flush written data to stable storage.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all().map_err(Error::WriteFailure)
    }

    /// Take the exclusive write lock without blocking.
    ///
    /// The lock is released when the file descriptor is closed.
    fn lock(&self) -> Result<()> {
        let rc = unsafe { libc::flock(self.file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if rc == 0 {
            return Ok(());
        }

        let err = std::io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::EWOULDBLOCK) {
            Err(Error::Locked(self.path.clone()))
        } else {
            Err(Error::OpenFailure {
                path: self.path.clone(),
                source: err,
            })
        }
    }
}
