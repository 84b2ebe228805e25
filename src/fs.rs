//! The file system that palette files get opened through.

use alloc::{collections::BTreeMap, string::String, vec::Vec};

use crate::{ByteSource, FileSystemError, MemSource};

/// Something that can open a file by path and give back its bytes.
pub trait FileSystem {
  /// The kind of source that an opened file reads from.
  type Source: ByteSource;

  /// Opens the file at `path`.
  fn open_file(&self, path: &str) -> Result<Self::Source, FileSystemError>;
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
  type Source = F::Source;
  #[inline]
  fn open_file(&self, path: &str) -> Result<Self::Source, FileSystemError> {
    (**self).open_file(path)
  }
}

/// A file system that's just a map from path to file bytes.
///
/// Paths are matched exactly, there's no normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFileSystem {
  files: BTreeMap<String, Vec<u8>>,
}
impl MemoryFileSystem {
  /// An empty file system.
  #[inline]
  #[must_use]
  pub const fn new() -> Self {
    Self { files: BTreeMap::new() }
  }

  /// Adds (or replaces) a file.
  #[inline]
  pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
    self.files.insert(path.into(), bytes.into());
  }

  /// Builder style version of [insert](Self::insert).
  #[inline]
  #[must_use]
  pub fn with_file(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
    self.insert(path, bytes);
    self
  }
}
impl FileSystem for MemoryFileSystem {
  type Source = MemSource<Vec<u8>>;
  #[inline]
  fn open_file(&self, path: &str) -> Result<Self::Source, FileSystemError> {
    match self.files.get(path) {
      Some(bytes) => Ok(MemSource::new(bytes.clone())),
      None => Err(FileSystemError::NotFound { path: String::from(path) }),
    }
  }
}

#[cfg(feature = "std")]
pub use disk::DiskFileSystem;

#[cfg(feature = "std")]
mod disk {
  use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    string::{String, ToString},
    vec::Vec,
  };

  use super::FileSystem;
  use crate::{FileSystemError, MemSource};

  /// Opens files from a directory on disk.
  ///
  /// The whole file gets read into memory when it's opened. Palette files are
  /// small, and the BMP parser wants all the bytes at once anyway.
  #[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
  #[cfg_attr(docs_rs, doc(cfg(feature = "std")))]
  pub struct DiskFileSystem {
    root: PathBuf,
  }
  impl DiskFileSystem {
    /// Paths given to [open_file](FileSystem::open_file) are relative to
    /// `root` (absolute paths replace it entirely).
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
      Self { root: root.into() }
    }

    /// The directory that paths are relative to.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
      &self.root
    }
  }
  impl FileSystem for DiskFileSystem {
    type Source = MemSource<Vec<u8>>;
    fn open_file(&self, path: &str) -> Result<Self::Source, FileSystemError> {
      let full_path = self.root.join(path);
      match std::fs::read(&full_path) {
        Ok(bytes) => Ok(MemSource::new(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
          Err(FileSystemError::NotFound { path: String::from(path) })
        }
        Err(e) => Err(FileSystemError::Io { path: String::from(path), message: e.to_string() }),
      }
    }
  }
}

#[test]
fn test_memory_file_system() {
  let fs = MemoryFileSystem::new().with_file("gfx/palette.lmp", [1_u8, 2, 3]);
  let source = fs.open_file("gfx/palette.lmp").unwrap();
  assert_eq!(source.len(), 3);
  assert_eq!(
    (&fs).open_file("gfx/other.lmp").unwrap_err(),
    FileSystemError::NotFound { path: String::from("gfx/other.lmp") }
  );
}
