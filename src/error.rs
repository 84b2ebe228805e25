use alloc::string::String;
use core::fmt;

use crate::bmp::BmpError;

/// An error while building a palette table from bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PaletteError {
  /// The palette data was zero bytes long.
  EmptyPalette,

  /// A seek or read went outside of the source's bytes.
  OutOfBounds {
    /// Where the seek or read wanted to start.
    offset: usize,
    /// How many bytes were wanted from there.
    requested: usize,
    /// The total length of the source.
    len: usize,
  },

  /// The source was supposed to be a BMP file but didn't parse as one.
  Bmp(BmpError),

  /// The allocator couldn't give us enough space.
  Alloc,
}
impl From<BmpError> for PaletteError {
  #[inline]
  fn from(e: BmpError) -> Self {
    match e {
      BmpError::AllocError => Self::Alloc,
      other => Self::Bmp(other),
    }
  }
}
impl From<alloc::collections::TryReserveError> for PaletteError {
  #[inline]
  fn from(_: alloc::collections::TryReserveError) -> Self {
    Self::Alloc
  }
}
impl fmt::Display for PaletteError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::EmptyPalette => f.write_str("palette is empty"),
      Self::OutOfBounds { offset, requested, len } => write!(
        f,
        "wanted {requested} bytes at offset {offset}, but the source is only {len} bytes"
      ),
      Self::Bmp(e) => write!(f, "bad bitmap: {e:?}"),
      Self::Alloc => f.write_str("allocation failed"),
    }
  }
}
#[cfg(feature = "std")]
impl std::error::Error for PaletteError {}

/// An error from a [FileSystem](crate::FileSystem) when opening a file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FileSystemError {
  /// There's no file at the path.
  NotFound {
    /// The path that was asked for.
    path: String,
  },

  /// Any other failure from the underlying file system.
  Io {
    /// The path that was asked for.
    path: String,
    /// The file system's own description of what went wrong.
    message: String,
  },
}
impl fmt::Display for FileSystemError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NotFound { path } => write!(f, "file not found: '{path}'"),
      Self::Io { path, message } => write!(f, "could not read '{path}': {message}"),
    }
  }
}
#[cfg(feature = "std")]
impl std::error::Error for FileSystemError {}

/// Why a palette file failed to load.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AssetErrorKind {
  /// The file extension isn't `lmp`, `pcx`, or `bmp`.
  UnknownFormat,

  /// The file system couldn't give us the file.
  FileSystem(FileSystemError),

  /// The file was read but the palette inside was bad.
  Palette(PaletteError),
}

/// A palette file failed to load.
///
/// This always knows the path that was being loaded, and the cause is in
/// [kind](AssetError::kind).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetError {
  path: String,
  kind: AssetErrorKind,
}
impl AssetError {
  #[inline]
  pub(crate) fn new(path: &str, kind: AssetErrorKind) -> Self {
    Self { path: String::from(path), kind }
  }

  /// The path of the palette file.
  #[inline]
  #[must_use]
  pub fn path(&self) -> &str {
    &self.path
  }

  /// What went wrong.
  #[inline]
  #[must_use]
  pub fn kind(&self) -> &AssetErrorKind {
    &self.kind
  }
}
impl fmt::Display for AssetError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Could not load palette file '{}': ", self.path)?;
    match &self.kind {
      AssetErrorKind::UnknownFormat => f.write_str("Unknown palette format"),
      AssetErrorKind::FileSystem(e) => fmt::Display::fmt(e, f),
      AssetErrorKind::Palette(e) => fmt::Display::fmt(e, f),
    }
  }
}
#[cfg(feature = "std")]
impl std::error::Error for AssetError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match &self.kind {
      AssetErrorKind::UnknownFormat => None,
      AssetErrorKind::FileSystem(e) => Some(e),
      AssetErrorKind::Palette(e) => Some(e),
    }
  }
}

/// An error while expanding indexed pixels into RGBA pixels.
///
/// These mean that the index buffer doesn't go with the palette (or with the
/// output buffer), so they're kept apart from the loading errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ExpandError {
  /// The [Palette](crate::Palette) doesn't have a table yet.
  Uninitialized,

  /// There's fewer index bytes than the pixel count.
  IndexBufferTooShort {
    /// Pixels asked for.
    pixel_count: usize,
    /// Index bytes given.
    available: usize,
  },

  /// The RGBA output can't hold 4 bytes per pixel.
  OutputTooSmall {
    /// Bytes needed (saturated if the multiplication overflows).
    needed: usize,
    /// Bytes given.
    available: usize,
  },

  /// An index points past the end of the palette table.
  IndexOutOfRange {
    /// The first offending index value.
    index: u8,
    /// The number of whole entries in the table.
    entry_count: usize,
  },

  /// Reading the indexes out of a [ByteSource](crate::ByteSource) failed.
  Source(PaletteError),
}
impl From<PaletteError> for ExpandError {
  #[inline]
  fn from(e: PaletteError) -> Self {
    Self::Source(e)
  }
}
impl fmt::Display for ExpandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Uninitialized => f.write_str("palette has no table"),
      Self::IndexBufferTooShort { pixel_count, available } => {
        write!(f, "{pixel_count} pixels requested, but only {available} index bytes given")
      }
      Self::OutputTooSmall { needed, available } => {
        write!(f, "RGBA output needs {needed} bytes, but only {available} given")
      }
      Self::IndexOutOfRange { index, entry_count } => {
        write!(f, "index {index} is outside of a palette with {entry_count} entries")
      }
      Self::Source(e) => write!(f, "could not read indexes: {e}"),
    }
  }
}
#[cfg(feature = "std")]
impl std::error::Error for ExpandError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Source(e) => Some(e),
      _ => None,
    }
  }
}
