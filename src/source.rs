use alloc::vec::Vec;

use crate::PaletteError;

/// Random access reading of raw bytes, with a cursor.
///
/// The palette loaders only ever need to know the total length, move the
/// cursor, and pull out an exact number of bytes, so that's all this asks for.
pub trait ByteSource {
  /// Total length of the source in bytes.
  fn len(&self) -> usize;

  /// Current cursor position, in `0 ..= len`.
  fn position(&self) -> usize;

  /// Moves the cursor to `offset` bytes after the start.
  ///
  /// ## Failure
  /// * `offset` is past the end. The cursor doesn't move.
  fn seek_from_start(&mut self, offset: usize) -> Result<(), PaletteError>;

  /// Fills all of `buf` from the cursor, then moves the cursor past what was
  /// read.
  ///
  /// ## Failure
  /// * There's less than `buf.len()` bytes remaining. The cursor doesn't move
  ///   and `buf` might have been partly written.
  fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), PaletteError>;

  /// If the source has no bytes at all.
  #[inline]
  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Bytes between the cursor and the end.
  #[inline]
  fn remaining(&self) -> usize {
    self.len().saturating_sub(self.position())
  }

  /// Moves the cursor to `offset` bytes before the end.
  ///
  /// ## Failure
  /// * `offset` is larger than the source. The cursor doesn't move.
  #[inline]
  fn seek_from_end(&mut self, offset: usize) -> Result<(), PaletteError> {
    let len = self.len();
    match len.checked_sub(offset) {
      Some(target) => self.seek_from_start(target),
      None => Err(PaletteError::OutOfBounds { offset: 0, requested: offset, len }),
    }
  }

  /// Reads everything from the cursor to the end.
  #[inline]
  fn read_remaining(&mut self) -> Result<Vec<u8>, PaletteError> {
    self.read_vec(self.remaining())
  }

  /// Reads exactly `count` bytes into a new `Vec`.
  #[inline]
  fn read_vec(&mut self, count: usize) -> Result<Vec<u8>, PaletteError> {
    if count > self.remaining() {
      return Err(PaletteError::OutOfBounds {
        offset: self.position(),
        requested: count,
        len: self.len(),
      });
    }
    let mut v = Vec::new();
    v.try_reserve_exact(count)?;
    v.resize(count, 0_u8);
    self.read_exact(&mut v)?;
    Ok(v)
  }
}

/// A [ByteSource] over bytes that are already in memory.
///
/// Works with anything that's `AsRef<[u8]>`, so both `&[u8]` and `Vec<u8>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MemSource<B> {
  bytes: B,
  position: usize,
}
impl<B: AsRef<[u8]>> MemSource<B> {
  /// Makes a new source with the cursor at the start.
  #[inline]
  #[must_use]
  pub const fn new(bytes: B) -> Self {
    Self { bytes, position: 0 }
  }

  /// The bytes from the cursor to the end, without moving the cursor.
  #[inline]
  #[must_use]
  pub fn remaining_bytes(&self) -> &[u8] {
    self.bytes.as_ref().get(self.position..).unwrap_or_default()
  }

  /// Gives back the inner bytes.
  #[inline]
  #[must_use]
  pub fn into_inner(self) -> B {
    self.bytes
  }
}
impl<B: AsRef<[u8]>> ByteSource for MemSource<B> {
  #[inline]
  fn len(&self) -> usize {
    self.bytes.as_ref().len()
  }

  #[inline]
  fn position(&self) -> usize {
    self.position
  }

  #[inline]
  fn seek_from_start(&mut self, offset: usize) -> Result<(), PaletteError> {
    let len = self.len();
    if offset > len {
      return Err(PaletteError::OutOfBounds { offset, requested: 0, len });
    }
    self.position = offset;
    Ok(())
  }

  #[inline]
  fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), PaletteError> {
    let end = self.position.checked_add(buf.len());
    match end.and_then(|end| self.bytes.as_ref().get(self.position..end)) {
      Some(src) => {
        buf.copy_from_slice(src);
        self.position += buf.len();
        Ok(())
      }
      None => Err(PaletteError::OutOfBounds {
        offset: self.position,
        requested: buf.len(),
        len: self.len(),
      }),
    }
  }
}

#[test]
fn test_mem_source_seeks_and_reads() {
  let mut s = MemSource::new(&[1_u8, 2, 3, 4, 5][..]);
  assert_eq!(s.len(), 5);
  assert_eq!(s.remaining(), 5);

  let mut buf = [0_u8; 2];
  s.read_exact(&mut buf).unwrap();
  assert_eq!(buf, [1, 2]);
  assert_eq!(s.position(), 2);
  assert_eq!(s.remaining_bytes(), &[3, 4, 5]);

  s.seek_from_end(1).unwrap();
  assert_eq!(s.position(), 4);
  let mut buf = [0_u8; 2];
  assert_eq!(
    s.read_exact(&mut buf),
    Err(PaletteError::OutOfBounds { offset: 4, requested: 2, len: 5 })
  );
  assert_eq!(s.position(), 4);

  assert!(s.seek_from_start(6).is_err());
  assert!(s.seek_from_end(6).is_err());
  assert_eq!(s.position(), 4);

  s.seek_from_start(5).unwrap();
  assert_eq!(s.remaining(), 0);
  assert_eq!(s.read_remaining().unwrap(), alloc::vec::Vec::<u8>::new());
}
