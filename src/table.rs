use alloc::{sync::Arc, vec::Vec};
use core::fmt::Debug;

use bytemuck::cast_slice;

use crate::PaletteError;

/// The bytes of a loaded palette, as `[r, g, b]` entries.
///
/// The bytes are never changed after construction, and the backing store is
/// reference counted, so cloning a table is cheap and every clone shares the
/// same bytes. This also makes a table `Send + Sync`, so several threads can
/// expand images against the same table at once.
///
/// The number of entries is `len / 3`. If the length isn't a multiple of 3 the
/// leftover bytes are kept but aren't an entry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PaletteTable(Arc<[u8]>);
impl PaletteTable {
  /// Makes a table from the raw palette bytes.
  ///
  /// ## Failure
  /// * `data` is empty.
  #[inline]
  pub fn new(data: Vec<u8>) -> Result<Self, PaletteError> {
    if data.is_empty() {
      return Err(PaletteError::EmptyPalette);
    }
    Ok(Self(Arc::from(data)))
  }

  /// Length of the table in bytes. Never zero.
  #[inline]
  #[must_use]
  #[allow(clippy::len_without_is_empty)]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// The number of whole `[r, g, b]` entries.
  #[inline]
  #[must_use]
  pub fn entry_count(&self) -> usize {
    self.0.len() / 3
  }

  /// The raw bytes, including any leftover partial entry.
  #[inline]
  #[must_use]
  pub fn as_bytes(&self) -> &[u8] {
    &self.0
  }

  /// The whole entries.
  #[inline]
  #[must_use]
  pub fn entries(&self) -> &[[u8; 3]] {
    cast_slice(&self.0[..self.entry_count() * 3])
  }

  /// Gets the entry for an index, or `None` if the table is too short.
  #[inline]
  #[must_use]
  pub fn get(&self, index: u8) -> Option<[u8; 3]> {
    self.entries().get(usize::from(index)).copied()
  }

  /// If both tables share the same backing bytes.
  #[inline]
  #[must_use]
  pub fn ptr_eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}
impl Debug for PaletteTable {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    // currently prints no more than 4 palette entries
    let entries = self.entries();
    f.debug_tuple("PaletteTable")
      .field(&&entries[..entries.len().min(4)])
      .field(&entries.len())
      .finish()
  }
}

#[test]
fn test_palette_table_entries() {
  use alloc::vec;

  assert_eq!(PaletteTable::new(Vec::new()), Err(PaletteError::EmptyPalette));

  let t = PaletteTable::new(vec![10, 20, 30, 200, 210, 220, 7]).unwrap();
  assert_eq!(t.len(), 7);
  assert_eq!(t.entry_count(), 2);
  assert_eq!(t.entries(), &[[10, 20, 30], [200, 210, 220]]);
  assert_eq!(t.get(1), Some([200, 210, 220]));
  assert_eq!(t.get(2), None);

  // a lone byte is still a legal (if useless) table
  let tiny = PaletteTable::new(vec![9]).unwrap();
  assert_eq!(tiny.entry_count(), 0);
  assert!(tiny.entries().is_empty());

  let u = t.clone();
  assert!(t.ptr_eq(&u));
  assert!(!t.ptr_eq(&tiny));
}
