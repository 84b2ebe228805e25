use alloc::vec::Vec;

use crate::{ByteSource, Color, ExpandError, Palette, PaletteTable};

/// Which palette indexes (if any) count as transparent while expanding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransparencyMode {
  /// Every pixel gets an alpha of 255.
  #[default]
  Opaque,
  /// Index 255 gets an alpha of 0, all others get 255.
  ///
  /// This is the Quake convention for "fence" textures.
  Index255Transparent,
}

/// The palette index that [TransparencyMode::Index255Transparent] treats as
/// transparent.
pub const TRANSPARENT_INDEX: u8 = 255;

/// What else was learned while expanding an indexed image.
#[derive(Debug, Clone, Copy)]
pub struct Expansion {
  /// The plain average of the RGB of every pixel (transparent ones included),
  /// with an alpha of `1.0`.
  pub average_color: Color,

  /// If any pixel was given an alpha of 0.
  ///
  /// Always `false` with [TransparencyMode::Opaque].
  pub had_transparency: bool,
}

impl PaletteTable {
  /// Expands `pixel_count` indexes into `rgba`, 4 bytes per pixel.
  ///
  /// Bytes of `rgba` past `4 * pixel_count` aren't touched.
  ///
  /// ## Failure
  /// Everything is checked before anything is written, so on failure `rgba`
  /// is left as it was.
  /// * `indexed` has fewer than `pixel_count` bytes.
  /// * `rgba` has fewer than `4 * pixel_count` bytes.
  /// * Any of the first `pixel_count` indexes is past the end of the table.
  pub fn expand_into(
    &self, indexed: &[u8], pixel_count: usize, rgba: &mut [u8], mode: TransparencyMode,
  ) -> Result<Expansion, ExpandError> {
    let indexed = indexed.get(..pixel_count).ok_or(ExpandError::IndexBufferTooShort {
      pixel_count,
      available: indexed.len(),
    })?;
    let available = rgba.len();
    let rgba = pixel_count
      .checked_mul(4)
      .and_then(|needed| rgba.get_mut(..needed))
      .ok_or(ExpandError::OutputTooSmall { needed: pixel_count.saturating_mul(4), available })?;
    self.check_indexes(indexed)?;

    let entries = self.entries();
    let mut sum = [0_u64; 3];
    let mut had_transparency = false;
    for (index, dest) in indexed.iter().copied().zip(rgba.chunks_exact_mut(4)) {
      let Some(&[r, g, b]) = entries.get(usize::from(index)) else {
        // check_indexes already ruled this out
        return Err(self.index_error(index));
      };
      let a = if mode == TransparencyMode::Index255Transparent && index == TRANSPARENT_INDEX {
        had_transparency = true;
        0
      } else {
        0xFF
      };
      dest.copy_from_slice(&[r, g, b, a]);
      sum[0] += u64::from(r);
      sum[1] += u64::from(g);
      sum[2] += u64::from(b);
    }

    Ok(Expansion { average_color: average_color(sum, pixel_count), had_transparency })
  }

  /// Like [expand_into](Self::expand_into), but allocates the output.
  pub fn expand(
    &self, indexed: &[u8], pixel_count: usize, mode: TransparencyMode,
  ) -> Result<(Vec<u8>, Expansion), ExpandError> {
    let needed = pixel_count.checked_mul(4).ok_or(ExpandError::OutputTooSmall {
      needed: usize::MAX,
      available: 0,
    })?;
    // check the cheap stuff before allocating anything
    if indexed.len() < pixel_count {
      return Err(ExpandError::IndexBufferTooShort { pixel_count, available: indexed.len() });
    }
    let mut rgba = Vec::new();
    rgba.try_reserve_exact(needed).map_err(|e| ExpandError::Source(e.into()))?;
    rgba.resize(needed, 0_u8);
    let info = self.expand_into(indexed, pixel_count, &mut rgba, mode)?;
    Ok((rgba, info))
  }

  /// Reads `pixel_count` indexes from `source` and expands them.
  ///
  /// On success the cursor has moved forward exactly `pixel_count` bytes. If
  /// there aren't enough bytes left the cursor doesn't move.
  pub fn expand_from_source<S: ByteSource + ?Sized>(
    &self, source: &mut S, pixel_count: usize, mode: TransparencyMode,
  ) -> Result<(Vec<u8>, Expansion), ExpandError> {
    let indexed = source.read_vec(pixel_count)?;
    self.expand(&indexed, pixel_count, mode)
  }

  fn check_indexes(&self, indexed: &[u8]) -> Result<(), ExpandError> {
    if self.entry_count() > usize::from(u8::MAX) {
      return Ok(());
    }
    match indexed.iter().copied().find(|&i| usize::from(i) >= self.entry_count()) {
      Some(index) => Err(self.index_error(index)),
      None => Ok(()),
    }
  }

  fn index_error(&self, index: u8) -> ExpandError {
    ExpandError::IndexOutOfRange { index, entry_count: self.entry_count() }
  }
}

fn average_color(sum: [u64; 3], pixel_count: usize) -> Color {
  if pixel_count == 0 {
    return Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
  }
  let n = pixel_count as f64;
  let [r, g, b] = sum.map(|s| (s as f64 / n / 255.0) as f32);
  Color { r, g, b, a: 1.0 }
}

impl Palette {
  /// See [PaletteTable::expand_into].
  ///
  /// ## Failure
  /// * The palette is uninitialized.
  #[inline]
  pub fn expand_into(
    &self, indexed: &[u8], pixel_count: usize, rgba: &mut [u8], mode: TransparencyMode,
  ) -> Result<Expansion, ExpandError> {
    self.table().ok_or(ExpandError::Uninitialized)?.expand_into(indexed, pixel_count, rgba, mode)
  }

  /// See [PaletteTable::expand].
  ///
  /// ## Failure
  /// * The palette is uninitialized.
  #[inline]
  pub fn expand(
    &self, indexed: &[u8], pixel_count: usize, mode: TransparencyMode,
  ) -> Result<(Vec<u8>, Expansion), ExpandError> {
    self.table().ok_or(ExpandError::Uninitialized)?.expand(indexed, pixel_count, mode)
  }

  /// See [PaletteTable::expand_from_source].
  ///
  /// ## Failure
  /// * The palette is uninitialized. Nothing is read from `source`.
  #[inline]
  pub fn expand_from_source<S: ByteSource + ?Sized>(
    &self, source: &mut S, pixel_count: usize, mode: TransparencyMode,
  ) -> Result<(Vec<u8>, Expansion), ExpandError> {
    self.table().ok_or(ExpandError::Uninitialized)?.expand_from_source(source, pixel_count, mode)
  }
}

#[test]
fn test_expand_round_trip() {
  let t = PaletteTable::new(alloc::vec![10, 20, 30, 200, 210, 220]).unwrap();
  let (rgba, info) = t.expand(&[0, 1, 0], 3, TransparencyMode::Opaque).unwrap();
  assert_eq!(rgba, [10, 20, 30, 255, 200, 210, 220, 255, 10, 20, 30, 255]);
  assert!(!info.had_transparency);
  assert_eq!(info.average_color.a, 1.0);
}

#[test]
fn test_expand_into_fails_before_writing() {
  let t = PaletteTable::new(alloc::vec![1, 2, 3, 4, 5, 6]).unwrap();
  let mut rgba = [7_u8; 12];
  assert_eq!(
    t.expand_into(&[0, 1, 2], 3, &mut rgba, TransparencyMode::Opaque).unwrap_err(),
    ExpandError::IndexOutOfRange { index: 2, entry_count: 2 }
  );
  assert_eq!(rgba, [7_u8; 12]);

  assert_eq!(
    t.expand_into(&[0, 1], 3, &mut rgba, TransparencyMode::Opaque).unwrap_err(),
    ExpandError::IndexBufferTooShort { pixel_count: 3, available: 2 }
  );
  assert_eq!(
    t.expand_into(&[0, 1, 0], 3, &mut rgba[..11], TransparencyMode::Opaque).unwrap_err(),
    ExpandError::OutputTooSmall { needed: 12, available: 11 }
  );
  assert_eq!(rgba, [7_u8; 12]);
}
