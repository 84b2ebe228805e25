use alloc::vec::Vec;

use crate::{
  bmp::Bmp, AssetError, AssetErrorKind, ByteSource, FileSystem, PaletteError, PaletteTable,
};

/// The PCX palette is always the last 768 bytes of the file.
pub const PCX_PALETTE_SIZE: usize = 256 * 3;

/// The palette file formats that [Palette::load_file] knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaletteFormat {
  /// Headerless `[r, g, b]` entries (Quake `palette.lmp` style).
  Lmp,
  /// The 768 byte palette at the end of a PCX file.
  Pcx,
  /// The color table (or pixels) of a Windows Bitmap.
  Bmp,
  /// Anything else.
  Unknown,
}
impl PaletteFormat {
  /// Picks the format from a file extension, ignoring ASCII case.
  #[inline]
  #[must_use]
  pub fn from_extension(extension: &str) -> Self {
    if extension.eq_ignore_ascii_case("lmp") {
      Self::Lmp
    } else if extension.eq_ignore_ascii_case("pcx") {
      Self::Pcx
    } else if extension.eq_ignore_ascii_case("bmp") {
      Self::Bmp
    } else {
      Self::Unknown
    }
  }

  /// Picks the format from the extension of the last component of a path.
  ///
  /// Both `/` and `\` count as separators. A path without an extension is
  /// [Unknown](Self::Unknown).
  #[inline]
  #[must_use]
  pub fn from_path(path: &str) -> Self {
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file_name.rsplit_once('.') {
      Some((_, extension)) => Self::from_extension(extension),
      None => Self::Unknown,
    }
  }
}

/// A handle to a palette table, or to nothing yet.
///
/// The [Default] palette is "uninitialized": it has no table at all. That's
/// different from an empty table, which can't exist.
///
/// Cloning a palette shares the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Palette {
  table: Option<PaletteTable>,
}
impl From<PaletteTable> for Palette {
  #[inline]
  fn from(table: PaletteTable) -> Self {
    Self { table: Some(table) }
  }
}
impl Palette {
  /// Makes a palette from raw `[r, g, b]` bytes.
  ///
  /// ## Failure
  /// * `data` is empty.
  #[inline]
  pub fn from_bytes(data: Vec<u8>) -> Result<Self, PaletteError> {
    PaletteTable::new(data).map(Self::from)
  }

  /// If there's a table.
  #[inline]
  #[must_use]
  pub const fn initialized(&self) -> bool {
    self.table.is_some()
  }

  /// The table, if there is one.
  #[inline]
  #[must_use]
  pub const fn table(&self) -> Option<&PaletteTable> {
    self.table.as_ref()
  }

  /// Opens `path` in `fs` and loads it based on the file extension.
  ///
  /// The extension is checked first, so an unknown format never opens the
  /// file.
  ///
  /// ## Failure
  /// * The extension isn't `lmp`, `pcx`, or `bmp` (any case).
  /// * The file system can't open the file.
  /// * The format's loader fails.
  ///
  /// Every failure is an [AssetError] that carries `path`.
  pub fn load_file<F: FileSystem>(fs: &F, path: &str) -> Result<Self, AssetError> {
    let format = PaletteFormat::from_path(path);
    if format == PaletteFormat::Unknown {
      log::warn!("unknown palette format: '{path}'");
      return Err(AssetError::new(path, AssetErrorKind::UnknownFormat));
    }
    log::debug!("loading palette '{path}' as {format:?}");
    let mut source =
      fs.open_file(path).map_err(|e| AssetError::new(path, AssetErrorKind::FileSystem(e)))?;
    let result = match format {
      PaletteFormat::Lmp => Self::load_lmp(&mut source),
      PaletteFormat::Pcx => Self::load_pcx(&mut source),
      PaletteFormat::Bmp => Self::load_bmp(&mut source),
      PaletteFormat::Unknown => return Err(AssetError::new(path, AssetErrorKind::UnknownFormat)),
    };
    result.map_err(|e| AssetError::new(path, AssetErrorKind::Palette(e)))
  }

  /// Loads a palette where all of the remaining bytes are the palette.
  #[inline]
  pub fn load_lmp<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self, PaletteError> {
    let data = source.read_remaining()?;
    if data.len() % 3 != 0 {
      log::warn!("palette length {} isn't a multiple of 3", data.len());
    }
    Self::from_bytes(data)
  }

  /// Loads the palette from the last 768 bytes of a PCX file.
  ///
  /// Whatever comes before that (the PCX header and image) is ignored.
  ///
  /// ## Failure
  /// * The source is shorter than 768 bytes.
  #[inline]
  pub fn load_pcx<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self, PaletteError> {
    source.seek_from_end(PCX_PALETTE_SIZE)?;
    log::trace!("pcx palette starts at offset {}", source.position());
    let data = source.read_vec(PCX_PALETTE_SIZE)?;
    Self::from_bytes(data)
  }

  /// Loads a palette out of a BMP file.
  ///
  /// An indexed bitmap gives its color table. Any other bitmap gives its
  /// pixels, top row first, as if the whole image were one long list of
  /// palette entries. That lets a palette be drawn as a plain swatch image.
  ///
  /// ## Failure
  /// * The bytes aren't a BMP this crate can read.
  /// * The color table or image is empty.
  pub fn load_bmp<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self, PaletteError> {
    let bytes = source.read_remaining()?;
    let bmp = Bmp::parse(&bytes)?;
    let data = if bmp.has_palette() {
      bmp.palette_rgb()?
    } else {
      log::debug!(
        "bmp has no color table ({} bits per pixel), using its pixels as the palette",
        bmp.info_header.bits_per_pixel
      );
      bmp.pixels_rgb()?
    };
    Self::from_bytes(data)
  }

  /// Loads a palette from a source that's known to be a bare palette.
  ///
  /// This works just like [load_lmp](Self::load_lmp), it's only a separate
  /// name for when the bytes didn't come from a file with an extension.
  #[inline]
  pub fn from_raw<S: ByteSource + ?Sized>(source: &mut S) -> Result<Self, PaletteError> {
    Self::load_lmp(source)
  }
}

#[test]
fn test_palette_format_from_path() {
  assert_eq!(PaletteFormat::from_path("gfx/palette.lmp"), PaletteFormat::Lmp);
  assert_eq!(PaletteFormat::from_path("gfx/colormap.PCX"), PaletteFormat::Pcx);
  assert_eq!(PaletteFormat::from_path("C:\\quake\\pal.Bmp"), PaletteFormat::Bmp);
  assert_eq!(PaletteFormat::from_path("gfx/palette.pal"), PaletteFormat::Unknown);
  assert_eq!(PaletteFormat::from_path("gfx.d/palette"), PaletteFormat::Unknown);
  assert_eq!(PaletteFormat::from_path("lmp"), PaletteFormat::Unknown);
  assert_eq!(PaletteFormat::from_path(".lmp"), PaletteFormat::Lmp);
}

#[test]
fn test_uninitialized_palette() {
  let p = Palette::default();
  assert!(!p.initialized());
  assert!(p.table().is_none());

  let p = Palette::from_bytes(alloc::vec![1, 2, 3]).unwrap();
  assert!(p.initialized());
  assert_eq!(p.table().map(PaletteTable::len), Some(3));
  assert_eq!(Palette::from_bytes(Vec::new()), Err(PaletteError::EmptyPalette));
}
