#![forbid(unsafe_code)]

//! Module for reading the palette out of Windows Bitmap files (BMP).
//!
//! This is not a general BMP decoder, it only does what palette loading needs:
//! either the color table of an indexed bitmap, or the pixels of a true-color
//! bitmap as `[r, g, b]` values.
//!
//! ## The Format
//!
//! Note: All multi-byte values in BMP are always little-endian encoded.
//!
//! * The file starts with a 14 byte "file header": a two letter tag, the total
//!   file size, and the byte position of the pixel data.
//! * Next is an "info header". The first 4 bytes are the size of the info
//!   header, and each header version has a different size, so that's how you
//!   tell them apart. Every version has a width, height, and bits per pixel.
//! * With a 40 byte header and [BmpCompression::Bitfields] or
//!   [BmpCompression::AlphaBitfields] there's 3 or 4 `u32` channel masks after
//!   the header. The bigger headers keep the masks inside the header itself.
//! * Next there **might** be a color table. It's mandatory for 8 bits per pixel
//!   or less. Each entry is `[b, g, r, 0]`, except with the 12 byte core header
//!   where each entry is `[b, g, r]`.
//! * Then, at the offset given in the file header, the pixel array. Each row is
//!   padded to 4 bytes. A positive height means rows are stored bottom to top,
//!   a negative height means top to bottom.

use alloc::vec::Vec;
use core::num::NonZeroU32;

use crate::{byte_array_at, i32_le, onz_u32_le, try_split_off_byte_array, u16_le, u32_le};

/// Ways that parsing a BMP can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
#[allow(missing_docs)]
pub enum BmpError {
  ThisIsProbablyNotABmpFile,
  InsufficientBytes,
  UnknownCompression,
  UnknownHeaderLength,
  IllegalBitDepth,
  AllocError,
  PixelDataIllegalLength,
  /// The BMP file might be valid, but either way this library doesn't currently
  /// know how to pull colors out of it.
  ParserIncomplete,
}

/// Two-letter file tags commonly found at the start of a BMP file.
pub const COMMON_BMP_TAGS: &[[u8; 2]] = &[*b"BM", *b"BA", *b"CI", *b"CP", *b"IC", *b"PT"];

/// Various possible compression styles for Bmp files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BmpCompression {
  /// RGB, No compression.
  RgbNoCompression = 0,

  /// RGB, Run-length encoded, 8bpp
  RgbRLE8 = 1,

  /// RGB, Run-length encoded, 4bpp
  RgbRLE4 = 2,

  /// Meaning depends on header:
  /// * OS/2 2.x: Huffman 1D
  /// * Otherwise: uncompressed, with three `u32` masks locating the R, G, and
  ///   B bits.
  Bitfields = 3,

  /// Meaning depends on header:
  /// * OS/2 2.x: RLE24
  /// * Otherwise: a jpeg image
  Jpeg = 4,

  /// A png image
  Png = 5,

  /// Uncompressed, with four `u32` masks locating the R, G, B, and A bits.
  AlphaBitfields = 6,

  /// CMYK, No compression.
  CmykNoCompression = 11,

  /// CMYK, Run-length encoded, 8bpp
  CmykRLE8 = 12,

  /// CMYK, Run-length encoded, 4bpp
  CmykRLE4 = 13,
}
impl TryFrom<u32> for BmpCompression {
  type Error = BmpError;
  #[inline]
  fn try_from(value: u32) -> Result<Self, Self::Error> {
    use BmpCompression::*;
    Ok(match value {
      0 => RgbNoCompression,
      1 => RgbRLE8,
      2 => RgbRLE4,
      3 => Bitfields,
      4 => Jpeg,
      5 => Png,
      6 => AlphaBitfields,
      11 => CmykNoCompression,
      12 => CmykRLE8,
      13 => CmykRLE4,
      _ => return Err(BmpError::UnknownCompression),
    })
  }
}

/// The header at the start of all BMP files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BmpFileHeader {
  /// This is expected to be one of the [COMMON_BMP_TAGS].
  pub tag: [u8; 2],

  /// The total size of the file.
  ///
  /// Plenty of writers get this wrong, so it's not enforced.
  pub total_file_size: u32,

  /// The byte index within the file where the pixel data starts.
  pub pixel_data_offset: u32,
}
impl BmpFileHeader {
  /// Tries to get the file header and remaining bytes from the bytes of a BMP
  /// file.
  #[inline]
  pub fn try_from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), BmpError> {
    let (a, rest) = try_split_off_byte_array::<14>(bytes).ok_or(BmpError::InsufficientBytes)?;
    let header = Self {
      tag: byte_array_at(&a, 0),
      total_file_size: u32_le(byte_array_at(&a, 2)),
      // 4 reserved bytes skipped
      pixel_data_offset: u32_le(byte_array_at(&a, 10)),
    };
    Ok((header, rest))
  }
}

/// The various BMP info header versions, named by their byte size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(missing_docs)]
pub enum BmpHeaderVersion {
  /// `BITMAPCOREHEADER`, Windows 2.0 and OS/2 1.x.
  Core12,
  /// `OS22XBITMAPHEADER`, the short form.
  Os22x16,
  /// `OS22XBITMAPHEADER`, the long form.
  Os22x64,
  /// `BITMAPINFOHEADER`, by far the most common.
  V1_40,
  V2_52,
  V3_56,
  V4_108,
  V5_124,
}
impl BmpHeaderVersion {
  /// Picks the version based on the header's declared size.
  #[inline]
  pub const fn from_size(size: u32) -> Result<Self, BmpError> {
    Ok(match size {
      12 => Self::Core12,
      16 => Self::Os22x16,
      64 => Self::Os22x64,
      40 => Self::V1_40,
      52 => Self::V2_52,
      56 => Self::V3_56,
      108 => Self::V4_108,
      124 => Self::V5_124,
      _ => return Err(BmpError::UnknownHeaderLength),
    })
  }

  /// Size of the header in bytes.
  #[inline]
  #[must_use]
  pub const fn size(self) -> usize {
    match self {
      Self::Core12 => 12,
      Self::Os22x16 => 16,
      Self::Os22x64 => 64,
      Self::V1_40 => 40,
      Self::V2_52 => 52,
      Self::V3_56 => 56,
      Self::V4_108 => 108,
      Self::V5_124 => 124,
    }
  }

  /// Bytes per color table entry.
  #[inline]
  #[must_use]
  pub const fn color_table_entry_size(self) -> usize {
    match self {
      Self::Core12 => 3,
      _ => 4,
    }
  }

  const fn is_os2(self) -> bool {
    matches!(self, Self::Os22x16 | Self::Os22x64)
  }
}

/// The parts of a BMP info header that matter for getting colors out.
///
/// All the header versions are folded into this one struct. Fields that a
/// version doesn't have get their implied value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BmpInfoHeader {
  /// Which header version the file used.
  pub version: BmpHeaderVersion,

  /// Image pixel width
  pub width: i32,

  /// Image pixel height.
  ///
  /// * A positive height indicates that the origin is the **bottom** left.
  /// * A negative height indicates that the image origin is the **top** left.
  pub height: i32,

  /// Should be 1, 2, 4, 8, 16, 24, or 32.
  pub bits_per_pixel: u16,

  /// The compression style of the image data.
  pub compression: BmpCompression,

  /// The number of bytes in the raw bitmap data, if given.
  ///
  /// Only used to find the end of RLE compressed pixel data.
  pub image_byte_size: Option<NonZeroU32>,

  /// Declared palette length. `None` means "the implied amount".
  pub palette_len: Option<NonZeroU32>,

  /// `[r, g, b, a]` masks stored inside the header (v2 and later).
  pub header_masks: Option<[u32; 4]>,
}
impl BmpInfoHeader {
  /// Tries to get the info header and remaining bytes.
  pub fn try_from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), BmpError> {
    let (size, _) = try_split_off_byte_array::<4>(bytes).ok_or(BmpError::InsufficientBytes)?;
    let version = BmpHeaderVersion::from_size(u32_le(size))?;
    if bytes.len() < version.size() {
      return Err(BmpError::InsufficientBytes);
    }
    let (a, rest) = bytes.split_at(version.size());

    let header = match version {
      BmpHeaderVersion::Core12 => Self {
        version,
        // unsigned in this version, so always bottom-up
        width: i32::from(u16_le(byte_array_at(a, 4))),
        height: i32::from(u16_le(byte_array_at(a, 6))),
        bits_per_pixel: u16_le(byte_array_at(a, 10)),
        compression: BmpCompression::RgbNoCompression,
        image_byte_size: None,
        palette_len: None,
        header_masks: None,
      },
      BmpHeaderVersion::Os22x16 => Self {
        version,
        width: i32_le(byte_array_at(a, 4)),
        height: i32_le(byte_array_at(a, 8)),
        bits_per_pixel: u16_le(byte_array_at(a, 14)),
        compression: BmpCompression::RgbNoCompression,
        image_byte_size: None,
        palette_len: None,
        header_masks: None,
      },
      _ => {
        let masks = |count: usize| {
          let mut m = [0_u32; 4];
          for (i, mask) in m.iter_mut().enumerate().take(count) {
            *mask = u32_le(byte_array_at(a, 40 + i * 4));
          }
          m
        };
        Self {
          version,
          width: i32_le(byte_array_at(a, 4)),
          height: i32_le(byte_array_at(a, 8)),
          bits_per_pixel: u16_le(byte_array_at(a, 14)),
          compression: BmpCompression::try_from(u32_le(byte_array_at(a, 16)))?,
          image_byte_size: onz_u32_le(byte_array_at(a, 20)),
          palette_len: onz_u32_le(byte_array_at(a, 32)),
          header_masks: match version {
            BmpHeaderVersion::V2_52 => Some(masks(3)),
            BmpHeaderVersion::V3_56 | BmpHeaderVersion::V4_108 | BmpHeaderVersion::V5_124 => {
              Some(masks(4))
            }
            _ => None,
          },
        }
      }
    };
    Ok((header, rest))
  }

  /// If the pixels are indexes into a color table.
  #[inline]
  #[must_use]
  pub const fn is_indexed(&self) -> bool {
    self.bits_per_pixel <= 8
  }

  /// Gets the number of color table entries.
  ///
  /// Indexed images use `2**bits_per_pixel` entries unless a smaller count is
  /// declared. A larger declared count is clamped, since the extra entries
  /// couldn't be referenced anyway. Direct color images can have an optional
  /// table of "suggested" colors, which this counts too.
  #[inline]
  #[must_use]
  pub const fn palette_len(&self) -> usize {
    let declared = match self.palette_len {
      Some(nz) => nz.get() as usize,
      None => 0,
    };
    if self.is_indexed() {
      let max = 1_usize << self.bits_per_pixel;
      if declared == 0 || declared > max {
        max
      } else {
        declared
      }
    } else {
      declared
    }
  }

  /// Bytes per row of pixel data, including the padding to 4.
  #[inline]
  #[must_use]
  pub const fn bytes_per_line(&self) -> usize {
    let bits_per_line =
      (self.width.unsigned_abs() as usize).saturating_mul(self.bits_per_pixel as usize);
    bits_per_line.saturating_add(31) / 32 * 4
  }
}

/// A BMP file, with its regions located but not yet decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bmp<'b> {
  /// The file header.
  pub file_header: BmpFileHeader,
  /// The info header.
  pub info_header: BmpInfoHeader,
  /// `[r, g, b, a]` channel masks, only used for 16 and 32 bits per pixel.
  pub masks: [u32; 4],
  color_table: &'b [u8],
  pixel_data: &'b [u8],
}
impl<'b> Bmp<'b> {
  /// Parses the headers and finds the color table and pixel data.
  ///
  /// ## Failure
  /// * The tag isn't a known BMP tag.
  /// * Any region runs past the end of `bytes`.
  pub fn parse(bytes: &'b [u8]) -> Result<Self, BmpError> {
    let (file_header, rest) = BmpFileHeader::try_from_bytes(bytes)?;
    if !COMMON_BMP_TAGS.contains(&file_header.tag) {
      return Err(BmpError::ThisIsProbablyNotABmpFile);
    }
    if file_header.total_file_size as usize != bytes.len() {
      log::warn!(
        "bmp header states that the file size is 0x{:x} bytes, but it's 0x{:x}",
        file_header.total_file_size,
        bytes.len()
      );
    }
    let (info_header, mut rest) = BmpInfoHeader::try_from_bytes(rest)?;
    if !matches!(info_header.bits_per_pixel, 1 | 2 | 4 | 8 | 16 | 24 | 32) {
      return Err(BmpError::IllegalBitDepth);
    }

    let masks = match (info_header.compression, info_header.header_masks) {
      (BmpCompression::Bitfields | BmpCompression::AlphaBitfields, _)
        if info_header.version.is_os2() =>
      {
        // OS/2 reuses these numbers for Huffman 1D and RLE24.
        return Err(BmpError::ParserIncomplete);
      }
      (BmpCompression::Bitfields | BmpCompression::AlphaBitfields, Some(m)) => m,
      (BmpCompression::Bitfields, None) => {
        let (a, new_rest) =
          try_split_off_byte_array::<12>(rest).ok_or(BmpError::InsufficientBytes)?;
        rest = new_rest;
        [
          u32_le(byte_array_at(&a, 0)),
          u32_le(byte_array_at(&a, 4)),
          u32_le(byte_array_at(&a, 8)),
          0,
        ]
      }
      (BmpCompression::AlphaBitfields, None) => {
        let (a, new_rest) =
          try_split_off_byte_array::<16>(rest).ok_or(BmpError::InsufficientBytes)?;
        rest = new_rest;
        [
          u32_le(byte_array_at(&a, 0)),
          u32_le(byte_array_at(&a, 4)),
          u32_le(byte_array_at(&a, 8)),
          u32_le(byte_array_at(&a, 12)),
        ]
      }
      // When bitmasks aren't specified, there's default RGB mask values based on
      // the bit depth, either 555 (16-bit) or 888 (32-bit).
      _ => match info_header.bits_per_pixel {
        16 => [0b11111 << 10, 0b11111 << 5, 0b11111, 0],
        32 => [0xFF << 16, 0xFF << 8, 0xFF, 0],
        _ => [0, 0, 0, 0],
      },
    };

    let table_bytes =
      info_header.palette_len().saturating_mul(info_header.version.color_table_entry_size());
    if rest.len() < table_bytes {
      return Err(BmpError::InsufficientBytes);
    }
    let color_table = &rest[..table_bytes];

    let pixel_data_start = file_header.pixel_data_offset as usize;
    let pixel_data_len = match info_header.compression {
      // RLE data is shorter than the image it encodes. The header gives the
      // size, or if it doesn't then the data runs to the end of the file.
      BmpCompression::RgbRLE8 | BmpCompression::RgbRLE4 => match info_header.image_byte_size {
        Some(nz) => nz.get() as usize,
        None => bytes.len().saturating_sub(pixel_data_start),
      },
      _ => {
        let height = info_header.height.unsigned_abs() as usize;
        info_header.bytes_per_line().saturating_mul(height)
      }
    };
    let pixel_data = pixel_data_start
      .checked_add(pixel_data_len)
      .and_then(|end| bytes.get(pixel_data_start..end))
      .ok_or(BmpError::InsufficientBytes)?;

    Ok(Self { file_header, info_header, masks, color_table, pixel_data })
  }

  /// If this bitmap has a color table that its pixels index into.
  #[inline]
  #[must_use]
  pub const fn has_palette(&self) -> bool {
    self.info_header.is_indexed()
  }

  /// The color table entries as `[r, g, b]` bytes, 3 bytes per entry.
  ///
  /// Whatever alpha byte the entries have is dropped.
  pub fn palette_rgb(&self) -> Result<Vec<u8>, BmpError> {
    let entry_size = self.info_header.version.color_table_entry_size();
    let mut v = Vec::new();
    v.try_reserve_exact(self.color_table.len() / entry_size * 3)
      .map_err(|_| BmpError::AllocError)?;
    for entry in self.color_table.chunks_exact(entry_size) {
      let [b, g, r]: [u8; 3] = byte_array_at(entry, 0);
      v.extend_from_slice(&[r, g, b]);
    }
    Ok(v)
  }

  /// Decodes a direct color bitmap into `[r, g, b]` bytes, rows top to bottom.
  ///
  /// Any alpha channel is dropped.
  ///
  /// ## Failure
  /// * The image is indexed, or uses a compression other than none or
  ///   bitfields.
  pub fn pixels_rgb(&self) -> Result<Vec<u8>, BmpError> {
    match self.info_header.compression {
      BmpCompression::RgbNoCompression
      | BmpCompression::Bitfields
      | BmpCompression::AlphaBitfields => (),
      _ => return Err(BmpError::ParserIncomplete),
    }
    let bits_per_pixel = self.info_header.bits_per_pixel;
    let bytes_per_pixel = match bits_per_pixel {
      16 => 2,
      24 => 3,
      32 => 4,
      _ => return Err(BmpError::ParserIncomplete),
    };
    let width = self.info_header.width.unsigned_abs() as usize;
    let height = self.info_header.height.unsigned_abs() as usize;
    let bytes_per_line = self.info_header.bytes_per_line();
    if width == 0 || height == 0 {
      return Ok(Vec::new());
    }
    if self.pixel_data.len() != bytes_per_line.saturating_mul(height) {
      return Err(BmpError::PixelDataIllegalLength);
    }
    let no_padding_bytes_per_line = width * bytes_per_pixel;

    let mut v = Vec::new();
    v.try_reserve_exact(width.saturating_mul(height).saturating_mul(3))
      .map_err(|_| BmpError::AllocError)?;

    let [r_mask, g_mask, b_mask, _] = self.masks;
    let mut per_row_op = |i: &mut dyn Iterator<Item = &[u8]>| {
      for data_row in i {
        for px in data_row[..no_padding_bytes_per_line].chunks_exact(bytes_per_pixel) {
          let rgb = match px {
            [b, g, r] => [*r, *g, *b],
            [lo, hi] => {
              let u = u32::from(u16::from_le_bytes([*lo, *hi]));
              [channel(u, r_mask), channel(u, g_mask), channel(u, b_mask)]
            }
            _ => {
              let u = u32_le(byte_array_at(px, 0));
              [channel(u, r_mask), channel(u, g_mask), channel(u, b_mask)]
            }
          };
          v.extend_from_slice(&rgb);
        }
      }
    };
    if self.info_header.height < 0 {
      per_row_op(&mut self.pixel_data.chunks_exact(bytes_per_line));
    } else {
      per_row_op(&mut self.pixel_data.rchunks_exact(bytes_per_line));
    }
    Ok(v)
  }
}

/// Pulls the bits of `mask` out of `u` and rescales them to `0 ..= 255`.
#[inline]
#[must_use]
fn channel(u: u32, mask: u32) -> u8 {
  if mask == 0 {
    return 0;
  }
  let shift = mask.trailing_zeros();
  let max = u64::from(mask >> shift);
  let value = u64::from((u & mask) >> shift);
  (value * 255 / max) as u8
}

#[test]
fn test_channel_rescale() {
  assert_eq!(channel(0b11111 << 10, 0b11111 << 10), 255);
  assert_eq!(channel(0, 0b11111 << 10), 0);
  assert_eq!(channel(0x00AB_0000, 0xFF << 16), 0xAB);
  assert_eq!(channel(0xFFFF_FFFF, 0), 0);
  assert_eq!(channel(0xFFFF_FFFF, 0xFFFF_FFFF), 255);
}

#[test]
fn test_bytes_per_line_pads_to_four() {
  let h = BmpInfoHeader {
    version: BmpHeaderVersion::V1_40,
    width: 3,
    height: -2,
    bits_per_pixel: 24,
    compression: BmpCompression::RgbNoCompression,
    image_byte_size: None,
    palette_len: None,
    header_masks: None,
  };
  assert_eq!(h.bytes_per_line(), 12);
  assert_eq!(BmpInfoHeader { bits_per_pixel: 8, ..h }.bytes_per_line(), 4);
  assert_eq!(BmpInfoHeader { bits_per_pixel: 1, width: 33, ..h }.bytes_per_line(), 8);
  assert_eq!(BmpInfoHeader { bits_per_pixel: 8, ..h }.palette_len(), 256);
  assert_eq!(
    BmpInfoHeader { bits_per_pixel: 4, palette_len: NonZeroU32::new(3), ..h }.palette_len(),
    3
  );
  assert_eq!(h.palette_len(), 0);
}
