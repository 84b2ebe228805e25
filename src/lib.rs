#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! A crate for loading color palettes and expanding indexed images.
//!
//! A palette is a table of `[r, g, b]` entries. Old game formats keep them in
//! a few different places:
//! * **LMP**: the whole file is the table, no header at all.
//! * **PCX**: the last 768 bytes of the file are a 256 entry table.
//! * **BMP**: either the color table of an indexed bitmap, or (for a
//!   true-color bitmap) the pixels themselves read as one long row of swatches.
//!
//! Once you have a [Palette] you can expand a buffer of `u8` indexes into RGBA
//! pixels with [Palette::expand] (or [PaletteTable::expand_into] if you've got
//! your own output buffer), which also gives you the average color of the
//! image and tells you if any pixel ended up transparent.
//!
//! ```
//! use palette_assets::{MemSource, Palette, TransparencyMode};
//!
//! let mut source = MemSource::new(&[10_u8, 20, 30, 200, 210, 220][..]);
//! let palette = Palette::load_lmp(&mut source).unwrap();
//! let (rgba, info) = palette.expand(&[0, 1, 0], 3, TransparencyMode::Opaque).unwrap();
//! assert_eq!(rgba, [10, 20, 30, 255, 200, 210, 220, 255, 10, 20, 30, 255]);
//! assert!(!info.had_transparency);
//! ```
//!
//! ## Features
//! * `std` (default): adds [DiskFileSystem] and `std::error::Error` impls.
//!   Without it the crate is `no_std` (but it always needs `alloc`).

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod parser_helpers;
pub(crate) use parser_helpers::*;

pub mod bmp;

mod error;
pub use error::*;

mod source;
pub use source::*;

mod fs;
pub use fs::*;

mod table;
pub use table::*;

mod palette;
pub use palette::*;

mod expand;
pub use expand::*;

/// The average color of an expanded image.
///
/// Channels are linear and normalized to `0.0 ..= 1.0`.
pub use pixel_formats::r32g32b32a32_Sfloat as Color;
