#![forbid(unsafe_code)]

//! Just has shorthands for the little-endian int parsing that BMP wants.

use core::num::NonZeroU32;

#[inline]
#[must_use]
pub fn u16_le(bytes: [u8; 2]) -> u16 {
  u16::from_le_bytes(bytes)
}

#[inline]
#[must_use]
pub fn u32_le(bytes: [u8; 4]) -> u32 {
  u32::from_le_bytes(bytes)
}

#[inline]
#[must_use]
pub fn i32_le(bytes: [u8; 4]) -> i32 {
  i32::from_le_bytes(bytes)
}

#[inline]
#[must_use]
pub fn onz_u32_le(bytes: [u8; 4]) -> Option<NonZeroU32> {
  NonZeroU32::new(u32_le(bytes))
}

/// Copies `N` bytes starting at `start` out of `bytes`.
///
/// The caller has already checked the length, so a short slice just gives
/// zeroes rather than panicking.
#[inline]
#[must_use]
pub fn byte_array_at<const N: usize>(bytes: &[u8], start: usize) -> [u8; N] {
  let mut a = [0_u8; N];
  if let Some(src) = bytes.get(start..start.saturating_add(N)) {
    a.copy_from_slice(src);
  }
  a
}

pub fn try_split_off_byte_array<const N: usize>(bytes: &[u8]) -> Option<([u8; N], &[u8])> {
  if bytes.len() >= N {
    let (head, tail) = bytes.split_at(N);
    Some((byte_array_at::<N>(head, 0), tail))
  } else {
    None
  }
}

#[test]
fn test_try_split_off_byte_array() {
  let bytes = [1_u8, 2, 3, 4, 5];
  assert_eq!(try_split_off_byte_array::<2>(&bytes), Some(([1, 2], &bytes[2..])));
  assert_eq!(try_split_off_byte_array::<5>(&bytes), Some(([1, 2, 3, 4, 5], &bytes[5..])));
  assert_eq!(try_split_off_byte_array::<6>(&bytes), None);
  assert_eq!(byte_array_at::<4>(&bytes, 3), [0, 0, 0, 0]);
  assert_eq!(u32_le(byte_array_at::<4>(&bytes, 1)), 0x0504_0302);
}
