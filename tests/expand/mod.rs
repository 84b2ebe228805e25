use palette_assets::{
  ByteSource, ExpandError, MemSource, Palette, PaletteError, PaletteTable, TransparencyMode,
};

fn full_table() -> PaletteTable {
  PaletteTable::new(super::data_palette()).unwrap()
}

fn close(a: f32, b: f32) -> bool {
  (a - b).abs() < 1e-6
}

#[test]
fn test_lmp_then_expand() {
  let mut source = MemSource::new(vec![10_u8, 20, 30, 200, 210, 220]);
  let palette = Palette::load_lmp(&mut source).unwrap();
  assert_eq!(palette.table().unwrap().len(), 6);

  let (rgba, info) = palette.expand(&[0, 1, 0], 3, TransparencyMode::Opaque).unwrap();
  assert_eq!(rgba, [10, 20, 30, 255, 200, 210, 220, 255, 10, 20, 30, 255]);
  assert!(!info.had_transparency);
}

#[test]
fn test_opaque_never_reports_transparency() {
  let t = full_table();
  let indexed = [255, 0, 255, 17, 255];
  let (rgba, info) = t.expand(&indexed, indexed.len(), TransparencyMode::Opaque).unwrap();
  assert!(!info.had_transparency);
  assert!(rgba.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn test_index_255_transparency() {
  let t = full_table();
  let mode = TransparencyMode::Index255Transparent;

  let indexed = [3, 255, 7, 255];
  let (rgba, info) = t.expand(&indexed, 4, mode).unwrap();
  assert!(info.had_transparency);
  for (px, index) in rgba.chunks_exact(4).zip(indexed) {
    let expected_alpha = if index == 255 { 0 } else { 255 };
    assert_eq!(px[3], expected_alpha, "index {index}");
    // the color is still copied for transparent pixels
    assert_eq!(&px[..3], &t.get(index).unwrap());
  }

  let (rgba, info) = t.expand(&[0, 1, 254], 3, mode).unwrap();
  assert!(!info.had_transparency);
  assert!(rgba.chunks_exact(4).all(|px| px[3] == 255));

  // an index 255 past pixel_count doesn't count
  let (_, info) = t.expand(&[0, 1, 255], 2, mode).unwrap();
  assert!(!info.had_transparency);
}

#[test]
fn test_uniform_image_average_is_the_entry() {
  let t = full_table();
  for index in [0_u8, 1, 100, 254, 255] {
    for mode in [TransparencyMode::Opaque, TransparencyMode::Index255Transparent] {
      let indexed = vec![index; 37];
      let (_, info) = t.expand(&indexed, indexed.len(), mode).unwrap();
      let [r, g, b] = t.get(index).unwrap();
      let c = info.average_color;
      assert!(close(c.r, r as f32 / 255.0), "{index}: {c:?}");
      assert!(close(c.g, g as f32 / 255.0), "{index}: {c:?}");
      assert!(close(c.b, b as f32 / 255.0), "{index}: {c:?}");
      assert_eq!(c.a, 1.0);
    }
  }
}

#[test]
fn test_average_of_black_and_white() {
  let t = PaletteTable::new(vec![0, 0, 0, 255, 255, 255]).unwrap();
  let (_, info) = t.expand(&[0, 1, 1, 0], 4, TransparencyMode::Opaque).unwrap();
  let c = info.average_color;
  assert!(close(c.r, 0.5) && close(c.g, 0.5) && close(c.b, 0.5), "{c:?}");
  assert_eq!(c.a, 1.0);
}

#[test]
fn test_zero_pixels() {
  let t = full_table();
  let (rgba, info) = t.expand(&[], 0, TransparencyMode::Index255Transparent).unwrap();
  assert!(rgba.is_empty());
  assert!(!info.had_transparency);
  let c = info.average_color;
  assert_eq!((c.r, c.g, c.b, c.a), (0.0, 0.0, 0.0, 1.0));
}

#[test]
fn test_index_past_the_table_is_an_error() {
  let palette = Palette::from_bytes(vec![1, 2, 3, 4, 5, 6, 7]).unwrap();
  assert_eq!(
    palette.expand(&[0, 1, 2], 3, TransparencyMode::Opaque).unwrap_err(),
    ExpandError::IndexOutOfRange { index: 2, entry_count: 2 }
  );
  // but it's fine if the bad index isn't part of the image
  assert!(palette.expand(&[0, 1, 2], 2, TransparencyMode::Opaque).is_ok());
}

#[test]
fn test_expand_into_leaves_extra_output_alone() {
  let t = PaletteTable::new(vec![9, 8, 7]).unwrap();
  let mut rgba = [1_u8; 10];
  t.expand_into(&[0, 0], 2, &mut rgba, TransparencyMode::Opaque).unwrap();
  assert_eq!(rgba, [9, 8, 7, 255, 9, 8, 7, 255, 1, 1]);
}

#[test]
fn test_uninitialized_palette_cannot_expand() {
  let p = Palette::default();
  let mut rgba = [0_u8; 4];
  assert_eq!(
    p.expand_into(&[0], 1, &mut rgba, TransparencyMode::Opaque).unwrap_err(),
    ExpandError::Uninitialized
  );
  let mut source = MemSource::new(&[0_u8, 1][..]);
  assert_eq!(
    p.expand_from_source(&mut source, 1, TransparencyMode::Opaque).unwrap_err(),
    ExpandError::Uninitialized
  );
  assert_eq!(source.position(), 0);
}

#[test]
fn test_expand_from_source_moves_the_cursor() {
  let palette = Palette::from(full_table());
  let mut source = MemSource::new(vec![1_u8, 2, 3, 4, 5]);

  let (rgba, _) = palette.expand_from_source(&mut source, 2, TransparencyMode::Opaque).unwrap();
  assert_eq!(rgba.len(), 8);
  assert_eq!(&rgba[..3], &[1, 254, 0]);
  assert_eq!(source.position(), 2);

  let err = palette.expand_from_source(&mut source, 4, TransparencyMode::Opaque).unwrap_err();
  assert!(matches!(err, ExpandError::Source(PaletteError::OutOfBounds { .. })), "{err:?}");
  assert_eq!(source.position(), 2);

  let (rgba, _) = palette.expand_from_source(&mut source, 3, TransparencyMode::Opaque).unwrap();
  assert_eq!(&rgba[8..11], &[5, 250, 2]);
  assert_eq!(source.remaining(), 0);
}

#[test]
fn test_tables_are_shared_across_threads() {
  let t = full_table();
  let images: Vec<Vec<u8>> = (0..4).map(|_| super::rand_bytes(4096)).collect();
  std::thread::scope(|s| {
    let handles: Vec<_> = images
      .iter()
      .map(|img| {
        let t = t.clone();
        s.spawn(move || t.expand(img, img.len(), TransparencyMode::Index255Transparent).unwrap())
      })
      .collect();
    for (h, img) in handles.into_iter().zip(&images) {
      let (rgba, info) = h.join().unwrap();
      assert_eq!(rgba.len(), img.len() * 4);
      assert_eq!(info.had_transparency, img.contains(&255));
    }
  });
}
