use mockall::{mock, predicate::eq};
use palette_assets::{
  AssetErrorKind, ByteSource, DiskFileSystem, FileSystem, FileSystemError, MemSource,
  MemoryFileSystem, Palette, PaletteError, PaletteFormat,
};
use walkdir::WalkDir;

mock! {
  pub Fs {}
  impl FileSystem for Fs {
    type Source = MemSource<Vec<u8>>;
    fn open_file(&self, path: &str) -> Result<MemSource<Vec<u8>>, FileSystemError>;
  }
}

fn table_bytes(p: &Palette) -> Vec<u8> {
  p.table().unwrap().as_bytes().to_vec()
}

#[test]
fn test_lmp_entry_count_is_len_div_3() {
  super::init_logger();
  for k in 1..=16 {
    let bytes = super::rand_bytes(k * 3);
    let p = Palette::load_lmp(&mut MemSource::new(&bytes)).unwrap();
    let t = p.table().unwrap();
    assert_eq!(t.entry_count(), k);
    assert_eq!(t.as_bytes(), bytes.as_slice());
  }
}

#[test]
fn test_lmp_reads_from_cursor_to_end() {
  let mut source = MemSource::new(vec![9_u8, 9, 1, 2, 3]);
  source.seek_from_start(2).unwrap();
  let p = Palette::load_lmp(&mut source).unwrap();
  assert_eq!(table_bytes(&p), [1, 2, 3]);
  assert_eq!(source.remaining(), 0);
}

#[test]
fn test_empty_sources_are_empty_palettes() {
  let empty: &[u8] = &[];
  assert_eq!(Palette::load_lmp(&mut MemSource::new(empty)), Err(PaletteError::EmptyPalette));
  assert_eq!(Palette::from_raw(&mut MemSource::new(empty)), Err(PaletteError::EmptyPalette));
}

#[test]
fn test_from_raw_matches_lmp() {
  let bytes = super::rand_bytes(300);
  let a = Palette::load_lmp(&mut MemSource::new(&bytes)).unwrap();
  let b = Palette::from_raw(&mut MemSource::new(&bytes)).unwrap();
  assert_eq!(a, b);
}

#[test]
fn test_pcx_shorter_than_768_fails() {
  for len in [0, 1, 3, 500, 767] {
    let bytes = super::rand_bytes(len);
    let mut source = MemSource::new(&bytes);
    let err = Palette::load_pcx(&mut source).unwrap_err();
    assert!(matches!(err, PaletteError::OutOfBounds { .. }), "len {len}: {err:?}");
    assert_eq!(source.position(), 0);
  }
}

#[test]
fn test_pcx_takes_the_last_768_bytes() {
  for len in [768, 769, 800, 4096] {
    let bytes = super::rand_bytes(len);
    let p = Palette::load_pcx(&mut MemSource::new(&bytes)).unwrap();
    assert_eq!(table_bytes(&p), &bytes[len - 768..], "len {len}");
  }
}

#[test]
fn test_pcx_800_bytes_with_black_palette() {
  let mut bytes = vec![0xAB_u8; 32];
  bytes.extend_from_slice(&[0; 768]);
  assert_eq!(bytes.len(), 800);
  let p = Palette::load_pcx(&mut MemSource::new(&bytes)).unwrap();
  let t = p.table().unwrap();
  assert_eq!(t.entry_count(), 256);
  assert!(t.entries().iter().all(|e| *e == [0, 0, 0]));
}

#[test]
fn test_load_file_dispatches_on_extension() {
  super::init_logger();
  let mut pcx = vec![0x0A_u8; 10];
  pcx.extend((0..768).map(|i| (i % 256) as u8));
  let fs = MemoryFileSystem::new()
    .with_file("gfx/palette.LMP", [1_u8, 2, 3, 4, 5, 6])
    .with_file("gfx/colormap.Pcx", pcx.clone());

  let lmp = Palette::load_file(&fs, "gfx/palette.LMP").unwrap();
  assert_eq!(table_bytes(&lmp), [1, 2, 3, 4, 5, 6]);

  let p = Palette::load_file(&fs, "gfx/colormap.Pcx").unwrap();
  assert_eq!(table_bytes(&p), &pcx[10..]);
}

#[test]
fn test_unknown_extension_never_opens_the_file() {
  super::init_logger();
  let mut fs = MockFs::new();
  fs.expect_open_file().never();

  for path in ["palette.pal", "palette", "gfx/palette.lmp.bak"] {
    let err = Palette::load_file(&fs, path).unwrap_err();
    assert_eq!(err.kind(), &AssetErrorKind::UnknownFormat);
    assert_eq!(err.path(), path);
  }
}

#[test]
fn test_known_extension_opens_the_file_once() {
  let mut fs = MockFs::new();
  fs.expect_open_file()
    .with(eq("pal.lmp"))
    .times(1)
    .returning(|_| Ok(MemSource::new(vec![4, 5, 6])));
  let p = Palette::load_file(&fs, "pal.lmp").unwrap();
  assert_eq!(table_bytes(&p), [4, 5, 6]);
}

#[test]
fn test_file_system_errors_are_wrapped_with_the_path() {
  let mut fs = MockFs::new();
  fs.expect_open_file().returning(|path| {
    Err(FileSystemError::Io { path: path.to_string(), message: "disk on fire".to_string() })
  });
  let err = Palette::load_file(&fs, "gfx/palette.bmp").unwrap_err();
  assert_eq!(err.path(), "gfx/palette.bmp");
  assert_eq!(
    err.kind(),
    &AssetErrorKind::FileSystem(FileSystemError::Io {
      path: "gfx/palette.bmp".to_string(),
      message: "disk on fire".to_string(),
    })
  );
  let message = err.to_string();
  assert!(message.contains("gfx/palette.bmp"), "{message}");
  assert!(message.contains("disk on fire"), "{message}");
  assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_decode_errors_are_wrapped_with_the_path() {
  let fs = MemoryFileSystem::new()
    .with_file("empty.lmp", Vec::new())
    .with_file("short.pcx", vec![0_u8; 100]);

  let err = Palette::load_file(&fs, "empty.lmp").unwrap_err();
  assert_eq!(err.path(), "empty.lmp");
  assert_eq!(err.kind(), &AssetErrorKind::Palette(PaletteError::EmptyPalette));

  let err = Palette::load_file(&fs, "short.pcx").unwrap_err();
  assert!(matches!(err.kind(), AssetErrorKind::Palette(PaletteError::OutOfBounds { .. })));

  let err = Palette::load_file(&fs, "missing.bmp").unwrap_err();
  assert_eq!(
    err.kind(),
    &AssetErrorKind::FileSystem(FileSystemError::NotFound { path: "missing.bmp".to_string() })
  );
}

#[test]
fn test_disk_file_system_fixtures() {
  super::init_logger();
  let fs = DiskFileSystem::new("tests/data");
  let expected = super::data_palette();

  let lmp = Palette::load_file(&fs, "palette.lmp").unwrap();
  assert_eq!(table_bytes(&lmp), expected);

  let pcx = Palette::load_file(&fs, "image.pcx").unwrap();
  assert_eq!(table_bytes(&pcx), expected);

  let bmp = Palette::load_file(&fs, "indexed8.bmp").unwrap();
  assert_eq!(table_bytes(&bmp), expected);

  let err = Palette::load_file(&fs, "nope.lmp").unwrap_err();
  assert_eq!(
    err.kind(),
    &AssetErrorKind::FileSystem(FileSystemError::NotFound { path: "nope.lmp".to_string() })
  );
}

#[test]
fn test_loaders_do_not_panic() {
  // iter ALL files in the test folder, even non-palette files shouldn't panic.
  for entry in WalkDir::new("tests/").into_iter().filter_map(|e| e.ok()) {
    if entry.file_type().is_dir() {
      continue;
    }
    println!("{}", entry.path().display());
    let v = match std::fs::read(entry.path()) {
      Ok(v) => v,
      Err(e) => {
        println!("Error reading file: {e:?}");
        continue;
      }
    };
    let _ = Palette::load_lmp(&mut MemSource::new(&v));
    let _ = Palette::load_pcx(&mut MemSource::new(&v));
    let _ = Palette::load_bmp(&mut MemSource::new(&v));
    let path = entry.path().to_string_lossy();
    let _ = Palette::load_file(&DiskFileSystem::new("."), &path);
    let _ = PaletteFormat::from_path(&path);
  }
  // even totally random data should never panic a loader!
  for len in [0, 1, 14, 54, 767, 768, 1024] {
    let v = super::rand_bytes(len);
    let _ = Palette::load_pcx(&mut MemSource::new(&v));
    let _ = Palette::load_bmp(&mut MemSource::new(&v));
  }
}
