use std::fs::{self, File};
use std::io::Cursor as IoCursor;
use std::path::Path;

use ndarray::{Array2, Array3};
use ndarray_npy::NpzWriter;

use nld_data::{DataError, Dataset, MetadataTable, Session, fields};
use nld_render::{Cursor, ImageRenderer, TERMINAL_COLS, TERMINAL_ROWS};

const STEPS: usize = 3;

/// Arrays of a short session: the `@` walks right along row 5.
fn sample_arrays() -> (Array3<u8>, Array3<i8>, Array3<u8>, Array2<i16>) {
    let shape = (STEPS, TERMINAL_ROWS, TERMINAL_COLS);
    let mut chars = Array3::<u8>::from_elem(shape, b' ');
    let mut colors = Array3::<i8>::zeros(shape);
    let background = Array3::<u8>::zeros(shape);
    let mut cursor = Array2::<i16>::zeros((STEPS, 2));
    for t in 0..STEPS {
        chars[[t, 5, 10 + t]] = b'@';
        colors[[t, 5, 10 + t]] = 15;
        cursor[[t, 0]] = 5;
        cursor[[t, 1]] = (10 + t) as i16;
    }
    (chars, colors, background, cursor)
}

fn write_npz<W: std::io::Write + std::io::Seek>(writer: W, skip: Option<&str>, short_cursor: bool) {
    let (chars, colors, background, cursor) = sample_arrays();
    let mut npz = NpzWriter::new(writer);
    if skip != Some(fields::CHARS) {
        npz.add_array(fields::CHARS, &chars).unwrap();
    }
    if skip != Some(fields::COLORS) {
        npz.add_array(fields::COLORS, &colors).unwrap();
    }
    if skip != Some(fields::BACKGROUND) {
        npz.add_array(fields::BACKGROUND, &background).unwrap();
    }
    if skip != Some(fields::CURSOR) {
        if short_cursor {
            let short = cursor.slice(ndarray::s![..STEPS - 1, ..]).to_owned();
            npz.add_array(fields::CURSOR, &short).unwrap();
        } else {
            npz.add_array(fields::CURSOR, &cursor).unwrap();
        }
    }
    npz.finish().unwrap();
}

fn write_session_file(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    write_npz(File::create(path).unwrap(), None, false);
}

fn metadata_json(length: u64) -> String {
    format!(
        r#"{{
            "1001": {{
                "alignment": "neutral", "length": {length},
                "max_dungeon_number": 0, "min_dungeon_number": 0,
                "max_experience_level": 1, "min_experience_level": 1,
                "max_experience_points": 0, "min_experience_points": 0,
                "max_dungeon_level": 1, "min_dungeon_level": 1,
                "rank": 1, "role": "Caveman", "stamp": 1600000000, "username": "alice"
            }},
            "1002": {{
                "alignment": "lawful", "length": 10,
                "max_dungeon_number": 0, "min_dungeon_number": 0,
                "max_experience_level": 1, "min_experience_level": 1,
                "max_experience_points": 0, "min_experience_points": 0,
                "max_dungeon_level": 1, "min_dungeon_level": 1,
                "rank": 2, "role": "Priest", "stamp": 1600000100, "username": "bob"
            }}
        }}"#
    )
}

#[test]
fn test_load_session_from_memory() {
    let mut buf = IoCursor::new(Vec::new());
    write_npz(&mut buf, None, false);
    buf.set_position(0);

    let session = Session::from_reader(buf).unwrap();
    assert_eq!(session.len(), STEPS);
    assert_eq!(session.chars().shape()[0], session.colors().shape()[0]);
    assert_eq!(session.background().shape()[0], session.cursors().shape()[0]);
    assert_eq!(session.chars()[[1, 5, 11]], i32::from(b'@'));
    assert_eq!(session.cursor(2), Some(Cursor::new(5, 12)));

    let obs = session.observation(0).unwrap();
    assert_eq!(obs.colors()[[5, 10]], 15);
    assert!(obs.text().lines().nth(5).unwrap().ends_with('@'));
}

#[test]
fn test_unsigned_wide_dtypes() {
    let (chars, _, background, cursor) = sample_arrays();
    let mut colors = Array3::<u32>::zeros((STEPS, TERMINAL_ROWS, TERMINAL_COLS));
    colors[[0, 5, 10]] = 15;
    colors[[0, 0, 0]] = u32::MAX;
    let cursor = cursor.mapv(|v| v as u64);

    let mut buf = IoCursor::new(Vec::new());
    let mut npz = NpzWriter::new(&mut buf);
    npz.add_array(fields::CHARS, &chars).unwrap();
    npz.add_array(fields::COLORS, &colors).unwrap();
    npz.add_array(fields::BACKGROUND, &background).unwrap();
    npz.add_array(fields::CURSOR, &cursor).unwrap();
    npz.finish().unwrap();
    buf.set_position(0);

    let session = Session::from_reader(buf).unwrap();
    assert_eq!(session.colors()[[0, 5, 10]], 15);
    assert_eq!(session.colors()[[0, 0, 0]], i32::MAX);
    assert_eq!(session.cursor(1), Some(Cursor::new(5, 11)));
}

#[test]
fn test_missing_field() {
    let mut buf = IoCursor::new(Vec::new());
    write_npz(&mut buf, Some(fields::BACKGROUND), false);
    buf.set_position(0);

    match Session::from_reader(buf) {
        Err(DataError::MissingField(name)) => assert_eq!(name, fields::BACKGROUND),
        other => panic!("expected MissingField, got {other:?}"),
    }
}

#[test]
fn test_timestep_counts_must_agree() {
    let mut buf = IoCursor::new(Vec::new());
    write_npz(&mut buf, None, true);
    buf.set_position(0);

    assert!(matches!(
        Session::from_reader(buf),
        Err(DataError::TimestepMismatch { expected: STEPS, found, .. }) if found == STEPS - 1
    ));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        Session::load("/nonexistent/alice/1.npz"),
        Err(DataError::Open { .. })
    ));
}

#[test]
fn test_not_an_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.npz");
    fs::write(&path, b"definitely not a zip file").unwrap();
    assert!(matches!(Session::load(&path), Err(DataError::Npz(_))));
}

#[test]
fn test_dataset_layout() {
    let dir = tempfile::tempdir().unwrap();
    let metadata_path = dir.path().join("metadata.json");
    fs::write(&metadata_path, metadata_json(STEPS as u64)).unwrap();
    write_session_file(&dir.path().join("alice").join("1001.npz"));

    let dataset = Dataset::open(dir.path(), &metadata_path).unwrap();
    assert_eq!(
        dataset.session_path("1001").unwrap(),
        dir.path().join("alice").join("1001.npz")
    );

    let files = dataset.scan().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].username, "alice");
    assert_eq!(files[0].session_id, "1001");

    assert_eq!(dataset.missing_sessions(), vec!["1002"]);

    let (session, meta) = dataset.load_session("1001").unwrap();
    assert_eq!(session.len() as u64, meta.length);
    assert_eq!(meta.role, "Caveman");

    assert!(matches!(dataset.load_session("1002"), Err(DataError::Open { .. })));
    assert!(matches!(
        dataset.load_session("4242"),
        Err(DataError::UnknownSession(_))
    ));
}

#[test]
fn test_length_disagreement_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let metadata = MetadataTable::from_reader(metadata_json(999).as_bytes()).unwrap();
    write_session_file(&dir.path().join("alice").join("1001.npz"));

    let dataset = Dataset::new(dir.path(), metadata);
    let (session, meta) = dataset.load_session("1001").unwrap();
    assert_eq!(session.len(), STEPS);
    assert_eq!(meta.length, 999);
}

#[test]
fn test_every_step_renders() {
    let mut buf = IoCursor::new(Vec::new());
    write_npz(&mut buf, None, false);
    buf.set_position(0);
    let session = Session::from_reader(buf).unwrap();

    let renderer = ImageRenderer::new();
    let images: Vec<_> = session
        .observations()
        .map(|obs| renderer.render(&obs.unwrap()).unwrap())
        .collect();
    assert_eq!(images.len(), STEPS);
    // The @ moves, so consecutive frames differ
    assert_ne!(images[0].as_raw(), images[1].as_raw());
}
