//! Session array files
//!
//! A session is stored as a numpy `.npz` archive holding four arrays that
//! share a leading timestep axis:
//!
//! | entry            | shape        |
//! |------------------|--------------|
//! | `tty_chars`      | `[T, 24, 80]`|
//! | `tty_colors`     | `[T, 24, 80]`|
//! | `tty_background` | `[T, 24, 80]`|
//! | `tty_cursor`     | `[T, 2]`     |
//!
//! Any integer dtype is accepted and converted to `i32`; values beyond the
//! `i32` range saturate.
//!
//! `tty_cursor[t]` is read as `(row, col)`. Some renderers built on the same
//! data index it as `(col, row)`, so check the orientation of other tooling
//! before mixing the two.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use ndarray::{Array2, Array3, ArrayD, Axis, Ix2, Ix3, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, ReadNpzError};

use nld_render::{Cursor, Observation, TERMINAL_COLS, TERMINAL_ROWS};

use crate::error::DataError;

/// Entry names inside a session archive.
pub mod fields {
    pub const CHARS: &str = "tty_chars";
    pub const COLORS: &str = "tty_colors";
    pub const BACKGROUND: &str = "tty_background";
    pub const CURSOR: &str = "tty_cursor";

    pub const ALL: [&str; 4] = [CHARS, COLORS, BACKGROUND, CURSOR];
}

/// All timesteps of one recorded session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    chars: Array3<i32>,
    colors: Array3<i32>,
    background: Array3<i32>,
    cursor: Array2<i32>,
}

impl Session {
    /// Load a session archive from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let _span = tracing::debug_span!("load_session", path = %path.display()).entered();
        let file = File::open(path).map_err(|source| DataError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Read a session archive from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DataError> {
        let mut npz = NpzReader::new(reader)?;
        let names = npz.names()?;

        let chars = read_entry(&mut npz, &names, fields::CHARS)?;
        let colors = read_entry(&mut npz, &names, fields::COLORS)?;
        let background = read_entry(&mut npz, &names, fields::BACKGROUND)?;
        let cursor = read_entry(&mut npz, &names, fields::CURSOR)?;

        let session = Self::from_arrays(
            into_grids(fields::CHARS, chars)?,
            into_grids(fields::COLORS, colors)?,
            into_grids(fields::BACKGROUND, background)?,
            into_cursors(cursor)?,
        )?;
        tracing::debug!(steps = session.len(), "session loaded");
        Ok(session)
    }

    /// Assemble a session from arrays already in memory, checking that all
    /// four agree on the number of timesteps.
    pub fn from_arrays(
        chars: Array3<i32>,
        colors: Array3<i32>,
        background: Array3<i32>,
        cursor: Array2<i32>,
    ) -> Result<Self, DataError> {
        let steps = chars.len_of(Axis(0));
        let counts = [
            (fields::COLORS, colors.len_of(Axis(0))),
            (fields::BACKGROUND, background.len_of(Axis(0))),
            (fields::CURSOR, cursor.len_of(Axis(0))),
        ];
        if let Some((field, found)) = counts.into_iter().find(|(_, n)| *n != steps) {
            return Err(DataError::TimestepMismatch {
                field: field.to_string(),
                expected: steps,
                found,
            });
        }
        check_grid_shape(fields::CHARS, chars.shape())?;
        check_grid_shape(fields::COLORS, colors.shape())?;
        check_grid_shape(fields::BACKGROUND, background.shape())?;
        check_cursor_shape(cursor.shape())?;

        Ok(Self {
            chars,
            colors,
            background,
            cursor,
        })
    }

    /// Number of timesteps.
    pub fn len(&self) -> usize {
        self.chars.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn chars(&self) -> &Array3<i32> {
        &self.chars
    }

    pub fn colors(&self) -> &Array3<i32> {
        &self.colors
    }

    pub fn background(&self) -> &Array3<i32> {
        &self.background
    }

    pub fn cursors(&self) -> &Array2<i32> {
        &self.cursor
    }

    /// Cursor at timestep `step`, stored as `(row, col)`.
    pub fn cursor(&self, step: usize) -> Option<Cursor> {
        (step < self.len()).then(|| Cursor::new(self.cursor[[step, 0]], self.cursor[[step, 1]]))
    }

    /// The observation at timestep `step`.
    pub fn observation(&self, step: usize) -> Result<Observation, DataError> {
        let cursor = self.cursor(step).ok_or(DataError::StepOutOfRange {
            step,
            len: self.len(),
        })?;
        let frame = |grids: &Array3<i32>| grids.index_axis(Axis(0), step).to_owned();
        Ok(Observation::new(
            frame(&self.chars),
            frame(&self.colors),
            frame(&self.background),
            cursor,
        )?)
    }

    /// Observations in timestep order.
    pub fn observations(&self) -> impl Iterator<Item = Result<Observation, DataError>> + '_ {
        (0..self.len()).map(|step| self.observation(step))
    }
}

/// Find `key` among the archive entries, with or without the `.npy` suffix.
fn resolve_entry<'a>(names: &'a [String], key: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|name| name.trim_end_matches(".npy") == key)
        .map(String::as_str)
}

fn read_entry<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    names: &[String],
    key: &str,
) -> Result<ArrayD<i32>, DataError> {
    let entry = resolve_entry(names, key).ok_or_else(|| DataError::MissingField(key.to_string()))?;
    Ok(read_widened(npz, entry)?)
}

/// Read an integer array of any width as `i32`. Values beyond the `i32` range
/// saturate.
fn read_widened<R: Read + Seek>(
    npz: &mut NpzReader<R>,
    entry: &str,
) -> Result<ArrayD<i32>, ReadNpzError> {
    if let Ok(a) = npz.by_name::<OwnedRepr<u8>, IxDyn>(entry) {
        return Ok(a.mapv(i32::from));
    }
    if let Ok(a) = npz.by_name::<OwnedRepr<i8>, IxDyn>(entry) {
        return Ok(a.mapv(i32::from));
    }
    if let Ok(a) = npz.by_name::<OwnedRepr<i16>, IxDyn>(entry) {
        return Ok(a.mapv(i32::from));
    }
    if let Ok(a) = npz.by_name::<OwnedRepr<u16>, IxDyn>(entry) {
        return Ok(a.mapv(i32::from));
    }
    if let Ok(a) = npz.by_name::<OwnedRepr<i32>, IxDyn>(entry) {
        return Ok(a);
    }
    if let Ok(a) = npz.by_name::<OwnedRepr<u32>, IxDyn>(entry) {
        return Ok(a.mapv(|v| i32::try_from(v).unwrap_or(i32::MAX)));
    }
    if let Ok(a) = npz.by_name::<OwnedRepr<u64>, IxDyn>(entry) {
        return Ok(a.mapv(|v| i32::try_from(v).unwrap_or(i32::MAX)));
    }
    npz.by_name::<OwnedRepr<i64>, IxDyn>(entry)
        .map(|a| a.mapv(|v| v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32))
}

fn grid_shape_error(field: &str, found: &[usize]) -> DataError {
    DataError::ShapeMismatch {
        field: field.to_string(),
        expected: format!("[T, {TERMINAL_ROWS}, {TERMINAL_COLS}]"),
        found: found.to_vec(),
    }
}

fn cursor_shape_error(found: &[usize]) -> DataError {
    DataError::ShapeMismatch {
        field: fields::CURSOR.to_string(),
        expected: "[T, 2]".to_string(),
        found: found.to_vec(),
    }
}

fn check_grid_shape(field: &str, shape: &[usize]) -> Result<(), DataError> {
    match shape {
        [_, TERMINAL_ROWS, TERMINAL_COLS] => Ok(()),
        _ => Err(grid_shape_error(field, shape)),
    }
}

fn check_cursor_shape(shape: &[usize]) -> Result<(), DataError> {
    match shape {
        [_, 2] => Ok(()),
        _ => Err(cursor_shape_error(shape)),
    }
}

fn into_grids(field: &str, array: ArrayD<i32>) -> Result<Array3<i32>, DataError> {
    check_grid_shape(field, array.shape())?;
    let shape = array.shape().to_vec();
    array
        .into_dimensionality::<Ix3>()
        .map_err(|_| grid_shape_error(field, &shape))
}

fn into_cursors(array: ArrayD<i32>) -> Result<Array2<i32>, DataError> {
    check_cursor_shape(array.shape())?;
    let shape = array.shape().to_vec();
    array
        .into_dimensionality::<Ix2>()
        .map_err(|_| cursor_shape_error(&shape))
}
