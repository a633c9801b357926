//! Persist grouped views as CSV.
//!
//! Layout mirrors a spreadsheet with a row index:
//!
//! ```text
//! ,Crops,States
//! 0,Corn,"Iowa,Nebraska"
//! 1,Wheat,Iowa
//! ```
//!
//! Output is always comma-delimited UTF-8; fields are quoted only when needed.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{WriteError, WriteResult};
use crate::models::GroupRow;

/// Write `groups` to any writer. Returns the number of data rows.
pub fn write_groups<G: GroupRow, W: Write>(groups: &[G], writer: W) -> Result<usize, csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(["", G::KEY_COLUMN, G::VALUES_COLUMN])?;
    for (index, group) in groups.iter().enumerate() {
        wtr.write_record([index.to_string().as_str(), group.key(), group.joined()])?;
    }
    wtr.flush()?;

    Ok(groups.len())
}

/// Render `groups` to a string, as [`persist`] would write them.
pub fn to_csv_string<G: GroupRow>(groups: &[G]) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    write_groups(groups, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Create or overwrite `path` with `groups`.
///
/// Parent directories must already exist.
pub fn persist<G: GroupRow>(groups: &[G], path: impl AsRef<Path>) -> WriteResult<usize> {
    let path = path.as_ref();
    let mut file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let rows = write_groups(groups, &mut file).map_err(|source| WriteError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    file.sync_all().map_err(|source| WriteError::Flush {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CropGroup, StateGroup};

    fn crop_groups() -> Vec<CropGroup> {
        vec![
            CropGroup { crop: "Corn".into(), states: "Iowa,Nebraska".into() },
            CropGroup { crop: "Wheat".into(), states: "Iowa".into() },
        ]
    }

    #[test]
    fn test_index_and_quoting() {
        let csv = to_csv_string(&crop_groups()).unwrap();
        assert_eq!(csv, ",Crops,States\n0,Corn,\"Iowa,Nebraska\"\n1,Wheat,Iowa\n");
    }

    #[test]
    fn test_state_view_columns() {
        let groups = vec![StateGroup { state: "Iowa".into(), crops: "Corn,Wheat".into() }];
        let csv = to_csv_string(&groups).unwrap();
        assert!(csv.starts_with(",States,Crops\n"));
    }

    #[test]
    fn test_empty_key_written_as_empty_field() {
        let groups = vec![CropGroup { crop: "".into(), states: "Ohio".into() }];
        let csv = to_csv_string(&groups).unwrap();
        assert_eq!(csv.lines().nth(1), Some("0,,Ohio"));
    }

    #[test]
    fn test_persist_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("by crops.csv");

        let rows = persist(&crop_groups(), &path).unwrap();
        assert_eq!(rows, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&records[0][2], "Iowa,Nebraska");
        assert_eq!(&records[1][1], "Wheat");
    }

    #[test]
    fn test_persist_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "stale content that is longer than the new file\n".repeat(10))
            .unwrap();

        persist(&crop_groups()[1..], &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), ",Crops,States\n0,Wheat,Iowa\n");
    }

    #[test]
    fn test_persist_missing_parent_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        let err = persist(&crop_groups(), &path).unwrap_err();
        assert!(matches!(err, WriteError::Create { .. }));
        assert_eq!(err.path(), path.as_path());
    }
}
