//! Output files
//!
//! Every produced record is written as `<key>.gen.csv`, `<key>.gen.xlsx`,
//! `<key>.gen.json` and `<key>.gen.pickle`. After a batch the per-paper
//! files are read back and merged into `merged.*`.

mod csv;
mod json;
mod pickle;
mod xlsx;

pub use self::csv::{read_csv, write_csv};
pub use self::json::{write_json, write_json_array};
pub use self::pickle::{write_pickle, write_pickle_list};
pub use self::xlsx::write_xlsx;

use crate::error::Result;
use std::io::ErrorKind;
use crate::record::{Record, Table};
use std::path::{Path, PathBuf};

/// Extensions of the per-paper outputs, in write order
///
/// The CSV doubles as the "already processed" marker, so it goes last.
pub const OUTPUT_EXTENSIONS: [&str; 4] = ["xlsx", "json", "pickle", "csv"];

/// Base name of the merged outputs
pub const MERGED_STEM: &str = "merged";

/// Path of a per-paper output, e.g. `out/<key>.gen.csv`
pub fn generated_path(out_dir: &Path, key: &str, extension: &str) -> PathBuf {
    out_dir.join(format!("{}.gen.{}", key, extension))
}

/// Path of a merged output, e.g. `out/merged.csv`
pub fn merged_path(out_dir: &Path, extension: &str) -> PathBuf {
    out_dir.join(format!("{}.{}", MERGED_STEM, extension))
}

/// Write the four per-paper files of a record
///
/// On failure every `<key>.gen.*` file written so far is removed, so a
/// later run processes the document again instead of skipping it.
pub fn write_document(out_dir: &Path, record: &Record) -> Result<()> {
    if let Err(e) = write_outputs(out_dir, record) {
        remove_outputs(out_dir, &record.key);
        return Err(e);
    }

    tracing::debug!(key = %record.key, out_dir = %out_dir.display(), "Wrote document outputs");
    Ok(())
}

fn write_outputs(out_dir: &Path, record: &Record) -> Result<()> {
    let structured = record.to_json();
    write_xlsx(&record.table, &generated_path(out_dir, &record.key, "xlsx"))?;
    write_json(&structured, &generated_path(out_dir, &record.key, "json"))?;
    write_pickle(&structured, &generated_path(out_dir, &record.key, "pickle"))?;
    write_csv(&record.table, &generated_path(out_dir, &record.key, "csv"))
}

/// Delete the per-paper outputs of `key`; missing files are fine
fn remove_outputs(out_dir: &Path, key: &str) {
    for extension in OUTPUT_EXTENSIONS {
        let path = generated_path(out_dir, key, extension);
        if !path.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial output");
            }
        }
    }
}

/// Merge the per-paper outputs of `keys` into `merged.*`
///
/// Reads the files back from disk instead of holding every record in
/// memory for the whole run.
pub fn merge_outputs(out_dir: &Path, keys: &[String]) -> Result<()> {
    let paths = |extension: &str| -> Vec<PathBuf> {
        keys.iter()
            .map(|key| generated_path(out_dir, key, extension))
            .collect()
    };

    let json_paths = paths("json");
    let json_refs: Vec<&Path> = json_paths.iter().map(PathBuf::as_path).collect();
    write_json_array(&json_refs, &merged_path(out_dir, "json"))?;

    let mut tables = Vec::with_capacity(keys.len());
    for path in paths("csv") {
        tables.push(read_csv(&path)?);
    }
    let merged = Table::concat(&tables);
    write_csv(&merged, &merged_path(out_dir, "csv"))?;
    write_xlsx(&merged, &merged_path(out_dir, "xlsx"))?;

    let pickle_paths = paths("pickle");
    let pickle_refs: Vec<&Path> = pickle_paths.iter().map(PathBuf::as_path).collect();
    write_pickle_list(&pickle_refs, &merged_path(out_dir, "pickle"))?;

    tracing::info!(documents = keys.len(), out_dir = %out_dir.display(), "Merged outputs written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::FieldTarget;
    use crate::record::Cell;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(key: &str, title: &str) -> Record {
        let mut record = Record::new(key);
        record
            .store("title", FieldTarget::Single("title"), json!(title))
            .unwrap();
        record
    }

    #[test]
    fn test_generated_paths() {
        let out = Path::new("/tmp/out");
        assert_eq!(generated_path(out, "p1", "csv"), PathBuf::from("/tmp/out/p1.gen.csv"));
        assert_eq!(merged_path(out, "pickle"), PathBuf::from("/tmp/out/merged.pickle"));
    }

    #[test]
    fn test_write_document_creates_all_files() {
        let dir = TempDir::new().unwrap();
        write_document(dir.path(), &record("p1", "First")).unwrap();

        for extension in OUTPUT_EXTENSIONS {
            assert!(generated_path(dir.path(), "p1", extension).is_file());
        }
    }

    #[test]
    fn test_failed_write_leaves_no_outputs() {
        let dir = TempDir::new().unwrap();
        // a directory where the JSON file should go makes that write fail
        std::fs::create_dir(generated_path(dir.path(), "p1", "json")).unwrap();

        assert!(write_document(dir.path(), &record("p1", "First")).is_err());
        assert!(!generated_path(dir.path(), "p1", "csv").exists());
        assert!(!generated_path(dir.path(), "p1", "xlsx").exists());
        assert!(!generated_path(dir.path(), "p1", "pickle").exists());
    }

    #[test]
    fn test_merge_outputs() {
        let dir = TempDir::new().unwrap();
        let mut second = record("p2", "Second");
        second
            .store("authors", FieldTarget::Single("authors"), json!(["Ana Kovač"]))
            .unwrap();

        write_document(dir.path(), &record("p1", "First")).unwrap();
        write_document(dir.path(), &second).unwrap();
        merge_outputs(dir.path(), &["p1".to_string(), "p2".to_string()]).unwrap();

        let merged = read_csv(&merged_path(dir.path(), "csv")).unwrap();
        assert_eq!(merged.columns(), ["title", "authors.length", "authors.0"]);
        assert_eq!(merged.get("p2", "authors.0"), Some(&Cell::Text("Ana Kovač".into())));
        assert_eq!(merged.get("p1", "authors.length"), None);

        let json_text = std::fs::read_to_string(merged_path(dir.path(), "json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json_text).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));

        assert!(merged_path(dir.path(), "xlsx").is_file());
        assert!(merged_path(dir.path(), "pickle").is_file());
    }
}
