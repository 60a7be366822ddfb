use crate::error::Result;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub fn write_json(value: &Value, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// Concatenate already serialized JSON documents into one array
///
/// The documents are copied verbatim, so the merged file holds exactly
/// what the per-paper files hold.
pub fn write_json_array(documents: &[&Path], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(b"[")?;
    for (i, document) in documents.iter().enumerate() {
        if i > 0 {
            writer.write_all(b", ")?;
        }
        let contents = std::fs::read(document)?;
        writer.write_all(&contents)?;
    }
    writer.write_all(b"]")?;
    writer.flush()?;
    Ok(())
}
