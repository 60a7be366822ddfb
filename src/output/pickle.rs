use crate::error::Result;
use serde_json::Value;
use serde_pickle::{DeOptions, SerOptions};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Pickle a structured record as a dict with string keys
pub fn write_pickle(value: &Value, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_pickle::to_writer(&mut writer, value, SerOptions::new())?;
    writer.flush()?;
    Ok(())
}

/// Load pickled documents and pickle them again as one list
pub fn write_pickle_list(documents: &[&Path], path: &Path) -> Result<()> {
    let mut values = Vec::with_capacity(documents.len());
    for document in documents {
        let reader = BufReader::new(File::open(document)?);
        values.push(serde_pickle::value_from_reader(reader, DeOptions::new())?);
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_pickle::value_to_writer(&mut writer, &serde_pickle::Value::List(values), SerOptions::new())?;
    writer.flush()?;
    Ok(())
}
