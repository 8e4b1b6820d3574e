//! CSV output and the naming of exported files.

use crate::constants::{CSV_DIR, STEM_SEPARATOR};
use crate::error::Result;
use crate::registry::SamplingInterval;
use crate::types::NormalizedRecordSet;
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// `{date}__{location}__{interval-key}`, shared by the local file and the remote key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationName {
    pub date: NaiveDate,
    pub en_name: String,
    pub interval: SamplingInterval,
}

impl DestinationName {
    pub fn new(date: NaiveDate, en_name: &str, interval: SamplingInterval) -> Self {
        Self {
            date,
            en_name: en_name.to_string(),
            interval,
        }
    }

    pub fn stem(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.date.format("%Y-%m-%d"),
            self.en_name,
            self.interval.key(),
            sep = STEM_SEPARATOR
        )
    }

    /// `<data_root>/jma_csv/<stem>.csv`
    pub fn local_path(&self, data_root: &Path) -> PathBuf {
        data_root.join(CSV_DIR).join(format!("{}.csv", self.stem()))
    }

    /// `<data_root_name>/jma_csv/<stem>.csv`
    pub fn remote_key(&self, data_root: &Path) -> String {
        remote_key(data_root, &format!("{}.csv", self.stem()))
    }
}

/// Object key of an exported file: the data root's own name, then `jma_csv/<file_name>`
pub fn remote_key(data_root: &Path, file_name: &str) -> String {
    let tail = format!("{CSV_DIR}/{file_name}");
    match data_root.file_name() {
        Some(root_name) => format!("{}/{tail}", root_name.to_string_lossy()),
        None => tail,
    }
}

/// Header row of canonical names, then one row per record.
pub fn write_csv_to<W: Write>(records: &NormalizedRecordSet, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(records.columns())?;
    for row in records.rows() {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv(records: &NormalizedRecordSet, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    write_csv_to(records, file)
}
