//! Result dumps for the static consumer page
//!
//! `data.json` holds the Ask response as received. `static/consumed.json`
//! holds one `{name, consumers}` entry per test case and is read by the
//! web page in the browser.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::BotError;
use crate::record::{QueryResult, TestCaseRecord};
use crate::Result;

/// Raw dump file name
pub const DATA_FILE: &str = "data.json";
/// Flattened dump path, relative to the dump directory
pub const CONSUMED_FILE: &str = "static/consumed.json";
/// Printout holding the consumer pages
pub const CONSUMERS_PRINTOUT: &str = "Consumers";

/// A test case and the display names of its consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlattenedRecord {
    pub name: String,
    pub consumers: Vec<String>,
}

/// Top-level shape of `consumed.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedDocument {
    pub data: Vec<FlattenedRecord>,
}

/// Paths written by [`dump`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpPaths {
    pub data: PathBuf,
    pub consumed: PathBuf,
}

/// Project every record onto its `Consumers` printout.
///
/// Fails on the first record without that printout.
pub fn flatten(records: &[TestCaseRecord]) -> Result<ConsumedDocument> {
    let data = records
        .iter()
        .map(flatten_record)
        .collect::<Result<Vec<_>>>()?;
    Ok(ConsumedDocument { data })
}

fn flatten_record(record: &TestCaseRecord) -> Result<FlattenedRecord> {
    let values = record
        .printout(CONSUMERS_PRINTOUT)
        .ok_or_else(|| BotError::MissingPrintout {
            record: record.id.clone(),
            printout: CONSUMERS_PRINTOUT.to_string(),
        })?;

    let consumers = values
        .iter()
        .map(|value| {
            value
                .display_text()
                .map(str::to_string)
                .ok_or_else(|| BotError::MalformedPrintout {
                    record: record.id.clone(),
                    printout: CONSUMERS_PRINTOUT.to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FlattenedRecord {
        name: record.id.clone(),
        consumers,
    })
}

/// Write both dump files below `dir`, overwriting existing ones.
///
/// `data.json` is written before the records are flattened, so it is
/// left behind even when flattening fails.
pub fn dump(result: &QueryResult, dir: &Path) -> Result<DumpPaths> {
    let data_path = dir.join(DATA_FILE);
    write_json(&data_path, &result.raw)?;
    info!(path = %data_path.display(), "wrote raw result");

    let document = flatten(&result.records)?;

    let consumed_path = dir.join(CONSUMED_FILE);
    if let Some(parent) = consumed_path.parent() {
        fs::create_dir_all(parent)?;
    }
    write_json(&consumed_path, &document)?;
    info!(
        path = %consumed_path.display(),
        records = document.data.len(),
        "wrote consumer list"
    );

    Ok(DumpPaths {
        data: data_path,
        consumed: consumed_path,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
