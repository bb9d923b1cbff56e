//! JSON Lines result container
//!
//! The file starts with a header record followed by one record per line:
//!
//! ```text
//! {"record":"header","format":"rgram-jsonl","library_version":"0.1.0","created_at":"..."}
//! {"record":"namespace","name":"<fingerprint>"}
//! {"record":"dataset","key":"/<fingerprint>/KernelType.LINEAR_0_0_0","data":[0.0,2.0,0.0]}
//! ```
//!
//! Non-finite values are written as the strings `"NaN"`, `"inf"` and `"-inf"`.

use crate::cache::StorageKey;
use crate::core::{GramError, Result, ResultStore};
use crate::store::ensure_writable;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Format identifier written in the header record
pub const FORMAT_NAME: &str = "rgram-jsonl";

/// One line of the container
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum Record {
    Header(ContainerHeader),
    Namespace { name: String },
    Dataset { key: String, data: Vec<JsonFloat> },
}

/// Metadata written once at the top of the container
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContainerHeader {
    /// Always [`FORMAT_NAME`]
    pub format: String,
    /// Library version used to create the container
    pub library_version: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
}

impl ContainerHeader {
    fn current() -> Self {
        Self {
            format: FORMAT_NAME.to_string(),
            library_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// `f32` that survives JSON even when it is not finite
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum JsonFloat {
    Finite(f32),
    Special(SpecialFloat),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum SpecialFloat {
    #[serde(rename = "NaN")]
    Nan,
    #[serde(rename = "inf")]
    Infinity,
    #[serde(rename = "-inf")]
    NegInfinity,
}

impl From<f32> for JsonFloat {
    fn from(value: f32) -> Self {
        if value.is_nan() {
            JsonFloat::Special(SpecialFloat::Nan)
        } else if value == f32::INFINITY {
            JsonFloat::Special(SpecialFloat::Infinity)
        } else if value == f32::NEG_INFINITY {
            JsonFloat::Special(SpecialFloat::NegInfinity)
        } else {
            JsonFloat::Finite(value)
        }
    }
}

impl From<JsonFloat> for f32 {
    fn from(value: JsonFloat) -> Self {
        match value {
            JsonFloat::Finite(v) => v,
            JsonFloat::Special(SpecialFloat::Nan) => f32::NAN,
            JsonFloat::Special(SpecialFloat::Infinity) => f32::INFINITY,
            JsonFloat::Special(SpecialFloat::NegInfinity) => f32::NEG_INFINITY,
        }
    }
}

/// Result store backed by a JSON Lines file
///
/// Every record is flushed as soon as it is written, so a failed run keeps
/// all keys stored before the failure. The file is closed on drop.
pub struct JsonlStore {
    path: PathBuf,
    writer: BufWriter<File>,
    namespaces: HashSet<String>,
    keys: HashSet<StorageKey>,
}

impl JsonlStore {
    /// Create a new container, replacing any existing file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, true)
    }

    /// Open a container, truncating it or appending to it
    ///
    /// When appending to an existing file its namespaces and keys are
    /// indexed first, so duplicates are still rejected.
    pub fn open<P: AsRef<Path>>(path: P, truncate: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut namespaces = HashSet::new();
        let mut keys = HashSet::new();

        let existing = !truncate && path.exists();
        if existing {
            for record in read_records(&path)? {
                match record? {
                    Record::Namespace { name } => {
                        namespaces.insert(name);
                    }
                    Record::Dataset { key, .. } => {
                        keys.insert(StorageKey::parse(&key)?);
                    }
                    Record::Header(_) => {}
                }
            }
            debug!(
                "Indexed {} namespaces and {} keys in {path:?}",
                namespaces.len(),
                keys.len()
            );
        }

        let file = if existing {
            OpenOptions::new().append(true).open(&path)?
        } else {
            File::create(&path)?
        };

        let mut store = Self {
            path,
            writer: BufWriter::new(file),
            namespaces,
            keys,
        };
        if !existing {
            store.append(&Record::Header(ContainerHeader::current()))?;
        }
        Ok(store)
    }

    /// Path of the container file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored arrays
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Read the header record of a container file
    pub fn read_header<P: AsRef<Path>>(path: P) -> Result<ContainerHeader> {
        match read_records(path.as_ref())?.next() {
            Some(Ok(Record::Header(header))) => Ok(header),
            Some(Err(e)) => Err(e),
            _ => Err(GramError::InvalidDataset(format!(
                "{:?} does not start with a container header",
                path.as_ref()
            ))),
        }
    }

    fn append(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)
            .map_err(|e| GramError::SerializationError(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl ResultStore for JsonlStore {
    fn create_namespace(&mut self, name: &str) -> Result<()> {
        if self.namespaces.contains(name) {
            return Err(GramError::Storage(format!(
                "namespace {name} already exists"
            )));
        }
        self.append(&Record::Namespace {
            name: name.to_string(),
        })?;
        self.namespaces.insert(name.to_string());
        Ok(())
    }

    fn has_namespace(&self, name: &str) -> bool {
        self.namespaces.contains(name)
    }

    fn write(&mut self, key: &StorageKey, data: &[f32]) -> Result<()> {
        ensure_writable(&*self, key)?;
        self.append(&Record::Dataset {
            key: key.to_string(),
            data: data.iter().copied().map(JsonFloat::from).collect(),
        })?;
        self.keys.insert(key.clone());
        Ok(())
    }

    fn contains(&self, key: &StorageKey) -> bool {
        self.keys.contains(key)
    }

    fn read(&mut self, key: &StorageKey) -> Result<Option<Vec<f32>>> {
        if !self.keys.contains(key) {
            return Ok(None);
        }
        self.writer.flush()?;

        for record in read_records(&self.path)? {
            if let Record::Dataset { key: k, data } = record? {
                if k == key.as_str() {
                    return Ok(Some(data.into_iter().map(f32::from).collect()));
                }
            }
        }
        Ok(None)
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for JsonlStore {
    fn drop(&mut self) {
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush {:?}: {e}", self.path);
        }
    }
}

fn read_records(path: &Path) -> Result<impl Iterator<Item = Result<Record>>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(reader
        .lines()
        .enumerate()
        .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|(n, line)| {
            let line = line?;
            serde_json::from_str::<Record>(&line)
                .map_err(|e| GramError::ParseError(format!("line {}: {e}", n + 1)))
        }))
}
