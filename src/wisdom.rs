use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::{Precision, WisdomError};

const HEADER: &str = "wisefft-wisdom v1";

/// Identifies one planning decision: the transform size, its precision, and the CPU capability mask
/// (see [`CpuFeatures::mask`](crate::CpuFeatures::mask)) it was made for.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct WisdomKey {
    pub size: usize,
    pub precision: Precision,
    pub cpu_mask: u64,
}

/// A recorded planning decision
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct WisdomEntry {
    pub key: WisdomKey,
    /// Either a codelet signature, or one of the generic strategy names `dit_fallback`, `stockham`, `sixstep`,
    /// `mixedradix` and `bluestein`. Never empty, and never contains whitespace.
    pub algorithm: String,
    pub timestamp: SystemTime,
}

/// A cache of planning decisions that can be persisted across runs.
///
/// All methods take `&self` and synchronize internally, so a single `Wisdom` can be shared between threads
/// through an `Arc`. Storing a key that's already present replaces its entry.
///
/// ### Persistence format
///
/// [`export`](Wisdom::export) writes UTF-8 text: a header line `wisefft-wisdom v1`, followed by one record per line,
/// sorted by key:
///
/// ```text
/// <size> <f32|f64> <capability mask, hex> <algorithm> <unix time>
/// ```
///
/// The unix time is written as seconds with nine fractional digits, so timestamps round-trip to the nanosecond.
/// Whole seconds are accepted on import. Timestamps before the epoch are written as zero.
///
/// [`import`](Wisdom::import) skips blank lines and lines starting with `#`. It validates the whole stream before
/// merging any of it, so a stream with a single bad record leaves the cache untouched.
///
/// ```rust
/// use wisefft::{Precision, Wisdom, WisdomKey};
///
/// let wisdom = Wisdom::new();
/// let key = WisdomKey { size: 1024, precision: Precision::Double, cpu_mask: 0x3 };
/// wisdom.store(key, "stockham").unwrap();
///
/// let mut exported = Vec::new();
/// wisdom.export(&mut exported).unwrap();
///
/// let restored = Wisdom::new();
/// restored.import(exported.as_slice()).unwrap();
/// assert_eq!(restored.lookup(&key).unwrap().algorithm, "stockham");
/// ```
#[derive(Default)]
pub struct Wisdom {
    entries: RwLock<HashMap<WisdomKey, WisdomEntry>>,
}

impl Wisdom {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide cache consulted by [`Plan::new`](crate::Plan::new)
    pub fn global() -> Arc<Wisdom> {
        static GLOBAL: OnceLock<Arc<Wisdom>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Wisdom::new())))
    }

    pub fn lookup(&self, key: &WisdomKey) -> Option<WisdomEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Returns the recorded algorithm name for the given key parts, if any
    pub fn lookup_algorithm(&self, size: usize, precision: Precision, cpu_mask: u64) -> Option<String> {
        self.lookup(&WisdomKey {
            size,
            precision,
            cpu_mask,
        })
        .map(|entry| entry.algorithm)
    }

    /// Records `algorithm` for `key`, timestamped now. Replaces any existing entry for `key`.
    ///
    /// Names that couldn't be exported as a single field are rejected with [`WisdomError::InvalidAlgorithm`].
    pub fn store(&self, key: WisdomKey, algorithm: impl Into<String>) -> Result<(), WisdomError> {
        self.store_entry(WisdomEntry {
            key,
            algorithm: algorithm.into(),
            timestamp: SystemTime::now(),
        })
    }

    /// Records a complete entry, replacing any existing entry with the same key
    pub fn store_entry(&self, entry: WisdomEntry) -> Result<(), WisdomError> {
        if !is_valid_algorithm_name(&entry.algorithm) {
            return Err(WisdomError::InvalidAlgorithm(entry.algorithm));
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(entry.key, entry);
        Ok(())
    }

    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of every entry, sorted by key
    pub fn entries(&self) -> Vec<WisdomEntry> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut snapshot: Vec<WisdomEntry> = entries.values().cloned().collect();
        snapshot.sort_by_key(|entry| entry.key);
        snapshot
    }

    /// Writes every entry to `writer` in the text format described on [`Wisdom`]
    pub fn export<W: Write>(&self, mut writer: W) -> Result<(), WisdomError> {
        writeln!(writer, "{}", HEADER)?;
        for entry in self.entries() {
            let since_epoch = entry
                .timestamp
                .duration_since(UNIX_EPOCH)
                .unwrap_or(Duration::ZERO);
            writeln!(
                writer,
                "{} {} {:#x} {} {}.{:09}",
                entry.key.size,
                entry.key.precision.tag(),
                entry.key.cpu_mask,
                entry.algorithm,
                since_epoch.as_secs(),
                since_epoch.subsec_nanos()
            )?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads entries in the text format described on [`Wisdom`] and merges them into this cache.
    ///
    /// Returns the number of records read. On error, the cache is left unchanged.
    pub fn import<R: Read>(&self, reader: R) -> Result<usize, WisdomError> {
        let mut parsed = Vec::new();
        let mut seen_header = false;

        for (index, line) in BufReader::new(reader).lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            if !seen_header {
                if trimmed != HEADER {
                    return Err(WisdomError::Malformed {
                        line: line_number,
                        reason: format!("expected header '{}'", HEADER),
                    });
                }
                seen_header = true;
                continue;
            }

            parsed.push(parse_record(trimmed, line_number)?);
        }

        if !seen_header {
            return Err(WisdomError::Malformed {
                line: 1,
                reason: format!("missing header '{}'", HEADER),
            });
        }

        let count = parsed.len();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for entry in parsed {
            entries.insert(entry.key, entry);
        }
        Ok(count)
    }

    /// Imports from an in-memory string, for wisdom embedded in a binary
    pub fn import_str(&self, data: &str) -> Result<usize, WisdomError> {
        self.import(data.as_bytes())
    }

    pub fn import_file<P: AsRef<Path>>(&self, path: P) -> Result<usize, WisdomError> {
        self.import(File::open(path)?)
    }

    /// Exports to `path`, replacing the file if it exists
    pub fn export_file<P: AsRef<Path>>(&self, path: P) -> Result<(), WisdomError> {
        self.export(BufWriter::new(File::create(path)?))
    }
}

fn is_valid_algorithm_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().any(char::is_whitespace)
}

// `<seconds>` or `<seconds>.<1 to 9 fractional digits>`
fn parse_timestamp(field: &str) -> Option<SystemTime> {
    let (seconds, nanos) = match field.split_once('.') {
        None => (field, 0),
        Some((seconds, fraction)) => {
            if fraction.is_empty()
                || fraction.len() > 9
                || !fraction.bytes().all(|byte| byte.is_ascii_digit())
            {
                return None;
            }
            let scale = 10u32.pow(9 - fraction.len() as u32);
            (seconds, fraction.parse::<u32>().ok()? * scale)
        }
    };
    if !seconds.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    UNIX_EPOCH.checked_add(Duration::new(seconds.parse::<u64>().ok()?, nanos))
}

fn parse_record(record: &str, line: usize) -> Result<WisdomEntry, WisdomError> {
    let malformed = |reason: &str| WisdomError::Malformed {
        line,
        reason: reason.to_string(),
    };

    let fields: Vec<&str> = record.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(malformed("expected 5 fields"));
    }

    let size = fields[0]
        .parse::<usize>()
        .map_err(|_| malformed("invalid size"))?;
    if size == 0 {
        return Err(malformed("size must be at least 1"));
    }
    let precision = Precision::from_tag(fields[1]).ok_or_else(|| malformed("unknown precision"))?;
    let cpu_mask = fields[2]
        .strip_prefix("0x")
        .and_then(|hex| u64::from_str_radix(hex, 16).ok())
        .ok_or_else(|| malformed("invalid capability mask"))?;
    let timestamp = parse_timestamp(fields[4]).ok_or_else(|| malformed("invalid timestamp"))?;

    Ok(WisdomEntry {
        key: WisdomKey {
            size,
            precision,
            cpu_mask,
        },
        algorithm: fields[3].to_string(),
        timestamp,
    })
}
