use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use snapcache::{CacheError, CacheRO, CacheRW};
use thiserror::Error;

use crate::constants::{filenames, fleets};
use crate::data_mgmt::models::{DbSelector, DeviceRecord};
use crate::data_mgmt::parse;
use crate::interfaces::telemetry::{SourceError, TelemetrySource};

const METADATA_MARKER: &str = "### METADATA ###";
const DATA_MARKER: &str = "### DATA ###";
const KEY_QUERY_TIME: &str = "query_time";
const KEY_SOURCE: &str = "source";

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("malformed snapshot data: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed snapshot: {0}")]
    Format(String),
    #[error("failed to query {database}: {source}")]
    Source {
        database: &'static str,
        #[source]
        source: SourceError,
    },
    #[error("source for {found} cannot fill a {expected} snapshot store")]
    SourceMismatch {
        expected: DbSelector,
        found: DbSelector,
    },
}

/// One date's device-status table, as cached on disk
#[derive(Clone, Debug, PartialEq)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub selector: DbSelector,
    /// Seconds the database query took when the snapshot was generated
    pub query_time: f64,
    pub records: Vec<DeviceRecord>,
}

impl DailySnapshot {
    pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{METADATA_MARKER}")?;
        writeln!(writer, "{KEY_QUERY_TIME},{:.3}", self.query_time)?;
        writeln!(writer, "{KEY_SOURCE},{}", self.selector)?;
        writeln!(writer, "{DATA_MARKER}")?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()
    }

    /// Reads a snapshot; `selector` applies when the metadata does not name a source
    pub fn read_from<R: BufRead>(
        mut reader: R,
        date: NaiveDate,
        selector: DbSelector,
    ) -> Result<Self, SnapshotError> {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        if line.trim() != METADATA_MARKER {
            return Err(SnapshotError::Format(format!(
                "expected '{METADATA_MARKER}', found '{}'",
                line.trim()
            )));
        }

        let mut metadata = HashMap::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(SnapshotError::Format(format!("missing '{DATA_MARKER}'")));
            }
            let entry = line.trim();
            if entry == DATA_MARKER {
                break;
            }
            match entry.split_once(',') {
                Some((key, value)) => {
                    metadata.insert(key.trim().to_string(), value.trim().to_string());
                }
                None => log::debug!("Ignoring metadata line '{entry}'"),
            }
        }

        let query_time = metadata
            .get(KEY_QUERY_TIME)
            .ok_or_else(|| SnapshotError::Format(format!("missing '{KEY_QUERY_TIME}'")))?
            .parse::<f64>()
            .map_err(|e| SnapshotError::Format(format!("invalid '{KEY_QUERY_TIME}': {e}")))?;
        let selector = match metadata.get(KEY_SOURCE) {
            Some(source) => source.parse().map_err(SnapshotError::Format)?,
            None => selector,
        };

        let mut records = csv::Reader::from_reader(reader)
            .deserialize()
            .collect::<Result<Vec<DeviceRecord>, _>>()?;
        // Older Bursts snapshots were written without a customer column
        if selector == DbSelector::DebugSmbs {
            for record in records.iter_mut().filter(|r| r.organization.is_none()) {
                record.organization = Some(fleets::BURSTS_CUSTOMER.to_string());
            }
        }

        Ok(DailySnapshot {
            date,
            selector,
            query_time,
            records,
        })
    }
}

/// Dates with a cached snapshot from `selector`, oldest first
pub fn cached_dates(
    report_dir: &Path,
    selector: DbSelector,
) -> Result<Vec<NaiveDate>, SnapshotError> {
    let cache = CacheRO::open(report_dir, selector.snapshot_prefix(), filenames::SNAPSHOT_EXT);
    Ok(cache.dates()?)
}

/// Cache-or-query access to daily snapshots from one database
///
/// A cached file is used as long as it exists; its age is never checked.
pub struct SnapshotStore {
    cache: CacheRW,
    selector: DbSelector,
    critical_voltage: f64,
}

impl SnapshotStore {
    pub fn open(
        report_dir: &Path,
        selector: DbSelector,
        critical_voltage: f64,
    ) -> Result<Self, SnapshotError> {
        let cache = CacheRW::open(report_dir, selector.snapshot_prefix(), filenames::SNAPSHOT_EXT)?;
        Ok(SnapshotStore {
            cache,
            selector,
            critical_voltage,
        })
    }

    pub fn load(&self, date: NaiveDate) -> Result<Option<DailySnapshot>, SnapshotError> {
        match self.cache.reader(date)? {
            Some(reader) => {
                DailySnapshot::read_from(reader, date, self.selector).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn save(&self, snapshot: &DailySnapshot) -> Result<PathBuf, SnapshotError> {
        Ok(self
            .cache
            .write_with(snapshot.date, |w| snapshot.write_to(w))?)
    }

    /// Returns the cached snapshot for `date`, or queries `source` and caches the result.
    ///
    /// `as_of` is passed through to the source; `None` asks for the latest readings.
    pub fn load_or_fetch<S>(
        &self,
        date: NaiveDate,
        as_of: Option<NaiveDate>,
        source: &mut S,
    ) -> Result<DailySnapshot, SnapshotError>
    where
        S: TelemetrySource + ?Sized,
    {
        if let Some(snapshot) = self.load(date)? {
            log::info!("Loading existing report for {date}");
            return Ok(snapshot);
        }

        if source.selector() != self.selector {
            return Err(SnapshotError::SourceMismatch {
                expected: self.selector,
                found: source.selector(),
            });
        }

        log::info!(
            "Generating new report for {date} using {} database",
            self.selector.database_name()
        );
        let started = Instant::now();
        let batch = source.fetch(as_of).map_err(|source| SnapshotError::Source {
            database: self.selector.database_name(),
            source,
        })?;
        let query_time = started.elapsed().as_secs_f64();
        log::info!("Query returned {} rows in {query_time:.2} s", batch.len());

        let snapshot = DailySnapshot {
            date,
            selector: self.selector,
            query_time,
            records: parse::normalize(batch, self.critical_voltage),
        };
        let path = self.save(&snapshot)?;
        log::debug!("Saved {} records to {}", snapshot.records.len(), path.display());
        Ok(snapshot)
    }
}
