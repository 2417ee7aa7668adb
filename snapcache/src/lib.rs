//! Date-keyed file cache.
//!
//! Each entry is a single file named `<prefix><YYYY-MM-DD>.<extension>` inside
//! one directory. An entry is considered valid for as long as the file exists:
//! there is no expiry and no staleness check.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TMP_SUFFIX: &str = ".tmp";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        CacheError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;

pub struct AccessRO;
pub struct AccessRW;

pub struct DateCache<AccessTag> {
    dir: PathBuf,
    prefix: String,
    extension: String,
    _access: AccessTag,
}

pub type CacheRW = DateCache<AccessRW>;
pub type CacheRO = DateCache<AccessRO>;

// Methods common to read-only and read-write caches
impl<AccessTag> DateCache<AccessTag> {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!(
            "{}{}.{}",
            self.prefix,
            date.format(DATE_FORMAT),
            self.extension
        ))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.path(date).is_file()
    }

    /// Opens the entry for `date`, or returns `None` if nothing is cached.
    pub fn reader(&self, date: NaiveDate) -> Result<Option<BufReader<File>>> {
        let path = self.path(date);
        match File::open(&path) {
            Ok(f) => Ok(Some(BufReader::new(f))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    /// All dates with an entry, oldest first. A missing directory is an empty cache.
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(CacheError::io(&self.dir, e)),
        };

        let mut dates = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io(&self.dir, e))?;
            if let Some(date) = entry.file_name().to_str().and_then(|n| self.date_of(n)) {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }

    fn date_of(&self, filename: &str) -> Option<NaiveDate> {
        let stem = filename
            .strip_prefix(&self.prefix)?
            .strip_suffix(&self.extension)?
            .strip_suffix('.')?;
        NaiveDate::parse_from_str(stem, DATE_FORMAT).ok()
    }
}

// Methods specific to read-only cache
impl CacheRO {
    pub fn open(dir: impl AsRef<Path>, prefix: &str, extension: &str) -> Self {
        DateCache {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.to_string(),
            extension: extension.to_string(),
            _access: AccessRO,
        }
    }
}

// Methods specific to read-write cache
impl CacheRW {
    pub fn open(dir: impl AsRef<Path>, prefix: &str, extension: &str) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        // Create directory for cache if it doesn't already exist
        fs::create_dir_all(&dir).map_err(|e| CacheError::io(&dir, e))?;
        Ok(DateCache {
            dir,
            prefix: prefix.to_string(),
            extension: extension.to_string(),
            _access: AccessRW,
        })
    }

    /// Writes the entry for `date` through `write_fn`, replacing any existing one.
    ///
    /// The content goes to a temporary file first and is renamed into place, so a
    /// present entry is always a complete one.
    pub fn write_with<F>(&self, date: NaiveDate, write_fn: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let path = self.path(date);
        let mut tmp_name = path.clone().into_os_string();
        tmp_name.push(TMP_SUFFIX);
        let tmp_path = PathBuf::from(tmp_name);

        let file = File::create(&tmp_path).map_err(|e| CacheError::io(&tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        if let Err(e) = write_fn(&mut writer).and_then(|_| writer.flush()) {
            drop(writer);
            fs::remove_file(&tmp_path).ok();
            return Err(CacheError::io(&tmp_path, e));
        }
        drop(writer);

        fs::rename(&tmp_path, &path).map_err(|e| CacheError::io(&path, e))?;
        log::debug!("Cached entry for {date} at {}", path.display());
        Ok(path)
    }

    pub fn remove(&self, date: NaiveDate) -> Result<bool> {
        let path = self.path(date);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }
}
