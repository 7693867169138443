use chrono::{DateTime, NaiveDate, Utc};
use log::warn;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::error::StoreError;
use super::store::{select_window, ObservationStore, Observations, WindowQuery};
use super::types::Observation;

const FOLDER_NAME: &str = "observations";
const STAMP_PREFIX: &[u8] = b"{\"captured_at\":\"";

/// Day file currently open for appending, with the length we last left it at.
struct DayFile {
    day: NaiveDate,
    file: File,
    len: u64,
}

/// Append-only JSON-lines log, one file per UTC day.
///
/// Each row is written with a single `write_all` of a complete line, so a
/// concurrent reader can at worst see a torn final line, which it skips.
/// Before writing after a torn line the writer terminates it, so the new row
/// always starts on a line of its own.
pub struct JsonlStore {
    base: PathBuf,
    writer: Mutex<Option<DayFile>>,
}

impl JsonlStore {
    pub fn open(base: PathBuf) -> Result<Self, StoreError> {
        let store = JsonlStore {
            base,
            writer: Mutex::new(None),
        };
        fs::create_dir_all(store.folder())?;
        Ok(store)
    }

    fn folder(&self) -> PathBuf {
        self.base.join(FOLDER_NAME)
    }

    fn day_path(&self, day: NaiveDate) -> PathBuf {
        self.folder().join(format!("{}.jsonl", day.format("%Y-%m-%d")))
    }

    fn open_day(&self, day: NaiveDate) -> io::Result<DayFile> {
        let path = self.day_path(day);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        let len = terminate_torn_tail(&mut file, &path)?;
        Ok(DayFile { day, file, len })
    }

    fn write_line(&self, day: NaiveDate, line: &[u8]) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| io::Error::other(e.to_string()))?;

        let mut current = match writer.take() {
            Some(current) if current.day == day => current,
            _ => self.open_day(day)?,
        };

        // Someone else touched the file since our last write.
        if current.file.metadata()?.len() != current.len {
            current.len = terminate_torn_tail(&mut current.file, &self.day_path(day))?;
        }

        // On failure the handle is dropped, so the next append reopens the
        // file and repairs whatever part of the line made it to disk.
        current.file.write_all(line)?;
        current.len += line.len() as u64;
        *writer = Some(current);
        Ok(())
    }

    fn read_day(&self, day: NaiveDate, query: &WindowQuery) -> Result<Vec<Observation>, StoreError> {
        let path = self.day_path(day);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read(&path).map_err(StoreError::query)?;
        let mut rows = Vec::new();
        for (n, line) in content.split(|&b| b == b'\n').enumerate() {
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            if let Some(at) = leading_timestamp(line) {
                if !query.contains(at) {
                    continue;
                }
            }
            match serde_json::from_slice::<Observation>(line) {
                Ok(row) => rows.push(row),
                Err(e) => warn!("Skipping line {} of {}: {}", n + 1, path.display(), e),
            }
        }
        Ok(rows)
    }
}

/// Appends a newline when the file ends mid-line. Returns the resulting length.
fn terminate_torn_tail(file: &mut File, path: &Path) -> io::Result<u64> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(0);
    }

    let mut last = [0u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(len);
    }

    warn!("Terminating torn line at the end of {}", path.display());
    file.write_all(b"\n")?;
    Ok(len + 1)
}

/// Capture time read off the head of a stored row, without decoding the rest.
fn leading_timestamp(line: &[u8]) -> Option<DateTime<Utc>> {
    let rest = line.strip_prefix(STAMP_PREFIX)?;
    let end = rest.iter().position(|&b| b == b'"')?;
    let stamp = std::str::from_utf8(&rest[..end]).ok()?;
    DateTime::parse_from_rfc3339(stamp)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<NaiveDate> {
    let last = end.date_naive();
    let mut day = start.date_naive();
    let mut days = Vec::new();
    while day <= last {
        days.push(day);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

impl ObservationStore for JsonlStore {
    fn append(&self, observation: &Observation) -> Result<(), StoreError> {
        let mut line = serde_json::to_vec(observation)
            .map_err(|e| StoreError::write(&observation.aircraft_id, e))?;
        line.push(b'\n');

        self.write_line(observation.captured_at.date_naive(), &line)
            .map_err(|e| StoreError::write(&observation.aircraft_id, e))
    }

    fn query_window(&self, query: &WindowQuery) -> Result<Observations, StoreError> {
        let mut rows = Vec::new();
        for day in days_between(query.start(), query.now) {
            rows.extend(self.read_day(day, query)?);
        }
        Ok(select_window(rows, query))
    }
}
