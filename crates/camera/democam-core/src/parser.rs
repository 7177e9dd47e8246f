//! Tick log parser.
//!
//! Reads a header-labeled CSV where each record is one tick of one player,
//! coerces the required columns and groups rows into a [`TrackSet`] in
//! first-seen subject order.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::config::{Config, MalformedRowPolicy};
use crate::data::{SampleRow, StanceFlags, TrackSet, Vec3};
use crate::error::{DemoCamError, PathRole, Result};

pub const COL_TICK: &str = "tick";
pub const COL_SUBJECT: &str = "player_name";
pub const COL_POS_X: &str = "pos_x";
pub const COL_POS_Y: &str = "pos_y";
pub const COL_POS_Z: &str = "pos_z";
pub const COL_YAW: &str = "view_dir_x";
pub const COL_PITCH: &str = "view_dir_y";
pub const COL_DUCKING: &str = "is_ducking";
pub const COL_DUCKING_IN_PROGRESS: &str = "is_ducking_in_progress";
pub const COL_UNDUCKING_IN_PROGRESS: &str = "is_unducking_in_progress";
pub const COL_STANDING: &str = "is_standing";

const FLAG_COLUMNS: [&str; 4] = [
    COL_DUCKING,
    COL_DUCKING_IN_PROGRESS,
    COL_UNDUCKING_IN_PROGRESS,
    COL_STANDING,
];

/// Parser knobs, usually derived from [`Config`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub malformed_rows: MalformedRowPolicy,
    pub allow_missing_flags: bool,
}

impl From<&Config> for ParseOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            malformed_rows: cfg.malformed_rows,
            allow_missing_flags: cfg.allow_missing_flags,
        }
    }
}

/// Parsed log plus bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct ParsedLog {
    pub tracks: TrackSet,
    pub rows_read: usize,
    pub rows_skipped: usize,
    /// Subjects whose rows arrived out of tick order and were re-sorted.
    pub resorted_subjects: Vec<String>,
}

/// Column positions resolved from the header.
#[derive(Debug)]
struct Columns {
    tick: usize,
    subject: usize,
    pos: [usize; 3],
    yaw: usize,
    pitch: usize,
    /// ducking, ducking-in-progress, unducking-in-progress, standing
    flags: [Option<usize>; 4],
}

impl Columns {
    fn resolve(headers: &csv::StringRecord, allow_missing_flags: bool) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| DemoCamError::MissingColumn {
                column: name.to_owned(),
            })
        };

        let mut flags = [None; 4];
        for (slot, name) in flags.iter_mut().zip(FLAG_COLUMNS) {
            *slot = if allow_missing_flags {
                find(name)
            } else {
                Some(require(name)?)
            };
        }

        Ok(Self {
            tick: require(COL_TICK)?,
            subject: require(COL_SUBJECT)?,
            pos: [require(COL_POS_X)?, require(COL_POS_Y)?, require(COL_POS_Z)?],
            yaw: require(COL_YAW)?,
            pitch: require(COL_PITCH)?,
            flags,
        })
    }
}

/// One record being coerced; carries the line for error reporting.
struct RecordView<'a> {
    record: &'a csv::StringRecord,
    headers: &'a csv::StringRecord,
    line: u64,
}

impl RecordView<'_> {
    fn raw(&self, idx: usize) -> Result<&str> {
        self.record
            .get(idx)
            .map(str::trim)
            .ok_or_else(|| self.malformed(idx, "", "field missing"))
    }

    fn malformed(&self, idx: usize, value: &str, reason: &str) -> DemoCamError {
        DemoCamError::MalformedRecord {
            line: self.line,
            column: self.headers.get(idx).unwrap_or("?").trim().to_owned(),
            value: value.to_owned(),
            reason: reason.to_owned(),
        }
    }

    fn int(&self, idx: usize) -> Result<i64> {
        let raw = self.raw(idx)?;
        raw.parse::<i64>()
            .map_err(|e| self.malformed(idx, raw, &e.to_string()))
    }

    fn float(&self, idx: usize) -> Result<f64> {
        let raw = self.raw(idx)?;
        match raw.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(self.malformed(idx, raw, "not a finite number")),
            Err(e) => Err(self.malformed(idx, raw, &e.to_string())),
        }
    }

    fn text(&self, idx: usize) -> Result<String> {
        let raw = self.raw(idx)?;
        if raw.is_empty() {
            return Err(self.malformed(idx, raw, "empty subject identity"));
        }
        Ok(raw.to_owned())
    }

    fn flag(&self, idx: Option<usize>) -> Result<bool> {
        let Some(idx) = idx else {
            return Ok(false);
        };
        let raw = self.raw(idx)?;
        match raw {
            "true" | "True" | "TRUE" => Ok(true),
            "false" | "False" | "FALSE" => Ok(false),
            _ => raw
                .parse::<i64>()
                .map(|v| v != 0)
                .map_err(|e| self.malformed(idx, raw, &e.to_string())),
        }
    }
}

fn coerce(view: &RecordView<'_>, cols: &Columns) -> Result<SampleRow> {
    Ok(SampleRow {
        tick: view.int(cols.tick)?,
        subject_id: view.text(cols.subject)?,
        position: Vec3::new(
            view.float(cols.pos[0])?,
            view.float(cols.pos[1])?,
            view.float(cols.pos[2])?,
        ),
        yaw: view.float(cols.yaw)?,
        pitch: view.float(cols.pitch)?,
        flags: StanceFlags {
            crouching: view.flag(cols.flags[0])?,
            entering_crouch: view.flag(cols.flags[1])?,
            exiting_crouch: view.flag(cols.flags[2])?,
            standing: view.flag(cols.flags[3])?,
        },
    })
}

/// UTF-8 view of a raw record; a bad field is reported like any other
/// malformed value.
fn decode(
    raw: &csv::ByteRecord,
    headers: &csv::StringRecord,
    line: u64,
) -> Result<csv::StringRecord> {
    csv::StringRecord::from_byte_record(raw.clone()).map_err(|err| {
        let idx = err.utf8_error().field();
        DemoCamError::MalformedRecord {
            line,
            column: headers.get(idx).unwrap_or("?").trim().to_owned(),
            value: raw
                .get(idx)
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default(),
            reason: "invalid UTF-8".to_owned(),
        }
    })
}

/// Apply the malformed-row policy to a row that could not be read.
fn reject(err: DemoCamError, policy: MalformedRowPolicy, out: &mut ParsedLog) -> Result<()> {
    match policy {
        MalformedRowPolicy::Abort => Err(err),
        MalformedRowPolicy::Skip => {
            warn!(%err, "skipping malformed row");
            out.rows_skipped += 1;
            Ok(())
        }
    }
}

/// Parse a CSV stream into per-subject tracks.
pub fn parse_reader<R: Read>(reader: R, opts: ParseOptions) -> Result<ParsedLog> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        warn!("tick log is empty");
        return Ok(ParsedLog::default());
    }
    let cols = Columns::resolve(&headers, opts.allow_missing_flags)?;
    if cols.flags.iter().any(Option::is_none) {
        warn!("stance flag columns missing; crouch easing disabled for absent flags");
    }

    let mut out = ParsedLog::default();
    let mut raw = csv::ByteRecord::new();
    loop {
        match rdr.read_byte_record(&mut raw) {
            Ok(true) => {}
            Ok(false) => break,
            // the reader cannot make progress past an I/O failure
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => return Err(err.into()),
            Err(err) => {
                reject(err.into(), opts.malformed_rows, &mut out)?;
                continue;
            }
        }
        let line = raw.position().map(|p| p.line()).unwrap_or(0);
        let row = decode(&raw, &headers, line).and_then(|record| {
            let view = RecordView {
                record: &record,
                headers: &headers,
                line,
            };
            coerce(&view, &cols)
        });
        match row {
            Ok(row) => {
                out.rows_read += 1;
                out.tracks.entry(&row.subject_id).rows.push(row);
            }
            Err(err) => reject(err, opts.malformed_rows, &mut out)?,
        }
    }

    for track in out.tracks.iter_mut() {
        let ordered = track.rows.windows(2).all(|w| w[0].tick <= w[1].tick);
        if !ordered {
            warn!(
                subject = %track.subject_id,
                "rows out of tick order; re-sorting"
            );
            // stable: equal ticks keep arrival order
            track.rows.sort_by_key(|r| r.tick);
            out.resorted_subjects.push(track.subject_id.clone());
        }
        debug!(subject = %track.subject_id, rows = track.rows.len(), "parsed subject");
    }

    info!(
        rows = out.rows_read,
        skipped = out.rows_skipped,
        subjects = out.tracks.len(),
        "parsed tick log"
    );
    Ok(out)
}

/// Open and parse a log file.
pub fn parse_path(path: &Path, opts: ParseOptions) -> Result<ParsedLog> {
    if !path.is_file() {
        return Err(DemoCamError::InputNotFound {
            role: PathRole::InputLog,
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| DemoCamError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "reading tick log");
    parse_reader(std::io::BufReader::new(file), opts)
}
