//! Delimited text candle source.
//!
//! Reads one candle per row from broker-style exports such as
//! `SPFB.SI;60;20170613;100000;58120;58126;58016;58115;1432` using the `csv`
//! crate. After `skip_columns` leading columns the layout is
//! `date[, time], open, high, low, close[, volume]`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::domain::Candle;

use super::source::{CandleSource, SourceError};

/// Column layout and parsing options for a delimited candle file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelimitedFormat {
    pub delimiter: u8,
    pub has_header: bool,
    /// Leading columns to ignore (ticker, period, ...).
    pub skip_columns: usize,
    /// `chrono` format of the date column.
    pub date_format: String,
    /// `chrono` format of the time column; `None` when there is no time column.
    pub time_format: Option<String>,
}

impl Default for DelimitedFormat {
    fn default() -> Self {
        Self {
            delimiter: b';',
            has_header: false,
            skip_columns: 0,
            date_format: "%Y%m%d".to_string(),
            time_format: Some("%H%M%S".to_string()),
        }
    }
}

impl DelimitedFormat {
    /// `<TICKER>;<PER>;<DATE>;<TIME>;<OPEN>;<HIGH>;<LOW>;<CLOSE>;<VOL>` with a header row.
    pub fn broker_export() -> Self {
        Self {
            has_header: true,
            skip_columns: 2,
            ..Self::default()
        }
    }
}

pub struct DelimitedCandleSource<R = File> {
    reader: csv::Reader<R>,
    format: DelimitedFormat,
    record: StringRecord,
    current: Option<Candle>,
}

impl DelimitedCandleSource<File> {
    /// Open `path`. The file handle is held until the source is dropped.
    pub fn open(path: impl AsRef<Path>, format: DelimitedFormat) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file, format))
    }
}

impl<R: Read> DelimitedCandleSource<R> {
    pub fn from_reader(reader: R, format: DelimitedFormat) -> Self {
        let reader = ReaderBuilder::new()
            .delimiter(format.delimiter)
            .has_headers(format.has_header)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);
        Self {
            reader,
            format,
            record: StringRecord::new(),
            current: None,
        }
    }

    fn parse_record(&self) -> Result<Candle, SourceError> {
        let record = &self.record;
        let line = record.position().map_or(0, |p| p.line());
        let mut column = self.format.skip_columns;
        let mut next = |name: &'static str| {
            let value = field(record, column, line, name);
            column += 1;
            value
        };

        let date_raw = next("date")?;
        let date = NaiveDate::parse_from_str(date_raw, &self.format.date_format).map_err(|_| {
            SourceError::InvalidTimestamp {
                line,
                value: date_raw.to_string(),
            }
        })?;
        let time = match &self.format.time_format {
            Some(fmt) => {
                let time_raw = next("time")?;
                NaiveTime::parse_from_str(time_raw, fmt).map_err(|_| {
                    SourceError::InvalidTimestamp {
                        line,
                        value: format!("{date_raw} {time_raw}"),
                    }
                })?
            }
            None => NaiveTime::MIN,
        };

        let open = parse_price(next("open")?, line, "open")?;
        let high = parse_price(next("high")?, line, "high")?;
        let low = parse_price(next("low")?, line, "low")?;
        let close = parse_price(next("close")?, line, "close")?;
        let volume = match next("volume") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| SourceError::InvalidNumber {
                line,
                column: "volume",
                value: raw.to_string(),
            })?,
            // Volume is optional.
            Err(_) => 0,
        };

        Ok(Candle::new(NaiveDateTime::new(date, time), open, high, low, close).with_volume(volume))
    }
}

fn field<'a>(
    record: &'a StringRecord,
    index: usize,
    line: u64,
    column: &'static str,
) -> Result<&'a str, SourceError> {
    record
        .get(index)
        .filter(|v| !v.is_empty())
        .ok_or(SourceError::MissingColumn { line, column })
}

fn parse_price(raw: &str, line: u64, column: &'static str) -> Result<f64, SourceError> {
    raw.parse::<f64>().map_err(|_| SourceError::InvalidNumber {
        line,
        column,
        value: raw.to_string(),
    })
}

impl<R: Read> CandleSource for DelimitedCandleSource<R> {
    fn advance(&mut self) -> Result<bool, SourceError> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(false);
        }
        let candle = self.parse_record()?;
        if let Some(previous) = &self.current {
            if candle.timestamp <= previous.timestamp {
                return Err(SourceError::OutOfOrder {
                    line: self.record.position().map_or(0, |p| p.line()),
                    previous: previous.timestamp,
                    current: candle.timestamp,
                });
            }
        }
        self.current = Some(candle);
        Ok(true)
    }

    fn current(&self) -> Option<&Candle> {
        self.current.as_ref()
    }
}
