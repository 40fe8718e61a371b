use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::errors::StatementResult;
use crate::types::PurchaseRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    #[default]
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "tsv")]
    Tsv,
    #[serde(rename = "json")]
    Json,
}

impl OutputFormat {
    fn delimiter(&self) -> Option<u8> {
        match self {
            OutputFormat::Csv => Some(b','),
            OutputFormat::Tsv => Some(b'\t'),
            OutputFormat::Json => None,
        }
    }

    /// Guesses the format from an output file extension, `None` when unknown.
    pub fn from_extension(path: &str) -> Option<Self> {
        let ext = path.rsplit_once('.')?.1.to_lowercase();
        match ext.as_str() {
            "csv" => Some(OutputFormat::Csv),
            "tsv" | "tab" => Some(OutputFormat::Tsv),
            "json" | "jsonl" | "ndjson" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Writes purchase records as a table with a `date,description,amount,card_suffix`
/// header, or as one JSON object per line.
pub struct RecordWriter<W: Write> {
    inner: Sink<W>,
}

const COLUMNS: [&str; 4] = ["date", "description", "amount", "card_suffix"];

enum Sink<W: Write> {
    Delimited {
        writer: csv::Writer<W>,
        header_written: bool,
    },
    JsonLines(W),
}

impl<W: Write> RecordWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        let inner = match format.delimiter() {
            Some(delimiter) => Sink::Delimited {
                writer: csv::WriterBuilder::new()
                    .delimiter(delimiter)
                    .has_headers(false)
                    .from_writer(writer),
                header_written: false,
            },
            None => Sink::JsonLines(writer),
        };
        Self { inner }
    }

    /// Writes the header row once; a table with no records still has one.
    pub fn write_header(&mut self) -> StatementResult<()> {
        if let Sink::Delimited {
            writer,
            header_written,
        } = &mut self.inner
        {
            if !*header_written {
                writer.write_record(COLUMNS)?;
                *header_written = true;
            }
        }
        Ok(())
    }

    pub fn write(&mut self, record: &PurchaseRecord) -> StatementResult<()> {
        self.write_header()?;
        match &mut self.inner {
            Sink::Delimited { writer, .. } => writer.serialize(record)?,
            Sink::JsonLines(writer) => {
                serde_json::to_writer(&mut *writer, record)?;
                writer.write_all(b"\n").map_err(write_failed)?;
            }
        }
        Ok(())
    }

    /// Writes every record and flushes. Returns how many were written.
    pub fn write_records<I>(&mut self, records: I) -> StatementResult<usize>
    where
        I: IntoIterator<Item = PurchaseRecord>,
    {
        self.write_header()?;
        let mut written = 0;
        for record in records {
            self.write(&record)?;
            written += 1;
        }
        self.flush()?;
        Ok(written)
    }

    pub fn flush(&mut self) -> StatementResult<()> {
        match &mut self.inner {
            Sink::Delimited { writer, .. } => writer.flush(),
            Sink::JsonLines(writer) => writer.flush(),
        }
        .map_err(write_failed)
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> StatementResult<W> {
        match self.inner {
            Sink::Delimited { writer, .. } => writer
                .into_inner()
                .map_err(|err| write_failed(err.into_error())),
            Sink::JsonLines(mut writer) => {
                writer.flush().map_err(write_failed)?;
                Ok(writer)
            }
        }
    }
}

fn write_failed(err: std::io::Error) -> crate::errors::StatementParseError {
    crate::errors::StatementParseError::WriteFailed(err.to_string())
}
