//! Delimited-text reading for supplier files.
//!
//! Files are decoded to UTF-8 first (`encoding_rs`, label taken from the
//! source config) and then split with the `csv` crate using the source's
//! dialect. Cells are kept as strings; typing happens in the adapters.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use crate::spec::{Engine, SourceSpec};

pub const DEFAULT_SEPARATOR: u8 = b';';

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("unknown encoding label '{0}'")]
    UnknownEncoding(String),
    #[error("separator must be a single ASCII character, got '{0}'")]
    InvalidSeparator(String),
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed row {row}: {message}")]
    Malformed { row: usize, message: String },
    #[error("header row {header} is past the end of a {rows}-row file")]
    MissingHeader { header: usize, rows: usize },
}

/// Separator, header position, explicit column names, strictness, encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDialect {
    pub separator: u8,
    pub header: Option<usize>,
    pub column_names: Option<Vec<String>>,
    pub engine: Engine,
    pub encoding: &'static Encoding,
}

impl Default for TableDialect {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            header: Some(0),
            column_names: None,
            engine: Engine::Python,
            encoding: encoding_rs::UTF_8,
        }
    }
}

impl TableDialect {
    pub fn from_spec(spec: &SourceSpec) -> Result<Self, TableError> {
        let separator = match spec.separator.as_deref() {
            None => DEFAULT_SEPARATOR,
            Some(s) => match s.as_bytes() {
                [b] if b.is_ascii() => *b,
                _ => return Err(TableError::InvalidSeparator(s.to_string())),
            },
        };
        let encoding = match spec.encoding.as_deref() {
            None => encoding_rs::UTF_8,
            Some(label) => Encoding::for_label(label.trim().as_bytes())
                .ok_or_else(|| TableError::UnknownEncoding(label.to_string()))?,
        };
        Ok(Self {
            separator,
            header: spec.header,
            column_names: spec.column_names.clone(),
            engine: spec.engine,
            encoding,
        })
    }
}

/// A decoded table: column names plus string rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    pub fn read(path: &Path, dialect: &TableDialect) -> Result<Self, TableError> {
        let bytes = std::fs::read(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes, dialect)
    }

    pub fn parse(bytes: &[u8], dialect: &TableDialect) -> Result<Self, TableError> {
        let text = decode(bytes, dialect.encoding);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(dialect.separator)
            .has_headers(false)
            .flexible(dialect.engine == Engine::Python)
            .from_reader(text.as_bytes());

        let mut lines: Vec<Vec<String>> = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| TableError::Malformed {
                row: i,
                message: e.to_string(),
            })?;
            lines.push(record.iter().map(str::to_string).collect());
        }

        let (header_row, rows) = match dialect.header {
            Some(h) => {
                if h >= lines.len() {
                    if lines.is_empty() {
                        return Ok(Self::new(
                            dialect.column_names.clone().unwrap_or_default(),
                            Vec::new(),
                        ));
                    }
                    return Err(TableError::MissingHeader {
                        header: h,
                        rows: lines.len(),
                    });
                }
                let rows = lines.split_off(h + 1);
                (lines.pop(), rows)
            }
            None => (None, lines),
        };

        let columns = match (&dialect.column_names, header_row) {
            (Some(names), _) => names.clone(),
            (None, Some(header)) => header.into_iter().map(|c| c.trim().to_string()).collect(),
            (None, None) => {
                let width = rows.iter().map(Vec::len).max().unwrap_or(0);
                (0..width).map(|i| i.to_string()).collect()
            }
        };

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text, or `""` for cells past the end of a short row.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn decode<'a>(bytes: &'a [u8], encoding: &'static Encoding) -> Cow<'a, str> {
    let (text, _, _) = encoding.decode(bytes);
    text
}
