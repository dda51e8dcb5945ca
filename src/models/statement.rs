//! Imported statement model
//!
//! Records a single statement file import. Immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::StatementId;
use super::transaction::Transaction;

/// Delimited text format detected for a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatementFormat {
    /// Comma separated
    #[default]
    Csv,
    /// Tab separated
    Tsv,
    /// Semicolon separated (common in European exports)
    Semicolon,
    /// Pipe separated
    Pipe,
}

impl StatementFormat {
    /// Format for a delimiter byte, if it is one we recognise
    pub fn from_delimiter(delimiter: u8) -> Option<Self> {
        match delimiter {
            b',' => Some(Self::Csv),
            b'\t' => Some(Self::Tsv),
            b';' => Some(Self::Semicolon),
            b'|' => Some(Self::Pipe),
            _ => None,
        }
    }
}

impl fmt::Display for StatementFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "CSV"),
            Self::Tsv => write!(f, "TSV"),
            Self::Semicolon => write!(f, "Semicolon-delimited"),
            Self::Pipe => write!(f, "Pipe-delimited"),
        }
    }
}

/// One statement file import and the transactions it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedStatement {
    /// Unique identifier
    pub id: StatementId,

    /// Source file name
    pub filename: String,

    /// Detected format
    pub format: StatementFormat,

    /// When the import ran
    pub imported_at: DateTime<Utc>,

    /// Who ran the import
    pub imported_by: String,

    /// Data rows skipped for having fewer than three fields
    #[serde(default)]
    pub skipped_rows: usize,

    /// Rows whose date fell back to the import time
    #[serde(default)]
    pub estimated_dates: usize,

    /// Resulting transactions, in file order
    pub transactions: Vec<Transaction>,
}

impl ImportedStatement {
    /// Number of transactions produced
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Check if the import produced no transactions
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl fmt::Display for ImportedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} transactions)",
            self.filename,
            self.format,
            self.transactions.len()
        )
    }
}
