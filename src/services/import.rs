//! Statement import service
//!
//! Parses delimited bank statement text into transactions. The importer is
//! tolerant by design of the input it sees in the wild:
//! - columns are located by header aliases, falling back to fixed positions
//! - quoted fields may contain the delimiter; `""` is a literal quote
//! - rows with fewer than three fields are skipped
//! - unparseable amounts become zero
//! - unparseable dates fall back to the import time and are marked estimated
//!
//! Input is read incrementally from any `BufRead`.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{ReconError, ReconResult};
use crate::models::{
    ImportedStatement, Money, StatementFormat, StatementId, Transaction, TransactionKind,
};

/// Header aliases for each logical column, matched case-insensitively
const DATE_ALIASES: &[&str] = &["date", "posted", "booked"];
const AMOUNT_ALIASES: &[&str] = &["amount", "amt", "sum", "total"];
const DESCRIPTION_ALIASES: &[&str] = &[
    "desc",
    "memo",
    "narrative",
    "details",
    "payee",
    "particulars",
    "summary",
];
const BALANCE_ALIASES: &[&str] = &["balance", "running"];
const REFERENCE_ALIASES: &[&str] = &["ref", "check", "cheque", "transaction id"];

/// Alias lists in field claim order: date, amount, description, balance, reference
const FIELD_ALIASES: [&[&str]; 5] = [
    DATE_ALIASES,
    AMOUNT_ALIASES,
    DESCRIPTION_ALIASES,
    BALANCE_ALIASES,
    REFERENCE_ALIASES,
];

/// Delimiters considered during detection, in tie-break order
const CANDIDATE_DELIMITERS: &[u8] = &[b',', b';', b'\t', b'|'];

/// Rows need at least this many fields to be imported
const MIN_FIELDS: usize = 3;

/// Column positions for a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub date_column: usize,
    pub amount_column: usize,
    pub description_column: usize,
    pub balance_column: Option<usize>,
    pub reference_column: Option<usize>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date_column: 0,
            amount_column: 1,
            description_column: 2,
            balance_column: None,
            reference_column: None,
        }
    }
}

impl ColumnMapping {
    /// Detect column positions from a header record
    ///
    /// Headers where an alias appears as a whole word are assigned first,
    /// then headers that merely contain one, so "Amount" wins over the "sum"
    /// inside "Summary". Within a pass each header goes to the first
    /// still-unassigned field it matches. Required fields nobody claims keep
    /// their fixed fallback position.
    pub fn detect(headers: &StringRecord) -> Self {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let mut fields: [Option<usize>; 5] = [None; 5];
        let mut claimed = vec![false; normalized.len()];

        for whole_word in [true, false] {
            for (idx, header) in normalized.iter().enumerate() {
                if claimed[idx] {
                    continue;
                }
                for (slot, aliases) in fields.iter_mut().zip(FIELD_ALIASES) {
                    if slot.is_none() && aliases.iter().any(|a| alias_matches(header, a, whole_word))
                    {
                        *slot = Some(idx);
                        claimed[idx] = true;
                        break;
                    }
                }
            }
        }

        let [date, amount, description, balance, reference] = fields;

        let fallback = Self::default();
        Self {
            date_column: date.unwrap_or(fallback.date_column),
            amount_column: amount.unwrap_or(fallback.amount_column),
            description_column: description.unwrap_or(fallback.description_column),
            balance_column: balance,
            reference_column: reference,
        }
    }
}

/// Service for importing bank statements
#[derive(Debug, Clone, Default)]
pub struct StatementImporter {
    delimiter: Option<u8>,
}

impl StatementImporter {
    /// Create an importer that detects the delimiter from the header line
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed delimiter instead of detecting one
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Import a statement file from disk
    pub fn import_file(&self, path: &Path, operator: &str) -> ReconResult<ImportedStatement> {
        let file = File::open(path).map_err(|e| {
            ReconError::Import(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.import_reader(BufReader::new(file), &filename, operator, Utc::now())
    }

    /// Import a statement held in memory
    pub fn import_str(
        &self,
        content: &str,
        filename: &str,
        operator: &str,
    ) -> ReconResult<ImportedStatement> {
        self.import_reader(content.as_bytes(), filename, operator, Utc::now())
    }

    /// Import a statement from a reader
    ///
    /// `now` is the import time: it stamps the statement and is the fallback
    /// date for rows whose date cannot be parsed.
    pub fn import_reader<R: BufRead>(
        &self,
        mut reader: R,
        filename: &str,
        operator: &str,
        now: DateTime<Utc>,
    ) -> ReconResult<ImportedStatement> {
        let mut statement = ImportedStatement {
            id: StatementId::new(),
            filename: filename.to_string(),
            format: StatementFormat::default(),
            imported_at: now,
            imported_by: operator.to_string(),
            skipped_rows: 0,
            estimated_dates: 0,
            transactions: Vec::new(),
        };

        let Some(header_line) = read_header_line(&mut reader)? else {
            tracing::warn!(filename, "statement is empty");
            return Ok(statement);
        };

        let delimiter = self
            .delimiter
            .unwrap_or_else(|| detect_delimiter(&header_line));
        statement.format = StatementFormat::from_delimiter(delimiter).unwrap_or_default();

        let headers = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(delimiter)
            .from_reader(header_line.as_bytes())
            .records()
            .next()
            .transpose()
            .map_err(|e| ReconError::Import(format!("Failed to read header row: {}", e)))?
            .unwrap_or_default();
        let mapping = ColumnMapping::detect(&headers);
        tracing::debug!(?mapping, delimiter = %(delimiter as char), "detected statement layout");

        let mut rows = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(delimiter)
            .from_reader(reader);

        // Row numbers are 1-based and count the header as row 1
        for (idx, result) in rows.records().enumerate() {
            let row_number = idx + 2;
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(row = row_number, error = %e, "skipping unreadable row");
                    statement.skipped_rows += 1;
                    continue;
                }
            };

            if record.iter().all(|f| f.is_empty()) {
                continue;
            }

            if record.len() < MIN_FIELDS {
                tracing::warn!(row = row_number, fields = record.len(), "skipping short row");
                statement.skipped_rows += 1;
                continue;
            }

            let txn = parse_row(&record, &mapping, now, row_number);
            if txn.date_estimated {
                statement.estimated_dates += 1;
            }
            statement.transactions.push(txn);
        }

        tracing::info!(
            filename,
            format = %statement.format,
            transactions = statement.transactions.len(),
            skipped = statement.skipped_rows,
            estimated_dates = statement.estimated_dates,
            "statement imported"
        );

        Ok(statement)
    }
}

fn parse_row(
    record: &StringRecord,
    mapping: &ColumnMapping,
    now: DateTime<Utc>,
    row_number: usize,
) -> Transaction {
    let field = |idx: usize| record.get(idx).unwrap_or("");
    let optional = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .filter(|s| !s.is_empty())
    };

    let raw_amount = field(mapping.amount_column);
    let (amount, kind) = parse_signed_amount(raw_amount).unwrap_or_else(|| {
        tracing::warn!(row = row_number, value = raw_amount, "unparseable amount, using zero");
        (Money::zero(), TransactionKind::Deposit)
    });

    let raw_date = field(mapping.date_column);
    let (date, estimated) = match parse_date(raw_date) {
        Some(date) => (date, false),
        None => {
            tracing::warn!(
                row = row_number,
                value = raw_date,
                "unparseable date, using import time"
            );
            (now.date_naive(), true)
        }
    };

    let mut txn = Transaction::with_kind(date, field(mapping.description_column), amount, kind);
    txn.date_estimated = estimated;
    txn.created_at = now;
    txn.balance = optional(mapping.balance_column).and_then(parse_amount);
    txn.reference = optional(mapping.reference_column).map(str::to_string);
    txn
}

/// Lowercase a header and collapse punctuation and whitespace to single spaces
fn normalize_header(header: &str) -> String {
    header
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn alias_matches(header: &str, alias: &str, whole_word: bool) -> bool {
    if whole_word {
        format!(" {} ", header).contains(&format!(" {} ", alias))
    } else {
        header.contains(alias)
    }
}

/// Read up to and including the first non-empty line
fn read_header_line<R: BufRead>(reader: &mut R) -> ReconResult<Option<String>> {
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| ReconError::Import(format!("Failed to read statement: {}", e)))?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_start_matches('\u{feff}').trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
}

/// Pick the candidate delimiter occurring most often outside quotes
pub fn detect_delimiter(line: &str) -> u8 {
    let mut counts = [0usize; 4];
    let mut in_quotes = false;

    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if let Some(pos) = CANDIDATE_DELIMITERS.iter().position(|&d| d == b) {
                counts[pos] += 1;
            }
        }
    }

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    CANDIDATE_DELIMITERS[best]
}

/// Parse a statement amount into a signed value
///
/// Returns `None` if nothing numeric can be recovered.
pub fn parse_amount(s: &str) -> Option<Money> {
    Money::parse_lenient(s)
}

/// Parse a statement amount into a magnitude and direction
///
/// Any negative sign marker makes a withdrawal, even on a zero amount.
pub fn parse_signed_amount(s: &str) -> Option<(Money, TransactionKind)> {
    Money::parse_lenient_parts(s).map(|(amount, negative)| {
        let kind = if negative {
            TransactionKind::Withdrawal
        } else {
            TransactionKind::Deposit
        };
        (amount, kind)
    })
}

/// Parse a statement date
///
/// Tried in order: ISO-8601 (date or date-time), `MM/DD/YYYY` or
/// `DD/MM/YYYY` (day-first only when the first number exceeds 12), then
/// `YYYY/MM/DD`. Returns `None` when nothing fits.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    parse_iso_date(s)
        .or_else(|| parse_numeric_date(s))
        .or_else(|| {
            ["%Y/%m/%d", "%Y.%m.%d"]
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        })
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// `a/b/yyyy` where the order of day and month is ambiguous
fn parse_numeric_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.split_whitespace().next()?;
    let parts: Vec<&str> = date_part.split(['/', '.', '-']).collect();
    if parts.len() != 3 || parts[2].len() != 4 {
        return None;
    }

    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year: i32 = parts[2].parse().ok()?;

    let (month, day) = if first > 12 {
        (second, first)
    } else {
        (first, second)
    };
    NaiveDate::from_ymd_opt(year, month, day)
}
