//! Row serialization for exports.

use std::borrow::Cow;

use csv::{Terminator, WriterBuilder};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use super::error::ExportError;
use super::options::{ExportFormat, FileFormat};
use crate::import::IMPORT_COLUMNS;
use crate::journal::JournalEntry;

/// Column order of the summary export.
pub const SUMMARY_COLUMNS: [&str; 5] = ["entry_id", "reference", "date", "total_amount", "status"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Leading characters a spreadsheet treats as the start of a formula.
const FORMULA_TRIGGERS: [char; 4] = ['=', '+', '-', '@'];

/// Serialized rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    /// File contents.
    pub bytes: Vec<u8>,
    /// Entries written.
    pub entries: usize,
    /// Data rows written, header excluded.
    pub rows: usize,
    /// True if cancellation stopped the write early.
    pub truncated: bool,
}

/// Writes `entries` in the given layout and encoding.
///
/// Cancellation is checked between entries, so a truncated file never
/// contains a partial entry.
///
/// Excel output quotes text cells that a spreadsheet would otherwise
/// evaluate as a formula; CSV output is written verbatim so it can be
/// imported again unchanged.
///
/// # Errors
///
/// Returns `ExportError::Write` if serialization fails, or
/// `ExportError::AmountOverflow` if a summary total cannot be computed.
pub fn write_entries(
    entries: &[JournalEntry],
    format: ExportFormat,
    file_format: FileFormat,
    cancel: &CancellationToken,
) -> Result<Written, ExportError> {
    let (prefix, terminator): (&[u8], _) = match file_format {
        FileFormat::Csv => (&[], Terminator::Any(b'\n')),
        FileFormat::Excel => (UTF8_BOM, Terminator::CRLF),
    };
    let mut writer = WriterBuilder::new()
        .terminator(terminator)
        .from_writer(prefix.to_vec());

    match format {
        ExportFormat::Detailed => writer.write_record(IMPORT_COLUMNS)?,
        ExportFormat::Summary => writer.write_record(SUMMARY_COLUMNS)?,
    }

    let mut written = 0;
    let mut rows = 0;
    let mut truncated = false;

    for entry in entries {
        if cancel.is_cancelled() {
            truncated = true;
            break;
        }

        let date = entry.date.format(DATE_FORMAT).to_string();
        let reference = text_cell(&entry.reference, file_format);
        match format {
            ExportFormat::Detailed => {
                let memo = text_cell(&entry.memo, file_format);
                for line in &entry.lines {
                    writer.write_record([
                        date.as_str(),
                        &*reference,
                        &*memo,
                        line.account_code.as_str(),
                        amount_cell(line.debit).as_str(),
                        amount_cell(line.credit).as_str(),
                        &*text_cell(line.department.as_deref().unwrap_or_default(), file_format),
                        &*text_cell(line.project.as_deref().unwrap_or_default(), file_format),
                    ])?;
                    rows += 1;
                }
            }
            ExportFormat::Summary => {
                let total = entry
                    .total_amount()
                    .ok_or(ExportError::AmountOverflow { entry_id: entry.id })?;
                writer.write_record([
                    entry.id.to_string().as_str(),
                    &*reference,
                    date.as_str(),
                    total.to_string().as_str(),
                    entry.status.as_str(),
                ])?;
                rows += 1;
            }
        }
        written += 1;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Write(e.error().to_string()))?;

    Ok(Written {
        bytes,
        entries: written,
        rows,
        truncated,
    })
}

/// Prefixes Excel text cells that start with a formula trigger with `'`.
fn text_cell(value: &str, file_format: FileFormat) -> Cow<'_, str> {
    match file_format {
        FileFormat::Excel if value.starts_with(FORMULA_TRIGGERS) => Cow::Owned(format!("'{value}")),
        _ => Cow::Borrowed(value),
    }
}

/// The inactive side of a line is written as an empty cell.
fn amount_cell(amount: Decimal) -> String {
    if amount.is_zero() {
        String::new()
    } else {
        amount.to_string()
    }
}
