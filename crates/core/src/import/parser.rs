//! CSV reading and row grouping.
//!
//! Rows are grouped into candidate entries by `(reference, date)` in order of
//! first appearance. Rows without a reference cannot be grouped and are
//! reported on their own.

use std::collections::HashMap;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::error::ImportError;

/// Column order of the import format (and the detailed export).
pub const IMPORT_COLUMNS: [&str; 8] = [
    "date",
    "reference",
    "memo",
    "account_code",
    "debit",
    "credit",
    "department",
    "project",
];

const REQUIRED_COLUMNS: [&str; 5] = ["date", "reference", "account_code", "debit", "credit"];

/// One data record, fields trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// Line the record starts on (1-based, header included).
    pub line: u64,
    /// Date text, unparsed.
    pub date: String,
    /// Grouping reference.
    pub reference: String,
    /// Entry memo.
    pub memo: String,
    /// Account code.
    pub account_code: String,
    /// Debit text, unparsed.
    pub debit: String,
    /// Credit text, unparsed.
    pub credit: String,
    /// Department tag.
    pub department: String,
    /// Project tag.
    pub project: String,
}

/// Rows that form one candidate entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    /// Shared reference.
    pub reference: String,
    /// Shared date text.
    pub date: String,
    /// Member rows, in file order.
    pub rows: Vec<RawRow>,
}

impl RowGroup {
    /// Lines of the member rows.
    #[must_use]
    pub fn lines(&self) -> Vec<u64> {
        self.rows.iter().map(|r| r.line).collect()
    }
}

/// A unit of import work, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportUnit {
    /// A row that has no reference.
    Orphan(RawRow),
    /// A group of rows forming one entry.
    Group(RowGroup),
}

/// Positions of the known columns within a record.
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    date: usize,
    reference: usize,
    memo: Option<usize>,
    account_code: usize,
    debit: usize,
    credit: usize,
    department: Option<usize>,
    project: Option<usize>,
}

impl ColumnMap {
    const fn positional() -> Self {
        Self {
            date: 0,
            reference: 1,
            memo: Some(2),
            account_code: 3,
            debit: 4,
            credit: 5,
            department: Some(6),
            project: Some(7),
        }
    }

    fn from_header(header: &StringRecord) -> Result<Self, ImportError> {
        let names: Vec<String> = header.iter().map(normalize_column).collect();
        let find = |column: &str| {
            let wanted = normalize_column(column);
            names.iter().position(|name| *name == wanted)
        };

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| find(column).is_none())
            .map(ToString::to_string)
            .collect();

        match (
            find("date"),
            find("reference"),
            find("account_code"),
            find("debit"),
            find("credit"),
        ) {
            (Some(date), Some(reference), Some(account_code), Some(debit), Some(credit)) => {
                Ok(Self {
                    date,
                    reference,
                    memo: find("memo"),
                    account_code,
                    debit,
                    credit,
                    department: find("department"),
                    project: find("project"),
                })
            }
            _ => Err(ImportError::MissingColumns(missing)),
        }
    }

    fn read(&self, record: &StringRecord, line: u64) -> RawRow {
        let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();
        let optional = |idx: Option<usize>| idx.map(&field).unwrap_or_default();

        RawRow {
            line,
            date: field(self.date),
            reference: field(self.reference),
            memo: optional(self.memo),
            account_code: field(self.account_code),
            debit: field(self.debit),
            credit: field(self.credit),
            department: optional(self.department),
            project: optional(self.project),
        }
    }
}

/// `Account Code`, `account_code` and `accountCode` all name the same column.
fn normalize_column(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Reads CSV text into rows.
///
/// A leading UTF-8 byte order mark is ignored. Blank records are skipped.
///
/// # Errors
///
/// Returns `ImportError::MissingColumns` when a header lacks required
/// columns and `ImportError::Csv` when the text cannot be read.
pub fn parse_rows(csv_text: &str, has_header: bool) -> Result<Vec<RawRow>, ImportError> {
    let text = csv_text.strip_prefix('\u{feff}').unwrap_or(csv_text);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut columns = (!has_header).then(ColumnMap::positional);
    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let Some(map) = columns else {
            columns = Some(ColumnMap::from_header(&record)?);
            continue;
        };

        let line = record.position().map_or(0, csv::Position::line);
        rows.push(map.read(&record, line));
    }

    Ok(rows)
}

/// Groups rows into import units, keeping first-appearance order.
#[must_use]
pub fn group_rows(rows: Vec<RawRow>) -> Vec<ImportUnit> {
    let mut units: Vec<ImportUnit> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for row in rows {
        if row.reference.is_empty() {
            units.push(ImportUnit::Orphan(row));
            continue;
        }

        let key = (row.reference.clone(), row.date.clone());
        match index.get(&key) {
            Some(&at) => {
                if let ImportUnit::Group(group) = &mut units[at] {
                    group.rows.push(row);
                }
            }
            None => {
                index.insert(key, units.len());
                units.push(ImportUnit::Group(RowGroup {
                    reference: row.reference.clone(),
                    date: row.date.clone(),
                    rows: vec![row],
                }));
            }
        }
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
date,reference,memo,account_code,debit,credit,department,project
2024-01-05,JE-1,Office rent,6100,1200.00,,OPS,
2024-01-05,JE-1,,1000,,1200.00,,
2024-01-06,JE-2,Supplies,6200,80.00,,,P-7
2024-01-06,JE-2,,2000,,80.00,,
";

    #[test]
    fn test_parse_with_header() {
        let rows = parse_rows(SAMPLE, true).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].reference, "JE-1");
        assert_eq!(rows[0].department, "OPS");
        assert_eq!(rows[2].project, "P-7");
        assert_eq!(rows[1].credit, "1200.00");
    }

    #[test]
    fn test_header_maps_columns_by_name() {
        let text = "Reference,Account Code,Credit,Debit,Date\nJE-9,4000,50.00,,2024-02-01\n";
        let rows = parse_rows(text, true).unwrap();
        assert_eq!(rows[0].reference, "JE-9");
        assert_eq!(rows[0].account_code, "4000");
        assert_eq!(rows[0].credit, "50.00");
        assert_eq!(rows[0].date, "2024-02-01");
        assert_eq!(rows[0].memo, "");
    }

    #[test]
    fn test_missing_columns() {
        let err = parse_rows("date,reference,account_code\n", true).unwrap_err();
        assert_eq!(
            err,
            ImportError::MissingColumns(vec!["debit".to_string(), "credit".to_string()])
        );
    }

    #[test]
    fn test_positional_without_header() {
        let rows = parse_rows("2024-01-05,JE-1,Rent,6100,10.00,\n", false).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].line, 1);
        assert_eq!(rows[0].debit, "10.00");
        assert_eq!(rows[0].department, "");
    }

    #[test]
    fn test_bom_and_blank_records_ignored() {
        let text = format!("\u{feff}{SAMPLE},,,,,,,\n");
        let rows = parse_rows(&text, true).unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_rows("", true).unwrap().is_empty());
    }

    #[test]
    fn test_grouping_by_reference_and_date() {
        let text = "\
date,reference,memo,account_code,debit,credit
2024-01-05,JE-1,,6100,10.00,
2024-01-06,JE-2,,6100,5.00,
,,orphan,6100,1.00,
2024-01-05,JE-1,,1000,,10.00
2024-01-07,JE-1,,1000,,3.00
";
        let units = group_rows(parse_rows(text, true).unwrap());
        assert_eq!(units.len(), 4);

        match &units[0] {
            ImportUnit::Group(group) => {
                assert_eq!(group.reference, "JE-1");
                assert_eq!(group.lines(), vec![2, 5]);
            }
            ImportUnit::Orphan(_) => panic!("expected group"),
        }
        assert!(matches!(&units[1], ImportUnit::Group(g) if g.reference == "JE-2"));
        assert!(matches!(&units[2], ImportUnit::Orphan(row) if row.line == 4));
        assert!(matches!(&units[3], ImportUnit::Group(g) if g.date == "2024-01-07"));
    }
}
