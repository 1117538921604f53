//! Reading cases from CSV uploads and hand-typed lists.
//!
//! Bad lines are collected rather than failing the whole input, so a typo on
//! one line does not throw away the rest of the batch.

use std::io::Read;

use crate::assigner::Item;
use crate::error::ParseError;

pub const DEFAULT_NAME_COLUMN: &str = "Case Name";
pub const DEFAULT_WEIGHT_COLUMN: &str = "Number of Pages";

/// Cases that parsed cleanly plus the lines or rows that did not
#[derive(Debug, Default)]
pub struct ParsedItems {
    pub items: Vec<Item>,
    pub rejected: Vec<ParseError>,
}

impl ParsedItems {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Parse one `Case Name - Pages` entry per line.
///
/// The page count follows the last hyphen, so names may contain hyphens
/// themselves. Blank lines are ignored.
pub fn parse_text(input: &str) -> ParsedItems {
    let mut parsed = ParsedItems::default();

    for (idx, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(line) {
            Ok(item) => parsed.items.push(item),
            Err(reason) => parsed.rejected.push(ParseError::Line {
                line: idx + 1,
                reason,
            }),
        }
    }

    parsed
}

fn parse_line(line: &str) -> Result<Item, String> {
    let (name, pages) = line
        .rsplit_once('-')
        .ok_or_else(|| format!("expected \"Case Name - Pages\", got \"{}\"", line.trim()))?;

    let name = name.trim();
    let pages = pages.trim();

    // "Name - -3" or "Name - - 3": the last hyphen was a minus sign
    if name.ends_with('-') && pages.parse::<i64>().is_ok() {
        return Err(format!("page count must be non-negative, got -{}", pages));
    }

    if name.is_empty() {
        return Err("case name is empty".to_string());
    }

    let weight = parse_weight(pages)?;
    Ok(Item::new(name, weight))
}

/// Parse a CSV file with a header row, taking the case name and page count
/// from the named columns.
pub fn parse_csv<R: Read>(
    reader: R,
    name_column: &str,
    weight_column: &str,
) -> Result<ParsedItems, ParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let name_idx = column_index(&headers, name_column)?;
    let weight_idx = column_index(&headers, weight_column)?;

    let mut parsed = ParsedItems::default();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let row = e.position().map(|p| p.line()).unwrap_or(0);
                parsed.rejected.push(ParseError::Row {
                    row,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let row = record.position().map(|p| p.line()).unwrap_or(0);

        let item = match (record.get(name_idx), record.get(weight_idx)) {
            (Some(""), _) | (None, _) => Err("case name is empty".to_string()),
            (_, None) => Err(format!("missing {} value", weight_column)),
            (Some(name), Some(pages)) => parse_weight(pages).map(|w| Item::new(name, w)),
        };

        match item {
            Ok(item) => parsed.items.push(item),
            Err(reason) => parsed.rejected.push(ParseError::Row { row, reason }),
        }
    }

    Ok(parsed)
}

fn column_index(headers: &csv::StringRecord, column: &str) -> Result<usize, ParseError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| ParseError::MissingColumn(column.to_string()))
}

fn parse_weight(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    let weight: i64 = raw
        .parse()
        .map_err(|_| format!("invalid page count \"{}\"", raw))?;

    if weight < 0 {
        return Err(format!("page count must be non-negative, got {}", weight));
    }

    Ok(weight)
}
