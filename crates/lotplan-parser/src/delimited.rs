//! Comma/semicolon separated uploads
//!
//! Cells are kept as text; numeric coercion happens during normalization,
//! which already handles decimal commas.

use crate::{unnamed_header, ParseError};
use csv::{ReaderBuilder, Trim};
use lotplan_core::{CellValue, RawRow, RawTable};

/// Pick `;` when the header line has more semicolons than commas.
///
/// Spreadsheet exports in locales with a decimal comma use `;`.
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let commas = header.iter().filter(|b| **b == b',').count();
    let semicolons = header.iter().filter(|b| **b == b';').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

pub fn read(bytes: &[u8]) -> Result<RawTable, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .delimiter(sniff_delimiter(bytes))
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| {
            let h = h.trim_start_matches('\u{feff}').trim();
            if h.is_empty() {
                unnamed_header(idx)
            } else {
                h.to_string()
            }
        })
        .collect();
    if headers.is_empty() {
        return Err(ParseError::EmptySheet);
    }

    let mut table = RawTable::new(headers);
    for result in reader.records() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(table.len() + 2);
        let cells: Vec<CellValue> = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::text(value)
                }
            })
            .collect();
        let row = RawRow::new(line, cells);
        if row.is_blank() {
            continue;
        }
        table.push(row);
    }

    tracing::debug!(rows = table.len(), columns = table.headers.len(), "read delimited upload");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_headers_and_rows() {
        let table = read(b"salle,lot\n101,L1\n102,L2\n").unwrap();
        assert_eq!(table.headers, vec!["salle", "lot"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].cells, vec![CellValue::text("101"), CellValue::text("L1")]);
    }

    #[test]
    fn keeps_source_line_numbers() {
        let table = read(b"salle,lot\n101,L1\n,\n102,L2\n").unwrap();
        assert_eq!(table.len(), 2, "blank row skipped");
        assert_eq!(table.rows[0].line, 2);
        assert_eq!(table.rows[1].line, 4);
    }

    #[test]
    fn semicolon_exports_are_detected() {
        let table = read(b"salle;Run Time\n101;1500,5\n").unwrap();
        assert_eq!(table.headers, vec!["salle", "Run Time"]);
        assert_eq!(table.rows[0].cell(1).to_text(), "1500,5");
    }

    #[test]
    fn empty_cells_and_blank_headers() {
        let table = read(b"salle,,lot\n101,,L1\n").unwrap();
        assert_eq!(table.headers, vec!["salle", "Unnamed: 1", "lot"]);
        assert_eq!(table.rows[0].cell(1), &CellValue::Empty);
    }

    #[test]
    fn short_records_are_allowed() {
        let table = read(b"a,b,c\n1\n").unwrap();
        assert_eq!(table.rows[0].cells.len(), 1);
        assert_eq!(table.rows[0].cell(2), &CellValue::Empty);
    }

    #[test]
    fn utf8_bom_is_stripped() {
        let table = read("\u{feff}salle,lot\n1,2\n".as_bytes()).unwrap();
        assert_eq!(table.headers[0], "salle");
    }

    #[test]
    fn sniff_prefers_comma_on_tie() {
        assert_eq!(sniff_delimiter(b"a\n"), b',');
        assert_eq!(sniff_delimiter(b"a;b,c\n"), b',');
        assert_eq!(sniff_delimiter(b"a;b;c,d\n"), b';');
    }
}
