// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Table detection on extracted page text, and workbook export of the result.
//
// A table is a run of at least two consecutive lines that split into the
// same number (two or more) of cells, cells being separated by a tab or by
// two or more spaces.

use std::path::Path;

use pdfwerk_core::error::{PdfwerkError, Result};
use rust_xlsxwriter::{Workbook, XlsxError};
use tracing::{debug, info};

/// Minimum rows before a run of aligned lines counts as a table.
const MIN_ROWS: usize = 2;

/// A table found on one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// 1-based page the table was found on.
    pub page: u32,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn columns(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

/// Split a line into cells on tabs and runs of two or more spaces.
///
/// A tab always closes a cell, so consecutive tabs keep the blank cell
/// between them. Blank cells at either end of the line are dropped.
fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut spaces = 0;

    for ch in line.trim().chars() {
        match ch {
            '\t' => {
                cells.push(std::mem::take(&mut current));
                spaces = 0;
            }
            ' ' => spaces += 1,
            _ => {
                if spaces >= 2 && !current.is_empty() {
                    cells.push(std::mem::take(&mut current));
                } else if spaces > 0 && !current.is_empty() {
                    current.push(' ');
                }
                spaces = 0;
                current.push(ch);
            }
        }
    }
    cells.push(current);

    let mut cells: Vec<String> = cells.into_iter().map(|cell| cell.trim().to_string()).collect();
    while cells.last().is_some_and(String::is_empty) {
        cells.pop();
    }
    let leading = cells.iter().take_while(|cell| cell.is_empty()).count();
    cells.drain(..leading);
    cells
}

/// Find the tables in one page's text.
pub fn detect_tables(page: u32, text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut run: Vec<Vec<String>> = Vec::new();

    let mut flush = |run: &mut Vec<Vec<String>>| {
        if run.len() >= MIN_ROWS {
            tables.push(Table {
                page,
                rows: std::mem::take(run),
            });
        } else {
            run.clear();
        }
    };

    for line in text.lines() {
        let cells = split_cells(line);
        let continues = cells.len() >= 2 && run.first().is_none_or(|row| row.len() == cells.len());
        if !continues {
            flush(&mut run);
        }
        if cells.len() >= 2 {
            run.push(cells);
        }
    }
    flush(&mut run);

    debug!(page, found = tables.len(), "Tables detected");
    tables
}

fn workbook_error(err: XlsxError) -> PdfwerkError {
    PdfwerkError::OfficeError(format!("failed to write workbook: {err}"))
}

/// Write `tables` to an xlsx workbook, one sheet per table named
/// `Table_N`. No header row is assumed; blank cells stay empty.
pub fn write_workbook(tables: &[Table], output: &Path) -> Result<()> {
    let mut workbook = Workbook::new();

    for (index, table) in tables.iter().enumerate() {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(format!("Table_{}", index + 1))
            .map_err(workbook_error)?;

        for (row, cells) in table.rows.iter().enumerate() {
            let row = u32::try_from(row).map_err(|_| {
                PdfwerkError::OfficeError(format!("table {} has too many rows", index + 1))
            })?;
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                let col = u16::try_from(col).map_err(|_| {
                    PdfwerkError::OfficeError(format!("table {} has too many columns", index + 1))
                })?;
                worksheet
                    .write_string(row, col, cell.as_str())
                    .map_err(workbook_error)?;
            }
        }
    }

    workbook.save(output).map_err(workbook_error)?;
    info!(sheets = tables.len(), output = %output.display(), "Workbook written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx, open_workbook};

    #[test]
    fn cells_split_on_wide_gaps_only() {
        assert_eq!(
            split_cells("Unit price   Qty\tTotal"),
            vec!["Unit price", "Qty", "Total"]
        );
        assert_eq!(split_cells("plain sentence here"), vec!["plain sentence here"]);
        assert!(split_cells("   ").is_empty());
    }

    #[test]
    fn blank_tab_cells_are_kept() {
        assert_eq!(split_cells("Bob\t\tParis"), vec!["Bob", "", "Paris"]);
        assert_eq!(split_cells("a\t  b"), vec!["a", "b"]);
        assert_eq!(split_cells("\tx\ty\t\t"), vec!["x", "y"]);
    }

    #[test]
    fn table_with_a_blank_cell_survives() {
        let tables = detect_tables(1, "Name\tAge\tCity\nBob\t\tParis\nAnn\t30\tRome");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[0].rows[1], vec!["Bob", "", "Paris"]);
    }

    #[test]
    fn aligned_lines_form_a_table() {
        let text = "Invoice 42\n\
                    Item    Qty    Price\n\
                    Bolt    10     0.20\n\
                    Nut     25     0.05\n\
                    Thank you for your order";
        let tables = detect_tables(3, text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].page, 3);
        assert_eq!(tables[0].columns(), 3);
        assert_eq!(tables[0].rows[2], vec!["Nut", "25", "0.05"]);
    }

    #[test]
    fn column_count_change_starts_a_new_table() {
        let text = "a  b\nc  d\nx  y  z\nu  v  w";
        let tables = detect_tables(1, text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1].columns(), 3);
    }

    #[test]
    fn single_aligned_line_is_not_a_table() {
        assert!(detect_tables(1, "Name    Value\nprose follows").is_empty());
        assert!(detect_tables(1, "").is_empty());
    }

    #[test]
    fn workbook_has_a_sheet_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report_tables.xlsx");
        let tables = vec![
            Table {
                page: 1,
                rows: vec![vec!["a".into(), "b".into()], vec!["1".into(), "2".into()]],
            },
            Table {
                page: 4,
                rows: vec![
                    vec!["x, y".into(), "z".into(), "w".into()],
                    vec!["Bob".into(), "".into(), "Paris".into()],
                ],
            },
        ];
        write_workbook(&tables, &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Table_1", "Table_2"]);

        let second = workbook.worksheet_range("Table_2").unwrap();
        assert_eq!(second.get_value((0, 0)), Some(&Data::String("x, y".into())));
        assert_eq!(second.get_value((1, 2)), Some(&Data::String("Paris".into())));
    }
}
