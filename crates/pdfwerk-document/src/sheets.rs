// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spreadsheet to PDF. Workbooks are read with calamine and laid out as one
// table per sheet: sheet name as a heading, the first row as a header that
// repeats on every page, and column widths proportional to their content.

use std::path::Path;

use calamine::{Reader, open_workbook_auto};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object};
use pdfwerk_core::error::{PdfwerkError, Result};
use tracing::{debug, info, instrument, warn};

use crate::pdf::PdfWriter;

/// US Letter, portrait, in points.
const LETTER: [f32; 2] = [612.0, 792.0];
/// Sheets wider than this switch the whole document to landscape.
const LANDSCAPE_COLUMNS: usize = 5;
const MARGIN: f32 = 36.0;
const FONT_SIZE: f32 = 9.0;
const HEADING_SIZE: f32 = 14.0;
const ROW_HEIGHT: f32 = 13.0;
const CELL_PADDING: f32 = 3.0;
/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.55;

/// One worksheet as rows of display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Read every sheet of the workbook at `path`, in workbook order.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_workbook(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path).map_err(|err| {
        PdfwerkError::OfficeError(format!("failed to open {}: {}", path.display(), err))
    })?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&name).map_err(|err| {
            PdfwerkError::OfficeError(format!("failed to read sheet {name}: {err}"))
        })?;
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        debug!(sheet = %name, rows = rows.len(), "Sheet read");
        sheets.push(Sheet { name, rows });
    }
    Ok(sheets)
}

/// Lay `sheets` out as a PDF at `output`. Returns the page count.
#[instrument(skip(sheets), fields(sheets = sheets.len(), output = %output.display()))]
pub fn write_sheets_pdf(sheets: &[Sheet], output: &Path) -> Result<u32> {
    let printable: Vec<&Sheet> = sheets
        .iter()
        .filter(|sheet| {
            let empty = sheet.rows.is_empty();
            if empty {
                warn!(sheet = %sheet.name, "Empty sheet skipped");
            }
            !empty
        })
        .collect();
    if printable.is_empty() {
        return Err(PdfwerkError::NothingExtracted("no sheets to convert".into()));
    }

    let widest = printable.iter().map(|sheet| sheet.columns()).max().unwrap_or(0);
    let size = if widest > LANDSCAPE_COLUMNS {
        [LETTER[1], LETTER[0]]
    } else {
        LETTER
    };

    let mut writer = PdfWriter::new();
    let resources = font_resources(&mut writer);
    let mut layout = Layout {
        writer: &mut writer,
        resources,
        size,
    };
    for sheet in printable {
        layout.sheet(sheet)?;
    }

    let pages = writer.page_count() as u32;
    writer.write_to_file(output)?;
    info!(pages, landscape = size[0] > size[1], "Workbook converted");
    Ok(pages)
}

/// Helvetica as /F1 and Helvetica-Bold as /F2.
fn font_resources(writer: &mut PdfWriter) -> Dictionary {
    let mut fonts = Dictionary::new();
    for (resource, base) in [("F1", "Helvetica"), ("F2", "Helvetica-Bold")] {
        let mut font = Dictionary::new();
        font.set("Type", Object::Name(b"Font".to_vec()));
        font.set("Subtype", Object::Name(b"Type1".to_vec()));
        font.set("BaseFont", Object::Name(base.as_bytes().to_vec()));
        font.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        fonts.set(resource, Object::Reference(writer.add_object(font)));
    }
    let mut resources = Dictionary::new();
    resources.set("Font", Object::Dictionary(fonts));
    resources
}

struct Layout<'a> {
    writer: &'a mut PdfWriter,
    resources: Dictionary,
    size: [f32; 2],
}

impl Layout<'_> {
    fn top(&self) -> f32 {
        self.size[1] - MARGIN
    }

    fn sheet(&mut self, sheet: &Sheet) -> Result<()> {
        let widths = column_widths(sheet, self.size[0] - 2.0 * MARGIN);
        let (header, body) = sheet.rows.split_at(1);
        let header = &header[0];

        let mut ops = Vec::new();
        let mut y = self.top() - HEADING_SIZE;
        text(&mut ops, "F2", HEADING_SIZE, MARGIN, y, &sheet.name);
        y -= HEADING_SIZE;
        y = row(&mut ops, &widths, y, header, true);

        for cells in body {
            if y - ROW_HEIGHT < MARGIN {
                self.flush(std::mem::take(&mut ops))?;
                y = row(&mut ops, &widths, self.top(), header, true);
            }
            y = row(&mut ops, &widths, y, cells, false);
        }
        self.flush(ops)
    }

    fn flush(&mut self, operations: Vec<Operation>) -> Result<()> {
        let content = Content { operations }.encode().map_err(|err| {
            PdfwerkError::PdfError(format!("failed to encode sheet page: {}", err))
        })?;
        self.writer
            .add_page(self.size, content, self.resources.clone());
        Ok(())
    }
}

/// Widths proportional to each column's longest entry, filling `available`.
fn column_widths(sheet: &Sheet, available: f32) -> Vec<f32> {
    let mut lengths = vec![1usize; sheet.columns()];
    for cells in &sheet.rows {
        for (length, cell) in lengths.iter_mut().zip(cells) {
            *length = (*length).max(cell.chars().count());
        }
    }
    let total: usize = lengths.iter().sum();
    lengths
        .iter()
        .map(|length| available * *length as f32 / total as f32)
        .collect()
}

/// Draw one table row whose top edge is at `top`; returns the next row's top.
fn row(ops: &mut Vec<Operation>, widths: &[f32], top: f32, cells: &[String], header: bool) -> f32 {
    let bottom = top - ROW_HEIGHT;
    let width: f32 = widths.iter().sum();
    if header {
        ops.extend([
            Operation::new("q", vec![]),
            Operation::new("g", vec![Object::Real(0.85)]),
            Operation::new(
                "re",
                vec![
                    Object::Real(MARGIN),
                    Object::Real(bottom),
                    Object::Real(width),
                    Object::Real(ROW_HEIGHT),
                ],
            ),
            Operation::new("f", vec![]),
            Operation::new("Q", vec![]),
        ]);
    }

    let font = if header { "F2" } else { "F1" };
    let mut x = MARGIN;
    for (column, width) in widths.iter().enumerate() {
        if let Some(cell) = cells.get(column) {
            let fitted = fit(cell, *width - 2.0 * CELL_PADDING);
            text(ops, font, FONT_SIZE, x + CELL_PADDING, bottom + 3.5, &fitted);
        }
        x += width;
    }

    ops.extend([
        Operation::new("G", vec![Object::Real(0.6)]),
        Operation::new("w", vec![Object::Real(0.5)]),
        Operation::new("m", vec![Object::Real(MARGIN), Object::Real(bottom)]),
        Operation::new("l", vec![Object::Real(MARGIN + width), Object::Real(bottom)]),
        Operation::new("S", vec![]),
    ]);
    bottom
}

fn text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, value: &str) {
    if value.is_empty() {
        return;
    }
    ops.extend([
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), Object::Real(size)],
        ),
        Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
        Operation::new("Tj", vec![Object::string_literal(win_ansi(value))]),
        Operation::new("ET", vec![]),
    ]);
}

/// Truncate `value` to roughly fit `width` points at the body font size.
fn fit(value: &str, width: f32) -> String {
    let max_chars = (width / (FONT_SIZE * GLYPH_WIDTH)).floor().max(1.0) as usize;
    value.chars().take(max_chars).collect()
}

/// Latin-1 bytes for the standard fonts; anything else becomes `?`.
fn win_ansi(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|ch| match u8::try_from(u32::from(ch)) {
            Ok(byte) if !ch.is_control() => byte,
            Ok(_) => b' ',
            Err(_) => b'?',
        })
        .collect()
}
