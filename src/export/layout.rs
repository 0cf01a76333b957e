//! Table layout for the tabular document
//!
//! Measures and wraps cell text, sizes columns and rows, and splits the table over as
//! many pages as it needs, repeating the header on each. The output is one list of
//! PDF content operations per page; the document builder only adds the page frame.
//!
//! All positions here are millimetres measured from the top-left corner of the page
//! and converted to PDF user space (points, bottom-left origin) when emitted.

use crate::types::{Rgb, TableStyle};
use lopdf::content::Operation;
use lopdf::Object;

pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Resource names of the fonts the document builder registers
pub const FONT_REGULAR: &str = "F1";
pub const FONT_BOLD: &str = "F2";

/// Narrowest a data column may be squeezed to
const MIN_COLUMN_WIDTH: f32 = 8.0;

/// Largest share of the free width a single data column may take
const MAX_COLUMN_SHARE: f32 = 0.5;

/// Approximate Helvetica advance width of `c`, in em
fn char_advance(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '\'' | '|' | '.' | ',' | ':' | ';' | '!' => 0.25,
        ' ' | 'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '-' | '/' => 0.32,
        'm' | 'w' | 'M' | 'W' | '@' => 0.85,
        '0'..='9' => 0.556,
        c if c.is_uppercase() => 0.68,
        _ => 0.52,
    }
}

/// Width of `text` at `font_size` points, in millimetres
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_advance).sum::<f32>() * font_size / PT_PER_MM
}

/// Break `text` into lines no wider than `max_width` mm.
///
/// Explicit newlines are kept, words wrap on spaces, and words wider than a whole
/// line are split between characters. Always yields at least one line.
pub fn wrap_text(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();

        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if text_width(&candidate, font_size) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            // Hard-break a word that cannot fit on a line of its own
            for c in word.chars() {
                current.push(c);
                if text_width(&current, font_size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }

        lines.push(current);
    }

    lines
}

/// Encode text for a standard Type1 font (WinAnsi); unmappable characters become `?`
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            0x09 => b' ',
            _ => b'?',
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Head,
    Body { alternate: bool },
}

/// A row with its cells already wrapped to their column widths
struct MeasuredRow {
    lines: Vec<Vec<String>>,
    height: f32,
}

impl MeasuredRow {
    fn line_count(&self) -> usize {
        self.lines.iter().map(Vec::len).max().unwrap_or(1)
    }
}

/// Split `rest` mm between columns in proportion to `natural`.
///
/// With two or more columns none ends up wider than `MAX_COLUMN_SHARE` of `rest`;
/// width taken off a capped column goes to the others. The result always sums to `rest`.
fn share_width(natural: &[f32], rest: f32) -> Vec<f32> {
    let cap = if natural.len() > 1 { rest * MAX_COLUMN_SHARE } else { rest };
    let mut widths = vec![0.0; natural.len()];
    let mut capped = vec![false; natural.len()];

    loop {
        let taken: f32 = widths.iter().zip(&capped).filter(|(_, c)| **c).map(|(w, _)| *w).sum();
        let weight: f32 = natural.iter().zip(&capped).filter(|(_, c)| !**c).map(|(n, _)| *n).sum();
        let free = rest - taken;

        let mut newly_capped = false;
        for (col, &n) in natural.iter().enumerate() {
            if capped[col] {
                continue;
            }
            widths[col] = if weight > 0.0 { n / weight * free } else { 0.0 };
            if widths[col] > cap {
                widths[col] = cap;
                capped[col] = true;
                newly_capped = true;
            }
        }

        if !newly_capped {
            return widths;
        }
    }
}

/// Lays a header and body out over fixed-size pages
pub struct TableLayout<'a> {
    style: &'a TableStyle,
}

impl<'a> TableLayout<'a> {
    pub fn new(style: &'a TableStyle) -> Self {
        TableLayout { style }
    }

    /// Lay out the table and return the drawing operations for every page, in order
    pub fn layout(&self, header: &[String], body: &[Vec<String>]) -> Vec<Vec<Operation>> {
        let style = self.style;
        let widths = self.column_widths(header, body);

        let head = self.measure(header, &widths);
        let rows: Vec<MeasuredRow> = body.iter().map(|row| self.measure(row, &widths)).collect();

        let bottom = style.page_height - style.margin_bottom;
        let fresh_top = style.margin_top + head.height;
        let mut pages = Vec::new();
        let mut ops = Vec::new();
        let mut y = style.start_y;

        self.draw_row(&mut ops, &head, &widths, y, RowKind::Head);
        y += head.height;
        let mut rows_on_page = 0;

        for (i, row) in rows.iter().enumerate() {
            let kind = RowKind::Body { alternate: i % 2 == 1 };

            // A row that fits on a fresh page moves there whole
            if y + row.height > bottom && rows_on_page > 0 && row.height <= bottom - fresh_top {
                self.break_page(&mut pages, &mut ops, &head, &widths, &mut y);
                rows_on_page = 0;
            }

            if y + row.height <= bottom {
                self.draw_row(&mut ops, row, &widths, y, kind);
                y += row.height;
                rows_on_page += 1;
                continue;
            }

            // Taller than a page: split into line ranges, one piece per page
            let total_lines = row.line_count();
            let mut start = 0;
            loop {
                let mut capacity = self.lines_fitting(bottom - y);
                if capacity == 0 {
                    if rows_on_page > 0 {
                        self.break_page(&mut pages, &mut ops, &head, &widths, &mut y);
                        rows_on_page = 0;
                        continue;
                    }
                    capacity = 1;
                }

                let take = capacity.min(total_lines - start);
                let piece = self.slice_row(row, start, take);
                self.draw_row(&mut ops, &piece, &widths, y, kind);
                y += piece.height;
                rows_on_page += 1;
                start += take;

                if start >= total_lines {
                    break;
                }
                self.break_page(&mut pages, &mut ops, &head, &widths, &mut y);
                rows_on_page = 0;
            }
        }

        pages.push(ops);
        log::debug!("laid out {} table rows over {} pages", rows.len(), pages.len());
        pages
    }

    /// Fixed narrow index column, remaining width shared in proportion to content
    fn column_widths(&self, header: &[String], body: &[Vec<String>]) -> Vec<f32> {
        let style = self.style;
        let available = style.page_width - style.margin_left - style.margin_right;
        let rest = (available - style.index_column_width).max(0.0);

        let natural: Vec<f32> = (1..header.len())
            .map(|col| {
                let widest = std::iter::once(&header[col])
                    .chain(body.iter().filter_map(|row| row.get(col)))
                    .flat_map(|cell| cell.split('\n'))
                    .map(|line| text_width(line, style.font_size))
                    .fold(0.0, f32::max);
                (widest + 2.0 * style.cell_padding).max(MIN_COLUMN_WIDTH)
            })
            .collect();

        let mut widths = Vec::with_capacity(header.len());
        widths.push(style.index_column_width);
        widths.extend(share_width(&natural, rest));
        widths
    }

    /// Close the current page and start the next one with the header repeated
    fn break_page(
        &self,
        pages: &mut Vec<Vec<Operation>>,
        ops: &mut Vec<Operation>,
        head: &MeasuredRow,
        widths: &[f32],
        y: &mut f32,
    ) {
        pages.push(std::mem::take(ops));
        *y = self.style.margin_top;
        self.draw_row(ops, head, widths, *y, RowKind::Head);
        *y += head.height;
    }

    /// Whole text lines that fit in `space` mm of row height
    fn lines_fitting(&self, space: f32) -> usize {
        let usable = space - 2.0 * self.style.cell_padding;
        if usable <= 0.0 {
            return 0;
        }
        (usable / self.line_height() + 1e-3).floor() as usize
    }

    /// Lines `start..start + take` of every cell; the index cell repeats on each piece
    fn slice_row(&self, row: &MeasuredRow, start: usize, take: usize) -> MeasuredRow {
        let lines: Vec<Vec<String>> = row
            .lines
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                let from = if col == 0 { 0 } else { start.min(cell.len()) };
                let to = (from + take).min(cell.len());
                cell[from..to].to_vec()
            })
            .collect();

        MeasuredRow {
            height: take as f32 * self.line_height() + 2.0 * self.style.cell_padding,
            lines,
        }
    }

    fn line_height(&self) -> f32 {
        self.style.font_size * self.style.line_spacing / PT_PER_MM
    }

    fn measure(&self, cells: &[String], widths: &[f32]) -> MeasuredRow {
        let inner = |w: f32| (w - 2.0 * self.style.cell_padding).max(0.0);
        let lines: Vec<Vec<String>> = widths
            .iter()
            .enumerate()
            .map(|(col, &w)| {
                let text = cells.get(col).map(String::as_str).unwrap_or("");
                wrap_text(text, self.style.font_size, inner(w))
            })
            .collect();

        let max_lines = lines.iter().map(Vec::len).max().unwrap_or(1);
        MeasuredRow {
            height: max_lines as f32 * self.line_height() + 2.0 * self.style.cell_padding,
            lines,
        }
    }

    fn draw_row(&self, ops: &mut Vec<Operation>, row: &MeasuredRow, widths: &[f32], top: f32, kind: RowKind) {
        let style = self.style;
        let total_width: f32 = widths.iter().sum();

        let (fill, text_color, font) = match kind {
            RowKind::Head => (Some(style.head_fill), style.head_text, FONT_BOLD),
            RowKind::Body { alternate: true } => (Some(style.alternate_fill), style.body_text, FONT_REGULAR),
            RowKind::Body { alternate: false } => (None, style.body_text, FONT_REGULAR),
        };

        if let Some(fill) = fill {
            ops.push(color_op("rg", fill));
            ops.push(self.rect(style.margin_left, top, total_width, row.height));
            ops.push(Operation::new("f", vec![]));
        }

        // Grid
        ops.push(color_op("RG", style.grid_color));
        ops.push(Operation::new("w", vec![(style.grid_line_width * PT_PER_MM).into()]));
        let mut x = style.margin_left;
        for &w in widths {
            ops.push(self.rect(x, top, w, row.height));
            ops.push(Operation::new("S", vec![]));
            x += w;
        }

        // Text, vertically centred in the row
        let line_height = self.line_height();
        let ascent = style.font_size * 0.8 / PT_PER_MM;
        ops.push(color_op("rg", text_color));

        let mut x = style.margin_left;
        for (col, (&w, lines)) in widths.iter().zip(&row.lines).enumerate() {
            let align = if col == 0 { Align::Center } else { Align::Left };
            let block = lines.len() as f32 * line_height;
            let first_baseline = top + (row.height - block) / 2.0 + (line_height - ascent) / 2.0 + ascent;

            for (k, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let tx = match align {
                    Align::Left => x + style.cell_padding,
                    Align::Center => x + (w - text_width(line, style.font_size)) / 2.0,
                };
                let baseline = first_baseline + k as f32 * line_height;
                push_text(ops, font, style.font_size, tx, self.to_pdf_y(baseline), line);
            }
            x += w;
        }
    }

    fn rect(&self, x: f32, top: f32, w: f32, h: f32) -> Operation {
        Operation::new(
            "re",
            vec![
                (x * PT_PER_MM).into(),
                self.to_pdf_y(top + h).into(),
                (w * PT_PER_MM).into(),
                (h * PT_PER_MM).into(),
            ],
        )
    }

    /// Convert a distance from the page top (mm) to a PDF y coordinate (pt)
    pub fn to_pdf_y(&self, from_top: f32) -> f32 {
        (self.style.page_height - from_top) * PT_PER_MM
    }
}

/// Set the fill (`rg`) or stroke (`RG`) colour
pub fn color_op(operator: &str, color: Rgb) -> Operation {
    Operation::new(
        operator,
        color.iter().map(|&c| (f32::from(c) / 255.0).into()).collect(),
    )
}

/// Emit one line of text with its baseline at (`x` mm, `y` pt)
pub fn push_text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![Object::Name(font.as_bytes().to_vec()), size.into()]));
    ops.push(Operation::new("Td", vec![(x * PT_PER_MM).into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(encode_text(text))]));
    ops.push(Operation::new("ET", vec![]));
}
