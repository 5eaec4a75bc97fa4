//! PDF rendering with `printpdf`
//!
//! Pages are A4 landscape. Table pages are drawn first, the flow diagram last.

use crate::report::flow::{curve_points, FlowDiagram};
use crate::report::table::{Table, TablePage, CELL_PADDING_MM};
use crate::types::{Direction, ReportError};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerIndex, PdfLayerReference, PdfPageIndex, Point, Rgb,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub const PAGE_WIDTH_MM: f32 = 297.0;
pub const PAGE_HEIGHT_MM: f32 = 210.0;
pub const MARGIN_MM: f32 = 12.0;

const TITLE_SIZE: f32 = 12.0;
const SUBTITLE_SIZE: f32 = 8.0;
const TABLE_FONT_SIZE: f32 = 7.0;
const ROW_HEIGHT_MM: f32 = 4.5;
const TITLE_BLOCK_MM: f32 = 14.0;

const FLOW_LABEL_SIZE: f32 = 6.0;
const FLOW_LEFT_X_MM: f32 = 95.0;
const FLOW_RIGHT_X_MM: f32 = 200.0;
const LANE_SPACING_MM: f32 = 1.2;
const CURVE_SEGMENTS: usize = 24;

/// Table rows that fit on one page below the title block and header row
pub fn rows_per_page() -> usize {
    let usable = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM - TITLE_BLOCK_MM - ROW_HEIGHT_MM;
    (usable / ROW_HEIGHT_MM).floor() as usize
}

/// Hands out pages, reusing the one created with the document first
struct Pages {
    doc: PdfDocumentReference,
    first: Option<(PdfPageIndex, PdfLayerIndex)>,
    count: usize,
}

impl Pages {
    fn next(&mut self) -> PdfLayerReference {
        self.count += 1;
        let (page, layer) = match self.first.take() {
            Some(first) => first,
            None => self.doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Page {}", self.count),
            ),
        };
        self.doc.get_page(page).get_layer(layer)
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Render the tables and the flow diagram into one PDF at `path`
///
/// Returns the number of pages written.
pub fn write_pdf(
    path: &Path,
    title: &str,
    tables: &[Table],
    flow: &FlowDiagram,
    flow_title: &str,
) -> Result<usize, ReportError> {
    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Page 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };
    let mut pages = Pages {
        doc,
        first: Some((page, layer)),
        count: 0,
    };

    let per_page = rows_per_page();
    let usable_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    for table in tables {
        let font_size = table.fitted_font_size(TABLE_FONT_SIZE, usable_width);
        let widths = table.column_widths(font_size);
        for table_page in table.pages(per_page) {
            draw_table_page(&pages.next(), &fonts, &table_page, &widths, font_size);
        }
    }

    draw_flow_page(&pages.next(), &fonts, flow, flow_title);

    let page_count = pages.count;
    let file = File::create(path).map_err(|e| ReportError::io(path, e))?;
    pages.doc.save(&mut BufWriter::new(file))?;

    Ok(page_count)
}

fn draw_title(layer: &PdfLayerReference, fonts: &Fonts, title: &str, subtitle: Option<&str>) {
    let top = PAGE_HEIGHT_MM - MARGIN_MM;
    layer.use_text(title, TITLE_SIZE, Mm(MARGIN_MM), Mm(top - 4.0), &fonts.bold);
    if let Some(subtitle) = subtitle {
        layer.use_text(subtitle, SUBTITLE_SIZE, Mm(MARGIN_MM), Mm(top - 9.5), &fonts.regular);
    }
}

fn draw_table_page(
    layer: &PdfLayerReference,
    fonts: &Fonts,
    page: &TablePage<'_>,
    widths: &[f32],
    font_size: f32,
) {
    draw_title(layer, fonts, &page.title, page.subtitle);

    let mut y = PAGE_HEIGHT_MM - MARGIN_MM - TITLE_BLOCK_MM;
    draw_row(layer, &fonts.bold, page.header, widths, font_size, y);

    let rule_y = y - 1.3;
    let table_width: f32 = widths.iter().sum();
    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(0.5);
    layer.add_line(polyline(&[
        (MARGIN_MM, rule_y),
        (MARGIN_MM + table_width, rule_y),
    ]));

    for row in page.rows {
        y -= ROW_HEIGHT_MM;
        draw_row(layer, &fonts.regular, row, widths, font_size, y);
    }
}

fn draw_row(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    cells: &[String],
    widths: &[f32],
    font_size: f32,
    y: f32,
) {
    let mut x = MARGIN_MM;
    for (cell, width) in cells.iter().zip(widths) {
        if !cell.is_empty() {
            layer.use_text(cell.as_str(), font_size, Mm(x + CELL_PADDING_MM), Mm(y), font);
        }
        x += width;
    }
}

fn draw_flow_page(layer: &PdfLayerReference, fonts: &Fonts, flow: &FlowDiagram, title: &str) {
    draw_title(
        layer,
        fonts,
        title,
        Some("Deposits (green) run from the counterparty to the target; withdrawals (red) from the target to the counterparty."),
    );

    if flow.is_empty() {
        layer.use_text(
            "No fund movements recorded.",
            SUBTITLE_SIZE,
            Mm(MARGIN_MM),
            Mm(PAGE_HEIGHT_MM / 2.0),
            &fonts.regular,
        );
        return;
    }

    let top = PAGE_HEIGHT_MM - MARGIN_MM - TITLE_BLOCK_MM;
    let bottom = MARGIN_MM;
    let source_y = node_positions(flow.sources.len(), top, bottom);
    let target_y = node_positions(flow.targets.len(), top, bottom);

    for edge in &flow.edges {
        let lanes = flow.lanes(edge) as f32;
        let offset = (edge.lane as f32 - (lanes - 1.0) / 2.0) * LANE_SPACING_MM;
        let start = (FLOW_LEFT_X_MM, source_y[edge.source] + offset);
        let end = (FLOW_RIGHT_X_MM, target_y[edge.target] + offset);

        let color = match edge.direction {
            Direction::Deposit => Rgb::new(0.13, 0.55, 0.13, None),
            Direction::Withdrawal => Rgb::new(0.80, 0.15, 0.15, None),
        };
        layer.set_outline_color(Color::Rgb(color));
        layer.set_outline_thickness(flow.stroke_width(edge.amount));
        layer.add_line(polyline(&curve_points(start, end, CURVE_SEGMENTS)));
    }

    // Node bars and labels
    layer.set_outline_color(Color::Rgb(Rgb::new(0.1, 0.1, 0.4, None)));
    layer.set_outline_thickness(3.0);
    for (label, y) in flow.sources.iter().zip(&source_y) {
        layer.add_line(polyline(&[(FLOW_LEFT_X_MM, y - 2.0), (FLOW_LEFT_X_MM, y + 2.0)]));
        layer.use_text(label.as_str(), FLOW_LABEL_SIZE, Mm(MARGIN_MM), Mm(y - 1.0), &fonts.regular);
    }
    for (label, y) in flow.targets.iter().zip(&target_y) {
        layer.add_line(polyline(&[(FLOW_RIGHT_X_MM, y - 2.0), (FLOW_RIGHT_X_MM, y + 2.0)]));
        layer.use_text(
            label.as_str(),
            FLOW_LABEL_SIZE,
            Mm(FLOW_RIGHT_X_MM + 3.0),
            Mm(y - 1.0),
            &fonts.regular,
        );
    }
}

/// Evenly spread `count` node centres between `top` and `bottom`
fn node_positions(count: usize, top: f32, bottom: f32) -> Vec<f32> {
    let slot = (top - bottom) / count.max(1) as f32;
    (0..count)
        .map(|i| top - slot * (i as f32 + 0.5))
        .collect()
}

fn polyline(points: &[(f32, f32)]) -> Line {
    Line {
        points: points
            .iter()
            .map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false))
            .collect(),
        is_closed: false,
    }
}
