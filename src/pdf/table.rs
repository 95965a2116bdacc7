use crate::fonts::StandardFont;
use crate::model::{ComputedRow, InvoiceTotals, TaxRegime};

use super::layout::{Align, CELL_PADDING, Canvas, CellStyle, format_amount, wrap_text};

/// Base row height; wrapped item names take a multiple of it.
pub(super) const ROW_LINE_HEIGHT: f32 = 8.0;
pub(super) const HEADER_HEIGHT: f32 = 8.0;
const TABLE_FONT_SIZE: f32 = 9.0;
const HEADER_FILL: [u8; 3] = [240, 240, 240];

/// Index of the wrapping product-name column.
const ITEM_COLUMN: usize = 1;
/// The totals row's "Total" label spans serial, item, rate% and price.
const TOTAL_LABEL_SPAN: usize = 4;

pub(super) struct Column {
    label: &'static str,
    width: f32,
    align: Align,
}

const fn col(label: &'static str, width: f32, align: Align) -> Column {
    Column {
        label,
        width,
        align,
    }
}

/// Column set for a regime. Both sets span 190mm.
pub(super) fn columns(regime: TaxRegime) -> Vec<Column> {
    let mut cols = vec![
        col("", 8.0, Align::Center),
        col("Item", 60.0, Align::Left),
        col("GST%", 10.0, Align::Center),
        col("Rate", 17.0, Align::Right),
        col("Qty", 10.0, Align::Center),
        col("Amount", 20.0, Align::Right),
    ];
    match regime {
        TaxRegime::InterState => cols.extend([
            col("IGST", 20.0, Align::Right),
            col("Total", 45.0, Align::Right),
        ]),
        TaxRegime::IntraState => cols.extend([
            col("CGST", 15.0, Align::Right),
            col("SGST", 15.0, Align::Right),
            col("Total", 35.0, Align::Right),
        ]),
    }
    cols
}

/// Item-name lines and the resulting row height.
pub(super) fn item_row_layout(columns: &[Column], product: &str) -> (Vec<String>, f32) {
    let text_w = columns[ITEM_COLUMN].width - 2.0 * CELL_PADDING;
    let lines = wrap_text(StandardFont::Helvetica, TABLE_FONT_SIZE, product, text_w);
    let height = ROW_LINE_HEIGHT.max(lines.len() as f32 * ROW_LINE_HEIGHT);
    (lines, height)
}

pub(super) fn draw_header(canvas: &mut Canvas, columns: &[Column], x: f32, y: f32) {
    canvas.set_font(StandardFont::HelveticaBold, TABLE_FONT_SIZE);
    let mut cx = x;
    for c in columns {
        canvas.cell(cx, y, c.width, HEADER_HEIGHT, c.label, c.align, CellStyle::shaded(HEADER_FILL));
        cx += c.width;
    }
}

fn tax_cells(regime: TaxRegime, cgst: f64, sgst: f64, igst: f64) -> Vec<String> {
    match regime {
        TaxRegime::InterState => vec![format_amount(igst)],
        TaxRegime::IntraState => vec![format_amount(cgst), format_amount(sgst)],
    }
}

pub(super) fn draw_item_row(
    canvas: &mut Canvas,
    columns: &[Column],
    regime: TaxRegime,
    x: f32,
    y: f32,
    height: f32,
    serial: usize,
    row: &ComputedRow,
    name_lines: &[String],
) {
    canvas.set_font(StandardFont::Helvetica, TABLE_FONT_SIZE);

    let mut cells = vec![
        serial.to_string(),
        String::new(),
        format!("{}%", row.item.gst_rate),
        format_amount(row.item.unit_price),
        row.item.quantity.to_string(),
        format_amount(row.base_amount),
    ];
    cells.extend(tax_cells(regime, row.tax.cgst, row.tax.sgst, row.tax.igst));
    cells.push(format_amount(row.row_total));

    let mut cx = x;
    for (i, (c, text)) in columns.iter().zip(&cells).enumerate() {
        if i == ITEM_COLUMN {
            canvas.lines(cx, y, c.width, ROW_LINE_HEIGHT, name_lines);
            canvas.stroke_rect(cx, y, c.width, height);
        } else {
            canvas.cell(cx, y, c.width, height, text, c.align, CellStyle::BORDERED);
        }
        cx += c.width;
    }
}

pub(super) fn draw_totals_row(
    canvas: &mut Canvas,
    columns: &[Column],
    regime: TaxRegime,
    x: f32,
    y: f32,
    totals: &InvoiceTotals,
) {
    canvas.set_font(StandardFont::HelveticaBold, TABLE_FONT_SIZE);
    let style = CellStyle::shaded(HEADER_FILL);

    let label_w: f32 = columns[..TOTAL_LABEL_SPAN].iter().map(|c| c.width).sum();
    canvas.cell(x, y, label_w, ROW_LINE_HEIGHT, "Total", Align::Right, style);

    let mut cells = vec![totals.quantity.to_string(), format_amount(totals.subtotal)];
    cells.extend(tax_cells(regime, totals.cgst, totals.sgst, totals.igst));
    cells.push(format_amount(totals.grand_total));

    let mut cx = x + label_w;
    for (c, text) in columns[TOTAL_LABEL_SPAN..].iter().zip(&cells) {
        canvas.cell(cx, y, c.width, ROW_LINE_HEIGHT, text, c.align, style);
        cx += c.width;
    }
}
