mod layout;
mod table;

use pdf_writer::{Filter, Name, Pdf, Rect, Ref};

use crate::error::Error;
use crate::fonts::{StandardFont, register_fonts};
use crate::logo::LogoImage;
use crate::model::{InvoiceDocument, PartyState, TaxRegime, non_blank};
use crate::pagination::{PageFrame, Paginator, TableEvent, plan_table};

pub use layout::format_amount;
use layout::{Align, Canvas, CellStyle, PT_PER_MM, wrap_text};
use table::{HEADER_HEIGHT, columns, draw_header, draw_item_row, draw_totals_row, item_row_layout};

// A4 portrait, millimetres.
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 10.0;
/// Reserved below the content area on every page for the footer.
pub const FOOTER_BAND: f32 = 50.0;
/// Distance of the footer's separator rule from the bottom edge.
const FOOTER_OFFSET: f32 = 35.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const LOGO_X: f32 = 155.0;
const LOGO_Y: f32 = 10.0;
const LOGO_WIDTH: f32 = 40.0;

const PARTY_RIGHT_X: f32 = 115.0;
const PARTY_LEFT_WIDTH: f32 = 100.0;
/// The table never starts closer than this below the top of the party block.
const PARTY_MIN_HEIGHT: f32 = 50.0;
const PARTY_TABLE_GAP: f32 = 10.0;

const TOTALS_X: f32 = 120.0;
const TOTALS_GAP: f32 = 5.0;

const DISCLAIMER: &str = "This is an electronically generated document, no signature is required.";

pub fn page_frame() -> PageFrame {
    PageFrame::new(PAGE_HEIGHT, MARGIN, FOOTER_BAND)
}

fn display_date(date: chrono::NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

fn draw_title_block(canvas: &mut Canvas, doc: &InvoiceDocument) -> f32 {
    canvas.set_font(StandardFont::HelveticaBold, 24.0);
    canvas.cell(MARGIN, 15.0, 100.0, 10.0, "INVOICE", Align::Left, CellStyle::PLAIN);

    let mut y = 30.0;
    let meta = [
        ("Invoice Number:", doc.identifier.clone()),
        ("Invoice Date:", display_date(doc.issue_date)),
        ("Due Date:", display_date(doc.due_date)),
    ];
    for (label, value) in &meta {
        canvas.set_font(StandardFont::HelveticaBold, 10.0);
        canvas.cell(MARGIN, y, 35.0, 6.0, label, Align::Left, CellStyle::PLAIN);
        canvas.set_font(StandardFont::Helvetica, 10.0);
        canvas.cell(MARGIN + 35.0, y, 65.0, 6.0, value, Align::Left, CellStyle::PLAIN);
        y += 6.0;
    }
    y + 15.0
}

fn id_lines(party: &PartyState) -> Vec<String> {
    [("GSTIN", &party.gstin), ("PAN", &party.pan), ("Phone", &party.phone)]
        .into_iter()
        .filter_map(|(label, field)| non_blank(field).map(|v| format!("{label}: {v}")))
        .collect()
}

/// Draws one line of a party column at the cursor, continuing on the next
/// page when it would cross the frame bottom.
fn flow_line(
    pages: &mut Vec<Canvas>,
    cursor: &mut Paginator,
    x: f32,
    w: f32,
    height: f32,
    text: &str,
    font: StandardFont,
    size: f32,
) {
    if cursor.will_break(height) {
        cursor.begin_page();
    }
    let y = cursor.advance(height);
    let canvas = page_canvas(pages, cursor.page());
    canvas.set_font(font, size);
    canvas.cell(x, y, w, height, text, Align::Left, CellStyle::PLAIN);
}

/// Draws one party column starting at `top` on the first page and returns
/// the cursor just below its last line.
fn draw_party(
    pages: &mut Vec<Canvas>,
    heading: &str,
    party: &PartyState,
    extra: Option<String>,
    x: f32,
    top: f32,
    w: f32,
) -> Paginator {
    let text_w = w - 2.0 * layout::CELL_PADDING;
    let mut cursor = Paginator::new(page_frame(), top);

    flow_line(pages, &mut cursor, x, w, 6.0, heading, StandardFont::HelveticaBold, 12.0);

    let name = party.name.trim();
    if !name.is_empty() {
        for line in wrap_text(StandardFont::HelveticaBold, 10.0, name, text_w) {
            flow_line(pages, &mut cursor, x, w, 5.0, &line, StandardFont::HelveticaBold, 10.0);
        }
    }

    let body = party
        .address_lines
        .iter()
        .flat_map(|l| l.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .chain(extra)
        .chain(id_lines(party));
    for text in body {
        for line in wrap_text(StandardFont::Helvetica, 10.0, &text, text_w) {
            flow_line(pages, &mut cursor, x, w, 5.0, &line, StandardFont::Helvetica, 10.0);
        }
    }
    cursor
}

/// Whichever cursor sits further down the document.
fn lower(a: Paginator, b: Paginator) -> Paginator {
    if (b.page(), b.cursor_y()) > (a.page(), a.cursor_y()) {
        b
    } else {
        a
    }
}

fn draw_totals_block(canvas: &mut Canvas, doc: &InvoiceDocument, y: f32) {
    let t = &doc.totals;
    let mut y = y;
    let mut entries = vec![("Subtotal:", t.subtotal)];
    match doc.regime {
        TaxRegime::IntraState => entries.extend([("CGST:", t.cgst), ("SGST:", t.sgst)]),
        TaxRegime::InterState => entries.push(("IGST:", t.igst)),
    }

    canvas.set_font(StandardFont::Helvetica, 10.0);
    for (label, amount) in entries {
        canvas.cell(TOTALS_X, y, 30.0, 6.0, label, Align::Right, CellStyle::PLAIN);
        let value = format!("Rs. {}", format_amount(amount));
        canvas.cell(TOTALS_X + 30.0, y, 40.0, 6.0, &value, Align::Right, CellStyle::PLAIN);
        y += 6.0;
    }

    canvas.set_font(StandardFont::HelveticaBold, 12.0);
    canvas.cell(TOTALS_X, y, 30.0, 8.0, "Grand Total:", Align::Right, CellStyle::PLAIN);
    let value = format!("Rs. {}", format_amount(t.grand_total));
    canvas.cell(TOTALS_X + 30.0, y, 40.0, 8.0, &value, Align::Right, CellStyle::PLAIN);
}

fn totals_block_height(regime: TaxRegime) -> f32 {
    let tax_lines = match regime {
        TaxRegime::IntraState => 2.0,
        TaxRegime::InterState => 1.0,
    };
    6.0 + tax_lines * 6.0 + 8.0
}

fn draw_footer(canvas: &mut Canvas, doc: &InvoiceDocument, page_num: usize, total_pages: usize) {
    let mut y = PAGE_HEIGHT - FOOTER_OFFSET;
    canvas.line(MARGIN, y, PAGE_WIDTH - MARGIN, y);
    y += 2.0;

    let billed_to = match doc.billed_to.name.trim() {
        "" => "Client Name",
        name => name,
    };
    let recap_w = CONTENT_WIDTH - 80.0;

    canvas.set_font(StandardFont::HelveticaBold, 9.0);
    canvas.cell(MARGIN, y, 40.0, 4.0, "Invoice No", Align::Left, CellStyle::PLAIN);
    canvas.cell(MARGIN + 40.0, y, 40.0, 4.0, "Invoice Date", Align::Left, CellStyle::PLAIN);
    canvas.cell(MARGIN + 80.0, y, recap_w, 4.0, "Billed To", Align::Left, CellStyle::PLAIN);
    y += 4.0;

    canvas.set_font(StandardFont::Helvetica, 9.0);
    canvas.cell(MARGIN, y, 40.0, 4.0, &doc.identifier, Align::Left, CellStyle::PLAIN);
    let date = display_date(doc.issue_date);
    canvas.cell(MARGIN + 40.0, y, 40.0, 4.0, &date, Align::Left, CellStyle::PLAIN);
    canvas.cell(MARGIN + 80.0, y, recap_w, 4.0, billed_to, Align::Left, CellStyle::PLAIN);
    y += 4.0 + 5.0;

    canvas.set_font(StandardFont::HelveticaBold, 9.0);
    let page_label = format!("Page {page_num} of {total_pages}");
    canvas.cell(MARGIN, y, CONTENT_WIDTH, 6.0, &page_label, Align::Left, CellStyle::PLAIN);
    y += 6.0;

    canvas.set_font(StandardFont::Helvetica, 8.0);
    canvas.set_text_gray(128.0 / 255.0);
    canvas.cell(MARGIN, y, CONTENT_WIDTH, 4.0, DISCLAIMER, Align::Left, CellStyle::PLAIN);
    canvas.set_text_gray(0.0);
}

/// Returns the canvas for `page`, opening new pages as needed.
fn page_canvas(pages: &mut Vec<Canvas>, page: usize) -> &mut Canvas {
    while pages.len() <= page {
        pages.push(Canvas::new(PAGE_HEIGHT));
    }
    &mut pages[page]
}

/// Renders the invoice as a complete PDF byte buffer.
///
/// Pure given its inputs: the same document and logo always produce the same
/// bytes. On error nothing is returned.
pub fn render(doc: &InvoiceDocument, logo: Option<&LogoImage>) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    if doc.rows.is_empty() {
        return Err(Error::NoLineItems);
    }

    let mut pages: Vec<Canvas> = vec![Canvas::new(PAGE_HEIGHT)];

    // Phase 1: page-one header, metadata and party block
    let first = &mut pages[0];
    if let Some(img) = logo {
        first.image("Im1", LOGO_X, LOGO_Y, LOGO_WIDTH, img.height_for_width(LOGO_WIDTH));
    }
    let party_top = draw_title_block(first, doc);
    let left = draw_party(
        &mut pages,
        "Billed By",
        &doc.billed_by,
        None,
        MARGIN,
        party_top,
        PARTY_LEFT_WIDTH,
    );
    let right = draw_party(
        &mut pages,
        "Billed To",
        &doc.billed_to,
        Some(format!("State: {}", doc.billed_to.state)),
        PARTY_RIGHT_X,
        party_top,
        PAGE_WIDTH - MARGIN - PARTY_RIGHT_X,
    );

    // Phase 2: item table, with the totals row as its last row
    let cols = columns(doc.regime);
    let row_layouts: Vec<(Vec<String>, f32)> = doc
        .rows
        .iter()
        .map(|row| item_row_layout(&cols, &row.item.product))
        .collect();
    let mut heights: Vec<f32> = row_layouts.iter().map(|(_, h)| *h).collect();
    heights.push(table::ROW_LINE_HEIGHT);

    let mut paginator = lower(left, right);
    let floor = party_top + PARTY_MIN_HEIGHT;
    if paginator.page() == 0 && paginator.cursor_y() < floor {
        paginator.skip(floor - paginator.cursor_y());
    }
    paginator.skip(PARTY_TABLE_GAP);
    let events = plan_table(&mut paginator, HEADER_HEIGHT, &heights)?;
    for event in events {
        match event {
            TableEvent::Header { page, y } => {
                draw_header(page_canvas(&mut pages, page), &cols, MARGIN, y);
            }
            TableEvent::Row { index, page, y, .. } if index == doc.rows.len() => {
                let canvas = page_canvas(&mut pages, page);
                draw_totals_row(canvas, &cols, doc.regime, MARGIN, y, &doc.totals);
            }
            TableEvent::Row {
                index,
                page,
                y,
                height,
            } => {
                let canvas = page_canvas(&mut pages, page);
                let (lines, _) = &row_layouts[index];
                draw_item_row(
                    canvas,
                    &cols,
                    doc.regime,
                    MARGIN,
                    y,
                    height,
                    index + 1,
                    &doc.rows[index],
                    lines,
                );
            }
        }
    }

    // Phase 3: totals block, kept whole
    paginator.skip(TOTALS_GAP);
    let block_h = totals_block_height(doc.regime);
    if paginator.will_break(block_h) {
        paginator.begin_page();
    }
    let block_y = paginator.advance(block_h);
    draw_totals_block(page_canvas(&mut pages, paginator.page()), doc, block_y);
    let t_layout = t0.elapsed();

    // Phase 4: footers, now that the page count is known
    let total_pages = pages.len();
    for (i, canvas) in pages.iter_mut().enumerate() {
        draw_footer(canvas, doc, i + 1, total_pages);
    }

    let bytes = assemble(pages, logo);
    log::info!(
        "Rendered invoice {}: {} rows, {} pages, layout={:.1}ms, total={:.1}ms ({} bytes)",
        doc.identifier,
        doc.rows.len(),
        total_pages,
        t_layout.as_secs_f64() * 1000.0,
        t0.elapsed().as_secs_f64() * 1000.0,
        bytes.len(),
    );
    Ok(bytes)
}

fn embed_logo(pdf: &mut Pdf, img: &LogoImage, alloc: &mut impl FnMut() -> Ref) -> Ref {
    let xobj_ref = alloc();
    let (w, h) = (img.pixel_width as i32, img.pixel_height as i32);

    let smask_ref = img.alpha.as_ref().map(|alpha| {
        let mask_ref = alloc();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(alpha, 6);
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w);
        mask.height(h);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        mask_ref
    });

    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&img.rgb, 6);
    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w);
    xobj.height(h);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    xobj_ref
}

fn assemble(pages: Vec<Canvas>, logo: Option<&LogoImage>) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let fonts = register_fonts(&mut pdf, &mut alloc);
    let logo_ref = logo.map(|img| embed_logo(&mut pdf, img, &mut alloc));

    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, canvas) in pages.into_iter().enumerate() {
        let raw = canvas.finish().finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    let media_box = Rect::new(0.0, 0.0, PAGE_WIDTH * PT_PER_MM, PAGE_HEIGHT * PT_PER_MM);
    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(media_box)
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        {
            let mut font_dict = resources.fonts();
            for (font, font_ref) in &fonts {
                font_dict.pair(Name(font.pdf_name().as_bytes()), *font_ref);
            }
        }
        if let Some(xobj_ref) = logo_ref {
            resources.x_objects().pair(Name(b"Im1"), xobj_ref);
        }
    }

    pdf.finish()
}
