#![allow(dead_code)]

use chrono::NaiveDate;
use gst_invoice::{InvoiceDocument, LineItem, PartyState, Region};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn party(name: &str, state: Region) -> PartyState {
    PartyState {
        name: name.to_string(),
        address_lines: vec!["12 MG Road".to_string(), "Bengaluru 560001".to_string()],
        state,
        gstin: Some("29ABCDE1234F1Z5".to_string()),
        pan: Some("ABCDE1234F".to_string()),
        phone: None,
    }
}

pub fn seller() -> PartyState {
    party("Acme Traders", Region::Karnataka)
}

pub fn local_client() -> PartyState {
    party("Bangalore Retail", Region::Karnataka)
}

pub fn remote_client() -> PartyState {
    party("Chennai Stores", Region::TamilNadu)
}

pub fn item(product: &str, quantity: u32, unit_price: f64, gst_rate: u32) -> LineItem {
    LineItem {
        product: product.to_string(),
        hsn: "8471".to_string(),
        quantity,
        unit_price,
        gst_rate,
    }
}

pub fn invoice(identifier: &str, billed_to: PartyState, items: Vec<LineItem>) -> InvoiceDocument {
    InvoiceDocument::new(
        identifier,
        date(2024, 3, 1),
        date(2024, 3, 8),
        seller(),
        billed_to,
        items,
    )
    .unwrap()
}

pub fn many_items(n: usize) -> Vec<LineItem> {
    (1..=n)
        .map(|i| item(&format!("Item {i}"), 1, 100.0, 18))
        .collect()
}

/// Value of the page tree's `/Count` entry.
pub fn page_count(pdf: &[u8]) -> usize {
    let text = String::from_utf8_lossy(pdf);
    let idx = text.find("/Count ").expect("page tree has a /Count");
    text[idx + "/Count ".len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap()
}

/// Number of `/Type /Page` objects (excluding `/Type /Pages`).
pub fn page_objects(pdf: &[u8]) -> usize {
    let text = String::from_utf8_lossy(pdf);
    text.matches("/Type /Page").count() - text.matches("/Type /Pages").count()
}

/// One shown text string with its baseline in millimetres from the top edge.
#[derive(Clone, Debug)]
pub struct PlacedText {
    pub y: f32,
    pub text: String,
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Inflated page content streams, in page order. Image streams are skipped.
pub fn page_streams(pdf: &[u8]) -> Vec<String> {
    let mut streams = Vec::new();
    let mut pos = 0;
    while let Some(start) = find(pdf, b"stream\n", pos) {
        let data_start = start + b"stream\n".len();
        let end = find(pdf, b"\nendstream", data_start).expect("unterminated stream");
        pos = end + b"\nendstream".len();
        let Ok(raw) = miniz_oxide::inflate::decompress_to_vec_zlib(&pdf[data_start..end]) else {
            continue;
        };
        if let Ok(text) = String::from_utf8(raw) {
            if text.contains(" Tj") {
                streams.push(text);
            }
        }
    }
    streams
}

fn unescape(literal: &str) -> String {
    let mut out = String::new();
    let mut chars = literal.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Text drawn on one page, in drawing order.
pub fn page_texts(stream: &str) -> Vec<PlacedText> {
    let pt_per_mm = 72.0 / 25.4;
    let mut baseline = 0.0f32;
    let mut texts = Vec::new();
    for line in stream.lines() {
        let line = line.trim();
        if let Some(operands) = line.strip_suffix(" Td") {
            let y: f32 = operands.split_whitespace().nth(1).unwrap().parse().unwrap();
            baseline = gst_invoice::PAGE_HEIGHT - y / pt_per_mm;
        } else if let Some(operand) = line.strip_suffix(" Tj") {
            let inner = &operand[1..operand.len() - 1];
            texts.push(PlacedText {
                y: baseline,
                text: unescape(inner),
            });
        }
    }
    texts
}

/// Text of every page of a rendered PDF.
pub fn rendered_pages(pdf: &[u8]) -> Vec<Vec<PlacedText>> {
    page_streams(pdf).iter().map(|s| page_texts(s)).collect()
}

pub fn count_text(page: &[PlacedText], text: &str) -> usize {
    page.iter().filter(|t| t.text == text).count()
}
