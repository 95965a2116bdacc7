use pdf_writer::{Content, Name, Str};

use crate::fonts::{StandardFont, to_winansi_bytes};

pub(super) const PT_PER_MM: f32 = 72.0 / 25.4;
/// Horizontal text inset inside a cell, in mm.
pub(super) const CELL_PADDING: f32 = 1.0;
const LINE_WIDTH_MM: f32 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, Default)]
pub(super) struct CellStyle {
    pub(super) border: bool,
    pub(super) fill: Option<[u8; 3]>,
}

impl CellStyle {
    pub(super) const PLAIN: CellStyle = CellStyle {
        border: false,
        fill: None,
    };
    pub(super) const BORDERED: CellStyle = CellStyle {
        border: true,
        fill: None,
    };

    pub(super) fn shaded(fill: [u8; 3]) -> Self {
        Self {
            border: true,
            fill: Some(fill),
        }
    }
}

/// One page's content stream, addressed in millimetres from the top-left
/// corner like the rest of the layout code.
pub(super) struct Canvas {
    content: Content,
    page_height: f32,
    font: StandardFont,
    font_size: f32,
    text_gray: f32,
}

impl Canvas {
    pub(super) fn new(page_height: f32) -> Self {
        let mut content = Content::new();
        content.set_line_width(LINE_WIDTH_MM * PT_PER_MM);
        Self {
            content,
            page_height,
            font: StandardFont::Helvetica,
            font_size: 10.0,
            text_gray: 0.0,
        }
    }

    fn px(&self, x: f32) -> f32 {
        x * PT_PER_MM
    }

    fn py(&self, y: f32) -> f32 {
        (self.page_height - y) * PT_PER_MM
    }

    pub(super) fn set_font(&mut self, font: StandardFont, size: f32) {
        self.font = font;
        self.font_size = size;
    }

    /// 0.0 is black, 1.0 white.
    pub(super) fn set_text_gray(&mut self, level: f32) {
        self.text_gray = level;
    }

    pub(super) fn text_width(&self, text: &str) -> f32 {
        self.font.text_width(text, self.font_size) / PT_PER_MM
    }

    fn font_size_mm(&self) -> f32 {
        self.font_size / PT_PER_MM
    }

    fn show_text(&mut self, x: f32, baseline_y: f32, text: &str) {
        if text.is_empty() {
            return;
        }
        let (px, py) = (self.px(x), self.py(baseline_y));
        let bytes = to_winansi_bytes(text);
        self.content.save_state();
        if self.text_gray > 0.0 {
            self.content.set_fill_gray(self.text_gray);
        }
        self.content.begin_text();
        self.content
            .set_font(Name(self.font.pdf_name().as_bytes()), self.font_size);
        self.content.next_line(px, py);
        self.content.show(Str(&bytes));
        self.content.end_text();
        self.content.restore_state();
    }

    /// A single-line cell: optional fill and border, text vertically centred.
    pub(super) fn cell(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        text: &str,
        align: Align,
        style: CellStyle,
    ) {
        if let Some(fill) = style.fill {
            self.fill_rect(x, y, w, h, fill);
        }
        if style.border {
            self.stroke_rect(x, y, w, h);
        }
        let text_x = match align {
            Align::Left => x + CELL_PADDING,
            Align::Center => x + (w - self.text_width(text)) / 2.0,
            Align::Right => x + w - CELL_PADDING - self.text_width(text),
        };
        let baseline_y = y + 0.5 * h + 0.3 * self.font_size_mm();
        self.show_text(text_x, baseline_y, text);
    }

    /// Pre-wrapped lines stacked at `line_h`, no border.
    pub(super) fn lines(&mut self, x: f32, y: f32, w: f32, line_h: f32, lines: &[String]) {
        for (i, line) in lines.iter().enumerate() {
            self.cell(x, y + i as f32 * line_h, w, line_h, line, Align::Left, CellStyle::PLAIN);
        }
    }

    pub(super) fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, [r, g, b]: [u8; 3]) {
        let (px, py) = (self.px(x), self.py(y + h));
        self.content.save_state();
        self.content
            .set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        self.content.rect(px, py, w * PT_PER_MM, h * PT_PER_MM);
        self.content.fill_nonzero();
        self.content.restore_state();
    }

    pub(super) fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let (px, py) = (self.px(x), self.py(y + h));
        self.content.rect(px, py, w * PT_PER_MM, h * PT_PER_MM);
        self.content.stroke();
    }

    pub(super) fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        let (a, b) = (self.px(x1), self.py(y1));
        let (c, d) = (self.px(x2), self.py(y2));
        self.content.move_to(a, b);
        self.content.line_to(c, d);
        self.content.stroke();
    }

    pub(super) fn image(&mut self, name: &str, x: f32, y: f32, w: f32, h: f32) {
        let (px, py) = (self.px(x), self.py(y + h));
        self.content.save_state();
        self.content
            .transform([w * PT_PER_MM, 0.0, 0.0, h * PT_PER_MM, px, py]);
        self.content.x_object(Name(name.as_bytes()));
        self.content.restore_state();
    }

    pub(super) fn finish(self) -> Content {
        self.content
    }
}

/// Greedy word wrap at `max_width` mm. Explicit newlines start a new line and
/// words wider than a whole line are broken between characters. Always
/// returns at least one (possibly empty) line.
pub(super) fn wrap_text(font: StandardFont, font_size: f32, text: &str, max_width: f32) -> Vec<String> {
    let width = |s: &str| font.text_width(s, font_size) / PT_PER_MM;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if width(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if width(word) <= max_width {
                current = word.to_string();
                continue;
            }
            for ch in word.chars() {
                current.push(ch);
                if width(&current) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// `1234567.5` → `"1,234,567.50"`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped: Vec<&str> = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .filter_map(|c| std::str::from_utf8(c).ok())
        .collect();
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{}.{frac_part}", grouped.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text(StandardFont::Helvetica, 9.0, "Cotton towel", 58.0);
        assert_eq!(lines, vec!["Cotton towel".to_string()]);
    }

    #[test]
    fn long_text_wraps_within_width() {
        let text = "Handwoven organic cotton bath towel with reinforced double stitched borders";
        let lines = wrap_text(StandardFont::Helvetica, 9.0, text, 58.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(StandardFont::Helvetica.text_width(line, 9.0) / PT_PER_MM <= 58.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn unbreakable_word_is_split() {
        let word = "X".repeat(80);
        let lines = wrap_text(StandardFont::Helvetica, 9.0, &word, 58.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap_text(StandardFont::Helvetica, 9.0, "", 58.0), vec![String::new()]);
    }
}
