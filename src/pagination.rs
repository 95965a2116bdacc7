//! Page-break decisions for the item table.
//!
//! All positions are millimetres measured down from the top edge of the page,
//! the way the renderer lays content out.

use crate::error::Error;

/// Rounding slack so that rows which fill a page exactly still fit.
const FIT_EPSILON: f32 = 1e-3;

/// The part of a page content may occupy. `bottom` sits above the reserved
/// footer band.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageFrame {
    pub top: f32,
    pub bottom: f32,
}

impl PageFrame {
    pub fn new(page_height: f32, top_margin: f32, footer_band: f32) -> Self {
        Self {
            top: top_margin,
            bottom: page_height - footer_band,
        }
    }

    pub fn usable_height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// True when a row of `row_height` starting at `cursor_y` would cross `page_bottom`.
pub fn will_break(cursor_y: f32, row_height: f32, page_bottom: f32) -> bool {
    cursor_y + row_height > page_bottom + FIT_EPSILON
}

/// Cursor over a sequence of identical pages.
#[derive(Clone, Debug)]
pub struct Paginator {
    frame: PageFrame,
    cursor_y: f32,
    page: usize,
}

impl Paginator {
    pub fn new(frame: PageFrame, start_y: f32) -> Self {
        Self {
            frame,
            cursor_y: start_y,
            page: 0,
        }
    }

    pub fn frame(&self) -> PageFrame {
        self.frame
    }

    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    /// Zero-based index of the current page.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_count(&self) -> usize {
        self.page + 1
    }

    pub fn will_break(&self, height: f32) -> bool {
        will_break(self.cursor_y, height, self.frame.bottom)
    }

    /// Starts a new page with the cursor at the top of the frame.
    pub fn begin_page(&mut self) {
        self.page += 1;
        self.cursor_y = self.frame.top;
    }

    /// Reserves `height` at the cursor and returns the y it starts at.
    pub fn advance(&mut self, height: f32) -> f32 {
        let y = self.cursor_y;
        self.cursor_y += height;
        y
    }

    pub fn skip(&mut self, gap: f32) {
        self.cursor_y += gap;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TableEvent {
    /// Draw the column header row.
    Header { page: usize, y: f32 },
    /// Draw row `index` (the totals row is the last index).
    Row {
        index: usize,
        page: usize,
        y: f32,
        height: f32,
    },
}

/// Lays out a table header followed by rows of the given heights.
///
/// The header is kept together with at least the first row. Before every row
/// the break test runs; a break starts a new page and repeats the header. A
/// row that cannot fit even on a fresh page under its header is a layout
/// error.
pub fn plan_table(
    paginator: &mut Paginator,
    header_height: f32,
    row_heights: &[f32],
) -> Result<Vec<TableEvent>, Error> {
    let capacity = paginator.frame().usable_height() - header_height;
    if let Some((index, h)) = row_heights
        .iter()
        .enumerate()
        .find(|&(_, &h)| h > capacity + FIT_EPSILON)
    {
        return Err(Error::Layout(format!(
            "table row {} is {h:.1}mm tall but a page holds {capacity:.1}mm of rows",
            index + 1
        )));
    }

    let mut events = Vec::with_capacity(row_heights.len() + 2);
    let first = row_heights.first().copied().unwrap_or(0.0);
    if paginator.will_break(header_height + first) {
        paginator.begin_page();
    }
    events.push(TableEvent::Header {
        page: paginator.page(),
        y: paginator.advance(header_height),
    });

    for (index, &height) in row_heights.iter().enumerate() {
        if paginator.will_break(height) {
            log::debug!(
                "page break before row {index}: y={:.1} h={height:.1} bottom={:.1}",
                paginator.cursor_y(),
                paginator.frame().bottom
            );
            paginator.begin_page();
            events.push(TableEvent::Header {
                page: paginator.page(),
                y: paginator.advance(header_height),
            });
        }
        events.push(TableEvent::Row {
            index,
            page: paginator.page(),
            y: paginator.advance(height),
            height,
        });
    }

    Ok(events)
}
