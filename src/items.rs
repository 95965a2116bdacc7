use serde::{Deserialize, Serialize};

use crate::master::{CatalogEntry, DEFAULT_GST_RATE};
use crate::model::LineItem;

/// One editable line on the invoice form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub name: String,
    pub hsn: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub gst_rate: u32,
}

impl Default for LineItemInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            hsn: String::new(),
            quantity: 1,
            unit_price: 0.0,
            gst_rate: DEFAULT_GST_RATE,
        }
    }
}

impl LineItemInput {
    /// `None` when the product name is blank; such lines are not invoiced.
    pub fn to_line_item(&self) -> Option<LineItem> {
        let product = self.name.trim();
        if product.is_empty() {
            return None;
        }
        Some(LineItem {
            product: product.to_string(),
            hsn: self.hsn.trim().to_string(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            gst_rate: self.gst_rate,
        })
    }
}

/// Copies name, HSN code, price and rate from a catalog product. Quantity is kept.
pub fn apply_product_selection(current: &LineItemInput, product: &CatalogEntry) -> LineItemInput {
    LineItemInput {
        name: product.name.clone(),
        hsn: product.hsn.clone(),
        unit_price: product.unit_price,
        gst_rate: product.gst_rate,
        ..current.clone()
    }
}

/// The ordered line inputs of a form. Never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItemInputs(Vec<LineItemInput>);

impl Default for LineItemInputs {
    fn default() -> Self {
        Self(vec![LineItemInput::default()])
    }
}

impl LineItemInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<LineItemInput>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        Self(rows)
    }

    pub fn rows(&self) -> &[LineItemInput] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn add_row(&self) -> Self {
        let mut rows = self.0.clone();
        rows.push(LineItemInput::default());
        Self(rows)
    }

    /// Drops the last row unless it is the only one.
    pub fn remove_last(&self) -> Self {
        let mut rows = self.0.clone();
        if rows.len() > 1 {
            rows.pop();
        }
        Self(rows)
    }

    pub fn replace(&self, index: usize, row: LineItemInput) -> Self {
        let mut rows = self.0.clone();
        if let Some(slot) = rows.get_mut(index) {
            *slot = row;
        }
        Self(rows)
    }

    /// Line items in printed order, skipping rows with a blank product name.
    pub fn line_items(&self) -> Vec<LineItem> {
        self.0.iter().filter_map(LineItemInput::to_line_item).collect()
    }
}
