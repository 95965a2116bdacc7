//! Invoice requests: the form a caller fills in, resolved against master
//! data into an [`InvoiceDocument`].

use chrono::{Days, NaiveDate};
use serde::Deserialize;

use crate::error::Error;
use crate::items::{LineItemInput, LineItemInputs, apply_product_selection};
use crate::master::MasterData;
use crate::model::{InvoiceDocument, PartyState};

pub const DEFAULT_DUE_DAYS: u64 = 7;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ItemRequest {
    /// Catalog product to start from.
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub hsn: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub gst_rate: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InvoiceRequest {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Client directory key (`"<name> - <state>"`).
    #[serde(default)]
    pub client: Option<String>,
    /// Inline party, used when `client` is absent.
    #[serde(default)]
    pub billed_to: Option<PartyState>,
    #[serde(default)]
    pub items: Vec<ItemRequest>,
}

impl ItemRequest {
    fn to_input(&self, master: &MasterData) -> LineItemInput {
        let mut input = LineItemInput::default();
        if let Some(key) = &self.product {
            match master.products.get(key) {
                Some(entry) => input = apply_product_selection(&input, entry),
                None => log::warn!("Unknown catalog product {key:?}"),
            }
        }
        if let Some(name) = &self.name {
            input.name = name.clone();
        }
        if let Some(hsn) = &self.hsn {
            input.hsn = hsn.clone();
        }
        if let Some(q) = self.quantity {
            input.quantity = q;
        }
        if let Some(p) = self.unit_price {
            input.unit_price = p;
        }
        if let Some(r) = self.gst_rate {
            input.gst_rate = r;
        }
        input
    }
}

impl InvoiceRequest {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn line_inputs(&self, master: &MasterData) -> LineItemInputs {
        LineItemInputs::from_rows(self.items.iter().map(|i| i.to_input(master)).collect())
    }

    fn resolve_billed_to(&self, master: &MasterData) -> PartyState {
        if let Some(key) = &self.client {
            if let Some(party) = master.clients.get(key) {
                return party.clone();
            }
            log::warn!("Unknown client {key:?}");
        }
        self.billed_to.clone().unwrap_or_default()
    }

    /// Builds the document. `suggested_identifier` is used when the request
    /// does not name one; `today` when it has no issue date.
    pub fn build(
        &self,
        master: &MasterData,
        suggested_identifier: &str,
        today: NaiveDate,
    ) -> Result<InvoiceDocument, Error> {
        let items = self.line_inputs(master).line_items();
        let issue_date = self.issue_date.unwrap_or(today);
        let due_date = self.due_date.unwrap_or_else(|| {
            issue_date
                .checked_add_days(Days::new(DEFAULT_DUE_DAYS))
                .unwrap_or(issue_date)
        });
        let identifier = self
            .identifier
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(suggested_identifier);

        InvoiceDocument::new(
            identifier,
            issue_date,
            due_date,
            master.billed_by.clone(),
            self.resolve_billed_to(master),
            items,
        )
    }
}
