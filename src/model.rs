use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::tax::{aggregate, compute_row};

macro_rules! regions {
    ($($variant:ident => $name:literal,)+) => {
        /// Indian states and union territories a party can be registered in.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub enum Region {
            $($variant,)+
        }

        impl Region {
            pub const ALL: &'static [Region] = &[$(Region::$variant,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Region::$variant => $name,)+
                }
            }
        }
    };
}

regions! {
    AndhraPradesh => "Andhra Pradesh",
    ArunachalPradesh => "Arunachal Pradesh",
    Assam => "Assam",
    Bihar => "Bihar",
    Chhattisgarh => "Chhattisgarh",
    Goa => "Goa",
    Gujarat => "Gujarat",
    Haryana => "Haryana",
    HimachalPradesh => "Himachal Pradesh",
    Jharkhand => "Jharkhand",
    Karnataka => "Karnataka",
    Kerala => "Kerala",
    MadhyaPradesh => "Madhya Pradesh",
    Maharashtra => "Maharashtra",
    Manipur => "Manipur",
    Meghalaya => "Meghalaya",
    Mizoram => "Mizoram",
    Nagaland => "Nagaland",
    Odisha => "Odisha",
    Punjab => "Punjab",
    Rajasthan => "Rajasthan",
    Sikkim => "Sikkim",
    TamilNadu => "Tamil Nadu",
    Telangana => "Telangana",
    Tripura => "Tripura",
    UttarPradesh => "Uttar Pradesh",
    Uttarakhand => "Uttarakhand",
    WestBengal => "West Bengal",
    AndamanAndNicobarIslands => "Andaman and Nicobar Islands",
    Chandigarh => "Chandigarh",
    DadraNagarHaveliDamanDiu => "Dadra and Nagar Haveli and Daman and Diu",
    Delhi => "Delhi",
    JammuAndKashmir => "Jammu and Kashmir",
    Ladakh => "Ladakh",
    Lakshadweep => "Lakshadweep",
    Puducherry => "Puducherry",
    Other => "Other",
}

impl Default for Region {
    fn default() -> Self {
        Region::Karnataka
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRegion(pub String);

impl fmt::Display for UnknownRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown state: {:?}", self.0)
    }
}

impl std::error::Error for UnknownRegion {}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

impl TryFrom<String> for Region {
    type Error = UnknownRegion;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Region> for String {
    fn from(r: Region) -> Self {
        r.name().to_string()
    }
}

/// A Billed-By or Billed-To party. Optional fields that are `None` (or blank)
/// are left off the printed invoice.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartyState {
    pub name: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    #[serde(default)]
    pub state: Region,
    #[serde(default)]
    pub gstin: Option<String>,
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

pub(crate) fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: String,
    /// HSN classification code. Carried with the item from the catalog or
    /// request; the printed table and the ledger do not include it.
    #[serde(default)]
    pub hsn: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub gst_rate: u32,
}

impl LineItem {
    pub fn base_amount(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

/// Per-item tax. Exactly one branch is populated; the other is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TaxSplit {
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
}

impl TaxSplit {
    pub fn total(&self) -> f64 {
        self.cgst + self.sgst + self.igst
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaxRegime {
    /// Same state: CGST + SGST, each half the rate.
    IntraState,
    /// Different states: IGST at the full rate.
    InterState,
}

impl TaxRegime {
    pub fn for_parties(billed_by: Region, billed_to: Region) -> Self {
        if billed_by == billed_to {
            TaxRegime::IntraState
        } else {
            TaxRegime::InterState
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComputedRow {
    pub item: LineItem,
    pub base_amount: f64,
    pub tax: TaxSplit,
    pub row_total: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InvoiceTotals {
    pub subtotal: f64,
    pub cgst: f64,
    pub sgst: f64,
    pub igst: f64,
    pub grand_total: f64,
    pub quantity: u64,
}

#[derive(Clone, Debug)]
pub struct InvoiceDocument {
    pub identifier: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub billed_by: PartyState,
    pub billed_to: PartyState,
    /// Printed order.
    pub rows: Vec<ComputedRow>,
    pub totals: InvoiceTotals,
    pub regime: TaxRegime,
}

impl InvoiceDocument {
    /// Computes every row and the document totals. An empty item list is
    /// refused: there is no such thing as an empty invoice.
    pub fn new(
        identifier: impl Into<String>,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        billed_by: PartyState,
        billed_to: PartyState,
        items: Vec<LineItem>,
    ) -> Result<Self, Error> {
        if items.is_empty() {
            return Err(Error::NoLineItems);
        }
        let rows: Vec<ComputedRow> = items
            .into_iter()
            .map(|item| compute_row(item, billed_by.state, billed_to.state))
            .collect();
        let totals = aggregate(&rows);
        Ok(Self {
            identifier: identifier.into(),
            issue_date,
            due_date,
            regime: TaxRegime::for_parties(billed_by.state, billed_to.state),
            billed_by,
            billed_to,
            rows,
            totals,
        })
    }
}
