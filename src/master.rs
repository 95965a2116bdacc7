//! Master data: the billed-by profile, the client directory and the product
//! catalog. Records come from spreadsheet-style JSON where any cell may be a
//! string or a number, so every field is parsed leniently.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::model::{PartyState, Region};

pub const DEFAULT_GST_RATE: u32 = 18;
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub hsn: String,
    pub unit_price: f64,
    pub gst_rate: u32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MasterData {
    pub billed_by: PartyState,
    /// Keyed by `"<name> - <state>"`.
    pub clients: BTreeMap<String, PartyState>,
    /// Keyed by product name.
    pub products: BTreeMap<String, CatalogEntry>,
}

#[derive(Deserialize)]
struct RawMasterData {
    #[serde(default)]
    billed_by: Option<Map<String, Value>>,
    #[serde(default)]
    clients: Vec<Map<String, Value>>,
    #[serde(default)]
    products: Vec<Map<String, Value>>,
}

type Record = Map<String, Value>;

fn cell(record: &Record, column: &str) -> String {
    match record.get(column) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn optional_cell(record: &Record, column: &str) -> Option<String> {
    Some(cell(record, column)).filter(|s| !s.is_empty())
}

fn region_cell(record: &Record, column: &str, fallback: Region) -> Region {
    let raw = cell(record, column);
    if raw.is_empty() {
        return fallback;
    }
    raw.parse().unwrap_or_else(|e| {
        log::warn!("{e}, using {}", Region::Other);
        Region::Other
    })
}

/// Price cell: thousands separators are stripped; anything else unparseable is 0.
pub fn parse_price(raw: &str) -> f64 {
    raw.replace(',', "").trim().parse().unwrap_or(0.0)
}

/// GST rate cell: a trailing `%` is allowed; anything else unparseable is 18.
pub fn parse_rate(raw: &str) -> u32 {
    raw.replace('%', "").trim().parse().unwrap_or(DEFAULT_GST_RATE)
}

fn billed_by_from(record: &Record) -> PartyState {
    let address_lines = ["Address Line 1", "Address Line 2"]
        .iter()
        .map(|c| cell(record, c))
        .filter(|l| !l.is_empty())
        .collect();
    PartyState {
        name: cell(record, "Company Name"),
        address_lines,
        state: region_cell(record, "State", Region::Karnataka),
        gstin: optional_cell(record, "GSTIN"),
        pan: optional_cell(record, "PAN"),
        phone: optional_cell(record, "Phone"),
    }
}

fn client_from(record: &Record) -> Option<(String, PartyState)> {
    let name = cell(record, "Client Name");
    if name.is_empty() {
        return None;
    }
    let state_label = optional_cell(record, "State").unwrap_or_else(|| "Unknown".to_string());
    let key = format!("{name} - {state_label}");
    let address_lines = cell(record, "Address")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    let party = PartyState {
        name,
        address_lines,
        state: region_cell(record, "State", Region::Other),
        gstin: optional_cell(record, "GSTIN"),
        pan: optional_cell(record, "PAN"),
        phone: optional_cell(record, "Phone"),
    };
    Some((key, party))
}

fn product_from(record: &Record) -> Option<CatalogEntry> {
    let name = cell(record, "Product Name");
    if name.is_empty() {
        return None;
    }
    Some(CatalogEntry {
        name,
        hsn: cell(record, "HSN Code"),
        unit_price: parse_price(&cell(record, "Price")),
        gst_rate: parse_rate(&cell(record, "GST %")),
    })
}

impl MasterData {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let raw: RawMasterData = serde_json::from_str(json)?;
        let billed_by = raw
            .billed_by
            .as_ref()
            .map(billed_by_from)
            .unwrap_or_default();
        let clients = raw.clients.iter().filter_map(client_from).collect();
        let products = raw
            .products
            .iter()
            .filter_map(product_from)
            .map(|p| (p.name.clone(), p))
            .collect();
        Ok(Self {
            billed_by,
            clients,
            products,
        })
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Time-bounded cache around a master-data source.
pub struct MasterDataCache {
    data: Option<MasterData>,
    fetched_at: Option<Instant>,
    ttl: Duration,
}

impl MasterDataCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: None,
            fetched_at: None,
            ttl,
        }
    }

    pub fn is_stale(&self, now: Instant) -> bool {
        match self.fetched_at {
            Some(at) => now.saturating_duration_since(at) >= self.ttl,
            None => true,
        }
    }

    /// Reloads unconditionally. A failed load keeps whatever was cached
    /// before (or empty master data if nothing was) and leaves the entry stale.
    pub fn refresh(
        &mut self,
        now: Instant,
        load: impl FnOnce() -> Result<MasterData, Error>,
    ) -> &MasterData {
        match load() {
            Ok(data) => {
                self.data = Some(data);
                self.fetched_at = Some(now);
            }
            Err(e) => log::warn!("Could not load master data: {e}"),
        }
        self.data.get_or_insert_with(MasterData::default)
    }

    pub fn get(
        &mut self,
        now: Instant,
        load: impl FnOnce() -> Result<MasterData, Error>,
    ) -> &MasterData {
        if self.is_stale(now) {
            return self.refresh(now, load);
        }
        self.data.get_or_insert_with(MasterData::default)
    }

    pub fn invalidate(&mut self) {
        self.fetched_at = None;
    }
}

impl Default for MasterDataCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
