mod common;

use std::cell::Cell;
use std::time::{Duration, Instant};

use gst_invoice::Region;
use gst_invoice::master::{MasterData, MasterDataCache, parse_price, parse_rate};

const SHEET: &str = r#"{
    "billed_by": {
        "Company Name": "Acme Traders",
        "Address Line 1": "12 MG Road",
        "Address Line 2": "",
        "State": "Karnataka",
        "GSTIN": "29ABCDE1234F1Z5",
        "PAN": "ABCDE1234F",
        "Phone": 9876543210
    },
    "clients": [
        {"Client Name": "Chennai Stores", "State": "Tamil Nadu", "Address": "4 Anna Salai\nChennai", "GSTIN": ""},
        {"Client Name": "Mystery Co", "State": "Atlantis"},
        {"Client Name": "Nowhere Ltd"},
        {"Client Name": "", "State": "Goa"}
    ],
    "products": [
        {"Product Name": "Widget", "HSN Code": 8471, "Price": "1,250.50", "GST %": "12%"},
        {"Product Name": "Gadget", "Price": "n/a", "GST %": ""},
        {"Product Name": "Gizmo", "Price": 99, "GST %": 5},
        {"Product Name": "  ", "Price": 10}
    ]
}"#;

#[test]
fn parses_billed_by_profile() {
    common::init_logging();
    let data = MasterData::from_json(SHEET).unwrap();
    let by = &data.billed_by;
    assert_eq!(by.name, "Acme Traders");
    assert_eq!(by.address_lines, vec!["12 MG Road"]);
    assert_eq!(by.state, Region::Karnataka);
    assert_eq!(by.phone.as_deref(), Some("9876543210"));
}

#[test]
fn clients_are_keyed_by_name_and_state() {
    let data = MasterData::from_json(SHEET).unwrap();
    let keys: Vec<_> = data.clients.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            "Chennai Stores - Tamil Nadu",
            "Mystery Co - Atlantis",
            "Nowhere Ltd - Unknown",
        ]
    );
    let chennai = &data.clients["Chennai Stores - Tamil Nadu"];
    assert_eq!(chennai.state, Region::TamilNadu);
    assert_eq!(chennai.address_lines, vec!["4 Anna Salai", "Chennai"]);
    assert_eq!(chennai.gstin, None);
    assert_eq!(data.clients["Mystery Co - Atlantis"].state, Region::Other);
}

#[test]
fn catalog_cells_are_parsed_leniently() {
    let data = MasterData::from_json(SHEET).unwrap();
    assert_eq!(data.products.len(), 3);

    let widget = &data.products["Widget"];
    assert_eq!(widget.hsn, "8471");
    assert_eq!(widget.unit_price, 1250.5);
    assert_eq!(widget.gst_rate, 12);

    let gadget = &data.products["Gadget"];
    assert_eq!(gadget.unit_price, 0.0);
    assert_eq!(gadget.gst_rate, 18);

    assert_eq!(data.products["Gizmo"].unit_price, 99.0);
    assert_eq!(data.products["Gizmo"].gst_rate, 5);
}

#[test]
fn cell_parsers() {
    assert_eq!(parse_price("12,34,567.89"), 1234567.89);
    assert_eq!(parse_price(""), 0.0);
    assert_eq!(parse_rate(" 28 % "), 28);
    assert_eq!(parse_rate("-"), 18);
}

#[test]
fn missing_sections_default_to_empty() {
    let data = MasterData::from_json("{}").unwrap();
    assert!(data.clients.is_empty());
    assert!(data.products.is_empty());
    assert_eq!(data.billed_by.state, Region::Karnataka);
}

#[test]
fn cache_reloads_only_when_stale() {
    let mut cache = MasterDataCache::new(Duration::from_secs(600));
    let loads = Cell::new(0);
    let load = || {
        loads.set(loads.get() + 1);
        MasterData::from_json(SHEET)
    };

    let t0 = Instant::now();
    assert!(cache.is_stale(t0));
    assert_eq!(cache.get(t0, load).products.len(), 3);
    assert_eq!(cache.get(t0 + Duration::from_secs(599), load).products.len(), 3);
    assert_eq!(loads.get(), 1);

    cache.get(t0 + Duration::from_secs(600), load);
    assert_eq!(loads.get(), 2);

    cache.invalidate();
    cache.get(t0 + Duration::from_secs(601), load);
    assert_eq!(loads.get(), 3);
}

#[test]
fn failed_refresh_keeps_previous_data() {
    let mut cache = MasterDataCache::default();
    let t0 = Instant::now();
    cache.refresh(t0, || MasterData::from_json(SHEET));

    let later = t0 + Duration::from_secs(3600);
    let data = cache.refresh(later, || MasterData::from_json("not json"));
    assert_eq!(data.products.len(), 3);
    assert!(cache.is_stale(later));
}
