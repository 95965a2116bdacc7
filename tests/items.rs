mod common;

use chrono::NaiveDate;
use common::*;
use gst_invoice::items::{LineItemInput, LineItemInputs, apply_product_selection};
use gst_invoice::master::{CatalogEntry, MasterData};
use gst_invoice::request::InvoiceRequest;
use gst_invoice::{Error, Region, TaxRegime};

fn named(name: &str) -> LineItemInput {
    LineItemInput {
        name: name.to_string(),
        ..LineItemInput::default()
    }
}

#[test]
fn inputs_always_keep_one_row() {
    let inputs = LineItemInputs::new();
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs.remove_last().len(), 1);

    let three = inputs.add_row().add_row();
    assert_eq!(three.len(), 3);
    assert_eq!(three.remove_last().len(), 2);
    assert_eq!(LineItemInputs::from_rows(Vec::new()).len(), 1);
}

#[test]
fn new_rows_have_form_defaults() {
    let row = LineItemInput::default();
    assert_eq!(row.quantity, 1);
    assert_eq!(row.unit_price, 0.0);
    assert_eq!(row.gst_rate, 18);
}

#[test]
fn blank_names_are_dropped_in_order() {
    let inputs = LineItemInputs::from_rows(vec![named("First"), named("  "), named("Third")]);
    let items = inputs.line_items();
    let names: Vec<_> = items.iter().map(|i| i.product.as_str()).collect();
    assert_eq!(names, vec!["First", "Third"]);
}

#[test]
fn product_selection_keeps_quantity() {
    let entry = CatalogEntry {
        name: "Widget".to_string(),
        hsn: "8471".to_string(),
        unit_price: 250.0,
        gst_rate: 12,
    };
    let current = LineItemInput {
        quantity: 4,
        ..named("old")
    };
    let picked = apply_product_selection(&current, &entry);
    assert_eq!(picked.name, "Widget");
    assert_eq!(picked.hsn, "8471");
    assert_eq!(picked.unit_price, 250.0);
    assert_eq!(picked.gst_rate, 12);
    assert_eq!(picked.quantity, 4);

    let replaced = LineItemInputs::new().add_row().replace(1, picked.clone());
    assert_eq!(replaced.rows()[1], picked);
    assert_eq!(replaced.rows()[0], LineItemInput::default());
}

const MASTER: &str = r#"{
    "billed_by": {"Company Name": "Acme Traders", "State": "Karnataka"},
    "clients": [{"Client Name": "Chennai Stores", "State": "Tamil Nadu"}],
    "products": [{"Product Name": "Widget", "HSN Code": "8471", "Price": "250", "GST %": "12"}]
}"#;

#[test]
fn request_resolves_catalog_and_client() {
    init_logging();
    let master = MasterData::from_json(MASTER).unwrap();
    let req = InvoiceRequest::from_json(
        r#"{
            "client": "Chennai Stores - Tamil Nadu",
            "issue_date": "2024-03-01",
            "items": [
                {"product": "Widget", "quantity": 3},
                {"name": "Installation", "unit_price": 500, "gst_rate": 18},
                {"name": ""}
            ]
        }"#,
    )
    .unwrap();

    let doc = req.build(&master, "A00042", date(2024, 5, 5)).unwrap();
    assert_eq!(doc.identifier, "A00042");
    assert_eq!(doc.issue_date, date(2024, 3, 1));
    assert_eq!(doc.due_date, date(2024, 3, 8));
    assert_eq!(doc.billed_to.state, Region::TamilNadu);
    assert_eq!(doc.regime, TaxRegime::InterState);
    assert_eq!(doc.rows.len(), 2);
    assert_eq!(doc.rows[0].item.unit_price, 250.0);
    assert_eq!(doc.rows[0].item.quantity, 3);
    assert_eq!(doc.rows[0].item.hsn, "8471");
    assert_eq!(doc.rows[1].item.hsn, "");
    assert_eq!(doc.totals.subtotal, 1250.0);
}

#[test]
fn request_defaults_dates_and_party() {
    let master = MasterData::from_json(MASTER).unwrap();
    let req = InvoiceRequest::from_json(
        r#"{
            "identifier": "B00001",
            "billed_to": {"name": "Walk-in", "state": "Karnataka"},
            "items": [{"name": "Repair", "unit_price": 100}]
        }"#,
    )
    .unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
    let doc = req.build(&master, "A00001", today).unwrap();
    assert_eq!(doc.identifier, "B00001");
    assert_eq!(doc.issue_date, today);
    assert_eq!(doc.due_date, date(2025, 1, 4));
    assert_eq!(doc.regime, TaxRegime::IntraState);
    assert_eq!(doc.totals.cgst, 9.0);
}

#[test]
fn request_without_named_items_is_refused() {
    let master = MasterData::default();
    let req = InvoiceRequest::from_json(r#"{"items": [{"name": " "}, {}]}"#).unwrap();
    let result = req.build(&master, "A00001", date(2024, 1, 1));
    assert!(matches!(result, Err(Error::NoLineItems)));
}
