mod common;

use common::*;
use gst_invoice::ledger::{Ledger, MemoryLedger, save_invoice, seed_counter};
use gst_invoice::numbering::{InvoiceCounter, SEED_IDENTIFIER, next_identifier};

#[test]
fn increments_within_a_letter() {
    assert_eq!(next_identifier("A00001"), "A00002");
    assert_eq!(next_identifier("C00999"), "C01000");
}

#[test]
fn rolls_over_to_the_next_letter() {
    assert_eq!(next_identifier("A99999"), "B00000");
    assert_eq!(next_identifier("Y99999"), "Z00000");
}

#[test]
fn z_wraps_within_z() {
    assert_eq!(next_identifier("Z99999"), "Z00000");
}

#[test]
fn malformed_input_falls_back_to_seed() {
    for bad in ["", "garbage", "1A0001", "a00001", "A-0001", "AB0001"] {
        assert_eq!(next_identifier(bad), SEED_IDENTIFIER, "input {bad:?}");
    }
}

#[test]
fn short_serials_are_padded() {
    assert_eq!(next_identifier("B7"), "B00008");
}

#[test]
fn counter_seeds_from_last_persisted() {
    assert_eq!(InvoiceCounter::seed(None).current(), "A00001");
    assert_eq!(InvoiceCounter::seed(Some("  ")).current(), "A00001");
    assert_eq!(InvoiceCounter::seed(Some("A00041")).current(), "A00042");
}

#[test]
fn counter_reseeds_on_reset() {
    let mut counter = InvoiceCounter::seed(Some("A00010"));
    counter.reseed(Some("B00005"));
    assert_eq!(counter.current(), "B00006");
    counter.reseed(None);
    assert_eq!(counter.current(), SEED_IDENTIFIER);
}

#[test]
fn counter_advances_only_through_a_save() {
    init_logging();
    let mut ledger = MemoryLedger::new();
    let mut counter = seed_counter(&ledger);
    assert_eq!(counter.current(), "A00001");

    let doc = invoice(counter.current(), local_client(), many_items(1));
    save_invoice(&mut ledger, &mut counter, &doc).unwrap();
    assert_eq!(counter.current(), "A00002");

    // An edited identifier moves the counter past what was actually saved.
    let doc = invoice("A00100", local_client(), many_items(1));
    save_invoice(&mut ledger, &mut counter, &doc).unwrap();
    assert_eq!(counter.current(), "A00101");

    assert_eq!(seed_counter(&ledger).current(), "A00101");
    assert_eq!(ledger.rows().unwrap().len(), 2);
}
