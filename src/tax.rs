use crate::model::{ComputedRow, InvoiceTotals, LineItem, Region, TaxRegime, TaxSplit};

/// Computes the GST split and row total for one line item.
///
/// No rounding happens here, and the rate is taken as given: validating it is
/// the caller's job.
pub fn compute_row(item: LineItem, billed_by: Region, billed_to: Region) -> ComputedRow {
    let base_amount = item.base_amount();
    let rate = item.gst_rate as f64;

    let tax = match TaxRegime::for_parties(billed_by, billed_to) {
        TaxRegime::IntraState => {
            let half = base_amount * (rate / 2.0) / 100.0;
            TaxSplit {
                cgst: half,
                sgst: half,
                igst: 0.0,
            }
        }
        TaxRegime::InterState => TaxSplit {
            cgst: 0.0,
            sgst: 0.0,
            igst: base_amount * rate / 100.0,
        },
    };

    let row_total = base_amount + tax.cgst + tax.sgst + tax.igst;
    ComputedRow {
        item,
        base_amount,
        tax,
        row_total,
    }
}

/// Folds computed rows into document totals. An empty slice yields all zeros.
pub fn aggregate(rows: &[ComputedRow]) -> InvoiceTotals {
    let totals = rows.iter().fold(InvoiceTotals::default(), |mut acc, row| {
        acc.subtotal += row.base_amount;
        acc.cgst += row.tax.cgst;
        acc.sgst += row.tax.sgst;
        acc.igst += row.tax.igst;
        acc.grand_total += row.row_total;
        acc.quantity += row.item.quantity as u64;
        acc
    });

    debug_assert!(
        (totals.grand_total - (totals.subtotal + totals.cgst + totals.sgst + totals.igst)).abs()
            <= 1e-6 * totals.grand_total.abs().max(1.0),
        "grand total drifted from its components"
    );
    totals
}

/// Rounds a money value to two decimals for display and persistence.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
