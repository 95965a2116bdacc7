mod error;
mod fonts;
pub mod items;
pub mod ledger;
pub mod logo;
pub mod master;
pub mod model;
pub mod numbering;
pub mod pagination;
mod pdf;
pub mod request;
pub mod tax;

pub use error::Error;
pub use model::{InvoiceDocument, LineItem, PartyState, Region, TaxRegime};
pub use pdf::{FOOTER_BAND, MARGIN, PAGE_HEIGHT, PAGE_WIDTH, format_amount, page_frame};

use std::path::Path;
use std::time::Instant;

use logo::LogoImage;

/// Renders `doc` to PDF bytes. Nothing is returned on failure.
pub fn render_invoice(doc: &InvoiceDocument, logo: Option<&LogoImage>) -> Result<Vec<u8>, Error> {
    pdf::render(doc, logo)
}

pub fn render_invoice_to_file(
    doc: &InvoiceDocument,
    logo: Option<&LogoImage>,
    output: &Path,
) -> Result<(), Error> {
    let t0 = Instant::now();

    let bytes = pdf::render(doc, logo)?;
    let t_render = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_render.as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}
