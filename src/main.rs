use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use gst_invoice::ledger::{CsvLedger, save_invoice, seed_counter};
use gst_invoice::logo::{LogoImage, load_logo};
use gst_invoice::master::MasterData;
use gst_invoice::numbering::InvoiceCounter;
use gst_invoice::request::InvoiceRequest;
use gst_invoice::{Error, InvoiceDocument, render_invoice_to_file};

#[derive(Parser)]
#[command(version, about = "Compute GST invoices and render them as PDF")]
struct Cli {
    /// Master data JSON (billed-by profile, clients, products)
    #[arg(long, env = "GST_INVOICE_MASTER", global = true)]
    master: Option<PathBuf>,

    /// Invoice ledger CSV
    #[arg(long, env = "GST_INVOICE_LEDGER", default_value = "invoices.csv", global = true)]
    ledger: PathBuf,

    /// Logo image, file path or http(s) URL
    #[arg(long, env = "GST_INVOICE_LOGO", global = true)]
    logo: Option<String>,

    /// Logo download timeout in milliseconds
    #[arg(long, env = "GST_INVOICE_LOGO_TIMEOUT_MS", default_value_t = 5000, global = true)]
    logo_timeout_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render an invoice request to PDF without recording it
    Render {
        /// Invoice request JSON
        request: PathBuf,
        /// Output PDF path (defaults to <invoice no>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render an invoice and append it to the ledger
    Save {
        request: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the invoice number the next invoice will get
    NextNumber,
}

struct Session {
    master: MasterData,
    ledger: CsvLedger,
    counter: InvoiceCounter,
    logo: Option<LogoImage>,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self, Error> {
        let master = match &cli.master {
            Some(path) => MasterData::load(path)?,
            None => {
                log::warn!("No master data configured, billed-by and catalog are empty");
                MasterData::default()
            }
        };
        let ledger = CsvLedger::new(&cli.ledger);
        let counter = seed_counter(&ledger);
        let logo = cli
            .logo
            .as_deref()
            .and_then(|src| load_logo(src, Duration::from_millis(cli.logo_timeout_ms)));
        Ok(Self {
            master,
            ledger,
            counter,
            logo,
        })
    }

    fn build(&self, request: &Path) -> Result<InvoiceDocument, Error> {
        let json = std::fs::read_to_string(request)?;
        let req = InvoiceRequest::from_json(&json)?;
        let today = chrono::Local::now().date_naive();
        req.build(&self.master, self.counter.current(), today)
    }

    fn render(&self, doc: &InvoiceDocument, output: Option<PathBuf>) -> Result<PathBuf, Error> {
        let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.pdf", doc.identifier)));
        render_invoice_to_file(doc, self.logo.as_ref(), &output)?;
        Ok(output)
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let mut session = Session::open(&cli)?;

    match cli.command {
        Command::NextNumber => {
            println!("{}", session.counter.current());
        }
        Command::Render { request, output } => {
            let doc = match session.build(&request) {
                Err(Error::NoLineItems) => {
                    log::info!("No line items to invoice, nothing rendered");
                    return Ok(());
                }
                other => other?,
            };
            let path = session.render(&doc, output)?;
            log::info!("Invoice {} rendered to {}", doc.identifier, path.display());
        }
        Command::Save { request, output } => {
            let doc = match session.build(&request) {
                Err(Error::NoLineItems) => {
                    log::info!("No line items to invoice, nothing saved");
                    return Ok(());
                }
                other => other?,
            };
            let path = session.render(&doc, output)?;
            let row = save_invoice(&mut session.ledger, &mut session.counter, &doc)?;
            log::info!(
                "Invoice {} written to {} and recorded in {}",
                row.identifier,
                path.display(),
                session.ledger.path().display(),
            );
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
