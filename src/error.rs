use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    Csv(csv::Error),
    /// Nothing to invoice: every line input had a blank product name.
    NoLineItems,
    /// Page assembly failed; no document was produced.
    Layout(String),
    Ledger(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "invalid JSON: {e}"),
            Error::Csv(e) => write!(f, "ledger CSV error: {e}"),
            Error::NoLineItems => write!(f, "no line items with a product name"),
            Error::Layout(msg) => write!(f, "invoice generation failed: {msg}"),
            Error::Ledger(msg) => write!(f, "failed to save invoice: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
            Error::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}
