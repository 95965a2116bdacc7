/// Identifier used when there is no usable previous identifier.
pub const SEED_IDENTIFIER: &str = "A00001";

const MAX_SERIAL: u64 = 99_999;

/// Returns the identifier that follows `current`.
///
/// Identifiers are one uppercase letter followed by five zero-padded digits.
/// Past 99999 the digits wrap to zero and the letter advances, except that
/// `Z` stays `Z` (so `Z99999` is followed by `Z00000`). Input that does not
/// parse as letter + number yields [`SEED_IDENTIFIER`].
pub fn next_identifier(current: &str) -> String {
    let Some((letter, serial)) = parse_identifier(current) else {
        log::warn!("Unparseable invoice number {current:?}, reseeding to {SEED_IDENTIFIER}");
        return SEED_IDENTIFIER.to_string();
    };

    let mut letter = letter;
    let mut serial = serial + 1;
    if serial > MAX_SERIAL {
        serial = 0;
        if letter != 'Z' {
            letter = (letter as u8 + 1) as char;
        }
    }
    format!("{letter}{serial:05}")
}

fn parse_identifier(s: &str) -> Option<(char, u64)> {
    let mut chars = s.chars();
    let letter = chars.next().filter(char::is_ascii_uppercase)?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((letter, digits.parse().ok()?))
}

/// The editable "next invoice number" for one session.
///
/// Seeded from the last persisted identifier, advanced only after a save
/// succeeds, and reseeded on an explicit reset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvoiceCounter {
    current: String,
}

impl InvoiceCounter {
    pub fn seed(last_persisted: Option<&str>) -> Self {
        let current = match last_persisted.map(str::trim).filter(|s| !s.is_empty()) {
            Some(last) => next_identifier(last),
            None => SEED_IDENTIFIER.to_string(),
        };
        Self { current }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Moves past `saved`, the identifier the invoice was actually saved under
    /// (the user may have edited the suggested value).
    pub(crate) fn advance_past(&mut self, saved: &str) {
        self.current = next_identifier(saved);
    }

    pub fn reseed(&mut self, last_persisted: Option<&str>) {
        *self = Self::seed(last_persisted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_lowercase_and_signs() {
        assert_eq!(parse_identifier("a00001"), None);
        assert_eq!(parse_identifier("A+0001"), None);
        assert_eq!(parse_identifier("A"), None);
        assert_eq!(parse_identifier("B00042"), Some(('B', 42)));
    }
}
