use crate::types::{Result, SheetError};
use std::path::Path;

/// One decklist line: a card name and how many copies to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub quantity: u32,
    pub name: String,
    /// Set code from a `(SET)` annotation
    pub set_code: Option<String>,
    /// Collector number following the set code
    pub collector_number: Option<String>,
}

impl DeckEntry {
    pub fn new(quantity: u32, name: impl Into<String>) -> Self {
        Self {
            quantity,
            name: name.into(),
            set_code: None,
            collector_number: None,
        }
    }
}

/// Total number of cards with quantities expanded
pub fn card_count(entries: &[DeckEntry]) -> usize {
    entries.iter().map(|e| e.quantity as usize).sum()
}

/// Read and parse a decklist file
pub async fn load_decklist(path: impl AsRef<Path>) -> Result<Vec<DeckEntry>> {
    let text = tokio::fs::read_to_string(path.as_ref()).await?;
    parse_decklist(&text)
}

/// Parse decklist text.
///
/// Accepted lines: `4 Lightning Bolt`, `4x Lightning Bolt` or a bare name
/// meaning one copy, optionally followed by `(SET)` and a collector number.
/// Blank lines and lines starting with `#` or `//` are skipped.
pub fn parse_decklist(text: &str) -> Result<Vec<DeckEntry>> {
    let mut entries = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();

        // skip empty lines and comments
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        entries.push(parse_line(line, index + 1)?);
    }

    Ok(entries)
}

fn parse_line(line: &str, line_number: usize) -> Result<DeckEntry> {
    let error = |message: String| SheetError::Deck {
        line: line_number,
        message,
    };

    let (quantity, rest) = match split_quantity(line) {
        Some((digits, rest)) => {
            let quantity: u32 = digits
                .parse()
                .map_err(|_| error(format!("invalid quantity '{}'", digits)))?;
            if quantity == 0 {
                return Err(error("quantity must be at least 1".to_string()));
            }
            (quantity, rest)
        }
        None => (1, line),
    };

    let (name, set_code, collector_number) = split_variant(rest);
    if name.is_empty() {
        return Err(error("missing card name".to_string()));
    }

    Ok(DeckEntry {
        quantity,
        name: name.to_string(),
        set_code,
        collector_number,
    })
}

/// Split a leading `4 ` or `4x ` quantity from the rest of the line
fn split_quantity(line: &str) -> Option<(&str, &str)> {
    let digits_end = line
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)?;
    if digits_end == 0 {
        return None;
    }

    let (digits, mut rest) = line.split_at(digits_end);
    if let Some(stripped) = rest.strip_prefix(['x', 'X']) {
        rest = stripped;
    }

    // "4Bolt" or "4xBolt" is not a quantity
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    Some((digits, rest.trim_start()))
}

/// Split a trailing `(SET)` or `(SET) 123` annotation off a card name
fn split_variant(rest: &str) -> (&str, Option<String>, Option<String>) {
    let Some(open) = rest.rfind('(') else {
        return (rest.trim(), None, None);
    };
    let Some(close) = rest[open..].find(')').map(|i| open + i) else {
        return (rest.trim(), None, None);
    };

    let set_code = rest[open + 1..close].trim();
    let tail = rest[close + 1..].trim();
    let name = rest[..open].trim();

    let valid_set = !set_code.is_empty() && set_code.chars().all(|c| c.is_ascii_alphanumeric());
    let valid_tail = !tail.chars().any(char::is_whitespace);
    if !valid_set || !valid_tail {
        return (rest.trim(), None, None);
    }

    let collector_number = (!tail.is_empty()).then(|| tail.to_string());
    (name, Some(set_code.to_string()), collector_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_forms() {
        let text = "4 Lightning Bolt\n2x Counterspell\n3X Brainstorm\nSol Ring";
        let entries = parse_decklist(text).unwrap();
        assert_eq!(
            entries,
            vec![
                DeckEntry::new(4, "Lightning Bolt"),
                DeckEntry::new(2, "Counterspell"),
                DeckEntry::new(3, "Brainstorm"),
                DeckEntry::new(1, "Sol Ring"),
            ]
        );
        assert_eq!(card_count(&entries), 10);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let text = "# main deck\n\n// sideboard below\n  1 Island  \n";
        assert_eq!(parse_decklist(text).unwrap(), vec![DeckEntry::new(1, "Island")]);
    }

    #[test]
    fn test_names_starting_with_x() {
        let entries = parse_decklist("1 Xenagos, the Reveler").unwrap();
        assert_eq!(entries[0].name, "Xenagos, the Reveler");
    }

    #[test]
    fn test_split_card_name_is_kept() {
        let entries = parse_decklist("2 Fire // Ice").unwrap();
        assert_eq!(entries[0], DeckEntry::new(2, "Fire // Ice"));
    }

    #[test]
    fn test_set_annotation() {
        let entries = parse_decklist("1 Sol Ring (SLD) 123\n1 Forest (M21)").unwrap();

        assert_eq!(entries[0].name, "Sol Ring");
        assert_eq!(entries[0].set_code.as_deref(), Some("SLD"));
        assert_eq!(entries[0].collector_number.as_deref(), Some("123"));

        assert_eq!(entries[1].name, "Forest");
        assert_eq!(entries[1].set_code.as_deref(), Some("M21"));
        assert_eq!(entries[1].collector_number, None);
    }

    #[test]
    fn test_parenthesis_in_name_is_not_a_set() {
        let entries = parse_decklist("1 Who (What) When Where Why").unwrap();
        assert_eq!(entries[0].name, "Who (What) When Where Why");
        assert_eq!(entries[0].set_code, None);
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        match parse_decklist("1 Island\n0 Swamp") {
            Err(SheetError::Deck { line, .. }) => assert_eq!(line, 2),
            other => panic!("Expected deck error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_name_is_rejected() {
        assert!(matches!(
            parse_decklist("4x (SLD)"),
            Err(SheetError::Deck { line: 1, .. })
        ));
    }
}
