use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An author residue number with its optional insertion code (e.g. `-5`, `42`, `100A`).
///
/// Ordering follows sequence number first, then insertion code, where a missing
/// insertion code sorts before any letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResidueNumber {
    pub sequence: i32,
    pub insertion: Option<char>,
}

impl ResidueNumber {
    pub const fn new(sequence: i32) -> Self {
        Self {
            sequence,
            insertion: None,
        }
    }

    pub const fn with_insertion(sequence: i32, insertion: char) -> Self {
        Self {
            sequence,
            insertion: Some(insertion),
        }
    }

    pub fn is_negative(&self) -> bool {
        self.sequence < 0
    }

    /// Whether this number lies in the closed interval `[start, end]`.
    pub fn in_range(&self, start: &ResidueNumber, end: &ResidueNumber) -> bool {
        self >= start && self <= end
    }
}

impl Ord for ResidueNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sequence
            .cmp(&other.sequence)
            .then_with(|| self.insertion.cmp(&other.insertion))
    }
}

impl PartialOrd for ResidueNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ResidueNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.insertion {
            Some(code) => write!(f, "{}{}", self.sequence, code),
            None => write!(f, "{}", self.sequence),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid residue number: '{0}'")]
pub struct ParseResidueNumberError(pub String);

impl FromStr for ResidueNumber {
    type Err = ParseResidueNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (digits, insertion) = match trimmed.chars().last() {
            Some(last) if last.is_ascii_alphabetic() => {
                (&trimmed[..trimmed.len() - 1], Some(last))
            }
            _ => (trimmed, None),
        };
        let sequence = digits
            .parse::<i32>()
            .map_err(|_| ParseResidueNumberError(s.to_string()))?;
        Ok(Self {
            sequence,
            insertion,
        })
    }
}

/// Identifies a residue across the renderer boundary by author chain and number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResidueKey {
    pub chain: String,
    pub number: ResidueNumber,
}

impl ResidueKey {
    pub fn new(chain: impl Into<String>, number: ResidueNumber) -> Self {
        Self {
            chain: chain.into(),
            number,
        }
    }
}

impl fmt::Display for ResidueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub number: ResidueNumber,
    pub name: String,         // Residue name (e.g., "ALA", "ZN")
    pub chain_index: usize,   // Index of the parent chain
    pub hetero: bool,         // Built from HETATM records
    pub(crate) atoms: Vec<usize>,
}

impl Residue {
    pub(crate) fn new(number: ResidueNumber, name: &str, chain_index: usize, hetero: bool) -> Self {
        Self {
            number,
            name: name.to_string(),
            chain_index,
            hetero,
            atoms: Vec::new(),
        }
    }

    pub fn atoms(&self) -> &[usize] {
        &self.atoms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_negative_and_inserted_numbers() {
        assert_eq!("42".parse(), Ok(ResidueNumber::new(42)));
        assert_eq!("-5".parse(), Ok(ResidueNumber::new(-5)));
        assert_eq!("100A".parse(), Ok(ResidueNumber::with_insertion(100, 'A')));
        assert_eq!(" 7 ".parse(), Ok(ResidueNumber::new(7)));
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert!("".parse::<ResidueNumber>().is_err());
        assert!("A".parse::<ResidueNumber>().is_err());
        assert!("1-2".parse::<ResidueNumber>().is_err());
    }

    #[test]
    fn ordering_puts_plain_number_before_insertions() {
        let plain = ResidueNumber::new(10);
        let inserted = ResidueNumber::with_insertion(10, 'A');
        let next = ResidueNumber::new(11);
        assert!(plain < inserted);
        assert!(inserted < next);
        assert!(ResidueNumber::new(-3) < ResidueNumber::new(1));
    }

    #[test]
    fn in_range_is_inclusive_on_both_ends() {
        let start = ResidueNumber::new(-2);
        let end = ResidueNumber::with_insertion(5, 'B');
        assert!(start.in_range(&start, &end));
        assert!(end.in_range(&start, &end));
        assert!(ResidueNumber::with_insertion(5, 'A').in_range(&start, &end));
        assert!(!ResidueNumber::new(6).in_range(&start, &end));
        assert!(!ResidueNumber::new(-3).in_range(&start, &end));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for text in ["-12", "0", "88", "250C"] {
            let number: ResidueNumber = text.parse().unwrap();
            assert_eq!(number.to_string(), text);
        }
    }
}
