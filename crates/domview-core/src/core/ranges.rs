//! Parsing of textual residue-range specifications such as `B:2-29,A:1-21`.
//!
//! Segment order is kept exactly as written, since it drives the coloring order of a
//! domain. Malformed tokens are reported with a warning and skipped.

use crate::core::models::residue::ResidueNumber;
use std::fmt;
use tracing::warn;

/// One contiguous residue interval on a single chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub chain: String,
    pub start: ResidueNumber,
    pub end: ResidueNumber,
}

impl Segment {
    pub fn new(chain: impl Into<String>, start: ResidueNumber, end: ResidueNumber) -> Self {
        Self {
            chain: chain.into(),
            start,
            end,
        }
    }

    pub fn contains(&self, chain: &str, number: &ResidueNumber) -> bool {
        self.chain == chain && number.in_range(&self.start, &self.end)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chain, self.start, self.end)
    }
}

/// An ordered list of segments. Order is significant and never re-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeSpec {
    segments: Vec<Segment>,
}

impl RangeSpec {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Distinct chain identifiers in order of first appearance.
    pub fn chains(&self) -> Vec<String> {
        let mut chains: Vec<String> = Vec::new();
        for segment in &self.segments {
            if !chains.contains(&segment.chain) {
                chains.push(segment.chain.clone());
            }
        }
        chains
    }

    pub fn extend(&mut self, other: &RangeSpec) {
        self.segments.extend(other.segments.iter().cloned());
    }
}

impl<'a> IntoIterator for &'a RangeSpec {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A bound ligand residue named on the command line, e.g. `A:801`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LigandRef {
    pub chain: String,
    pub residue: ResidueNumber,
}

impl fmt::Display for LigandRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain, self.residue)
    }
}

/// Parses a residue bound of the form `-?\d+[A-Z]?`.
fn parse_bound(text: &str) -> Option<ResidueNumber> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (numeric, insertion) = match digits.chars().last() {
        Some(c) if c.is_ascii_uppercase() => (&digits[..digits.len() - 1], Some(c)),
        _ => (digits, None),
    };
    if numeric.is_empty() || !numeric.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let magnitude: i32 = numeric.parse().ok()?;
    let sequence = if text.starts_with('-') {
        -magnitude
    } else {
        magnitude
    };
    Some(ResidueNumber {
        sequence,
        insertion,
    })
}

/// Splits `start-end`, treating a leading `-` on either bound as a sign.
fn parse_interval(text: &str) -> Option<(ResidueNumber, ResidueNumber)> {
    let separator = text
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '-')
        .map(|(i, _)| i)?;
    let start = parse_bound(&text[..separator])?;
    let end = parse_bound(&text[separator + 1..])?;
    Some((start, end))
}

fn parse_segment(token: &str) -> Option<Segment> {
    let (chain, range) = token.split_once(':')?;
    let chain = chain.trim();
    if chain.is_empty() {
        return None;
    }
    let (start, end) = parse_interval(range.trim())?;
    Some(Segment::new(chain, start, end))
}

/// Parses a comma-separated list of `chain:start-end` tokens.
///
/// Tokens that do not match are skipped with a warning; an input with no valid token
/// yields an empty [`RangeSpec`].
pub fn parse_range_spec(text: &str) -> RangeSpec {
    let mut segments = Vec::new();
    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_segment(token) {
            Some(segment) => segments.push(segment),
            None => warn!("Skipping malformed range token '{}'.", token),
        }
    }
    RangeSpec::new(segments)
}

/// Parses a comma-separated list of `chain:residue` ligand references.
pub fn parse_ligand_spec(text: &str) -> Vec<LigandRef> {
    let mut ligands = Vec::new();
    for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let parsed = token.split_once(':').and_then(|(chain, residue)| {
            let chain = chain.trim();
            let residue = parse_bound(residue.trim())?;
            (!chain.is_empty()).then(|| LigandRef {
                chain: chain.to_string(),
                residue,
            })
        });
        match parsed {
            Some(ligand) => ligands.push(ligand),
            None => warn!("Skipping malformed ligand token '{}'.", token),
        }
    }
    ligands
}
