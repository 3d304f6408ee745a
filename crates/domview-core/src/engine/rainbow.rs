//! Rainbow coloring across a multi-segment domain in declared segment order.
//!
//! Residues are ranked by their position in the concatenation of all segments, so a
//! domain written as `B:2-29,A:1-21` starts blue on chain B and ends red on chain A
//! regardless of chain naming.

use super::error::EngineError;
use super::session::RenderSession;
use crate::core::color::{ColorValue, Rgb, hsv_to_rgb};
use crate::core::models::residue::ResidueKey;
use crate::core::ranges::{RangeSpec, Segment};
use crate::core::selection::SelectionExpr;
use crate::core::utils::identifiers::ALPHA_CARBON;
use std::collections::HashSet;
use tracing::debug;

const START_HUE: f64 = 2.0 / 3.0;

/// Colors assigned to residues, in rank order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorAssignment {
    entries: Vec<(ResidueKey, Rgb)>,
}

impl ColorAssignment {
    pub fn entries(&self) -> &[(ResidueKey, Rgb)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn color_of(&self, key: &ResidueKey) -> Option<Rgb> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, rgb)| *rgb)
    }
}

/// Hue of rank `k` out of `total`, sweeping from blue (2/3) down to red (0).
///
/// A single residue gets the start hue.
pub fn hue_at(k: usize, total: usize) -> f64 {
    if total < 2 {
        return START_HUE;
    }
    START_HUE * (1.0 - k as f64 / (total - 1) as f64)
}

pub fn rainbow_color(k: usize, total: usize) -> Rgb {
    let (r, g, b) = hsv_to_rgb(hue_at(k, total), 1.0, 1.0);
    Rgb::from_unit(r, g, b)
}

/// Ranks the residues returned by `present` for each segment, in segment order.
///
/// `present` yields the residues of a segment that carry a Cα marker, in sequence
/// order. Colors depend only on the rank in this concatenation. A residue covered by
/// more than one segment keeps the rank of its first occurrence.
pub fn assign<F, E>(spec: &RangeSpec, mut present: F) -> Result<ColorAssignment, E>
where
    F: FnMut(&Segment) -> Result<Vec<ResidueKey>, E>,
{
    let mut seen = HashSet::new();
    let mut ranked = Vec::new();
    for segment in spec {
        let residues = present(segment)?;
        debug!("Segment {} has {} residue(s) with Cα.", segment, residues.len());
        ranked.extend(residues.into_iter().filter(|key| seen.insert(key.clone())));
    }

    let total = ranked.len();
    let entries = ranked
        .into_iter()
        .enumerate()
        .map(|(k, key)| (key, rainbow_color(k, total)))
        .collect();
    Ok(ColorAssignment { entries })
}

/// Computes the rainbow for `spec` from the session's structure without coloring.
pub fn compute<S: RenderSession>(
    session: &S,
    spec: &RangeSpec,
) -> Result<ColorAssignment, EngineError> {
    assign(spec, |segment| {
        let markers = SelectionExpr::chain(segment.chain.clone())
            & SelectionExpr::residue_range(segment.start, segment.end)
            & SelectionExpr::atom_names(&[ALPHA_CARBON]);
        session.residues(&markers).map_err(EngineError::from)
    })
}

/// Computes and applies the rainbow, coloring every atom of each ranked residue.
pub fn apply<S: RenderSession>(
    session: &mut S,
    spec: &RangeSpec,
) -> Result<ColorAssignment, EngineError> {
    let assignment = compute(session, spec)?;
    for (key, rgb) in assignment.entries() {
        let residue = SelectionExpr::chain(key.chain.clone()) & SelectionExpr::Residue(key.number);
        session.color(&ColorValue::Rgb(*rgb), &residue)?;
    }
    debug!("Applied rainbow over {} residue(s).", assignment.len());
    Ok(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::residue::ResidueNumber;
    use crate::core::io::format::StructureFormat;
    use crate::core::ranges::parse_range_spec;
    use crate::engine::scripted::PymolScriptSession;
    use std::convert::Infallible;
    use std::fmt::Write as _;

    fn present_all(segment: &Segment) -> Result<Vec<ResidueKey>, Infallible> {
        Ok((segment.start.sequence..=segment.end.sequence)
            .map(|n| ResidueKey::new(segment.chain.clone(), ResidueNumber::new(n)))
            .collect())
    }

    fn hue_of(rgb: Rgb) -> f64 {
        // Only blue-to-red hues occur, so invert the piecewise mapping directly.
        let (r, g, b) = (rgb.r as f64, rgb.g as f64, rgb.b as f64);
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let d = max - min;
        let h = if max == r {
            ((g - b) / d).rem_euclid(6.0)
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h / 6.0
    }

    #[test]
    fn order_follows_declared_segments_not_chain_names() {
        let spec = parse_range_spec("B:2-4,A:1-2");
        let assignment = assign(&spec, present_all).unwrap();
        let order: Vec<String> = assignment
            .entries()
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(order, vec!["B:2", "B:3", "B:4", "A:1", "A:2"]);

        let hues: Vec<f64> = assignment.entries().iter().map(|(_, c)| hue_of(*c)).collect();
        assert!(hues.windows(2).all(|w| w[0] > w[1]), "{hues:?}");
        assert_eq!(assignment.entries()[0].1, Rgb::new(0, 0, 255));
        assert_eq!(assignment.entries()[4].1, Rgb::new(255, 0, 0));
    }

    #[test]
    fn hue_sweeps_from_two_thirds_to_zero() {
        assert_eq!(hue_at(0, 5), 2.0 / 3.0);
        assert_eq!(hue_at(4, 5), 0.0);
        assert!((hue_at(2, 5) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_inputs_do_not_divide_by_zero() {
        let empty = assign(&parse_range_spec("A:5-1"), present_all).unwrap();
        assert!(empty.is_empty());

        let single = assign(&parse_range_spec("A:7-7"), present_all).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single.entries()[0].1, Rgb::new(0, 0, 255));
    }

    #[test]
    fn accessor_errors_propagate() {
        let spec = parse_range_spec("A:1-3");
        let result: Result<ColorAssignment, &str> = assign(&spec, |_| Err("unavailable"));
        assert_eq!(result, Err("unavailable"));
    }

    #[test]
    fn overlapping_segments_color_each_residue_once_at_first_rank() {
        let assignment = assign(&parse_range_spec("A:1-3,A:2-4"), present_all).unwrap();
        let order: Vec<String> = assignment
            .entries()
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(order, vec!["A:1", "A:2", "A:3", "A:4"]);
        assert_eq!(assignment.entries()[0].1, rainbow_color(0, 4));
        assert_eq!(assignment.entries()[3].1, Rgb::new(255, 0, 0));

        let second = ResidueKey::new("A", ResidueNumber::new(2));
        assert_eq!(assignment.color_of(&second), Some(rainbow_color(1, 4)));
    }

    #[test]
    fn color_lookup_by_residue_key() {
        let assignment = assign(&parse_range_spec("A:1-3"), present_all).unwrap();
        let middle = ResidueKey::new("A", ResidueNumber::new(2));
        assert_eq!(assignment.color_of(&middle), Some(Rgb::new(0, 255, 0)));
        assert_eq!(assignment.color_of(&ResidueKey::new("B", ResidueNumber::new(2))), None);
    }

    // One Cα per residue on chain A, numbered -2, -1, 1, 10, 10A, 11.
    fn numbered_session(dir: &tempfile::TempDir) -> PymolScriptSession {
        let numbers = [(-2, ' '), (-1, ' '), (1, ' '), (10, ' '), (10, 'A'), (11, ' ')];
        let mut text = String::new();
        for (i, (resi, insertion)) in numbers.into_iter().enumerate() {
            writeln!(
                text,
                "ATOM  {:>5}  CA  ALA A{:>4}{}   {:>8.3}{:>8.3}{:>8.3}  1.00 20.00           C",
                i + 1,
                resi,
                insertion,
                3.8 * i as f64,
                0.0,
                0.0
            )
            .unwrap();
        }
        let path = dir.path().join("3neg.pdb");
        std::fs::write(&path, text).unwrap();

        let mut session = PymolScriptSession::new();
        session.load_structure(&path, StructureFormat::Pdb, "3neg").unwrap();
        session
    }

    #[test]
    fn negative_and_insertion_numbered_residues_are_colored() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = numbered_session(&dir);
        let assignment = apply(&mut session, &parse_range_spec("A:-2-1,A:10A-11")).unwrap();

        let order: Vec<String> = assignment
            .entries()
            .iter()
            .map(|(k, _)| k.to_string())
            .collect();
        assert_eq!(order, vec!["A:-2", "A:-1", "A:1", "A:10A", "A:11"]);

        let colors: Vec<&String> = session
            .commands()
            .iter()
            .filter(|c| c.starts_with("color "))
            .collect();
        assert_eq!(colors.len(), 5);
        assert_eq!(colors[0], "color 0x0000ff, c. A & i. \\-2");
        assert_eq!(colors[3], "color 0xffff00, c. A & i. 10A");
        assert_eq!(colors[4], "color 0xff0000, c. A & i. 11");
        assert!(!session.commands().iter().any(|c| c.ends_with("i. 10")));
    }
}
