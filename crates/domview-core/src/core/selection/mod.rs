//! Typed atom selections.
//!
//! A [`SelectionExpr`] is built from parsed residue ranges, ligand references, and atom
//! predicates, then either evaluated locally against a structure (see [`eval`]) or
//! serialized into the renderer's selection language through [`Display`](std::fmt::Display).

pub mod eval;

use crate::core::models::residue::ResidueNumber;
use crate::core::ranges::{LigandRef, RangeSpec};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionExpr {
    /// Matches no atom.
    None,
    /// Matches every atom.
    All,
    /// Every atom of a loaded object.
    Object(String),
    /// A previously defined named selection.
    Named(String),
    Chain(String),
    /// Residues whose author number lies in `[start, end]`.
    ResidueRange {
        start: ResidueNumber,
        end: ResidueNumber,
    },
    Residue(ResidueNumber),
    AtomNames(Vec<String>),
    Elements(Vec<String>),
    ResidueNames(Vec<String>),
    And(Box<SelectionExpr>, Box<SelectionExpr>),
    Or(Box<SelectionExpr>, Box<SelectionExpr>),
    Not(Box<SelectionExpr>),
    /// Atoms of `subject` closer than `distance` Angstroms to any atom of `of`.
    Within {
        subject: Box<SelectionExpr>,
        distance: f64,
        of: Box<SelectionExpr>,
    },
    /// Expands a selection to complete residues.
    ByResidue(Box<SelectionExpr>),
    /// Atoms covalently bonded to any atom of the inner selection.
    BoundTo(Box<SelectionExpr>),
}

impl SelectionExpr {
    pub fn chain(id: impl Into<String>) -> Self {
        SelectionExpr::Chain(id.into())
    }

    pub fn named(name: impl Into<String>) -> Self {
        SelectionExpr::Named(name.into())
    }

    pub fn object(name: impl Into<String>) -> Self {
        SelectionExpr::Object(name.into())
    }

    pub fn atom_names(names: &[&str]) -> Self {
        SelectionExpr::AtomNames(names.iter().map(|s| s.to_string()).collect())
    }

    pub fn elements(elements: &[&str]) -> Self {
        SelectionExpr::Elements(elements.iter().map(|s| s.to_string()).collect())
    }

    pub fn residue_names(names: &[&str]) -> Self {
        SelectionExpr::ResidueNames(names.iter().map(|s| s.to_string()).collect())
    }

    pub fn residue_range(start: ResidueNumber, end: ResidueNumber) -> Self {
        SelectionExpr::ResidueRange { start, end }
    }

    pub fn and(self, other: SelectionExpr) -> Self {
        SelectionExpr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: SelectionExpr) -> Self {
        SelectionExpr::Or(Box::new(self), Box::new(other))
    }

    pub fn within(self, distance: f64, of: SelectionExpr) -> Self {
        SelectionExpr::Within {
            subject: Box::new(self),
            distance,
            of: Box::new(of),
        }
    }

    pub fn by_residue(self) -> Self {
        SelectionExpr::ByResidue(Box::new(self))
    }

    pub fn bound_to(self) -> Self {
        SelectionExpr::BoundTo(Box::new(self))
    }

    /// Joins expressions with OR; an empty input matches nothing.
    pub fn any_of(exprs: impl IntoIterator<Item = SelectionExpr>) -> Self {
        exprs
            .into_iter()
            .reduce(|acc, expr| acc.or(expr))
            .unwrap_or(SelectionExpr::None)
    }

    /// The OR over all segments of `chain AND residue range`, in segment order.
    pub fn from_segments(spec: &RangeSpec) -> Self {
        Self::any_of(spec.iter().map(|segment| {
            SelectionExpr::chain(segment.chain.clone())
                .and(SelectionExpr::residue_range(segment.start, segment.end))
        }))
    }

    pub fn chains(ids: &[String]) -> Self {
        Self::any_of(ids.iter().map(|id| SelectionExpr::chain(id.clone())))
    }

    pub fn ligand(ligand: &LigandRef) -> Self {
        SelectionExpr::chain(ligand.chain.clone()).and(SelectionExpr::Residue(ligand.residue))
    }

    pub fn ligands(ligands: &[LigandRef]) -> Self {
        Self::any_of(ligands.iter().map(Self::ligand))
    }

    /// Union that drops empty operands instead of producing `x | none`.
    pub fn union(a: SelectionExpr, b: SelectionExpr) -> Self {
        match (a, b) {
            (SelectionExpr::None, other) | (other, SelectionExpr::None) => other,
            (a, b) => a.or(b),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, SelectionExpr::None)
    }

    fn is_leaf(&self) -> bool {
        !matches!(
            self,
            SelectionExpr::And(..)
                | SelectionExpr::Or(..)
                | SelectionExpr::Not(..)
                | SelectionExpr::Within { .. }
                | SelectionExpr::ByResidue(..)
                | SelectionExpr::BoundTo(..)
        )
    }
}

impl BitOr for SelectionExpr {
    type Output = SelectionExpr;

    fn bitor(self, rhs: Self) -> Self::Output {
        SelectionExpr::union(self, rhs)
    }
}

impl BitAnd for SelectionExpr {
    type Output = SelectionExpr;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl Not for SelectionExpr {
    type Output = SelectionExpr;

    fn not(self) -> Self::Output {
        SelectionExpr::Not(Box::new(self))
    }
}

/// Residue numbers starting with `-` must be escaped or PyMOL reads them as a range.
fn fmt_residue_number(number: &ResidueNumber) -> String {
    if number.is_negative() {
        format!("\\{}", number)
    } else {
        number.to_string()
    }
}

struct Operand<'a>(&'a SelectionExpr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_leaf() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

impl fmt::Display for SelectionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionExpr::None => f.write_str("none"),
            SelectionExpr::All => f.write_str("all"),
            SelectionExpr::Object(name) | SelectionExpr::Named(name) => f.write_str(name),
            SelectionExpr::Chain(id) if id.is_empty() => f.write_str("c. ''"),
            SelectionExpr::Chain(id) => write!(f, "c. {}", id),
            SelectionExpr::ResidueRange { start, end } => write!(
                f,
                "i. {}-{}",
                fmt_residue_number(start),
                fmt_residue_number(end)
            ),
            SelectionExpr::Residue(number) => write!(f, "i. {}", fmt_residue_number(number)),
            SelectionExpr::AtomNames(names) => write!(f, "n. {}", names.join("+")),
            SelectionExpr::Elements(elements) => write!(f, "e. {}", elements.join("+")),
            SelectionExpr::ResidueNames(names) => write!(f, "r. {}", names.join("+")),
            SelectionExpr::And(a, b) => write!(f, "{} & {}", Operand(a), Operand(b)),
            SelectionExpr::Or(a, b) => write!(f, "{} | {}", Operand(a), Operand(b)),
            SelectionExpr::Not(inner) => write!(f, "!{}", Operand(inner)),
            SelectionExpr::Within {
                subject,
                distance,
                of,
            } => write!(f, "{} within {} of {}", Operand(subject), distance, Operand(of)),
            SelectionExpr::ByResidue(inner) => write!(f, "byres ({})", inner),
            SelectionExpr::BoundTo(inner) => write!(f, "bto. ({})", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ranges::{parse_ligand_spec, parse_range_spec};

    #[test]
    fn single_segment_renders_as_chain_and_range() {
        let expr = SelectionExpr::from_segments(&parse_range_spec("A:1-129"));
        assert_eq!(expr.to_string(), "c. A & i. 1-129");
    }

    #[test]
    fn multi_segment_renders_as_parenthesized_union_in_order() {
        let expr = SelectionExpr::from_segments(&parse_range_spec("B:2-29,A:1-21"));
        assert_eq!(expr.to_string(), "(c. B & i. 2-29) | (c. A & i. 1-21)");
    }

    #[test]
    fn negative_residue_numbers_are_escaped() {
        let expr = SelectionExpr::from_segments(&parse_range_spec("A:-5--1"));
        assert_eq!(expr.to_string(), "c. A & i. \\-5-\\-1");
        let ligand = SelectionExpr::ligands(&parse_ligand_spec("A:-3"));
        assert_eq!(ligand.to_string(), "c. A & i. \\-3");
    }

    #[test]
    fn empty_inputs_produce_the_empty_selection() {
        assert!(SelectionExpr::from_segments(&RangeSpec::default()).is_none());
        assert_eq!(SelectionExpr::chains(&[]).to_string(), "none");
        let dom = SelectionExpr::named("dom");
        assert_eq!(SelectionExpr::None | dom.clone(), dom);
    }

    #[test]
    fn chain_union_lists_chains_in_order() {
        let expr = SelectionExpr::chains(&["B".to_string(), "A".to_string()]);
        assert_eq!(expr.to_string(), "c. B | c. A");
    }

    #[test]
    fn spatial_and_topological_operators_render() {
        let sg = SelectionExpr::named("dom")
            & SelectionExpr::residue_names(&["CYS", "CYX"])
            & SelectionExpr::atom_names(&["SG"]);
        let disulfide = (sg.clone() & sg.bound_to()).by_residue()
            & SelectionExpr::atom_names(&["CA", "CB", "SG"]);
        assert!(disulfide.to_string().starts_with("(byres ("));
        assert!(disulfide.to_string().ends_with(") & n. CA+CB+SG"));

        let near = (!SelectionExpr::atom_names(&["C", "O"]) & SelectionExpr::named("dom"))
            .within(4.0, SelectionExpr::named("spheres"));
        assert_eq!(near.to_string(), "((!n. C+O) & dom) within 4 of spheres");
    }
}
