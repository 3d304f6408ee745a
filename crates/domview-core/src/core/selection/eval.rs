use super::SelectionExpr;
use crate::core::models::system::MolecularSystem;
use kiddo::{KdTree, SquaredEuclidean};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Unknown selection name: '{0}'")]
    UnknownName(String),
    #[error("Unknown object: '{0}'")]
    UnknownObject(String),
}

/// One flag per atom of a [`MolecularSystem`], in atom index order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomMask {
    bits: Vec<bool>,
}

impl AtomMask {
    pub fn none(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    pub fn all(len: usize) -> Self {
        Self {
            bits: vec![true; len],
        }
    }

    pub fn from_fn(len: usize, f: impl FnMut(usize) -> bool) -> Self {
        Self {
            bits: (0..len).map(f).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Number of selected atoms.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|&b| b)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.bits.get(index).copied().unwrap_or(false)
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
    }

    pub fn and(&self, other: &AtomMask) -> AtomMask {
        self.zip_with(other, |a, b| a && b)
    }

    pub fn or(&self, other: &AtomMask) -> AtomMask {
        self.zip_with(other, |a, b| a || b)
    }

    pub fn invert(&self) -> AtomMask {
        Self {
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }

    fn zip_with(&self, other: &AtomMask, op: impl Fn(bool, bool) -> bool) -> AtomMask {
        Self {
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(&a, &b)| op(a, b))
                .collect(),
        }
    }
}

/// Evaluates [`SelectionExpr`] trees against a loaded structure.
///
/// Named selections resolve through a table of masks captured when each name was
/// defined, so later changes to their source expressions do not affect them.
pub struct SelectionEvaluator<'a> {
    system: &'a MolecularSystem,
    object: Option<&'a str>,
    named: Option<&'a HashMap<String, AtomMask>>,
}

impl<'a> SelectionEvaluator<'a> {
    pub fn new(system: &'a MolecularSystem) -> Self {
        Self {
            system,
            object: None,
            named: None,
        }
    }

    pub fn with_object(mut self, name: &'a str) -> Self {
        self.object = Some(name);
        self
    }

    pub fn with_named(mut self, named: &'a HashMap<String, AtomMask>) -> Self {
        self.named = Some(named);
        self
    }

    pub fn evaluate(&self, expr: &SelectionExpr) -> Result<AtomMask, SelectionError> {
        let n = self.system.atom_count();
        let system = self.system;
        let mask = match expr {
            SelectionExpr::None => AtomMask::none(n),
            SelectionExpr::All => AtomMask::all(n),
            SelectionExpr::Object(name) => {
                if self.object != Some(name.as_str()) {
                    return Err(SelectionError::UnknownObject(name.clone()));
                }
                AtomMask::all(n)
            }
            SelectionExpr::Named(name) => self
                .named
                .and_then(|table| table.get(name))
                .cloned()
                .ok_or_else(|| SelectionError::UnknownName(name.clone()))?,
            SelectionExpr::Chain(id) => AtomMask::from_fn(n, |i| {
                system.chain_of(i).is_some_and(|chain| chain.id == *id)
            }),
            SelectionExpr::ResidueRange { start, end } => AtomMask::from_fn(n, |i| {
                system
                    .residue_of(i)
                    .is_some_and(|residue| residue.number.in_range(start, end))
            }),
            SelectionExpr::Residue(number) => AtomMask::from_fn(n, |i| {
                system
                    .residue_of(i)
                    .is_some_and(|residue| residue.number == *number)
            }),
            SelectionExpr::AtomNames(names) => AtomMask::from_fn(n, |i| {
                system
                    .atom(i)
                    .is_some_and(|atom| names.iter().any(|name| *name == atom.name))
            }),
            SelectionExpr::Elements(elements) => AtomMask::from_fn(n, |i| {
                system.atom(i).is_some_and(|atom| {
                    elements.iter().any(|e| e.eq_ignore_ascii_case(&atom.element))
                })
            }),
            SelectionExpr::ResidueNames(names) => AtomMask::from_fn(n, |i| {
                system
                    .residue_of(i)
                    .is_some_and(|residue| names.iter().any(|name| *name == residue.name))
            }),
            SelectionExpr::And(a, b) => self.evaluate(a)?.and(&self.evaluate(b)?),
            SelectionExpr::Or(a, b) => self.evaluate(a)?.or(&self.evaluate(b)?),
            SelectionExpr::Not(inner) => self.evaluate(inner)?.invert(),
            SelectionExpr::Within {
                subject,
                distance,
                of,
            } => {
                let subject = self.evaluate(subject)?;
                let reference = self.evaluate(of)?;
                self.within(&subject, *distance, &reference)
            }
            SelectionExpr::ByResidue(inner) => self.by_residue(&self.evaluate(inner)?),
            SelectionExpr::BoundTo(inner) => self.bound_to(&self.evaluate(inner)?),
        };
        Ok(mask)
    }

    fn within(&self, subject: &AtomMask, distance: f64, reference: &AtomMask) -> AtomMask {
        let n = self.system.atom_count();
        let reference_positions: Vec<[f64; 3]> = reference
            .indices()
            .filter_map(|i| self.system.atom(i))
            .map(|a| [a.position.x, a.position.y, a.position.z])
            .collect();
        if reference_positions.is_empty() {
            return AtomMask::none(n);
        }

        let kdtree: KdTree<f64, 3> = (&reference_positions).into();
        let radius_sq = distance * distance;
        AtomMask::from_fn(n, |i| {
            if !subject.contains(i) {
                return false;
            }
            self.system.atom(i).is_some_and(|atom| {
                let query = [atom.position.x, atom.position.y, atom.position.z];
                kdtree.nearest_one::<SquaredEuclidean>(&query).distance <= radius_sq
            })
        })
    }

    fn by_residue(&self, inner: &AtomMask) -> AtomMask {
        let mut mask = AtomMask::none(self.system.atom_count());
        let mut seen = vec![false; self.system.residues().len()];
        for i in inner.indices() {
            let Some(atom) = self.system.atom(i) else {
                continue;
            };
            if std::mem::replace(&mut seen[atom.residue_index], true) {
                continue;
            }
            if let Some(residue) = self.system.residue(atom.residue_index) {
                for &member in residue.atoms() {
                    mask.bits[member] = true;
                }
            }
        }
        mask
    }

    fn bound_to(&self, inner: &AtomMask) -> AtomMask {
        let bonds = self.system.bonds();
        let mut mask = AtomMask::none(self.system.atom_count());
        for i in inner.indices() {
            for &neighbor in bonds.neighbors(i) {
                mask.bits[neighbor] = true;
            }
        }
        mask
    }
}
