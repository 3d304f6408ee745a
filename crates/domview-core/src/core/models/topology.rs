use super::atom::Atom;
use crate::core::utils::identifiers::{BOND_TOLERANCE, covalent_radius, is_bonded, max_covalent_radius};
use kiddo::{KdTree, SquaredEuclidean};

/// Covalent connectivity perceived from interatomic distances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BondGraph {
    neighbors: Vec<Vec<usize>>,
}

impl BondGraph {
    /// Perceives bonds between all atom pairs closer than the sum of their covalent
    /// radii plus [`BOND_TOLERANCE`].
    pub fn perceive(atoms: &[Atom]) -> Self {
        let mut neighbors = vec![Vec::new(); atoms.len()];
        if atoms.is_empty() {
            return Self { neighbors };
        }

        let positions: Vec<[f64; 3]> = atoms
            .iter()
            .map(|a| [a.position.x, a.position.y, a.position.z])
            .collect();
        let kdtree: KdTree<f64, 3> = (&positions).into();
        let max_radius = max_covalent_radius();

        for (i, atom) in atoms.iter().enumerate() {
            let reach = covalent_radius(&atom.element) + max_radius + BOND_TOLERANCE;
            for found in kdtree.within_unsorted::<SquaredEuclidean>(&positions[i], reach * reach) {
                let j = found.item as usize;
                if j <= i {
                    continue;
                }
                if is_bonded(&atom.element, &atoms[j].element, found.distance.sqrt()) {
                    neighbors[i].push(j);
                    neighbors[j].push(i);
                }
            }
        }
        for list in &mut neighbors {
            list.sort_unstable();
        }
        Self { neighbors }
    }

    pub fn neighbors(&self, atom_index: usize) -> &[usize] {
        self.neighbors
            .get(atom_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn are_bonded(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).binary_search(&b).is_ok()
    }

    pub fn bond_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn atom(name: &str, element: &str, x: f64) -> Atom {
        Atom::new(1, name, element, 0, Point3::new(x, 0.3 * x, 0.0))
    }

    #[test]
    fn perceives_chain_of_backbone_bonds() {
        // N-CA-C spaced about 1.5 A apart, then a distant sulfur.
        let atoms = vec![
            atom("N", "N", 0.0),
            atom("CA", "C", 1.4),
            atom("C", "C", 2.8),
            atom("SG", "S", 9.0),
        ];
        let graph = BondGraph::perceive(&atoms);
        assert!(graph.are_bonded(0, 1));
        assert!(graph.are_bonded(1, 2));
        assert!(!graph.are_bonded(0, 2));
        assert!(graph.neighbors(3).is_empty());
        assert_eq!(graph.bond_count(), 2);
    }

    #[test]
    fn empty_input_has_no_bonds() {
        let graph = BondGraph::perceive(&[]);
        assert_eq!(graph.bond_count(), 0);
        assert!(graph.neighbors(5).is_empty());
    }
}
