use super::atom::Atom;
use super::chain::Chain;
use super::residue::{Residue, ResidueNumber};
use super::topology::BondGraph;
use nalgebra::Point3;
use std::cell::OnceCell;
use std::collections::HashMap;

/// A complete coordinate model: atoms, residues, and chains stored in flat vectors.
///
/// Atoms, residues, and chains are addressed by their index in the respective
/// vector. Indices are stable for the lifetime of the system since the model is
/// immutable once built.
#[derive(Debug, Clone, Default)]
pub struct MolecularSystem {
    atoms: Vec<Atom>,
    residues: Vec<Residue>,
    chains: Vec<Chain>,
    chain_index_map: HashMap<String, usize>,
    residue_index_map: HashMap<(usize, ResidueNumber), usize>,
    bonds: OnceCell<BondGraph>,
}

impl MolecularSystem {
    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn residues(&self) -> &[Residue] {
        &self.residues
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    pub fn atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn residue(&self, index: usize) -> Option<&Residue> {
        self.residues.get(index)
    }

    pub fn chain(&self, index: usize) -> Option<&Chain> {
        self.chains.get(index)
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Finds a chain index by its author chain identifier (case-sensitive).
    pub fn find_chain(&self, id: &str) -> Option<usize> {
        self.chain_index_map.get(id).copied()
    }

    /// Finds a residue index by chain identifier and residue number.
    pub fn find_residue(&self, chain_id: &str, number: ResidueNumber) -> Option<usize> {
        let chain_index = self.find_chain(chain_id)?;
        self.residue_index_map.get(&(chain_index, number)).copied()
    }

    /// Returns the residue owning the atom at `atom_index`.
    pub fn residue_of(&self, atom_index: usize) -> Option<&Residue> {
        self.atoms
            .get(atom_index)
            .and_then(|atom| self.residues.get(atom.residue_index))
    }

    /// Returns the chain owning the atom at `atom_index`.
    pub fn chain_of(&self, atom_index: usize) -> Option<&Chain> {
        self.residue_of(atom_index)
            .and_then(|residue| self.chains.get(residue.chain_index))
    }

    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.atoms.iter().map(|atom| &atom.position)
    }

    pub fn bonds(&self) -> &BondGraph {
        self.bonds.get_or_init(|| BondGraph::perceive(&self.atoms))
    }
}

/// Incrementally assembles a [`MolecularSystem`] from streamed atom records.
///
/// Readers call [`start_chain`](Self::start_chain) and
/// [`start_residue`](Self::start_residue) whenever the chain or residue changes,
/// then [`add_atom`](Self::add_atom) for every atom record.
#[derive(Debug, Default)]
pub struct MolecularSystemBuilder {
    system: MolecularSystem,
    current_chain_idx: Option<usize>,
    current_residue_idx: Option<usize>,
}

impl MolecularSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_chain(&mut self, id: &str) -> &mut Self {
        let system = &mut self.system;
        let idx = *system
            .chain_index_map
            .entry(id.to_string())
            .or_insert_with(|| {
                system.chains.push(Chain::new(id));
                system.chains.len() - 1
            });
        self.current_chain_idx = Some(idx);
        self.current_residue_idx = None;
        self
    }

    /// Starts (or resumes) a residue in the current chain.
    ///
    /// Returns `None` when no chain has been started.
    pub fn start_residue(
        &mut self,
        number: ResidueNumber,
        name: &str,
        hetero: bool,
    ) -> Option<&mut Self> {
        let chain_idx = self.current_chain_idx?;
        let system = &mut self.system;
        let idx = *system
            .residue_index_map
            .entry((chain_idx, number))
            .or_insert_with(|| {
                system
                    .residues
                    .push(Residue::new(number, name, chain_idx, hetero));
                let index = system.residues.len() - 1;
                system.chains[chain_idx].residues.push(index);
                index
            });
        self.current_residue_idx = Some(idx);
        Some(self)
    }

    /// Appends an atom to the current residue, returning its index.
    ///
    /// Returns `None` when no residue has been started.
    pub fn add_atom(
        &mut self,
        serial: usize,
        name: &str,
        element: &str,
        position: Point3<f64>,
        occupancy: f64,
        b_factor: f64,
    ) -> Option<usize> {
        let res_idx = self.current_residue_idx?;
        let atom_idx = self.system.atoms.len();
        let mut atom = Atom::new(serial, name, element, res_idx, position);
        atom.occupancy = occupancy;
        atom.b_factor = b_factor;
        self.system.atoms.push(atom);
        self.system.residues[res_idx].atoms.push(atom_idx);
        Some(atom_idx)
    }

    pub fn build(self) -> MolecularSystem {
        self.system
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_chain_system() -> MolecularSystem {
        let mut builder = MolecularSystemBuilder::new();
        builder.start_chain("B");
        builder.start_residue(ResidueNumber::new(2), "GLY", false);
        builder.add_atom(1, "N", "N", Point3::new(0.0, 0.0, 0.0), 1.0, 10.0);
        builder.add_atom(2, "CA", "C", Point3::new(1.46, 0.0, 0.0), 1.0, 10.0);
        builder.start_chain("A");
        builder.start_residue(ResidueNumber::new(-1), "ALA", false);
        builder.add_atom(3, "CA", "C", Point3::new(5.0, 0.0, 0.0), 1.0, 10.0);
        builder.start_residue(ResidueNumber::new(801), "ZN", true);
        builder.add_atom(4, "ZN", "ZN", Point3::new(9.0, 0.0, 0.0), 1.0, 10.0);
        builder.build()
    }

    #[test]
    fn builder_preserves_file_order_of_chains_and_residues() {
        let system = two_chain_system();
        let chain_ids: Vec<_> = system.chains().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(chain_ids, vec!["B", "A"]);
        assert_eq!(system.chains()[1].residues().len(), 2);
        assert_eq!(system.atom_count(), 4);
    }

    #[test]
    fn lookups_resolve_chain_residue_and_owner() {
        let system = two_chain_system();
        let zn = system
            .find_residue("A", ResidueNumber::new(801))
            .and_then(|idx| system.residue(idx))
            .unwrap();
        assert_eq!(zn.name, "ZN");
        assert!(zn.hetero);
        assert_eq!(system.chain_of(0).unwrap().id, "B");
        assert_eq!(system.residue_of(2).unwrap().number, ResidueNumber::new(-1));
        assert!(system.find_chain("a").is_none());
    }

    #[test]
    fn resuming_a_residue_appends_to_the_existing_one() {
        let mut builder = MolecularSystemBuilder::new();
        builder.start_chain("A");
        builder.start_residue(ResidueNumber::new(1), "SER", false);
        builder.add_atom(1, "N", "N", Point3::origin(), 1.0, 0.0);
        builder.start_chain("A");
        builder.start_residue(ResidueNumber::new(1), "SER", false);
        builder.add_atom(2, "CA", "C", Point3::origin(), 1.0, 0.0);
        let system = builder.build();
        assert_eq!(system.residues().len(), 1);
        assert_eq!(system.residues()[0].atoms(), &[0, 1]);
    }

    #[test]
    fn adding_atoms_without_a_residue_is_rejected() {
        let mut builder = MolecularSystemBuilder::new();
        assert!(builder.add_atom(1, "CA", "C", Point3::origin(), 1.0, 0.0).is_none());
        assert!(builder.start_residue(ResidueNumber::new(1), "ALA", false).is_none());
    }
}
