/// A polymer or het chain, identified by its author chain ID (may be multi-character).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub id: String,
    pub(crate) residues: Vec<usize>, // Residue indices in file order
}

impl Chain {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            residues: Vec::new(),
        }
    }

    pub fn residues(&self) -> &[usize] {
        &self.residues
    }
}
