//! Reading and writing of coordinate files.
//!
//! PDB and mmCIF inputs are parsed into a [`MolecularSystem`](crate::core::models::system::MolecularSystem),
//! optionally through gzip compression. PDB output is used for assembly exports.

pub mod error;
pub mod format;
pub mod mmcif;
pub mod pdb;
pub mod traits;
