//! # Structure Models
//!
//! Plain data structures describing a loaded coordinate file.
//!
//! - [`atom`] - Atom records with element, position, occupancy and B-factor
//! - [`residue`] - Residues and author residue numbers with insertion codes
//! - [`chain`] - Chains identified by (possibly multi-letter) author chain IDs
//! - [`system`] - The complete model plus a streaming builder used by the readers
//! - [`topology`] - Distance-based covalent bond perception

pub mod atom;
pub mod chain;
pub mod residue;
pub mod system;
pub mod topology;
