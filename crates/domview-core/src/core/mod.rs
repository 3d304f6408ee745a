//! # Core Module
//!
//! Stateless building blocks of the rendering pipeline.
//!
//! ## Overview
//!
//! Everything in this module is a pure function of its inputs: structures are parsed
//! into immutable models, residue ranges into ordered segment lists, and selections
//! into expression trees that can be evaluated against a model or serialized for a
//! renderer.
//!
//! - **Structure Models** ([`models`]) - Atoms, residues, chains, and perceived bonds
//! - **File I/O** ([`io`]) - PDB and mmCIF readers, PDB writer, gzip handling
//! - **Residue Ranges** ([`ranges`]) - `chain:start-end` specifications and ligand references
//! - **Selections** ([`selection`]) - Typed selection expressions and their evaluation
//! - **Ligands** ([`ligands`]) - Single-atom versus multi-atom het group classification
//! - **Colors** ([`color`]) - RGB values, HSV conversion, and renderer color names

pub mod color;
pub mod io;
pub mod ligands;
pub mod models;
pub mod ranges;
pub mod selection;
pub mod utils;
