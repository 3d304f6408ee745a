//! # domview Core Library
//!
//! Renders images of a protein structural domain in three nested contexts: the whole
//! deposited structure, the chains containing the domain, and the isolated domain.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture.
//!
//! - **[`core`]: The Foundation.** Stateless data models (`MolecularSystem`), structure
//!   readers, residue-range parsing, typed selections, ligand classification, and colors.
//!
//! - **[`engine`]: The Logic Core.** The `RenderSession` abstraction over a molecular
//!   renderer and the decisions taken against it: rainbow coloring in declared segment
//!   order, adaptive representation choice, and camera orientation for very large
//!   structures.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into the
//!   complete domain imaging procedure, from scene preparation to PNG export.

pub mod core;
pub mod engine;
pub mod workflows;
