//! # Workflows Module
//!
//! High-level entry points that run complete procedures against a render session.
//!
//! - **Domain Images** ([`domain_images`]) - Renders a domain in structure, chain, and
//!   domain context and exports thumbnail and full-size images for each, optionally
//!   saving the coordinates of a domain assembly.

pub mod domain_images;
