//! # Engine Module
//!
//! Stateful pieces of the imaging pipeline, all driven through a [`session::RenderSession`].
//!
//! ## Overview
//!
//! A render session owns the scene: the loaded structure, named selections, colors,
//! visible representations, and the camera. The components here take decisions against
//! that scene and apply them, one blocking call at a time.
//!
//! - **Sessions** ([`session`], [`scripted`]) - The renderer abstraction and its PyMOL script implementation
//! - **Coloring** ([`rainbow`]) - Rainbow hues by rank in declared segment order
//! - **Representation** ([`representation`]) - Cartoon, ribbon, or volumetric per context level
//! - **Orientation** ([`orientation`]) - Half-turn flips bringing the domain to the front
//! - **Configuration** ([`config`]) - Thresholds, image sizes, and volumetric parameters
//! - **Progress Monitoring** ([`progress`]) - Stage and export events for user feedback
//! - **Error Handling** ([`error`]) - Engine-level error type wrapping the lower layers

pub mod config;
pub mod error;
pub mod orientation;
pub mod progress;
pub mod rainbow;
pub mod representation;
pub mod scripted;
pub mod session;
