use super::config::{ImageSize, VolumetricParams};
use crate::core::color::ColorValue;
use crate::core::io::error::StructureError;
use crate::core::io::format::StructureFormat;
use crate::core::models::residue::ResidueKey;
use crate::core::selection::SelectionExpr;
use crate::core::selection::eval::SelectionError;
use nalgebra::{Matrix3, Point3, Vector3};
use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No structure has been loaded into the session")]
    NoStructure,
    #[error("Failed to load structure: {0}")]
    Structure(#[from] StructureError),
    #[error("Invalid selection: {0}")]
    Selection(#[from] SelectionError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Molecular representations a session can show or hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Representation {
    Cartoon,
    Ribbon,
    Sticks,
    Spheres,
    Everything,
}

impl Representation {
    pub fn keyword(&self) -> &'static str {
        match self {
            Representation::Cartoon => "cartoon",
            Representation::Ribbon => "ribbon",
            Representation::Sticks => "sticks",
            Representation::Spheres => "spheres",
            Representation::Everything => "everything",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Global rendering settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOption {
    IgnoreCase(bool),
    RetainOrder(bool),
    CartoonSmoothLoops(bool),
    CartoonSideChainHelper(bool),
    SphereScale(f64),
    /// Draw ribbons through Cα atoms only.
    RibbonTraceAtoms(bool),
    Transparency(f64),
}

impl RenderOption {
    pub fn name(&self) -> &'static str {
        match self {
            RenderOption::IgnoreCase(_) => "ignore_case",
            RenderOption::RetainOrder(_) => "retain_order",
            RenderOption::CartoonSmoothLoops(_) => "cartoon_smooth_loops",
            RenderOption::CartoonSideChainHelper(_) => "cartoon_side_chain_helper",
            RenderOption::SphereScale(_) => "sphere_scale",
            RenderOption::RibbonTraceAtoms(_) => "ribbon_trace_atoms",
            RenderOption::Transparency(_) => "transparency",
        }
    }

    pub fn value(&self) -> String {
        match self {
            RenderOption::IgnoreCase(v)
            | RenderOption::RetainOrder(v)
            | RenderOption::CartoonSmoothLoops(v)
            | RenderOption::CartoonSideChainHelper(v)
            | RenderOption::RibbonTraceAtoms(v) => u8::from(*v).to_string(),
            RenderOption::SphereScale(v) | RenderOption::Transparency(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn vector(&self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// Names of the scene objects created by [`RenderSession::volumetric_surface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumetricSurface {
    pub map: String,
    pub surface: String,
    pub ramp: String,
}

/// A stateful molecular renderer holding one scene.
///
/// Every call blocks until the renderer has applied it. Selections are passed as
/// [`SelectionExpr`] trees and serialized by the implementation.
pub trait RenderSession {
    /// Loads a structure file into a new scene object named `object`.
    fn load_structure(
        &mut self,
        path: &Path,
        format: StructureFormat,
        object: &str,
    ) -> Result<(), SessionError>;

    fn set_option(&mut self, option: RenderOption) -> Result<(), SessionError>;

    fn set_background(&mut self, color: &ColorValue) -> Result<(), SessionError>;

    /// Defines (or redefines) a named selection, returning its atom count.
    fn define_selection(&mut self, name: &str, expr: &SelectionExpr)
    -> Result<usize, SessionError>;

    fn count_atoms(&self, expr: &SelectionExpr) -> Result<usize, SessionError>;

    /// Distinct residues touched by the selection, in model order.
    fn residues(&self, expr: &SelectionExpr) -> Result<Vec<ResidueKey>, SessionError>;

    /// Residue names of the selected atoms, one per distinct residue.
    fn residue_names(&self, expr: &SelectionExpr) -> Result<Vec<String>, SessionError>;

    fn atom_positions(&self, expr: &SelectionExpr) -> Result<Vec<Point3<f64>>, SessionError>;

    fn color(&mut self, color: &ColorValue, expr: &SelectionExpr) -> Result<(), SessionError>;

    fn show(&mut self, rep: Representation, expr: &SelectionExpr) -> Result<(), SessionError>;

    fn hide(&mut self, rep: Representation, expr: &SelectionExpr) -> Result<(), SessionError>;

    /// Aligns the camera with the principal axes of the selection.
    fn orient(&mut self, expr: &SelectionExpr) -> Result<(), SessionError>;

    /// Fits the camera to the selection; `complete` guarantees every atom is visible.
    fn zoom(&mut self, expr: &SelectionExpr, complete: bool) -> Result<(), SessionError>;

    /// Rotates the camera about one of its own axes.
    fn turn(&mut self, axis: Axis, degrees: f64) -> Result<(), SessionError>;

    /// The current model-to-view rotation; view Z of a point is `row(2) · p`.
    fn view_rotation(&self) -> Matrix3<f64>;

    /// Builds a Gaussian density map and isosurface over `object`, colored through a
    /// ramp from the atom colors to white.
    fn volumetric_surface(
        &mut self,
        object: &str,
        params: &VolumetricParams,
    ) -> Result<VolumetricSurface, SessionError>;

    fn delete(&mut self, name: &str) -> Result<(), SessionError>;

    fn deselect(&mut self) -> Result<(), SessionError>;

    fn export_png(&mut self, path: &Path, size: ImageSize, ray: bool) -> Result<(), SessionError>;

    /// Writes the coordinates of the selection, returning the number of atoms saved.
    fn save_coordinates(&mut self, path: &Path, expr: &SelectionExpr)
    -> Result<usize, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_render_name_and_value() {
        assert_eq!(RenderOption::IgnoreCase(false).name(), "ignore_case");
        assert_eq!(RenderOption::IgnoreCase(false).value(), "0");
        assert_eq!(RenderOption::RibbonTraceAtoms(true).value(), "1");
        assert_eq!(RenderOption::SphereScale(0.5).value(), "0.5");
        assert_eq!(RenderOption::Transparency(1.0).value(), "1");
    }

    #[test]
    fn axis_vectors_are_unit_basis_vectors() {
        assert_eq!(Axis::Y.vector(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(Axis::Z.keyword(), "z");
        assert_eq!(Representation::Everything.to_string(), "everything");
    }
}
