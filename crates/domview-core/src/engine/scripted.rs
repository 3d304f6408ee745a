//! A [`RenderSession`] that records a PyMOL command script.
//!
//! The structure is also loaded locally so that counts, residue lists, coordinates,
//! bonds, and proximity queries are answered without a running renderer. The camera
//! rotation is tracked locally too and written into the script with `set_view`, so the
//! view PyMOL renders is the one every orientation decision was taken against.

use super::config::{ImageSize, VolumetricParams};
use super::session::{
    Axis, RenderOption, RenderSession, Representation, SessionError, VolumetricSurface,
};
use crate::core::color::ColorValue;
use crate::core::io::format::StructureFormat;
use crate::core::io::pdb::PdbFile;
use crate::core::io::traits::StructureWriter;
use crate::core::models::residue::ResidueKey;
use crate::core::models::system::MolecularSystem;
use crate::core::selection::SelectionExpr;
use crate::core::selection::eval::{AtomMask, SelectionError, SelectionEvaluator};
use crate::core::utils::geometry::{
    bounding_radius, centroid, principal_axes, rotation_from_axis_angle,
};
use nalgebra::{Matrix3, Point3};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, trace, warn};

const MAP_NAME: &str = "map";
const SURFACE_NAME: &str = "surf";
const RAMP_NAME: &str = "ramp";
const FIELD_OF_VIEW_DEGREES: f64 = 20.0;

struct LoadedStructure {
    object: String,
    system: MolecularSystem,
}

pub struct PymolScriptSession {
    structure: Option<LoadedStructure>,
    named: HashMap<String, AtomMask>,
    rotation: Matrix3<f64>,
    commands: Vec<String>,
}

impl Default for PymolScriptSession {
    fn default() -> Self {
        Self {
            structure: None,
            named: HashMap::new(),
            rotation: Matrix3::identity(),
            commands: Vec::new(),
        }
    }
}

impl PymolScriptSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn system(&self) -> Option<&MolecularSystem> {
        self.structure.as_ref().map(|s| &s.system)
    }

    /// The recorded commands as a `.pml` script.
    pub fn script(&self) -> String {
        let mut script = self.commands.join("\n");
        script.push('\n');
        script
    }

    pub fn write_script(&self, path: &Path) -> Result<(), SessionError> {
        fs::write(path, self.script())?;
        debug!(
            "Wrote {} renderer command(s) to {}.",
            self.commands.len(),
            path.display()
        );
        Ok(())
    }

    fn loaded(&self) -> Result<&LoadedStructure, SessionError> {
        self.structure.as_ref().ok_or(SessionError::NoStructure)
    }

    fn evaluate(&self, expr: &SelectionExpr) -> Result<AtomMask, SessionError> {
        let loaded = self.loaded()?;
        let mask = SelectionEvaluator::new(&loaded.system)
            .with_object(&loaded.object)
            .with_named(&self.named)
            .evaluate(expr)?;
        Ok(mask)
    }

    fn emit(&mut self, line: String) {
        trace!("pymol> {}", line);
        self.commands.push(line);
    }
}

/// Quotes a path for the command line parser when it contains separators.
fn script_path(path: &Path) -> String {
    let text = path.display().to_string();
    if text.contains(|c: char| c.is_whitespace() || c == ',' || c == ';') {
        format!("\"{}\"", text)
    } else {
        text
    }
}

/// `set_view` with the given rotation, looking at `center` from far enough to see
/// a sphere of `radius`.
///
/// The rotation is written column by column, which is how the renderer stores it.
fn set_view_command(rotation: &Matrix3<f64>, center: &Point3<f64>, radius: f64) -> String {
    let half_fov = (FIELD_OF_VIEW_DEGREES / 2.0).to_radians();
    let radius = radius.max(1.0);
    let distance = radius / half_fov.tan();

    let mut values: Vec<f64> = Vec::with_capacity(18);
    for col in 0..3 {
        for row in 0..3 {
            values.push(rotation[(row, col)]);
        }
    }
    values.extend([0.0, 0.0, -distance]);
    values.extend([center.x, center.y, center.z]);
    values.extend([distance - radius, distance + radius, -FIELD_OF_VIEW_DEGREES]);

    let formatted: Vec<String> = values.iter().map(|v| format!("{:.6}", v)).collect();
    format!("set_view ({})", formatted.join(", "))
}

impl RenderSession for PymolScriptSession {
    fn load_structure(
        &mut self,
        path: &Path,
        format: StructureFormat,
        object: &str,
    ) -> Result<(), SessionError> {
        let system = format.read(path)?;
        debug!(
            "Loaded {} atoms in {} chain(s) from {}.",
            system.atom_count(),
            system.chains().len(),
            path.display()
        );
        self.structure = Some(LoadedStructure {
            object: object.to_string(),
            system,
        });
        self.named.clear();
        self.rotation = Matrix3::identity();
        self.emit(format!(
            "load {}, {}, format={}",
            script_path(path),
            object,
            format.keyword()
        ));
        Ok(())
    }

    fn set_option(&mut self, option: RenderOption) -> Result<(), SessionError> {
        self.emit(format!("set {}, {}", option.name(), option.value()));
        Ok(())
    }

    fn set_background(&mut self, color: &ColorValue) -> Result<(), SessionError> {
        self.emit(format!("bg_color {}", color));
        Ok(())
    }

    fn define_selection(
        &mut self,
        name: &str,
        expr: &SelectionExpr,
    ) -> Result<usize, SessionError> {
        let mask = self.evaluate(expr)?;
        let count = mask.count();
        self.named.insert(name.to_string(), mask);
        self.emit(format!("select {}, {}", name, expr));
        Ok(count)
    }

    fn count_atoms(&self, expr: &SelectionExpr) -> Result<usize, SessionError> {
        Ok(self.evaluate(expr)?.count())
    }

    fn residues(&self, expr: &SelectionExpr) -> Result<Vec<ResidueKey>, SessionError> {
        let mask = self.evaluate(expr)?;
        let system = &self.loaded()?.system;
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for i in mask.indices() {
            let Some(atom) = system.atom(i) else {
                continue;
            };
            if !seen.insert(atom.residue_index) {
                continue;
            }
            if let (Some(residue), Some(chain)) = (system.residue_of(i), system.chain_of(i)) {
                keys.push(ResidueKey::new(chain.id.clone(), residue.number));
            }
        }
        Ok(keys)
    }

    fn residue_names(&self, expr: &SelectionExpr) -> Result<Vec<String>, SessionError> {
        let mask = self.evaluate(expr)?;
        let system = &self.loaded()?.system;
        let mut seen = HashSet::new();
        Ok(mask
            .indices()
            .filter_map(|i| system.atom(i))
            .filter(|atom| seen.insert(atom.residue_index))
            .filter_map(|atom| system.residue(atom.residue_index))
            .map(|residue| residue.name.clone())
            .collect())
    }

    fn atom_positions(&self, expr: &SelectionExpr) -> Result<Vec<Point3<f64>>, SessionError> {
        let mask = self.evaluate(expr)?;
        let system = &self.loaded()?.system;
        Ok(mask
            .indices()
            .filter_map(|i| system.atom(i))
            .map(|atom| atom.position)
            .collect())
    }

    fn color(&mut self, color: &ColorValue, expr: &SelectionExpr) -> Result<(), SessionError> {
        self.emit(format!("color {}, {}", color, expr));
        Ok(())
    }

    fn show(&mut self, rep: Representation, expr: &SelectionExpr) -> Result<(), SessionError> {
        self.emit(format!("show {}, {}", rep, expr));
        Ok(())
    }

    fn hide(&mut self, rep: Representation, expr: &SelectionExpr) -> Result<(), SessionError> {
        self.emit(format!("hide {}, {}", rep, expr));
        Ok(())
    }

    fn orient(&mut self, expr: &SelectionExpr) -> Result<(), SessionError> {
        let positions = self.atom_positions(expr)?;
        let (Some(rotation), Some(center)) = (principal_axes(&positions), centroid(&positions))
        else {
            warn!("Cannot orient on empty selection '{}'.", expr);
            return Ok(());
        };
        let radius = bounding_radius(&center, &positions);
        self.rotation = rotation;
        self.emit(set_view_command(&rotation, &center, radius));
        Ok(())
    }

    fn zoom(&mut self, expr: &SelectionExpr, complete: bool) -> Result<(), SessionError> {
        if complete {
            self.emit(format!("zoom {}, complete=1", expr));
        } else {
            self.emit(format!("zoom {}", expr));
        }
        Ok(())
    }

    fn turn(&mut self, axis: Axis, degrees: f64) -> Result<(), SessionError> {
        let turn = rotation_from_axis_angle(&axis.vector(), degrees);
        self.rotation = turn.matrix() * self.rotation;
        self.emit(format!("turn {}, {}", axis.keyword(), degrees));
        Ok(())
    }

    fn view_rotation(&self) -> Matrix3<f64> {
        self.rotation
    }

    fn volumetric_surface(
        &mut self,
        object: &str,
        params: &VolumetricParams,
    ) -> Result<VolumetricSurface, SessionError> {
        if self.loaded()?.object != object {
            return Err(SelectionError::UnknownObject(object.to_string()).into());
        }
        let levels: Vec<String> = params.ramp_levels.iter().map(|l| l.to_string()).collect();
        let colors: Vec<String> = params
            .ramp_colors
            .iter()
            .map(|c| c.code().to_string())
            .collect();

        self.emit(format!("set gaussian_resolution, {}", params.gaussian_resolution));
        self.emit(format!("set gaussian_b_floor, {}", params.gaussian_b_floor));
        self.emit(format!(
            "map_new {}, gaussian, {}, {}, {}",
            MAP_NAME, params.grid_spacing, object, params.buffer
        ));
        self.emit(format!(
            "isosurface {}, {}, {}",
            SURFACE_NAME, MAP_NAME, params.isosurface_level
        ));
        self.emit(format!(
            "ramp_new {}, {}, [{}], [{}]",
            RAMP_NAME,
            object,
            levels.join(", "),
            colors.join(", ")
        ));
        self.emit(format!("color {}, {}", RAMP_NAME, SURFACE_NAME));
        self.emit(format!("disable {}", RAMP_NAME));

        Ok(VolumetricSurface {
            map: MAP_NAME.to_string(),
            surface: SURFACE_NAME.to_string(),
            ramp: RAMP_NAME.to_string(),
        })
    }

    fn delete(&mut self, name: &str) -> Result<(), SessionError> {
        self.named.remove(name);
        self.emit(format!("delete {}", name));
        Ok(())
    }

    fn deselect(&mut self) -> Result<(), SessionError> {
        self.emit("deselect".to_string());
        Ok(())
    }

    fn export_png(&mut self, path: &Path, size: ImageSize, ray: bool) -> Result<(), SessionError> {
        self.emit(format!(
            "png {}, width={}, height={}, ray={}",
            script_path(path),
            size.width,
            size.height,
            u8::from(ray)
        ));
        Ok(())
    }

    fn save_coordinates(
        &mut self,
        path: &Path,
        expr: &SelectionExpr,
    ) -> Result<usize, SessionError> {
        let mask = self.evaluate(expr)?;
        let indices: Vec<usize> = mask.indices().collect();
        PdbFile::write_atoms_to_path(&self.loaded()?.system, &indices, path)?;
        debug!("Saved {} atom(s) to {}.", indices.len(), path.display());
        Ok(indices.len())
    }
}
