use nalgebra::Point3;

/// A single atom record as read from a coordinate file.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Serial number from the source file.
    pub serial: usize,
    /// The atom name (e.g., "CA", "SG", "ZN").
    pub name: String,
    /// Upper-case element symbol (e.g., "C", "ZN").
    pub element: String,
    /// Index of the parent residue in the owning system.
    pub residue_index: usize,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
    pub occupancy: f64,
    pub b_factor: f64,
}

impl Atom {
    /// Creates an atom with unit occupancy and a zero B-factor.
    ///
    /// An empty `element` is inferred from the leading letters of the atom name.
    pub fn new(
        serial: usize,
        name: &str,
        element: &str,
        residue_index: usize,
        position: Point3<f64>,
    ) -> Self {
        let element = if element.trim().is_empty() {
            infer_element(name)
        } else {
            element.trim().to_ascii_uppercase()
        };
        Self {
            serial,
            name: name.trim().to_string(),
            element,
            residue_index,
            position,
            occupancy: 1.0,
            b_factor: 0.0,
        }
    }
}

fn infer_element(name: &str) -> String {
    name.trim()
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}
