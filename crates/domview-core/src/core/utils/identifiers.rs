use phf::{Map, phf_map};

/// Atom name of the alpha carbon, used as the per-residue marker.
pub const ALPHA_CARBON: &str = "CA";
/// Atom name of the backbone amide nitrogen.
pub const BACKBONE_NITROGEN: &str = "N";

/// Extra distance allowed beyond the sum of covalent radii when perceiving bonds.
pub const BOND_TOLERANCE: f64 = 0.45;
/// Atoms closer than this are considered overlapping rather than bonded.
pub const MIN_BOND_DISTANCE: f64 = 0.4;

const DEFAULT_COVALENT_RADIUS: f64 = 0.77;

// Single-bond covalent radii in Angstroms.
static COVALENT_RADII: Map<&'static str, f64> = phf_map! {
    "H" => 0.31, "D" => 0.31, "HE" => 0.28,
    "LI" => 1.28, "BE" => 0.96, "B" => 0.84, "C" => 0.76, "N" => 0.71, "O" => 0.66, "F" => 0.57,
    "NA" => 1.66, "MG" => 1.41, "AL" => 1.21, "SI" => 1.11, "P" => 1.07, "S" => 1.05, "CL" => 1.02,
    "K" => 2.03, "CA" => 1.76, "V" => 1.53, "CR" => 1.39, "MN" => 1.39, "FE" => 1.32,
    "CO" => 1.26, "NI" => 1.24, "CU" => 1.32, "ZN" => 1.22, "GA" => 1.22, "AS" => 1.19,
    "SE" => 1.20, "BR" => 1.20, "RB" => 2.20, "SR" => 1.95, "MO" => 1.54, "RU" => 1.46,
    "RH" => 1.42, "PD" => 1.39, "AG" => 1.45, "CD" => 1.44, "SB" => 1.39, "TE" => 1.38,
    "I" => 1.39, "CS" => 2.44, "BA" => 2.15, "W" => 1.62, "PT" => 1.36, "AU" => 1.36,
    "HG" => 1.32, "PB" => 1.46, "U" => 1.96,
};

/// Covalent radius for an element symbol, falling back to a carbon-like value.
pub fn covalent_radius(element: &str) -> f64 {
    COVALENT_RADII
        .get(element.trim().to_ascii_uppercase().as_str())
        .copied()
        .unwrap_or(DEFAULT_COVALENT_RADIUS)
}

/// The largest radius in the table, bounding the bond search distance.
pub fn max_covalent_radius() -> f64 {
    COVALENT_RADII
        .values()
        .copied()
        .fold(DEFAULT_COVALENT_RADIUS, f64::max)
}

/// Whether two atoms at `distance` Angstroms apart are covalently bonded.
pub fn is_bonded(element_a: &str, element_b: &str, distance: f64) -> bool {
    let limit = covalent_radius(element_a) + covalent_radius(element_b) + BOND_TOLERANCE;
    distance > MIN_BOND_DISTANCE && distance <= limit
}
