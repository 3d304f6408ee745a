//! Classification of bound het groups into single-atom ions and multi-atom ligands.

use phf::{Set, phf_set};
use std::fmt;

/// Het codes of groups consisting of a single atom (metals, monatomic ions, unknown atoms).
static ATOMIC_LIGANDS: Set<&'static str> = phf_set! {
    "3CO", "3NI", "4MO", "6MO", "AG", "AL", "AR", "ARS", "AU", "AU3", "BA", "BR", "BRO",
    "BS3", "CA", "CD", "CE", "CL", "CLO", "CO", "CR", "CS", "CU", "CU1", "CU3", "D8U",
    "DUM", "DY", "ER3", "EU", "EU3", "F", "FE", "FE2", "FLO", "GA", "GD", "GD3", "H",
    "HG", "HO", "HO3", "IDO", "IN", "IOD", "IR", "IR3", "K", "KR", "LA", "LI", "LU",
    "MG", "MN", "MN3", "MO", "NA", "NGN", "NI", "O", "OS", "OS4", "OX", "OXO", "PB",
    "PD", "PR", "PT", "PT4", "QTR", "RB", "RE", "RH", "RH3", "RU", "S", "SB", "SE",
    "SM", "SR", "TA0", "TB", "TE", "TL", "U1", "UNX", "V", "W", "XE", "Y1", "YB", "YB2",
    "YT3", "ZN", "ZN2",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LigandClass {
    /// Drawn as spheres together with its coordinating side chains.
    Atomic,
    /// Drawn as sticks.
    Polyatomic,
}

impl fmt::Display for LigandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LigandClass::Atomic => f.write_str("atomic"),
            LigandClass::Polyatomic => f.write_str("polyatomic"),
        }
    }
}

/// Classifies a residue name. Matching is exact and case-sensitive after trimming.
pub fn classify(residue_name: &str) -> LigandClass {
    if ATOMIC_LIGANDS.contains(residue_name.trim()) {
        LigandClass::Atomic
    } else {
        LigandClass::Polyatomic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_metal_ions_are_atomic() {
        for code in ["ZN", "CA", "MG", "FE2", "UNX", " NA "] {
            assert_eq!(classify(code), LigandClass::Atomic, "{code}");
        }
    }

    #[test]
    fn multi_atom_and_unknown_codes_are_polyatomic() {
        for code in ["HEM", "NAG", "ATP", "XYZ", "", "zn"] {
            assert_eq!(classify(code), LigandClass::Polyatomic, "{code}");
        }
        assert_eq!(classify("SO4"), LigandClass::Polyatomic);
    }
}
