use super::error::StructureError;
use super::format;
use crate::core::models::system::MolecularSystem;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

/// Common interface of the coordinate file formats understood by the crate.
///
/// Implementors only provide the streaming [`read_from`](Self::read_from); path based
/// reading transparently handles gzip-compressed inputs.
pub trait StructureFile {
    /// Reads a molecular system from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the reader reports an I/O failure.
    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, StructureError>;

    /// Reads a molecular system from a (possibly `.gz` compressed) file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<MolecularSystem, StructureError> {
        let mut reader = format::open_reader(path.as_ref())?;
        Self::read_from(&mut reader)
    }
}

/// Formats that can serialize a subset of atoms of a system.
pub trait StructureWriter {
    /// Writes the atoms at `atom_indices` (in the given order) to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_atoms(
        system: &MolecularSystem,
        atom_indices: &[usize],
        writer: &mut impl Write,
    ) -> Result<(), StructureError>;

    /// Writes the selected atoms to a file path, creating or truncating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_atoms_to_path<P: AsRef<Path>>(
        system: &MolecularSystem,
        atom_indices: &[usize],
        path: P,
    ) -> Result<(), StructureError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_atoms(system, atom_indices, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
