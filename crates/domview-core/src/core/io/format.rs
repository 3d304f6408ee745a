use super::error::StructureError;
use super::mmcif::MmcifFile;
use super::pdb::PdbFile;
use super::traits::StructureFile;
use crate::core::models::system::MolecularSystem;
use flate2::read::GzDecoder;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// The two coordinate formats a structure may be deposited in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    /// Legacy fixed-column PDB format.
    Pdb,
    /// Dictionary-based mmCIF format.
    Mmcif,
}

impl StructureFormat {
    /// Detects the format from the file name, ignoring a trailing `.gz`.
    ///
    /// Recognizes `.pdb`, `.ent` and `.cif`/`.mmcif` extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        let name = name.strip_suffix(".gz").unwrap_or(&name);
        let extension = name.rsplit_once('.').map(|(_, ext)| ext)?;
        match extension {
            "pdb" | "ent" => Some(StructureFormat::Pdb),
            "cif" | "mmcif" => Some(StructureFormat::Mmcif),
            _ => None,
        }
    }

    /// The format keyword understood by the renderer's `load` command.
    pub fn keyword(&self) -> &'static str {
        match self {
            StructureFormat::Pdb => "pdb",
            StructureFormat::Mmcif => "cif",
        }
    }

    /// Reads a structure of this format from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsed.
    pub fn read(&self, path: &Path) -> Result<MolecularSystem, StructureError> {
        match self {
            StructureFormat::Pdb => PdbFile::read_from_path(path),
            StructureFormat::Mmcif => MmcifFile::read_from_path(path),
        }
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Returns `true` if the path carries a `.gz` extension.
pub fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case("gz"))
}

/// Opens `path` for buffered reading, decompressing gzip content on the fly.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened.
pub fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzip_path(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Decompresses a gzip file fully into `writer`, returning the number of bytes written.
///
/// # Errors
///
/// Returns an I/O error if reading or writing fails.
pub fn decompress_into(path: &Path, writer: &mut impl io::Write) -> io::Result<u64> {
    let file = File::open(path)?;
    let mut decoder = GzDecoder::new(file);
    io::copy(&mut decoder, writer)
}
