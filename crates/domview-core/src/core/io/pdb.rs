use super::error::{StructureError, StructureParseErrorKind};
use super::traits::{StructureFile, StructureWriter};
use crate::core::models::residue::ResidueNumber;
use crate::core::models::system::{MolecularSystem, MolecularSystemBuilder};
use nalgebra::Point3;
use std::io::{BufRead, Write};
use tracing::warn;

const MIN_ATOM_RECORD_LENGTH: usize = 54;
const MAX_PDB_SERIAL: usize = 99_999;

fn column(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end.min(line.len())).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize, field: &str) -> Result<f64, StructureError> {
    let value = column(line, start, end);
    value.parse().map_err(|_| StructureError::Parse {
        line: line_num,
        kind: StructureParseErrorKind::InvalidFloat {
            field: field.to_string(),
            value: value.to_string(),
        },
    })
}

/// Reader and writer for the legacy fixed-column PDB format.
///
/// Only `ATOM`/`HETATM` records of the first model are read; every alternate
/// location is kept as its own atom.
pub struct PdbFile;

impl StructureFile for PdbFile {
    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, StructureError> {
        let mut builder = MolecularSystemBuilder::new();
        let mut current_chain: Option<String> = None;
        let mut current_residue: Option<(ResidueNumber, String)> = None;
        let mut atom_count = 0usize;

        for (line_idx, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_idx + 1;

            if line.starts_with("ENDMDL") {
                break;
            }
            let is_hetero = line.starts_with("HETATM");
            if !(is_hetero || line.starts_with("ATOM  ")) {
                continue;
            }
            if line.len() < MIN_ATOM_RECORD_LENGTH {
                return Err(StructureError::Parse {
                    line: line_num,
                    kind: StructureParseErrorKind::LineTooShort { length: line.len() },
                });
            }

            let name = column(&line, 12, 16);
            let res_name = column(&line, 17, 20);
            let chain_id = column(&line, 21, 22);
            let res_seq = column(&line, 22, 26);
            let insertion = line.get(26..27).and_then(|s| s.chars().next()).filter(|c| *c != ' ');

            let sequence: i32 = res_seq.parse().map_err(|_| StructureError::Parse {
                line: line_num,
                kind: StructureParseErrorKind::InvalidInt {
                    field: "resSeq".into(),
                    value: res_seq.into(),
                },
            })?;
            let number = ResidueNumber {
                sequence,
                insertion,
            };

            let x = parse_float(&line, line_num, 30, 38, "x")?;
            let y = parse_float(&line, line_num, 38, 46, "y")?;
            let z = parse_float(&line, line_num, 46, 54, "z")?;
            let occupancy = column(&line, 54, 60).parse().unwrap_or(1.0);
            let b_factor = column(&line, 60, 66).parse().unwrap_or(0.0);
            let element = column(&line, 76, 78);

            atom_count += 1;
            // Hybrid-36 or overflowing serials fall back to the running count.
            let serial = column(&line, 6, 11).parse().unwrap_or(atom_count);

            if current_chain.as_deref() != Some(chain_id) {
                builder.start_chain(chain_id);
                current_chain = Some(chain_id.to_string());
                current_residue = None;
            }
            let residue_changed = current_residue
                .as_ref()
                .is_none_or(|(n, r)| *n != number || r != res_name);
            if residue_changed {
                builder.start_residue(number, res_name, is_hetero);
                current_residue = Some((number, res_name.to_string()));
            }
            builder.add_atom(serial, name, element, Point3::new(x, y, z), occupancy, b_factor);
        }

        let system = builder.build();
        if system.is_empty() {
            return Err(StructureError::Empty);
        }
        Ok(system)
    }
}

impl StructureWriter for PdbFile {
    fn write_atoms(
        system: &MolecularSystem,
        atom_indices: &[usize],
        writer: &mut impl Write,
    ) -> Result<(), StructureError> {
        let mut last_chain: Option<usize> = None;
        let mut truncated_chain_warned = false;

        for (i, &atom_idx) in atom_indices.iter().enumerate() {
            let Some(atom) = system.atom(atom_idx) else {
                continue;
            };
            let Some(residue) = system.residue(atom.residue_index) else {
                continue;
            };
            let chain_id = system
                .chain(residue.chain_index)
                .map(|c| c.id.as_str())
                .unwrap_or("");
            if chain_id.chars().count() > 1 && !truncated_chain_warned {
                warn!(
                    "Chain ID '{}' does not fit the PDB chain column; writing its first character.",
                    chain_id
                );
                truncated_chain_warned = true;
            }
            let chain_char = chain_id.chars().next().unwrap_or(' ');

            if let Some(prev) = last_chain {
                if prev != residue.chain_index {
                    writeln!(writer, "TER")?;
                }
            }
            last_chain = Some(residue.chain_index);

            let record = if residue.hetero { "HETATM" } else { "ATOM" };
            let serial = (i % MAX_PDB_SERIAL) + 1;
            let name_field = if atom.name.len() < 4 && atom.element.len() == 1 {
                format!(" {:<3}", atom.name)
            } else {
                format!("{:<4}", atom.name)
            };
            let insertion = residue.number.insertion.unwrap_or(' ');

            writeln!(
                writer,
                "{:<6}{:>5} {} {:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
                record,
                serial,
                name_field,
                residue.name,
                chain_char,
                residue.number.sequence,
                insertion,
                atom.position.x,
                atom.position.y,
                atom.position.z,
                atom.occupancy,
                atom.b_factor,
                atom.element,
            )?;
        }
        if last_chain.is_some() {
            writeln!(writer, "TER")?;
        }
        writeln!(writer, "END")?;
        Ok(())
    }
}
