use super::error::{StructureError, StructureParseErrorKind};
use super::traits::StructureFile;
use crate::core::models::residue::ResidueNumber;
use crate::core::models::system::{MolecularSystem, MolecularSystemBuilder};
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::BufRead;

const ATOM_SITE_PREFIX: &str = "_atom_site.";

/// Reader for the `atom_site` category of mmCIF files.
///
/// Author identifiers (`auth_asym_id`, `auth_seq_id`) are preferred over label
/// identifiers so that chain and residue numbering match the PDB format. Only
/// rows of the first model are kept.
pub struct MmcifFile;

/// Column positions of the `atom_site` loop, resolved from its header.
struct AtomSiteColumns {
    count: usize,
    group: Option<usize>,
    serial: Option<usize>,
    element: Option<usize>,
    atom_name: usize,
    residue_name: usize,
    chain: usize,
    sequence: usize,
    insertion: Option<usize>,
    x: usize,
    y: usize,
    z: usize,
    occupancy: Option<usize>,
    b_factor: Option<usize>,
    model: Option<usize>,
}

impl AtomSiteColumns {
    fn resolve(headers: &[String]) -> Result<Self, StructureParseErrorKind> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        let find = |names: &[&str]| names.iter().find_map(|n| index.get(n).copied());
        let require = |names: &[&'static str]| {
            find(names).ok_or(StructureParseErrorKind::MissingColumn(names[0]))
        };

        Ok(Self {
            count: headers.len(),
            group: find(&["group_PDB"]),
            serial: find(&["id"]),
            element: find(&["type_symbol"]),
            atom_name: require(&["auth_atom_id", "label_atom_id"])?,
            residue_name: require(&["auth_comp_id", "label_comp_id"])?,
            chain: require(&["auth_asym_id", "label_asym_id"])?,
            sequence: require(&["auth_seq_id", "label_seq_id"])?,
            insertion: find(&["pdbx_PDB_ins_code"]),
            x: require(&["Cartn_x"])?,
            y: require(&["Cartn_y"])?,
            z: require(&["Cartn_z"])?,
            occupancy: find(&["occupancy"]),
            b_factor: find(&["B_iso_or_equiv"]),
            model: find(&["pdbx_PDB_model_num"]),
        })
    }
}

fn is_missing(value: &str) -> bool {
    value == "?" || value == "."
}

fn optional<'a>(row: &'a [String], idx: Option<usize>) -> Option<&'a str> {
    idx.map(|i| row[i].as_str()).filter(|v| !is_missing(v))
}

/// Splits a data line into CIF tokens, honoring single and double quotes.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '#' {
            break;
        }
        if c == '\'' || c == '"' {
            // A closing quote only counts when followed by whitespace or end of line.
            let mut j = i + 1;
            while j < chars.len() {
                if chars[j] == c && chars.get(j + 1).is_none_or(|n| n.is_whitespace()) {
                    break;
                }
                j += 1;
            }
            tokens.push(chars[i + 1..j.min(chars.len())].iter().collect());
            i = j + 1;
        } else {
            let start = i;
            while i < chars.len() && !chars[i].is_whitespace() {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect());
        }
    }
    tokens
}

struct AtomSiteBuilder {
    builder: MolecularSystemBuilder,
    current_chain: Option<String>,
    current_residue: Option<(ResidueNumber, String)>,
    first_model: Option<String>,
    atom_count: usize,
}

impl AtomSiteBuilder {
    fn new() -> Self {
        Self {
            builder: MolecularSystemBuilder::new(),
            current_chain: None,
            current_residue: None,
            first_model: None,
            atom_count: 0,
        }
    }

    fn push_row(
        &mut self,
        columns: &AtomSiteColumns,
        row: &[String],
        line_num: usize,
    ) -> Result<(), StructureError> {
        if let Some(model) = optional(row, columns.model) {
            match &self.first_model {
                None => self.first_model = Some(model.to_string()),
                Some(first) if first != model => return Ok(()),
                Some(_) => {}
            }
        }

        let parse_float = |idx: usize, field: &str| -> Result<f64, StructureError> {
            row[idx].parse().map_err(|_| StructureError::Parse {
                line: line_num,
                kind: StructureParseErrorKind::InvalidFloat {
                    field: field.to_string(),
                    value: row[idx].clone(),
                },
            })
        };

        let seq_text = row[columns.sequence].as_str();
        let sequence: i32 = seq_text.parse().map_err(|_| StructureError::Parse {
            line: line_num,
            kind: StructureParseErrorKind::InvalidInt {
                field: "auth_seq_id".into(),
                value: seq_text.into(),
            },
        })?;
        let insertion = optional(row, columns.insertion).and_then(|s| s.chars().next());
        let number = ResidueNumber {
            sequence,
            insertion,
        };

        let position = Point3::new(
            parse_float(columns.x, "Cartn_x")?,
            parse_float(columns.y, "Cartn_y")?,
            parse_float(columns.z, "Cartn_z")?,
        );
        let occupancy = optional(row, columns.occupancy)
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0);
        let b_factor = optional(row, columns.b_factor)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0);
        let element = optional(row, columns.element).unwrap_or("");
        let hetero = optional(row, columns.group) == Some("HETATM");
        let chain_id = row[columns.chain].as_str();
        let res_name = row[columns.residue_name].as_str();

        self.atom_count += 1;
        let serial = optional(row, columns.serial)
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.atom_count);

        if self.current_chain.as_deref() != Some(chain_id) {
            self.builder.start_chain(chain_id);
            self.current_chain = Some(chain_id.to_string());
            self.current_residue = None;
        }
        let residue_changed = self
            .current_residue
            .as_ref()
            .is_none_or(|(n, r)| *n != number || r != res_name);
        if residue_changed {
            self.builder.start_residue(number, res_name, hetero);
            self.current_residue = Some((number, res_name.to_string()));
        }
        self.builder.add_atom(
            serial,
            &row[columns.atom_name],
            element,
            position,
            occupancy,
            b_factor,
        );
        Ok(())
    }
}

enum State {
    Scanning,
    LoopHeader,
    AtomSiteHeader,
    AtomSiteRows,
}

impl StructureFile for MmcifFile {
    fn read_from(reader: &mut impl BufRead) -> Result<MolecularSystem, StructureError> {
        let mut state = State::Scanning;
        let mut headers: Vec<String> = Vec::new();
        let mut columns: Option<AtomSiteColumns> = None;
        let mut pending: Vec<String> = Vec::new();
        let mut site = AtomSiteBuilder::new();

        for (line_idx, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_idx + 1;
            let trimmed = line.trim();

            match state {
                State::Scanning => {
                    if trimmed == "loop_" {
                        state = State::LoopHeader;
                    }
                }
                State::LoopHeader => {
                    if let Some(name) = trimmed.strip_prefix(ATOM_SITE_PREFIX) {
                        headers.push(name.to_string());
                        state = State::AtomSiteHeader;
                    } else if trimmed != "loop_" {
                        state = State::Scanning;
                    }
                }
                State::AtomSiteHeader => {
                    if let Some(name) = trimmed.strip_prefix(ATOM_SITE_PREFIX) {
                        headers.push(name.to_string());
                        continue;
                    }
                    columns = Some(
                        AtomSiteColumns::resolve(&headers).map_err(|kind| StructureError::Parse {
                            line: line_num,
                            kind,
                        })?,
                    );
                    state = State::AtomSiteRows;
                }
                State::AtomSiteRows => {}
            }

            if let (State::AtomSiteRows, Some(cols)) = (&state, &columns) {
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.starts_with('#')
                    || trimmed.starts_with('_')
                    || trimmed.starts_with("loop_")
                    || trimmed.starts_with("data_")
                {
                    break;
                }
                pending.extend(tokenize(trimmed));
                if pending.len() > cols.count {
                    return Err(StructureError::Parse {
                        line: line_num,
                        kind: StructureParseErrorKind::ColumnCountMismatch {
                            expected: cols.count,
                            found: pending.len(),
                        },
                    });
                }
                if pending.len() == cols.count {
                    site.push_row(cols, &pending, line_num)?;
                    pending.clear();
                }
            }
        }

        let system = site.builder.build();
        if system.is_empty() {
            return Err(StructureError::Empty);
        }
        Ok(system)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
data_4HHH
#
_entry.id 4HHH
#
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_seq_id
_atom_site.pdbx_PDB_ins_code
_atom_site.Cartn_x
_atom_site.Cartn_y
_atom_site.Cartn_z
_atom_site.occupancy
_atom_site.B_iso_or_equiv
_atom_site.auth_seq_id
_atom_site.auth_comp_id
_atom_site.auth_asym_id
_atom_site.auth_atom_id
_atom_site.pdbx_PDB_model_num
ATOM   1 N  N   MET A 1 ? 1.000 2.000 3.000 1.00 10.00 -3 MET AA N   1
ATOM   2 C  CA  MET A 1 ? 2.000 2.000 3.000 1.00 10.00 -3 MET AA CA  1
ATOM   3 C  CA  GLY A 2 B 3.000 2.000 3.000 0.50 12.00 7  GLY AA CA  1
HETATM 4 ZN ZN  ZN  B . ? 9.000 9.000 9.000 1.00 20.00 301 ZN AA ZN  1
HETATM 5 C  \"C1'\" NAG C . ? 4.000 4.000 4.000 1.00 20.00 401 NAG AA \"C1'\" 1
ATOM   6 N  N   MET A 1 ? 1.000 2.000 3.000 1.00 10.00 -3 MET AA N   2
#
";

    #[test]
    fn reads_author_identifiers_of_first_model() {
        let system = MmcifFile::read_from(&mut Cursor::new(SAMPLE)).unwrap();
        assert_eq!(system.atom_count(), 5);
        assert_eq!(system.chains().len(), 1);
        assert_eq!(system.chains()[0].id, "AA");
        assert!(system.find_residue("AA", ResidueNumber::new(-3)).is_some());
        assert!(
            system
                .find_residue("AA", ResidueNumber::with_insertion(7, 'B'))
                .is_some()
        );
        assert_eq!(system.atom(4).unwrap().name, "C1'");
        assert!(system.residue_of(3).unwrap().hetero);
        assert_eq!(system.atom(3).unwrap().element, "ZN");
        assert_eq!(system.atom(2).unwrap().occupancy, 0.5);
    }

    #[test]
    fn missing_coordinate_column_is_reported() {
        let text = "data_x\nloop_\n_atom_site.id\n_atom_site.label_atom_id\n1 CA\n";
        let result = MmcifFile::read_from(&mut Cursor::new(text));
        assert!(matches!(
            result,
            Err(StructureError::Parse {
                kind: StructureParseErrorKind::MissingColumn(_),
                ..
            })
        ));
    }

    #[test]
    fn tokenizer_keeps_quoted_values_with_embedded_quotes() {
        assert_eq!(
            tokenize("HETATM 5 \"C1'\" 'O5' x#y # trailing"),
            vec!["HETATM", "5", "C1'", "O5", "x#y"]
        );
    }

    #[test]
    fn file_without_atom_site_is_empty_error() {
        let result = MmcifFile::read_from(&mut Cursor::new("data_x\n_entry.id X\n"));
        assert!(matches!(result, Err(StructureError::Empty)));
    }
}
