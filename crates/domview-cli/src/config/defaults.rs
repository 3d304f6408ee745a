use std::path::PathBuf;

/// Values used when neither the configuration file nor the command line sets them.
///
/// Rendering parameters default to the core library's own defaults.
pub struct DefaultsConfig {
    pub pdb_template: String,
    pub mmcif_template: String,
    pub output_root: PathBuf,
    pub renderer: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            pdb_template: "/usr2/pdb/data/structures/divided/pdb/{mid}/pdb{id}.ent.gz"
                .to_string(),
            mmcif_template: "/usr2/pdb/data/structures/divided/mmCIF/{mid}/{id}.cif.gz"
                .to_string(),
            output_root: PathBuf::from("."),
            renderer: PathBuf::from("pymol"),
        }
    }
}
