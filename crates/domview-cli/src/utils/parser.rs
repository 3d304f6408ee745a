use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid domain UID '{0}'. Expected more than 4 ASCII characters (e.g., 'e4hhhA1').")]
    InvalidUid(String),

    #[error("Invalid PDB code '{0}'. Expected four alphanumeric characters (e.g., '4hhh').")]
    InvalidPdbCode(String),
}

/// The directory level grouping domains by UID, `uid[2..len-2]`.
pub fn domain_group(uid: &str) -> Result<&str, ParseError> {
    if uid.len() <= 4 || !uid.is_ascii() {
        return Err(ParseError::InvalidUid(uid.to_string()));
    }
    Ok(&uid[2..uid.len() - 2])
}

pub fn validate_pdb_code(code: &str) -> Result<&str, ParseError> {
    if code.len() == 4 && code.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(code)
    } else {
        Err(ParseError::InvalidPdbCode(code.to_string()))
    }
}

/// Optional trailing arguments of `render`, split by kind.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ExtraArgs {
    pub ligands: Option<String>,
    pub partners: Vec<String>,
}

/// Arguments without '-' are ligand lists, the rest are assembly partner ranges.
///
/// Only one ligand list is kept; a later one replaces an earlier one with a warning.
pub fn split_extra_args(extra: &[String]) -> ExtraArgs {
    let mut parsed = ExtraArgs::default();
    for arg in extra {
        if arg.contains('-') {
            parsed.partners.push(arg.clone());
        } else if let Some(previous) = parsed.ligands.replace(arg.clone()) {
            warn!(
                "Multiple ligand annotations given; '{}' replaces '{}'.",
                arg, previous
            );
        }
    }
    parsed
}
