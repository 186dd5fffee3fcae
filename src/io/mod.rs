//! Reading and writing of QFock files.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{self, format_err};
use bincode;
use serde::{de::DeserializeOwned, Serialize};
use serde_yaml;

pub(crate) mod format;


/// An enumerated type for `QFock` binary file types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QFockFileType {
    /// Variant for binary files containing symmetry-group detection results.
    Sym,

    /// Variant for binary files containing G matrices.
    Gmat,
}

impl QFockFileType {
    /// Returns the extension of the file type.
    #[must_use]
    pub fn ext(&self) -> String {
        match self {
            QFockFileType::Sym => "qfock.sym".to_string(),
            QFockFileType::Gmat => "qfock.gmat".to_string(),
        }
    }

    /// Returns the path of a file of this type with the given name.
    fn path_for<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        let mut path = name.as_ref().to_path_buf();
        path.set_extension(self.ext());
        path
    }
}

/// Reads a `QFock` binary file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (without `QFock`-specific extensions).
/// * `file_type` - The type of the `QFock` file to be read in.
///
/// # Returns
///
/// A `Result` containing the structure deserialised from the read-in file.
///
/// # Errors
///
/// Errors if the file cannot be opened or its content cannot be deserialised.
pub fn read_qfock_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: QFockFileType,
) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let path = file_type.path_for(name);
    let mut reader = BufReader::new(File::open(path).map_err(|err| format_err!(err))?);
    bincode::deserialize_from(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes into a `QFock` binary file.
///
/// # Arguments
///
/// * `name` - The name of the file to be written (without `QFock`-specific extensions).
/// * `file_type` - The type of the `QFock` file to be written.
///
/// # Errors
///
/// Errors if the file cannot be created or the structure cannot be serialised.
pub fn write_qfock_binary<T, P: AsRef<Path>>(
    name: P,
    file_type: QFockFileType,
    value: &T,
) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let path = file_type.path_for(name);
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value).map_err(|err| format_err!(err))
}

/// Reads a `QFock` configuration YAML file and deserialises it into an appropriate structure.
///
/// # Arguments
///
/// * `name` - The name of the file to be read in (with its `.yml` or `.yaml` extension).
///
/// # Errors
///
/// Errors if the file cannot be opened or its content cannot be deserialised.
pub fn read_qfock_yaml<T, P: AsRef<Path>>(name: P) -> Result<T, anyhow::Error>
where
    T: DeserializeOwned,
{
    let mut reader = BufReader::new(File::open(name).map_err(|err| format_err!(err))?);
    serde_yaml::from_reader(&mut reader).map_err(|err| format_err!(err))
}

/// Serialises a structure and writes into a `QFock` configuration YAML file.
///
/// # Arguments
///
/// * `name` - The name of the YAML file to be written (without extensions). The resulting file
/// will have the `.yml` extension.
///
/// # Errors
///
/// Errors if the file cannot be created or the structure cannot be serialised.
pub fn write_qfock_yaml<T, P: AsRef<Path>>(name: P, value: &T) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let mut path = name.as_ref().to_path_buf();
    path.set_extension("yml");
    let mut writer = BufWriter::new(File::create(path)?);
    serde_yaml::to_writer(&mut writer, value).map_err(|err| format_err!(err))
}
