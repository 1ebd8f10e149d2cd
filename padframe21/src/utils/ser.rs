//!
//! # Serialization & Deserialization Utilities
//! (and file IO for those serialized objects)
//!

// Std-Lib
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

// Crates.io
use serde::de::DeserializeOwned;
use serde::Serialize;
use textwrap::dedent;

/// # Supported Serialization Formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerializationFormat {
    Json,
    Yaml,
    Toml,
}
impl SerializationFormat {
    /// Infer the format from the extension of `path`.
    /// Returns `None` for anything other than `json`, `yaml`, `yml`, or `toml`.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }
    /// Convert any [serde::Serialize] data to a serialized string
    pub fn to_string(&self, data: &impl Serialize) -> Result<String, SerError> {
        match *self {
            Self::Json => Ok(serde_json::to_string_pretty(data)?),
            Self::Yaml => Ok(serde_yaml::to_string(data)?),
            Self::Toml => Ok(toml::to_string(data)?),
        }
    }
    /// Parse string `s`. Leading indentation common to all lines is removed first.
    pub fn from_str<T: DeserializeOwned>(&self, s: &str) -> Result<T, SerError> {
        let s = dedent(s);
        match *self {
            Self::Json => Ok(serde_json::from_str(&s)?),
            Self::Yaml => Ok(serde_yaml::from_str(&s)?),
            Self::Toml => Ok(toml::from_str(&s)?),
        }
    }
    /// Save `data` to file `fname`
    pub fn save(&self, data: &impl Serialize, fname: impl AsRef<Path>) -> Result<(), SerError> {
        let mut file = BufWriter::new(std::fs::File::create(fname)?);
        let s = self.to_string(data)?;
        file.write_all(s.as_bytes())?;
        file.flush()?;
        Ok(())
    }
    /// Load from file at path `fname`
    pub fn open<T: DeserializeOwned>(&self, fname: impl AsRef<Path>) -> Result<T, SerError> {
        let mut file = BufReader::new(std::fs::File::open(&fname)?);
        let mut s = String::new();
        file.read_to_string(&mut s)?;
        self.from_str(&s)
    }
}

///
/// # Serialization to & from File
///
/// Fully default-implemented. Serde-enabled types opt in with an empty `impl`.
/// Both methods pick their [SerializationFormat] from the file extension.
///
pub trait SerdeFile: Serialize + DeserializeOwned {
    /// Save to `fname`, in the format implied by its extension
    fn save_path(&self, fname: impl AsRef<Path>) -> Result<(), SerError> {
        format_of(fname.as_ref())?.save(self, fname)
    }
    /// Open from `fname`, in the format implied by its extension
    fn open_path(fname: impl AsRef<Path>) -> Result<Self, SerError> {
        format_of(fname.as_ref())?.open(fname)
    }
}
fn format_of(path: &Path) -> Result<SerializationFormat, SerError> {
    SerializationFormat::from_path(path).ok_or_else(|| SerError::Extension(path.to_path_buf()))
}

/// Serialization Errors
#[derive(Debug, thiserror::Error)]
pub enum SerError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("toml: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("toml: {0}")]
    TomlDe(#[from] toml::de::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot infer a serialization format for {0:?} (expected .json, .yaml, .yml, or .toml)")]
    Extension(PathBuf),
}
