//!
//! # Padframe Result and Error Types
//!
//! Every invariant the padframe flow checks has its own [PadframeError] variant,
//! naming the offending cells, instances, or files.
//! The first failure aborts the run.
//!

// Std-Lib
use std::fmt;
use std::path::PathBuf;

// Local Imports
use crate::db::PlacementStatus;
use crate::extract::PadInstance;
use crate::utils::{ErrorContext, SerError};

/// # [PadframeError] Result Type
pub type PadResult<T> = Result<T, PadframeError>;

///
/// # Padframe Error Enumeration
///
#[derive(Debug, thiserror::Error)]
pub enum PadframeError {
    /// Pad or corner cell whose name has none of the accepted prefixes
    #[error("`{name}` is a pad or corner cell, but does not start with any of the accepted prefixes {prefixes:?}")]
    NamingViolation { name: String, prefixes: Vec<String> },
    /// Library cell flagged as both pad and corner
    #[error("`{0}` is flagged as both a pad and a corner (end-cap) cell")]
    AmbiguousClassification(String),
    /// No pad or corner cells in any library
    #[error("the libraries contain no pad or corner cells")]
    EmptyLibrary,
    /// Cell-name lookup into the registry failed
    #[error("`{0}` is not a known pad or corner cell")]
    UnknownCell(String),
    /// Non-pad, non-corner instance whose master looks like a pad
    #[error("instance `{inst}` of master `{master}` is neither a pad nor a corner, but its master has a pad-name prefix")]
    InconsistentClassification { inst: String, master: String },
    /// Design does not have exactly four corner instances
    #[error("expected exactly 4 corner instances, found {}: {:?}", .0.len(), .0)]
    WrongCornerCount(Vec<PadInstance>),
    /// Design has no pad instances
    #[error("the design contains no pad instances")]
    NoPadsFound,
    /// User config and design disagree on their set of pads
    #[error("mismatch between the padframe config and the design:\n{0}")]
    ConfigMismatch(ConfigDiff),
    /// Config text syntax error
    #[error("padframe config syntax error on line {line}: {message}\n    {content}")]
    ConfigParse {
        message: String,
        line: usize,
        content: String,
    },
    /// DEF syntax error
    #[error("DEF syntax error on line {line}: {message} (in {stack:?})\n    {content}")]
    DefParse {
        message: String,
        line: usize,
        content: String,
        stack: Vec<ErrorContext>,
    },
    /// Config content error, other than a pad-set mismatch
    #[error("invalid padframe config: {0}")]
    InvalidConfig(String),
    /// No die area from either the operator or the config
    #[error("die width and height are required, either as options or via an AREA statement")]
    MissingArea,
    /// Placement-engine result includes something other than pads and corners
    #[error("placed padframe instance `{inst}` of master `{master}` is neither a pad nor a corner")]
    UnexpectedInstanceKind { inst: String, master: String },
    /// Merge would override an existing placement
    #[error("instance `{inst}` is already placed (status {status})")]
    AlreadyPlaced {
        inst: String,
        status: PlacementStatus,
    },
    /// Instance-name lookup into the design failed
    #[error("instance `{0}` not found in the design")]
    InstanceNotFound(String),
    /// Master-name lookup into the libraries failed
    #[error("master `{0}` not found in any library")]
    UnknownMaster(String),
    /// Instance-name collision on creation
    #[error("an instance named `{0}` already exists")]
    DuplicateInstance(String),
    /// Engine produced a design with an unexpected name
    #[error("expected a design named `{expected}`, found `{found}`")]
    UnexpectedDesignName { expected: String, found: String },
    /// Required input file is absent
    #[error("file {0:?} does not exist")]
    MissingFile(PathBuf),
    /// External tool failure
    #[error(transparent)]
    Invocation(#[from] InvocationError),
    /// Invalid combination of options
    #[error("usage: {0}")]
    Usage(String),
    /// Library import failure, with its context stack
    #[error("import error: {message} (in {stack:?})")]
    Import {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// LEF reading failure
    #[error("lef: {0}")]
    Lef(String),
    /// Serialization failure
    #[error(transparent)]
    Ser(#[from] SerError),
    /// File-system failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
impl PadframeError {
    /// Create a [PadframeError::Usage] from anything String-convertible
    pub fn usage(s: impl Into<String>) -> Self {
        Self::Usage(s.into())
    }
    /// Create an [PadframeError::InvalidConfig] from anything String-convertible
    pub fn invalid_config(s: impl Into<String>) -> Self {
        Self::InvalidConfig(s.into())
    }
}
impl From<lef21::LefError> for PadframeError {
    fn from(e: lef21::LefError) -> Self {
        Self::Lef(format!("{:?}", e))
    }
}

///
/// # Config-versus-Design Difference
///
/// Symmetric difference between the (instance, cell) pairs a config lists and those the design
/// contains, plus any pairs the config lists more than once.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiff {
    /// Listed in the config, absent from the design
    pub only_in_config: Vec<PadInstance>,
    /// Present in the design, absent from the config
    pub only_in_design: Vec<PadInstance>,
    /// Listed in the config more than once
    pub duplicated: Vec<PadInstance>,
}
impl ConfigDiff {
    /// Boolean indication of whether config and design agree
    pub fn is_empty(&self) -> bool {
        self.only_in_config.is_empty() && self.only_in_design.is_empty() && self.duplicated.is_empty()
    }
}
impl fmt::Display for ConfigDiff {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let groups = [
            ("only in config", &self.only_in_config),
            ("only in design", &self.only_in_design),
            ("listed more than once in config", &self.duplicated),
        ];
        for (title, pads) in groups {
            if pads.is_empty() {
                continue;
            }
            writeln!(f, "  {}:", title)?;
            for pad in pads.iter() {
                writeln!(f, "    {} ({})", pad.name, pad.cell)?;
            }
        }
        Ok(())
    }
}

///
/// # External Tool Invocation Errors
///
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    /// Process could not be started
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// Process exited unsuccessfully
    #[error("`{program}` failed with exit code {code:?}\n{stderr}")]
    ExitStatus {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    /// Process succeeded, but left no output behind
    #[error("expected output file {0:?} was not produced")]
    MissingOutput(PathBuf),
}
