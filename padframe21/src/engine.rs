//!
//! # External Tools
//!
//! The padframe flow hands two jobs to external programs:
//!
//! * A [NetlistLinker] flattens a structural netlist into an unplaced layout.
//! * A [PlacementEngine] places pads and corners per a padframe config.
//!
//! Both are blocking calls which either produce a layout [Block] or fail.
//! [Padring] and [OpenRoad] implement them as subprocesses, each writing DEF to the requested
//! output path, which is then read back.
//!

// Std-Lib
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

// Crates.io
use log::{debug, info, warn};

// Local Imports
use crate::db::Block;
use crate::def;
use crate::error::{InvocationError, PadResult};

/// Number of trailing stderr lines kept in failure reports
const STDERR_TAIL: usize = 10;

/// # Placement Request
#[derive(Debug, Clone, Copy)]
pub struct PlaceRequest<'a> {
    /// Library (LEF) files
    pub lefs: &'a [PathBuf],
    /// Padframe config file
    pub config: &'a Path,
    /// Destination of the placed padframe DEF
    pub output: &'a Path,
}
/// # Placement Engine
pub trait PlacementEngine {
    /// Place the padframe described by `req`
    fn place(&self, req: &PlaceRequest) -> PadResult<Block>;
}

/// # Netlist Link Request
#[derive(Debug, Clone, Copy)]
pub struct LinkRequest<'a> {
    /// Library (LEF) files
    pub lefs: &'a [PathBuf],
    /// Structural netlist file
    pub netlist: &'a Path,
    /// Top module name
    pub top: &'a str,
    /// Destination of the linked DEF
    pub output: &'a Path,
}
/// # Netlist Linker
pub trait NetlistLinker {
    /// Link the netlist described by `req`
    fn link(&self, req: &LinkRequest) -> PadResult<Block>;
}

/// # `padring` Placement Engine
#[derive(Debug, Clone)]
pub struct Padring {
    pub program: String,
}
impl Default for Padring {
    fn default() -> Self {
        Self {
            program: "padring".into(),
        }
    }
}
impl Padring {
    /// Command-line arguments for `req`
    fn args(req: &PlaceRequest) -> Vec<String> {
        let mut args = Vec::new();
        for lef in req.lefs {
            args.push("-L".to_string());
            args.push(lef.display().to_string());
        }
        args.push("--def".into());
        args.push(req.output.display().to_string());
        args.push(req.config.display().to_string());
        args
    }
}
impl PlacementEngine for Padring {
    fn place(&self, req: &PlaceRequest) -> PadResult<Block> {
        info!("Invoking {} to generate a padframe", self.program);
        let output = Command::new(&self.program)
            .args(Self::args(req))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| InvocationError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        let path = check(&self.program, output, req.output)?;
        def::parse_file(path)
    }
}

/// # OpenROAD Netlist Linker
///
/// Drives `openroad` with a script on stdin.
#[derive(Debug, Clone)]
pub struct OpenRoad {
    pub program: String,
}
impl Default for OpenRoad {
    fn default() -> Self {
        Self {
            program: "openroad".into(),
        }
    }
}
impl OpenRoad {
    /// Script for `req`
    fn script(req: &LinkRequest) -> String {
        let mut lines = Vec::new();
        for lef in req.lefs {
            lines.push(format!("read_lef {}", lef.display()));
        }
        lines.push(format!("read_verilog {}", req.netlist.display()));
        lines.push(format!("link_design {}", req.top));
        lines.push(format!("write_def {}", req.output.display()));
        lines.push("exit".into());
        lines.join("\n")
    }
}
impl NetlistLinker for OpenRoad {
    fn link(&self, req: &LinkRequest) -> PadResult<Block> {
        info!("Invoking {} to link {}", self.program, req.top);
        let spawn_err = |source| InvocationError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;
        let script = Self::script(req);
        debug!("{} script:\n{}", self.program, script);
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(script.as_bytes()) {
                // Generally the program exited early. Its status tells the rest.
                warn!("Failed writing to {}: {}", self.program, e);
            }
        }
        let output = child.wait_with_output().map_err(spawn_err)?;
        let path = check(&self.program, output, req.output)?;
        def::parse_file(path)
    }
}

/// Log the output of `program`, and check for success and the presence of `expected`
fn check(program: &str, output: Output, expected: &Path) -> Result<PathBuf, InvocationError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    debug!("{} stdout:\n{}", program, stdout.trim());
    let lines: Vec<&str> = stderr.lines().collect();
    let tail = lines[lines.len().saturating_sub(STDERR_TAIL)..].join("\n");
    if !tail.is_empty() {
        debug!("{} stderr:\n{}", program, tail);
    }
    info!("{} exit code: {:?}", program, output.status.code());
    if !output.status.success() {
        return Err(InvocationError::ExitStatus {
            program: program.to_string(),
            code: output.status.code(),
            stderr: tail,
        });
    }
    if !expected.exists() {
        return Err(InvocationError::MissingOutput(expected.to_path_buf()));
    }
    Ok(expected.to_path_buf())
}
