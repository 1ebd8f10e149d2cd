//! # padframer
//!
//! I/O Padframe Generator
//!

use std::error::Error;
use std::path::PathBuf;

use clap::{ArgGroup, Parser};
use log::info;
use padframe21::{FlowOptionsBuilder, FlowOutcome, OpenRoad, PadPrefixes, Padring};

// => The doc-comment on `ProgramOptions` here is displayed by the `clap`-generated help docs =>

/// I/O Padframe Generator
///
/// Places the pads of a design around its die, via the `padring` placement engine.
/// Run once with `--init-padframe-config` to generate an editable side assignment,
/// then again with `--padframe-config` to place it.
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["verilog", "layout"])))]
struct ProgramOptions {
    /// Structural netlist containing the pads (and other user macros)
    #[arg(long, requires = "design")]
    verilog: Option<PathBuf>,
    /// Layout (.def, .json, .yaml, or .toml) containing the unplaced pads (and other user macros)
    #[arg(long)]
    layout: Option<PathBuf>,
    /// Name of the top-level module
    #[arg(short, long)]
    design: Option<String>,
    /// Die width, in microns
    #[arg(long)]
    width: Option<i64>,
    /// Die height, in microns
    #[arg(long)]
    height: Option<i64>,
    /// Padframe config file. Generated if not provided.
    #[arg(short = 'c', long)]
    padframe_config: Option<PathBuf>,
    /// Output layout file (.def, .json, .yaml, or .toml)
    #[arg(short, long)]
    output: PathBuf,
    /// Accepted pad and corner cell-name prefixes
    #[arg(long, num_args = 1.., default_values = ["sky130_fd_io", "sky130_ef_io"])]
    pad_name_prefixes: Vec<String>,
    /// Only generate a padframe config, to be edited
    #[arg(long)]
    init_padframe_config: bool,
    /// Directory for intermediate files
    #[arg(long, default_value = ".")]
    working_dir: PathBuf,
    /// Names of nets to mark as special
    #[arg(long, num_args = 1..)]
    special_nets: Vec<String>,
    /// LEF library files
    #[arg(short, long, num_args = 1.., required = true)]
    lefs: Vec<PathBuf>,
    /// Placement engine program
    #[arg(long, default_value = "padring")]
    padring: String,
    /// Netlist linker program
    #[arg(long, default_value = "openroad")]
    openroad: String,
    /// Verbose Output Mode
    #[arg(short, long)]
    verbose: bool,
}

/// The main entry point.
/// All logic is offloaded to `_main` for sake of testing.
fn main() -> Result<(), Box<dyn Error>> {
    let options = ProgramOptions::parse();
    let level = if options.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    _main(&options)
}

/// All the real logic, with `ProgramOptions` argument for sake of testing
fn _main(options: &ProgramOptions) -> Result<(), Box<dyn Error>> {
    let mut builder = FlowOptionsBuilder::default()
        .lefs(options.lefs.clone())
        .output(options.output.clone())
        .working_dir(options.working_dir.clone())
        .special_nets(options.special_nets.clone())
        .prefixes(PadPrefixes::new(options.pad_name_prefixes.iter().cloned()))
        .init_only(options.init_padframe_config);
    if let Some(ref p) = options.verilog {
        builder = builder.netlist(p.clone());
    }
    if let Some(ref p) = options.layout {
        builder = builder.layout(p.clone());
    }
    if let Some(ref d) = options.design {
        builder = builder.design(d.clone());
    }
    if let Some(w) = options.width {
        builder = builder.width(w);
    }
    if let Some(h) = options.height {
        builder = builder.height(h);
    }
    if let Some(ref p) = options.padframe_config {
        builder = builder.padframe_config(p.clone());
    }
    let flow_options = builder.build()?;

    let engine = Padring {
        program: options.padring.clone(),
    };
    let linker = OpenRoad {
        program: options.openroad.clone(),
    };
    match padframe21::flow::run(&flow_options, &engine, &linker)? {
        FlowOutcome::ConfigGenerated(path) => info!("Wrote {:?}", path),
        FlowOutcome::Placed { output, report } => {
            info!(
                "Wrote {:?}: {} pads placed, {} fillers created, {} instances centered",
                output,
                report.promoted,
                report.created.len(),
                report.centered.len()
            );
        }
    }
    Ok(())
}
