//! eqgen command-line driver.
//!
//! Argument parsing and the load, generate and emit pipeline behind the
//! `eqgen` binary. Kept in a library so the pipeline can be tested without
//! spawning a process.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;

use eqgen_decl::{LoadError, SourceCatalog};
use eqgen_emit::{emit, write_files, write_stdout, EmitOptions, EmittedFile};
use eqgen_ir::TypeName;
use eqgen_synth::GenError;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Only installs a subscriber when `RUST_LOG` is set, e.g.
/// `RUST_LOG=eqgen_synth=debug` or `RUST_LOG=trace`. Safe to call more
/// than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_writer(io::stderr)
                        .with_targets(true),
                )
                .init();
        }
    });
}

pub const USAGE: &str = "\
Usage: eqgen --type <Name> --module <path> --src <module>=<dir-or-file>... [options]

Options:
  --type <Name>               Root type to generate equality routines for
  --module <path>             Module that declares the root type
  --src <module>=<path>       Declaration sources of a module (repeatable)
  --foreign <prefix>          Treat modules under <prefix> as foreign (repeatable)
  --prefix <prefix>           Generated file name prefix (default: eqgen_)
  --stdout                    Print generated code instead of writing files
  -h, --help                  Show this message";

/// What the command line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Generate(Options),
    Help,
}

/// Settings for one generation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub type_name: String,
    pub module: String,
    /// `(module, path)` pairs. A directory is loaded whole; a file is
    /// registered on its own.
    pub sources: Vec<(String, PathBuf)>,
    pub foreign: Vec<String>,
    pub stdout: bool,
    pub emit: EmitOptions,
}

impl Options {
    pub fn root(&self) -> TypeName {
        TypeName::new(self.module.as_str(), self.type_name.as_str())
    }
}

/// Invalid command line. Reported with the usage text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("missing required option `{0}`")]
    Missing(&'static str),

    #[error("option `{0}` needs a value")]
    MissingValue(String),

    #[error("unknown option `{0}`")]
    Unknown(String),

    #[error("`--src` expects <module>=<path>, found `{0}`")]
    BadSource(String),
}

/// Failure of a generation run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Generate(#[from] GenError),

    #[error("cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
}

/// Parse arguments, not including the program name.
///
/// Options take their value either as the next argument or after `=`.
pub fn parse_args(args: &[String]) -> Result<Command, UsageError> {
    let mut type_name = None;
    let mut module = None;
    let mut sources = Vec::new();
    let mut foreign = Vec::new();
    let mut stdout = false;
    let mut emit = EmitOptions::default();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_owned())),
            _ => (arg.as_str(), None),
        };
        let mut value = || {
            inline
                .clone()
                .or_else(|| iter.next().cloned())
                .ok_or_else(|| UsageError::MissingValue(flag.to_owned()))
        };

        match flag {
            "-h" | "--help" => return Ok(Command::Help),
            "--type" | "-type" => type_name = Some(value()?),
            "--module" | "-module" => module = Some(value()?),
            "--src" | "-src" => {
                let entry = value()?;
                let Some((name, path)) = entry.split_once('=') else {
                    return Err(UsageError::BadSource(entry));
                };
                if name.is_empty() || path.is_empty() {
                    return Err(UsageError::BadSource(entry));
                }
                sources.push((name.to_owned(), PathBuf::from(path)));
            }
            "--foreign" | "-foreign" => foreign.push(value()?),
            "--prefix" | "-prefix" => emit.file_prefix = value()?,
            "--stdout" | "-stdout" => stdout = true,
            other => return Err(UsageError::Unknown(other.to_owned())),
        }
    }

    let type_name = type_name.ok_or(UsageError::Missing("--type"))?;
    let module = module.ok_or(UsageError::Missing("--module"))?;
    if sources.is_empty() {
        return Err(UsageError::Missing("--src"));
    }
    Ok(Command::Generate(Options {
        type_name,
        module,
        sources,
        foreign,
        stdout,
        emit,
    }))
}

/// Build the catalog the options describe. Package qualifiers are checked
/// once every source is registered, so sources may be listed in any order.
pub fn load_catalog(options: &Options) -> Result<SourceCatalog, CliError> {
    let mut catalog = SourceCatalog::new();
    for (module, path) in &options.sources {
        if path.is_dir() {
            catalog.load_dir(module, path)?;
        } else {
            load_file(&mut catalog, module, path)?;
        }
    }
    for prefix in &options.foreign {
        catalog.foreign_root(prefix);
    }
    catalog.bind_packages()?;
    Ok(catalog)
}

fn load_file(catalog: &mut SourceCatalog, module: &str, path: &Path) -> Result<(), CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    );
    catalog.add_source(module, &file_name, &text)?;
    if let Some(dir) = path.parent() {
        catalog.set_location(module, dir);
    }
    Ok(())
}

/// Run the whole pipeline. Generated code goes to `out` when
/// `options.stdout` is set, otherwise next to each module's sources.
pub fn run<W: Write>(options: &Options, out: W) -> Result<Vec<EmittedFile>, CliError> {
    let catalog = load_catalog(options)?;
    let root = options.root();
    let generation = eqgen_synth::generate(&catalog, &root)?;
    tracing::info!(root = %root, units = generation.len(), "generated equality routines");

    let files = emit(&generation, &catalog, &options.emit);
    if options.stdout {
        write_stdout(&files, out)?;
    } else {
        write_files(&files)?;
    }
    Ok(files)
}
