//! Emission of generated equality routines.
//!
//! Turns a [`Generation`] into one source file per unit, in the order the
//! units completed. Each file is rendered, then passed through
//! [`format_source`]; text that fails the formatter's checks is still
//! emitted, unformatted, with the [`FormatError`] attached so the caller can
//! report it.

mod emitter;
mod format;
pub mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use eqgen_ir::{Catalog, TypeName};
use eqgen_synth::{Generation, References};

pub use emitter::{Emitter, FileEmitter, StringEmitter, WriteEmitter};
pub use format::{format_source, FormatError};

/// Emission settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitOptions {
    /// Generated file names are `<prefix><TypeName>.go`.
    pub file_prefix: String,
    /// Tool name written into the header line.
    pub tool: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            file_prefix: "eqgen_".to_owned(),
            tool: "eqgen".to_owned(),
        }
    }
}

/// One generated file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmittedFile {
    pub ty: TypeName,
    /// Target location: the module's directory joined with the file name,
    /// or the bare file name when the catalog has no location.
    pub path: PathBuf,
    pub contents: String,
    pub references: References,
    /// Set when formatting failed and `contents` is the raw rendering.
    pub diagnostic: Option<FormatError>,
}

/// Render every unit of `generation`, in completion order.
pub fn emit(generation: &Generation, catalog: &dyn Catalog, options: &EmitOptions) -> Vec<EmittedFile> {
    generation
        .units_in_order()
        .map(|(id, unit)| {
            let module = &unit.ty().module;
            let package = catalog
                .module_name(module)
                .unwrap_or_else(|| module.last_segment().to_owned());

            let mut out = StringEmitter::new();
            render::render_file(generation, id, &package, &options.tool, &mut out);
            let raw = out.output();

            let (contents, diagnostic) = match format_source(&raw) {
                Ok(formatted) => (formatted, None),
                Err(err) => {
                    tracing::warn!(unit = %unit.ty(), error = %err, "formatting failed, keeping raw text");
                    (raw, Some(err))
                }
            };

            let file_name = format!("{}{}.go", options.file_prefix, unit.ty().name);
            let path = catalog
                .location(module)
                .map_or_else(|| PathBuf::from(&file_name), |dir| dir.join(&file_name));

            EmittedFile {
                ty: unit.ty().clone(),
                path,
                contents,
                references: unit.references().clone(),
                diagnostic,
            }
        })
        .collect()
}

/// Write each file to its target location.
///
/// # Errors
///
/// Stops at the first file that cannot be written.
pub fn write_files(files: &[EmittedFile]) -> io::Result<()> {
    for file in files {
        write_file(&file.path, &file.contents)?;
        tracing::debug!(path = %file.path.display(), "wrote generated file");
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    let mut out = FileEmitter::create(path)?;
    out.emit(contents);
    out.finish().map(drop)
}

/// Write all files to one stream, separated by a blank line.
///
/// # Errors
///
/// Returns the first write error.
pub fn write_stdout<W: Write>(files: &[EmittedFile], writer: W) -> io::Result<()> {
    let mut out = WriteEmitter::new(writer);
    for (idx, file) in files.iter().enumerate() {
        if idx > 0 {
            out.emit_newline();
        }
        out.emit(&file.contents);
    }
    out.finish().map(drop)
}
