use std::io;
use std::path::PathBuf;

use eqgen_ir::ModulePath;

/// Syntax error in a declaration source, located by file, line and column.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct DeclError {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl DeclError {
    pub fn new(file: &str, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            file: file.to_owned(),
            line,
            column,
            message: message.into(),
        }
    }
}

/// Failure to register a module's sources.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Decl(#[from] DeclError),

    #[error("cannot read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("module `{module}` declares package `{first}` and `{second}`")]
    PackageMismatch {
        module: ModulePath,
        first: String,
        second: String,
    },

    #[error("type `{name}` is declared twice in module `{module}`")]
    Duplicate { name: String, module: ModulePath },

    #[error("no declaration sources found for module `{module}` in `{}`", dir.display())]
    NoSources { module: ModulePath, dir: PathBuf },
}
