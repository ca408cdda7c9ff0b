//! Fatal generation errors.

use eqgen_ir::{CatalogError, ModulePath};

/// A condition that aborts the whole generation session.
///
/// These are input or programmer errors, not transient failures: there is
/// no retry and no partial output.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenError {
    /// The root or a transitively referenced named type could not be
    /// resolved.
    #[error(transparent)]
    Resolution(#[from] CatalogError),

    /// A module imports the same external module under two local names, so
    /// the name to use in generated code is ambiguous.
    #[error("module `{home}` imports `{module}` under two names: `{first}` and `{second}`")]
    AmbiguousImport {
        home: ModulePath,
        module: ModulePath,
        first: String,
        second: String,
    },

    /// The requested root type lies outside the generation boundary, so no
    /// routine can be placed next to it.
    #[error("type `{name}` in module `{module}` is outside the generation boundary")]
    ForeignRoot { name: String, module: ModulePath },
}
