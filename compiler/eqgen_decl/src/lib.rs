//! Declaration front end for the eqgen generator.
//!
//! Reads Go-style type declarations and serves them through the
//! [`Catalog`](eqgen_ir::Catalog) boundary:
//!
//! - **Lexing** (`token`): `logos` tokenizer with automatic statement
//!   separators at line ends.
//! - **Parsing** ([`parse`]): `package`, `import` and `type` declarations,
//!   lowered to [`TypeRef`](eqgen_ir::TypeRef). Integer constants are
//!   evaluated for array lengths; everything else in a file is skipped.
//!   Package qualifiers the file cannot bind stay [`PendingQualifier`]s.
//! - **Catalog** ([`SourceCatalog`]): modules assembled from parsed files,
//!   given inline or read from a directory. Pending qualifiers are bound
//!   against the package names imported modules declare.
//!
//! # Crate Dependencies
//!
//! - `eqgen_ir`: type shapes and the catalog trait.

mod error;
pub mod parse;
mod source;
mod token;

pub use error::{DeclError, LoadError};
pub use parse::{parse_file, ParsedFile, PendingQualifier, TypeDecl};
pub use source::SourceCatalog;
