//! Type-directed synthesis of deep-equality routines.
//!
//! Given a root named type, a [`Session`] walks the type's structural
//! definition and produces one [`GeneratedUnit`] per distinct named type
//! reachable from it. Each unit holds the body of a comparison routine as
//! [`Check`](eqgen_ir::Check) IR, plus the external modules the routine
//! references.
//!
//! # Design
//!
//! - **Memoization.** Units are stored in an arena indexed by
//!   [`UnitId`](eqgen_ir::UnitId) and keyed by [`TypeName`]. A unit is
//!   registered *before* its body is synthesized, so a self-referential type
//!   finds its own (in-progress) unit and emits a call to it instead of
//!   recursing forever.
//!
//! - **Uniform indirection.** Routines for value-like kinds take their
//!   subject by pointer. Call sites normalize their arguments (`&x` or `*p`
//!   plus a nil guard) so any routine can call any other, including one that
//!   is still being built.
//!
//! - **Structured naming.** Loop indices, map keys and captured map values
//!   are allocated by walking [`Place`](eqgen_ir::Place) trees (see
//!   [`naming`]), never by scanning rendered text.
//!
//! - **Errors.** Fatal conditions ([`GenError`]) propagate to the caller of
//!   [`Session::generate`]; a failed session yields no units at all.

mod error;
pub mod naming;
pub mod refs;
mod session;
mod synth;

pub use error::GenError;
pub use refs::{Qualifier, References};
pub use session::{ExternalFn, Externals, GeneratedUnit, Generation, Session, UnitState};
pub use synth::SynthFlags;

use eqgen_ir::TypeName;

/// Generate the equality routines for `root` and everything it reaches,
/// using the default external routines.
pub fn generate(
    catalog: &dyn eqgen_ir::Catalog,
    root: &TypeName,
) -> Result<Generation, GenError> {
    Session::new(catalog, Externals::default()).generate(root)
}
