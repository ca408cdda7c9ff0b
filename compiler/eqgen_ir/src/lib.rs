//! Shared vocabulary for the eqgen equality-routine generator.
//!
//! This crate provides:
//!
//! - **Type identity** ([`ModulePath`], [`TypeName`]): a named type is
//!   identified by its defining module and local name.
//!
//! - **Type shapes** ([`TypeRef`], [`StructuralKind`], [`Primitive`]): a
//!   closed set of structural kinds. Synthesis dispatches on them with an
//!   exhaustive `match`, so adding a kind is a compile-time-checked change.
//!
//! - **Catalog boundary** ([`Catalog`], [`MemoryCatalog`]): how the
//!   generator learns about type definitions and module imports.
//!
//! - **Comparison IR** ([`Place`], [`Check`], [`Callee`]): access paths as
//!   expression trees and comparison statements built on them. Synthesis
//!   produces this IR; emission renders it to text and the reference
//!   evaluator executes it.
//!
//! # Crate Dependencies
//!
//! Leaf crate: no `eqgen_*` dependencies.

pub mod catalog;
mod check;
mod name;
mod place;
mod ty;

pub use catalog::{Catalog, CatalogError, Import, ImportName, MemoryCatalog};
pub use check::{Builtin, Callee, Check, Subject, UnitId};
pub use name::{ModulePath, TypeName};
pub use place::{Family, LoopVar, Place, Side};
pub use ty::{Field, Primitive, StructuralKind, TypeRef};
