//! Generation Session.
//!
//! Drives synthesis for one root type: owns the unit arena, the memo map,
//! the generation stack and the completion order. Consumed by
//! [`Session::generate`], which either returns a complete [`Generation`] or
//! an error and nothing else.

use rustc_hash::FxHashMap;

use eqgen_ir::{Builtin, Catalog, Check, ModulePath, Place, StructuralKind, Subject, TypeName, UnitId};

use crate::refs::References;
use crate::GenError;

/// An external routine: defining module plus symbol name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExternalFn {
    pub module: ModulePath,
    pub symbol: String,
}

impl ExternalFn {
    pub fn new(module: &str, symbol: &str) -> Self {
        Self {
            module: ModulePath::new(module),
            symbol: symbol.to_owned(),
        }
    }
}

/// The external routines generated code may call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Externals {
    /// Generic equality of two opaque values, used for dynamic kinds.
    pub deep_equal: ExternalFn,
    /// Equality of two byte sequences.
    pub bytes_equal: ExternalFn,
}

impl Default for Externals {
    fn default() -> Self {
        Self {
            deep_equal: ExternalFn::new("reflect", "DeepEqual"),
            bytes_equal: ExternalFn::new("bytes", "Equal"),
        }
    }
}

impl Externals {
    pub fn get(&self, builtin: Builtin) -> &ExternalFn {
        match builtin {
            Builtin::DeepEqual => &self.deep_equal,
            Builtin::BytesEqual => &self.bytes_equal,
        }
    }
}

/// Lifecycle of a unit. A unit that does not exist yet is "unstarted".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitState {
    /// On the generation stack; calls to it may already be emitted.
    InProgress,
    /// Body finished; immutable from here on.
    Complete,
}

/// The synthesized comparison routine for one named type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedUnit {
    ty: TypeName,
    kind: StructuralKind,
    subject: Subject,
    state: UnitState,
    body: Vec<Check>,
    references: References,
}

impl GeneratedUnit {
    pub fn ty(&self) -> &TypeName {
        &self.ty
    }

    /// Underlying structural kind of the type.
    pub fn kind(&self) -> &StructuralKind {
        &self.kind
    }

    pub fn subject(&self) -> Subject {
        self.subject
    }

    pub fn state(&self) -> UnitState {
        self.state
    }

    pub fn body(&self) -> &[Check] {
        &self.body
    }

    pub fn references(&self) -> &References {
        &self.references
    }

    pub(crate) fn references_mut(&mut self) -> &mut References {
        &mut self.references
    }

    /// Name of the generated routine.
    pub fn routine_name(&self) -> String {
        format!("Equal{}", self.ty.name)
    }
}

/// State for one generation request.
pub struct Session<'cat> {
    pub(crate) catalog: &'cat dyn Catalog,
    pub(crate) externals: Externals,
    pub(crate) units: Vec<GeneratedUnit>,
    memo: FxHashMap<TypeName, UnitId>,
    /// Units currently being synthesized, innermost last.
    pub(crate) stack: Vec<UnitId>,
    order: Vec<UnitId>,
}

impl<'cat> Session<'cat> {
    pub fn new(catalog: &'cat dyn Catalog, externals: Externals) -> Self {
        Self {
            catalog,
            externals,
            units: Vec::new(),
            memo: FxHashMap::default(),
            stack: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Synthesize routines for `root` and every named type it reaches.
    pub fn generate(mut self, root: &TypeName) -> Result<Generation, GenError> {
        let _span = tracing::debug_span!("generate", root = %root).entered();

        if self.catalog.is_foreign(root) {
            return Err(GenError::ForeignRoot {
                name: root.name.clone(),
                module: root.module.clone(),
            });
        }

        let root_id = self.unit_for(root)?;
        debug_assert!(self.stack.is_empty());

        tracing::debug!(units = self.units.len(), "generation complete");
        Ok(Generation {
            units: self.units,
            order: self.order,
            root: root_id,
            externals: self.externals,
        })
    }

    /// Look up the unit for `name`, synthesizing it first if needed.
    ///
    /// The unit is registered and pushed before its body is synthesized, so
    /// a type that refers back to itself gets its own id back from the memo
    /// map instead of recursing.
    pub(crate) fn unit_for(&mut self, name: &TypeName) -> Result<UnitId, GenError> {
        if let Some(&id) = self.memo.get(name) {
            tracing::trace!(unit = %name, state = ?self.units[id.index()].state, "memo hit");
            return Ok(id);
        }

        let kind = self.catalog.resolve(name)?;
        let subject = if kind.is_reference_like() {
            Subject::ByValue
        } else {
            Subject::ByPointer
        };

        #[expect(
            clippy::cast_possible_truncation,
            reason = "unit count is bounded by the named types in one catalog"
        )]
        let id = UnitId::new(self.units.len() as u32);
        self.units.push(GeneratedUnit {
            ty: name.clone(),
            kind: kind.clone(),
            subject,
            state: UnitState::InProgress,
            body: Vec::new(),
            references: References::default(),
        });
        self.memo.insert(name.clone(), id);
        self.stack.push(id);
        tracing::debug!(unit = %name, ?subject, depth = self.stack.len(), "synthesizing unit");

        let place = match subject {
            Subject::ByPointer => Place::Subject.deref(),
            Subject::ByValue => Place::Subject,
        };
        let body = self.synthesize_kind(&place, &kind);
        self.stack.pop();
        let body = body?;

        let unit = &mut self.units[id.index()];
        unit.body = body;
        unit.state = UnitState::Complete;
        self.order.push(id);
        tracing::debug!(unit = %name, checks = unit.body.len(), "unit complete");
        Ok(id)
    }

    /// The unit currently being synthesized.
    pub(crate) fn current(&self) -> Option<UnitId> {
        self.stack.last().copied()
    }
}

/// Result of a successful session.
#[derive(Clone, Debug)]
pub struct Generation {
    units: Vec<GeneratedUnit>,
    order: Vec<UnitId>,
    root: UnitId,
    externals: Externals,
}

impl Generation {
    pub fn root(&self) -> UnitId {
        self.root
    }

    pub fn unit(&self, id: UnitId) -> &GeneratedUnit {
        &self.units[id.index()]
    }

    /// Number of units created. Each named type is created at most once.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unit ids in the order their synthesis completed.
    pub fn order(&self) -> &[UnitId] {
        &self.order
    }

    pub fn units_in_order(&self) -> impl Iterator<Item = (UnitId, &GeneratedUnit)> {
        self.order.iter().map(|&id| (id, self.unit(id)))
    }

    pub fn find(&self, name: &TypeName) -> Option<UnitId> {
        self.order
            .iter()
            .copied()
            .find(|id| self.unit(*id).ty() == name)
    }

    pub fn externals(&self) -> &Externals {
        &self.externals
    }
}
