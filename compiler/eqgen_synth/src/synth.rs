//! Code Synthesizer.
//!
//! Turns a type plus a [`Place`] into the [`Check`]s that compare the two
//! sides at that place. Dispatch is an exhaustive match over
//! [`StructuralKind`]; named types go through the session's memoized
//! [`unit_for`](Session::unit_for) and become calls.

use bitflags::bitflags;

use eqgen_ir::{
    Builtin, Callee, Check, Family, ModulePath, Place, StructuralKind, Subject, TypeName, TypeRef,
};

use crate::naming::next_loop_var;
use crate::refs::resolve_qualifier;
use crate::session::Session;
use crate::GenError;

bitflags! {
    /// Context of one synthesis step.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SynthFlags: u8 {
        /// The place is a pointer and the type being compared is what it
        /// points to. Only meaningful for named types, whose routines decide
        /// how their subject is passed.
        const THROUGH_REF = 1;
    }
}

/// What to do with a type the generator does not descend into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fallback {
    /// Treated as always equal: nothing is emitted.
    Skip,
    /// Compared through the generic-equality routine.
    Generic,
}

impl Session<'_> {
    fn fallback(&self, ty: &TypeRef) -> Option<Fallback> {
        match ty {
            TypeRef::Named(name) => self.catalog.is_foreign(name).then_some(Fallback::Skip),
            TypeRef::Structural(kind) => match kind.as_ref() {
                StructuralKind::Dynamic => Some(Fallback::Generic),
                StructuralKind::Opaque => Some(Fallback::Skip),
                _ => None,
            },
        }
    }

    /// Foreign named types and opaque kinds: no comparison is possible.
    fn is_skipped(&self, ty: &TypeRef) -> bool {
        self.fallback(ty) == Some(Fallback::Skip)
    }

    /// Checks comparing both sides of `place`, whose type is `ty`.
    pub(crate) fn synthesize(
        &mut self,
        place: &Place,
        ty: &TypeRef,
        flags: SynthFlags,
    ) -> Result<Vec<Check>, GenError> {
        match self.fallback(ty) {
            Some(Fallback::Skip) => return Ok(Vec::new()),
            Some(Fallback::Generic) => return Ok(vec![self.builtin_call(Builtin::DeepEqual, place)?]),
            None => {}
        }
        match ty {
            TypeRef::Named(name) => self.named(place, name, flags),
            TypeRef::Structural(kind) => self.synthesize_kind(place, kind),
        }
    }

    pub(crate) fn synthesize_kind(
        &mut self,
        place: &Place,
        kind: &StructuralKind,
    ) -> Result<Vec<Check>, GenError> {
        match kind {
            StructuralKind::Primitive(_) => Ok(vec![Check::Eq(place.clone())]),
            StructuralKind::Record { fields } => {
                let mut checks = Vec::new();
                for field in fields {
                    let at = place.field(&field.name);
                    checks.extend(self.synthesize(&at, &field.ty, SynthFlags::empty())?);
                }
                Ok(checks)
            }
            StructuralKind::Sequence { element } => self.sequence(place, element),
            StructuralKind::FixedArray { element, .. } => self.array(place, element),
            StructuralKind::Map { value, .. } => self.map(place, value),
            StructuralKind::Indirection { referent } => self.indirection(place, referent),
            StructuralKind::Dynamic => Ok(vec![self.builtin_call(Builtin::DeepEqual, place)?]),
            StructuralKind::Opaque => Ok(Vec::new()),
        }
    }

    /// Call the routine of a named type, normalizing the argument to the
    /// way that routine takes its subject.
    fn named(
        &mut self,
        place: &Place,
        name: &TypeName,
        flags: SynthFlags,
    ) -> Result<Vec<Check>, GenError> {
        let id = self.unit_for(name)?;
        self.reference(&name.module)?;

        let call = |arg: Place| Check::Call {
            callee: Callee::Unit(id),
            arg,
        };
        let through_ref = flags.contains(SynthFlags::THROUGH_REF);
        Ok(match (self.units[id.index()].subject(), through_ref) {
            (Subject::ByPointer, true) | (Subject::ByValue, false) => vec![call(place.clone())],
            (Subject::ByPointer, false) => vec![call(place.addr_of())],
            // Dereferencing needs the pointer to be non-nil first.
            (Subject::ByValue, true) => vec![Check::NilGuard {
                place: place.clone(),
                then: vec![call(place.deref())],
            }],
        })
    }

    fn sequence(&mut self, place: &Place, element: &TypeRef) -> Result<Vec<Check>, GenError> {
        // Elements that cannot be compared: equal lengths is all we can ask.
        if self.is_skipped(element) {
            return Ok(vec![Check::LenEq(place.clone())]);
        }
        if element.is_byte() {
            return Ok(vec![self.builtin_call(Builtin::BytesEqual, place)?]);
        }

        let mut checks = vec![Check::LenEq(place.clone())];
        checks.extend(self.element_loop(place, element)?);
        Ok(checks)
    }

    /// Like [`sequence`](Self::sequence) without the length check; arrays of
    /// primitives compare directly.
    fn array(&mut self, place: &Place, element: &TypeRef) -> Result<Vec<Check>, GenError> {
        if self.is_skipped(element) {
            return Ok(Vec::new());
        }
        if matches!(element.as_structural(), Some(StructuralKind::Primitive(_))) {
            return Ok(vec![Check::Eq(place.clone())]);
        }
        Ok(self.element_loop(place, element)?.into_iter().collect())
    }

    /// Index loop comparing each element; nothing if elements need no checks.
    fn element_loop(&mut self, place: &Place, element: &TypeRef) -> Result<Option<Check>, GenError> {
        let index = next_loop_var(place, Family::Index);
        let body = self.synthesize(&place.index(index), element, SynthFlags::empty())?;
        Ok((!body.is_empty()).then(|| Check::ForIndex {
            index,
            over: place.clone(),
            body,
        }))
    }

    fn map(&mut self, place: &Place, value: &TypeRef) -> Result<Vec<Check>, GenError> {
        let key = next_loop_var(place, Family::Key);
        let body = if self.is_skipped(value) {
            Vec::new()
        } else {
            self.synthesize(&place.map_value(key), value, SynthFlags::empty())?
        };
        Ok(vec![
            Check::LenEq(place.clone()),
            Check::ForKey {
                key,
                over: place.clone(),
                capture: !body.is_empty(),
                body,
            },
        ])
    }

    fn indirection(&mut self, place: &Place, referent: &TypeRef) -> Result<Vec<Check>, GenError> {
        if self.is_skipped(referent) {
            return Ok(vec![Check::NilGuard {
                place: place.clone(),
                then: Vec::new(),
            }]);
        }
        // The named branch owns nil handling for its calls.
        if let TypeRef::Named(name) = referent {
            return self.named(place, name, SynthFlags::THROUGH_REF);
        }
        let then = self.synthesize(&place.deref(), referent, SynthFlags::empty())?;
        Ok(vec![Check::NilGuard {
            place: place.clone(),
            then,
        }])
    }

    fn builtin_call(&mut self, builtin: Builtin, place: &Place) -> Result<Check, GenError> {
        let module = self.externals.get(builtin).module.clone();
        self.reference(&module)?;
        Ok(Check::Call {
            callee: Callee::Builtin(builtin),
            arg: place.clone(),
        })
    }

    /// Record that the current unit uses a symbol of `module`.
    fn reference(&mut self, module: &ModulePath) -> Result<(), GenError> {
        let Some(current) = self.current() else {
            return Ok(());
        };
        let home = self.units[current.index()].ty().module.clone();
        let qualifier = resolve_qualifier(self.catalog, &home, module)?;
        self.units[current.index()]
            .references_mut()
            .record(module.clone(), qualifier);
        Ok(())
    }
}
