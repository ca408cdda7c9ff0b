//! Renderer: comparison IR to source text.
//!
//! Every check becomes a guarded early `return false`; falling off the end
//! of the body returns `true`.

use eqgen_ir::{Callee, Check, LoopVar, Place, Side, Subject, UnitId};
use eqgen_synth::naming::{captured_ident, render_place};
use eqgen_synth::{GeneratedUnit, Generation, Qualifier};

use crate::emitter::Emitter;

/// Text of the file header line for a unit.
pub fn header_line(tool: &str, type_name: &str) -> String {
    format!("// Code generated by {tool} for type: {type_name}; DO NOT EDIT")
}

/// Render a complete file for unit `id`: header, package clause, imports
/// and the routine.
pub fn render_file<E: Emitter>(
    generation: &Generation,
    id: UnitId,
    package: &str,
    tool: &str,
    out: &mut E,
) {
    let unit = generation.unit(id);
    out.emit(&header_line(tool, &unit.ty().name));
    out.emit_newline();
    out.emit("package ");
    out.emit(package);
    out.emit_newline();

    if !unit.references().is_empty() {
        out.emit_newline();
        for (path, qualifier) in unit.references().iter() {
            let line = match qualifier {
                Qualifier::Package {
                    explicit: false, ..
                } => format!("import \"{path}\""),
                Qualifier::Package { name, .. } => format!("import {name} \"{path}\""),
                Qualifier::Dot => format!("import . \"{path}\""),
                // Never recorded.
                Qualifier::Local => continue,
            };
            out.emit(&line);
            out.emit_newline();
        }
    }

    out.emit_newline();
    render_unit(generation, id, out);
}

/// Render the routine of unit `id`.
pub fn render_unit<E: Emitter>(generation: &Generation, id: UnitId, out: &mut E) {
    let unit = generation.unit(id);
    let mut renderer = Renderer {
        generation,
        unit,
        out,
        depth: 0,
    };
    renderer.routine();
}

struct Renderer<'a, E: Emitter> {
    generation: &'a Generation,
    unit: &'a GeneratedUnit,
    out: &'a mut E,
    depth: usize,
}

impl<E: Emitter> Renderer<'_, E> {
    fn line(&mut self, text: &str) {
        self.out.emit_indent(self.depth);
        self.out.emit(text);
        self.out.emit_newline();
    }

    fn open(&mut self, head: &str) {
        self.line(&format!("{head} {{"));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn fail_if(&mut self, condition: &str) {
        self.open(&format!("if {condition}"));
        self.line("return false");
        self.close();
    }

    fn routine(&mut self) {
        let name = &self.unit.ty().name;
        let param = match self.unit.subject() {
            Subject::ByPointer => format!("*{name}"),
            Subject::ByValue => name.clone(),
        };
        self.open(&format!(
            "func {}(t1, t2 {param}) bool",
            self.unit.routine_name()
        ));
        if self.unit.subject() == Subject::ByPointer {
            self.open("if t1 == t2");
            self.line("return true");
            self.close();
            self.fail_if("t1 == nil || t2 == nil");
        }
        self.checks(self.unit.body());
        self.line("return true");
        self.close();
    }

    fn checks(&mut self, checks: &[Check]) {
        for check in checks {
            self.check(check);
        }
    }

    fn check(&mut self, check: &Check) {
        match check {
            Check::Eq(place) => {
                let (a, b) = sides(place);
                self.fail_if(&format!("{a} != {b}"));
            }
            Check::LenEq(place) => {
                let (a, b) = sides(place);
                self.fail_if(&format!("len({a}) != len({b})"));
            }
            Check::Call { callee, arg } => {
                let (a, b) = sides(arg);
                let symbol = self.callee_symbol(*callee);
                self.fail_if(&format!("!{symbol}({a}, {b})"));
            }
            Check::NilGuard { place, then } => {
                let (a, b) = sides(place);
                self.open(&format!("if {a} != {b}"));
                self.fail_if(&format!("{a} == nil || {b} == nil"));
                self.checks(then);
                self.close();
            }
            Check::ForIndex { index, over, body } => {
                let (a, _) = sides(over);
                self.open(&format!("for {index} := range {a}"));
                self.checks(body);
                self.close();
            }
            Check::ForKey {
                key,
                over,
                capture,
                body,
            } => self.for_key(*key, over, *capture, body),
        }
    }

    fn for_key(&mut self, key: LoopVar, over: &Place, capture: bool, body: &[Check]) {
        let (a, b) = sides(over);
        if !capture {
            self.open(&format!("for {key} := range {a}"));
            self.fail_if(&format!("_, ok := {b}[{key}]; !ok"));
            self.close();
            return;
        }

        let first = captured_ident(key, Side::First);
        let second = captured_ident(key, Side::Second);
        self.open(&format!("for {key}, {first} := range {a}"));
        self.open(&format!("if {second}, ok := {b}[{key}]; !ok"));
        self.line("return false");
        self.depth = self.depth.saturating_sub(1);
        self.open("} else");
        self.checks(body);
        self.close();
        self.close();
    }

    /// Spelling of `callee` as seen from the unit being rendered.
    fn callee_symbol(&self, callee: Callee) -> String {
        let refs = self.unit.references();
        match callee {
            Callee::Unit(id) => {
                let target = self.generation.unit(id);
                refs.qualifier(&target.ty().module)
                    .qualify(&target.routine_name())
            }
            Callee::Builtin(builtin) => {
                let external = self.generation.externals().get(builtin);
                refs.qualifier(&external.module).qualify(&external.symbol)
            }
        }
    }
}

fn sides(place: &Place) -> (String, String) {
    (
        render_place(place, Side::First),
        render_place(place, Side::Second),
    )
}
