//! Naming Engine.
//!
//! Two jobs:
//!
//! - **Path derivation**: render a [`Place`] for one side of the comparison.
//!   The routine subject is `t1`/`t2`; fields, indices, dereferences and
//!   address-of wrap their base; a map value captured while iterating that
//!   map renders as `value{n}{side}` instead of a second lookup. Because the
//!   substitution is a node in the tree, any dereference, index or field
//!   access around it is preserved as-is.
//!
//! - **Identifier allocation**: a new loop takes the next free number in its
//!   family by walking the place it iterates over, so nested loops at any
//!   depth never collide.

use std::fmt::Write;

use eqgen_ir::{Check, Family, LoopVar, Place, Side};

/// Identifier of the routine subject on `side`.
pub fn subject_ident(side: Side) -> &'static str {
    match side {
        Side::First => "t1",
        Side::Second => "t2",
    }
}

/// Identifier bound to the value of map key `key` on `side`.
pub fn captured_ident(key: LoopVar, side: Side) -> String {
    format!("value{}{}", key.n, side.ordinal())
}

/// Render `place` as an expression for `side`.
pub fn render_place(place: &Place, side: Side) -> String {
    let mut out = String::new();
    write_place(&mut out, place, side);
    out
}

fn write_place(out: &mut String, place: &Place, side: Side) {
    match place {
        Place::Subject => out.push_str(subject_ident(side)),
        Place::Field(base, name) => {
            // Selectors dereference one level implicitly.
            match base.as_ref() {
                Place::Deref(inner) => write_place(out, inner, side),
                other => write_place(out, other, side),
            }
            out.push('.');
            out.push_str(name);
        }
        Place::Index(base, var) => {
            write_place(out, base, side);
            let _ = write!(out, "[{var}]");
        }
        Place::MapValue(_, key) => out.push_str(&captured_ident(*key, side)),
        Place::Deref(base) => {
            out.push_str("(*");
            write_place(out, base, side);
            out.push(')');
        }
        Place::AddrOf(base) => {
            out.push_str("(&");
            write_place(out, base, side);
            out.push(')');
        }
    }
}

/// Highest number of `family` used anywhere in `place`, 0 if none.
fn highest(place: &Place, family: Family) -> u32 {
    let own = match place {
        Place::Index(_, var) | Place::MapValue(_, var) if var.family == family => var.n,
        _ => 0,
    };
    place
        .base()
        .map_or(own, |base| own.max(highest(base, family)))
}

/// Allocate the loop identifier for a new loop over `place`.
pub fn next_loop_var(place: &Place, family: Family) -> LoopVar {
    LoopVar::new(family, highest(place, family) + 1)
}

/// Every auxiliary identifier declared by `checks`, in declaration order.
///
/// Loops over disjoint places legitimately reuse identifiers (their scopes
/// do not overlap), so duplicates are only a problem along one nesting path.
pub fn aux_identifiers(checks: &[Check]) -> Vec<String> {
    let mut out = Vec::new();
    collect_identifiers(checks, &mut out);
    out
}

fn collect_identifiers(checks: &[Check], out: &mut Vec<String>) {
    for check in checks {
        match check {
            Check::ForIndex { index, .. } => out.push(index.to_string()),
            Check::ForKey { key, capture, .. } => {
                out.push(key.to_string());
                if *capture {
                    out.extend(Side::BOTH.map(|side| captured_ident(*key, side)));
                }
            }
            Check::Eq(_) | Check::LenEq(_) | Check::Call { .. } | Check::NilGuard { .. } => {}
        }
        collect_identifiers(check.children(), out);
    }
}
