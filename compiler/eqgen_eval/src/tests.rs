#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use eqgen_ir::{MemoryCatalog, Primitive, TypeName, TypeRef};
use eqgen_synth::{generate, Generation};

use super::*;

const APP: &str = "example.com/app";

fn int() -> TypeRef {
    TypeRef::primitive(Primitive::Int)
}

fn gen_for(cat: &MemoryCatalog, root: &str) -> Generation {
    generate(cat, &TypeName::new(APP, root)).unwrap()
}

fn eq(gen: &Generation, name: &str, a: &Value, b: &Value) -> bool {
    equal(gen, &TypeName::new(APP, name), a, b).unwrap()
}

/// Catalog with `X` defined as a record of the given fields.
fn x_with(fields: impl IntoIterator<Item = (&'static str, TypeRef)>) -> Generation {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "X", TypeRef::record(fields));
    gen_for(&cat, "X")
}

fn x(fields: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
    Value::ptr(Value::record(fields))
}

// ── Records ─────────────────────────────────────────────────────

#[test]
fn record_equality_is_fieldwise() {
    let gen = x_with([("A", int()), ("B", TypeRef::primitive(Primitive::String))]);

    let a = x([("A", Value::Int(1)), ("B", Value::str("x"))]);
    let b = x([("A", Value::Int(1)), ("B", Value::str("x"))]);
    assert!(eq(&gen, "X", &a, &b));

    let other_a = x([("A", Value::Int(2)), ("B", Value::str("x"))]);
    let other_b = x([("A", Value::Int(1)), ("B", Value::str("y"))]);
    assert!(!eq(&gen, "X", &a, &other_a));
    assert!(!eq(&gen, "X", &a, &other_b));
}

#[test]
fn identical_pointer_is_equal_without_inspection() {
    let gen = x_with([("F", TypeRef::primitive(Primitive::Float64))]);

    let nan = x([("F", Value::Float(f64::NAN))]);
    assert!(eq(&gen, "X", &nan, &nan.clone()));
    assert!(!eq(&gen, "X", &nan, &x([("F", Value::Float(f64::NAN))])));
}

#[test]
fn absent_subjects() {
    let gen = x_with([("A", int())]);
    let some = x([("A", Value::Int(1))]);

    assert!(eq(&gen, "X", &Value::nil_ptr(), &Value::nil_ptr()));
    assert!(!eq(&gen, "X", &Value::nil_ptr(), &some));
    assert!(!eq(&gen, "X", &some, &Value::nil_ptr()));
}

#[test]
fn foreign_and_opaque_fields_are_ignored() {
    let gen = x_with([
        ("When", TypeRef::named("time", "Time")),
        ("Done", TypeRef::opaque()),
        ("N", int()),
    ]);

    let a = x([
        ("When", Value::Opaque(1)),
        ("Done", Value::Opaque(2)),
        ("N", Value::Int(7)),
    ]);
    let b = x([
        ("When", Value::Opaque(3)),
        ("Done", Value::Opaque(4)),
        ("N", Value::Int(7)),
    ]);
    assert!(eq(&gen, "X", &a, &b));
}

// ── Sequences and arrays ────────────────────────────────────────

#[test]
fn sequence_length_and_order() {
    let gen = x_with([("S", TypeRef::sequence(int()))]);
    let s = |items: &[i64]| x([("S", Value::ints(items.iter().copied()))]);

    assert!(eq(&gen, "X", &s(&[1, 2]), &s(&[1, 2])));
    assert!(!eq(&gen, "X", &s(&[1, 2]), &s(&[1, 2, 3])));
    assert!(!eq(&gen, "X", &s(&[1, 2]), &s(&[2, 1])));
}

#[test]
fn absent_sequence_equals_empty() {
    let gen = x_with([("S", TypeRef::sequence(int()))]);
    let empty = x([("S", Value::Seq(Some(Vec::new())))]);
    let absent = x([("S", Value::Seq(None))]);

    assert!(eq(&gen, "X", &empty, &absent));
}

#[test]
fn arrays_compare_elementwise() {
    let gen = x_with([
        ("P", TypeRef::array(2, int())),
        ("R", TypeRef::array(2, TypeRef::record([("V", int())]))),
    ]);
    let value = |p: i64, r: i64| {
        let rec = |v| Value::record([("V", Value::Int(v))]);
        x([
            ("P", Value::array([Value::Int(p), Value::Int(0)])),
            ("R", Value::array([rec(0), rec(r)])),
        ])
    };

    assert!(eq(&gen, "X", &value(1, 1), &value(1, 1)));
    assert!(!eq(&gen, "X", &value(1, 1), &value(2, 1)));
    assert!(!eq(&gen, "X", &value(1, 1), &value(1, 2)));
}

#[test]
fn bytes_fast_path() {
    let gen = x_with([("B", TypeRef::sequence(TypeRef::primitive(Primitive::Byte)))]);
    let b = |bytes: Option<&[u8]>| x([("B", bytes.map_or(Value::Seq(None), Value::bytes))]);

    assert!(eq(&gen, "X", &b(Some(b"abc".as_slice())), &b(Some(b"abc".as_slice()))));
    assert!(!eq(&gen, "X", &b(Some(b"abc".as_slice())), &b(Some(b"abd".as_slice()))));
    assert!(eq(&gen, "X", &b(None), &b(Some(b"".as_slice()))));
}

// ── Maps ────────────────────────────────────────────────────────

fn int_map(entries: &[(i64, i64)]) -> Value {
    Value::map(entries.iter().map(|&(k, v)| (Value::Int(k), Value::Int(v))))
}

#[test]
fn map_order_is_irrelevant() {
    let gen = x_with([("M", TypeRef::map(int(), int()))]);

    let a = x([("M", int_map(&[(1, 10), (2, 20)]))]);
    let b = x([("M", int_map(&[(2, 20), (1, 10)]))]);
    assert!(eq(&gen, "X", &a, &b));
}

#[test]
fn map_value_and_key_differences() {
    let gen = x_with([("M", TypeRef::map(int(), int()))]);
    let a = x([("M", int_map(&[(1, 10), (2, 20)]))]);

    let value_differs = x([("M", int_map(&[(1, 10), (2, 21)]))]);
    let key_differs = x([("M", int_map(&[(1, 10), (3, 20)]))]);
    let shorter = x([("M", int_map(&[(1, 10)]))]);
    assert!(!eq(&gen, "X", &a, &value_differs));
    assert!(!eq(&gen, "X", &a, &key_differs));
    assert!(!eq(&gen, "X", &a, &shorter));
}

#[test]
fn nested_maps_and_sequences() {
    let gen = x_with([
        ("F7", TypeRef::map(int(), TypeRef::sequence(int()))),
        ("F17", TypeRef::map(int(), TypeRef::map(int(), int()))),
    ]);
    let value = |tail: i64| {
        x([
            ("F7", Value::map([(Value::Int(1), Value::ints([1, tail]))])),
            (
                "F17",
                Value::map([
                    (Value::Int(1), int_map(&[(1, 1), (2, tail)])),
                    (Value::Int(2), int_map(&[])),
                ]),
            ),
        ])
    };

    assert!(eq(&gen, "X", &value(5), &value(5)));
    assert!(!eq(&gen, "X", &value(5), &value(6)));
}

#[test]
fn map_with_record_keys() {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "Y", TypeRef::record([("F1", int())]))
        .define(APP, "X", TypeRef::record([("F14", TypeRef::map(TypeRef::named(APP, "Y"), int()))]));
    let gen = gen_for(&cat, "X");
    let y = |n| Value::record([("F1", Value::Int(n))]);

    let a = x([("F14", Value::map([(y(1), Value::Int(1)), (y(2), Value::Int(2))]))]);
    let b = x([("F14", Value::map([(y(2), Value::Int(2)), (y(1), Value::Int(1))]))]);
    let c = x([("F14", Value::map([(y(2), Value::Int(1)), (y(1), Value::Int(2))]))]);
    assert!(eq(&gen, "X", &a, &b));
    assert!(!eq(&gen, "X", &a, &c));
}

// ── Indirections and named types ────────────────────────────────

#[test]
fn pointer_fields() {
    let gen = x_with([("P", TypeRef::pointer(int()))]);
    let p = |v: Option<i64>| x([("P", v.map_or(Value::nil_ptr(), |v| Value::ptr(Value::Int(v))))]);

    assert!(eq(&gen, "X", &p(None), &p(None)));
    assert!(!eq(&gen, "X", &p(None), &p(Some(1))));
    assert!(eq(&gen, "X", &p(Some(1)), &p(Some(1))));
    assert!(!eq(&gen, "X", &p(Some(1)), &p(Some(2))));
}

#[test]
fn shared_pointer_short_circuits() {
    let gen = x_with([("P", TypeRef::pointer(TypeRef::primitive(Primitive::Float64)))]);
    let shared = Rc::new(Value::Float(f64::NAN));

    let a = x([("P", Value::Ptr(Some(Rc::clone(&shared))))]);
    let b = x([("P", Value::Ptr(Some(shared)))]);
    assert!(eq(&gen, "X", &a, &b));
}

#[test]
fn linked_list_through_self_reference() {
    let mut cat = MemoryCatalog::new();
    cat.define(
        APP,
        "Node",
        TypeRef::record([
            ("Val", int()),
            ("Next", TypeRef::pointer(TypeRef::named(APP, "Node"))),
        ]),
    );
    let gen = gen_for(&cat, "Node");
    assert_eq!(gen.len(), 1);

    let list = |vals: &[i64]| {
        vals.iter().rev().fold(Value::nil_ptr(), |next, &val| {
            Value::ptr(Value::record([("Val", Value::Int(val)), ("Next", next)]))
        })
    };
    assert!(eq(&gen, "Node", &list(&[1, 2, 3]), &list(&[1, 2, 3])));
    assert!(!eq(&gen, "Node", &list(&[1, 2, 3]), &list(&[1, 2, 4])));
    assert!(!eq(&gen, "Node", &list(&[1, 2]), &list(&[1, 2, 3])));
}

#[test]
fn reference_like_named_type_takes_values() {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "Ints", TypeRef::sequence(int()))
        .define(APP, "X", TypeRef::record([("P", TypeRef::pointer(TypeRef::named(APP, "Ints")))]));
    let gen = gen_for(&cat, "X");

    assert!(eq(&gen, "Ints", &Value::ints([1]), &Value::ints([1])));
    let p = |items: &[i64]| x([("P", Value::ptr(Value::ints(items.iter().copied())))]);
    assert!(eq(&gen, "X", &p(&[1, 2]), &p(&[1, 2])));
    assert!(!eq(&gen, "X", &p(&[1, 2]), &p(&[1])));
    assert!(!eq(&gen, "X", &p(&[1]), &x([("P", Value::nil_ptr())])));
}

#[test]
fn dynamic_fields_use_deep_equality() {
    let gen = x_with([("Any", TypeRef::dynamic())]);
    let any = |v: Value| x([("Any", Value::dynamic(v))]);

    assert!(eq(&gen, "X", &any(Value::ints([1, 2])), &any(Value::ints([1, 2]))));
    assert!(!eq(&gen, "X", &any(Value::ints([1, 2])), &any(Value::ints([1]))));
    assert!(!eq(&gen, "X", &any(Value::Int(1)), &any(Value::str("1"))));
    assert!(eq(&gen, "X", &x([("Any", Value::Dynamic(None))]), &x([("Any", Value::Dynamic(None))])));
}

// ── Errors ──────────────────────────────────────────────────────

#[test]
fn unknown_type_is_an_error() {
    let gen = x_with([("A", int())]);
    let err = equal(&gen, &TypeName::new(APP, "Nope"), &Value::nil_ptr(), &Value::nil_ptr());
    assert_eq!(
        err,
        Err(EvalError::UnknownType {
            name: TypeName::new(APP, "Nope"),
        })
    );
}

#[test]
fn shape_mismatch_is_an_error() {
    let gen = x_with([("A", int())]);
    let err = equal(&gen, &TypeName::new(APP, "X"), &Value::Int(1), &Value::Int(1)).unwrap_err();
    assert_eq!(
        err,
        EvalError::Shape {
            expected: "pointer",
            found: "int",
        }
    );
}

#[test]
fn deep_equal_distinguishes_absent_from_empty() {
    assert!(!deep_equal(&Value::Seq(None), &Value::Seq(Some(Vec::new()))));
    assert!(deep_equal(&Value::Seq(None), &Value::Seq(None)));
    assert!(bytes_equal(&Value::Seq(None), &Value::bytes(b"")).unwrap());
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn bytes_fast_path_agrees_with_elementwise(
        a in prop::collection::vec(any::<u8>(), 0..16),
        b in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut cat = MemoryCatalog::new();
        cat.define(APP, "Octet", TypeRef::primitive(Primitive::Byte))
            .define(APP, "Fast", TypeRef::record([("B", TypeRef::sequence(TypeRef::primitive(Primitive::Byte)))]))
            .define(APP, "Slow", TypeRef::record([("B", TypeRef::sequence(TypeRef::named(APP, "Octet")))]));
        let fast = gen_for(&cat, "Fast");
        let slow = gen_for(&cat, "Slow");

        let va = x([("B", Value::bytes(&a))]);
        let vb = x([("B", Value::bytes(&b))]);
        let expected = a == b;
        prop_assert_eq!(eq(&fast, "Fast", &va, &vb), expected);
        prop_assert_eq!(eq(&slow, "Slow", &va, &vb), expected);
    }

    #[test]
    fn sequence_equality_matches_vec_equality(
        a in prop::collection::vec(-3i64..3, 0..6),
        b in prop::collection::vec(-3i64..3, 0..6),
    ) {
        let gen = x_with([("S", TypeRef::sequence(int()))]);
        let va = x([("S", Value::ints(a.iter().copied()))]);
        let vb = x([("S", Value::ints(b.iter().copied()))]);
        prop_assert_eq!(eq(&gen, "X", &va, &vb), a == b);
    }

    #[test]
    fn map_equality_ignores_insertion_order(
        entries in prop::collection::btree_map(any::<i16>(), any::<i16>(), 0..8),
        seed in any::<u64>(),
    ) {
        let gen = x_with([("M", TypeRef::map(int(), int()))]);
        let ordered: Vec<(i64, i64)> = entries
            .iter()
            .map(|(&k, &v)| (i64::from(k), i64::from(v)))
            .collect();
        let mut shuffled = ordered.clone();
        let len = shuffled.len().max(1);
        #[expect(clippy::cast_possible_truncation, reason = "rotation amount only")]
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();

        let va = x([("M", int_map(&ordered))]);
        let vb = x([("M", int_map(&shuffled))]);
        prop_assert!(eq(&gen, "X", &va, &vb));
    }
}
