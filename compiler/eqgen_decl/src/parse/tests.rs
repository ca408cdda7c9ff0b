#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;

use super::*;

const APP: &str = "example.com/app";

fn parse(source: &str) -> ParsedFile {
    parse_file(&ModulePath::new(APP), "test.go", source).unwrap()
}

fn parse_err(source: &str) -> DeclError {
    parse_file(&ModulePath::new(APP), "test.go", source).unwrap_err()
}

fn int() -> TypeRef {
    TypeRef::primitive(Primitive::Int)
}

fn local(name: &str) -> TypeRef {
    TypeRef::named(APP, name)
}

fn definition<'f>(file: &'f ParsedFile, name: &str) -> &'f TypeRef {
    &file.types.iter().find(|t| t.name == name).unwrap().definition
}

fn fields(ty: &TypeRef) -> Vec<(&str, &TypeRef)> {
    match ty.as_structural() {
        Some(StructuralKind::Record { fields }) => {
            fields.iter().map(|f| (f.name.as_str(), &f.ty)).collect()
        }
        other => panic!("expected a record, found {other:?}"),
    }
}

#[test]
fn parses_reference_fixture() {
    let file = parse(
        r"package testdata

type Y struct {
	F1 int
}

type X struct {
	F1  int
	F2  string
	F3  []byte
	F4  []int
	F5  [3]int
	F6  map[int]int // different keys
	F7  map[int][]int
	F8  []map[int]int
	F9  *int
	F10 *[]int
	F11 []map[int]*[]int
	F12 Y
	F13 []*Y
	F14 map[Y]int
	F15 map[int]*Y
	F16 [][]int
	F17 map[int]map[int]int
}

type A struct {
	d []map[string][]int
}

type B struct {
	a A
	b int
}
",
    );

    assert_eq!(file.package, "testdata");
    let names: Vec<&str> = file.types.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Y", "X", "A", "B"]);

    let x = fields(definition(&file, "X"));
    assert_eq!(x.len(), 17);
    assert_eq!(x[2], ("F3", &TypeRef::sequence(TypeRef::primitive(Primitive::Byte))));
    assert_eq!(x[4], ("F5", &TypeRef::array(3, int())));
    assert_eq!(
        x[10],
        ("F11", &TypeRef::sequence(TypeRef::map(int(), TypeRef::pointer(TypeRef::sequence(int())))))
    );
    assert_eq!(x[11], ("F12", &local("Y")));
    assert_eq!(x[13], ("F14", &TypeRef::map(local("Y"), int())));
    assert_eq!(
        x[16],
        ("F17", &TypeRef::map(int(), TypeRef::map(int(), int())))
    );

    assert_eq!(
        fields(definition(&file, "B")),
        vec![("a", &local("A")), ("b", &int())]
    );
}

#[test]
fn imports_in_all_forms() {
    let file = parse(
        r#"package app

import "bytes"
import (
	lib "example.com/lib"
	. "example.com/dot"
	_ "example.com/side"
	"example.com/deep/model"
)
"#,
    );

    assert_eq!(
        file.imports,
        vec![
            Import::new("bytes", ImportName::Default),
            Import::new("example.com/lib", ImportName::Alias("lib".to_owned())),
            Import::new("example.com/dot", ImportName::Dot),
            Import::new("example.com/side", ImportName::Blank),
            Import::new("example.com/deep/model", ImportName::Default),
        ]
    );
}

#[test]
fn qualified_names_resolve_through_imports() {
    let file = parse(
        r#"package app

import (
	l "example.com/lib"
	"example.com/deep/model"
	"time"
)

type X struct {
	A l.Thing
	B *model.User
	C time.Time
}
"#,
    );

    assert_eq!(
        fields(definition(&file, "X")),
        vec![
            ("A", &TypeRef::named("example.com/lib", "Thing")),
            ("B", &TypeRef::pointer(TypeRef::named("example.com/deep/model", "User"))),
            ("C", &TypeRef::named("time", "Time")),
        ]
    );
}

#[test]
fn default_imports_bind_their_conventional_names() {
    let file = parse(
        r#"package app

import (
	"example.com/lib/v2"
	"gopkg.in/yaml.v3"
	"github.com/acme/go-redis"
)

type X struct {
	A lib.Thing
	B yaml.Node
	C redis.Client
}
"#,
    );

    assert_eq!(
        fields(definition(&file, "X")),
        vec![
            ("A", &TypeRef::named("example.com/lib/v2", "Thing")),
            ("B", &TypeRef::named("gopkg.in/yaml.v3", "Node")),
            ("C", &TypeRef::named("github.com/acme/go-redis", "Client")),
        ]
    );
    assert!(file.pending.is_empty());
}

#[test]
fn unconventional_qualifiers_stay_pending() {
    let file = parse(
        "package app\n\nimport \"example.com/models\"\n\ntype X struct {\n\tA schema.User\n\tB []*schema.Role\n}\n",
    );

    let stand_in = pending_module("schema");
    assert_eq!(pending_qualifier(&stand_in), Some("schema"));
    assert_eq!(pending_qualifier(&ModulePath::new("example.com/models")), None);
    assert_eq!(
        fields(definition(&file, "X")),
        vec![
            ("A", &TypeRef::named(stand_in.as_str(), "User")),
            (
                "B",
                &TypeRef::sequence(TypeRef::pointer(TypeRef::named(stand_in.as_str(), "Role")))
            ),
        ]
    );
    assert_eq!(
        file.pending,
        vec![PendingQualifier {
            qualifier: "schema".to_owned(),
            line: 6,
            column: 4,
        }]
    );
}

#[test]
fn field_forms() {
    let file = parse(
        r#"package app

import "example.com/lib"

type X struct {
	A, B int `json:"a"`
	Y
	*Z
	lib.Base "tag"
	_ int
	error
	C, _, D string; E bool
}
"#,
    );

    let string = TypeRef::primitive(Primitive::String);
    assert_eq!(
        fields(definition(&file, "X")),
        vec![
            ("A", &int()),
            ("B", &int()),
            ("Y", &local("Y")),
            ("Z", &TypeRef::pointer(local("Z"))),
            ("Base", &TypeRef::named("example.com/lib", "Base")),
            ("error", &TypeRef::dynamic()),
            ("C", &string),
            ("D", &string),
            ("E", &TypeRef::primitive(Primitive::Bool)),
        ]
    );
}

#[test]
fn dynamic_and_opaque_kinds() {
    let file = parse(
        r"package app

type X struct {
	I interface {
		Do(x int) (bool, error)
	}
	Any any
	Err error
	Ch chan int
	In <-chan string
	Out chan<- []byte
	F func(a, b int) (int, error)
	G func()
	H func() *X
}
",
    );

    let x = fields(definition(&file, "X"));
    let kinds: Vec<&StructuralKind> = x.iter().map(|(_, ty)| ty.as_structural().unwrap()).collect();
    assert_eq!(
        kinds,
        vec![
            &StructuralKind::Dynamic,
            &StructuralKind::Dynamic,
            &StructuralKind::Dynamic,
            &StructuralKind::Opaque,
            &StructuralKind::Opaque,
            &StructuralKind::Opaque,
            &StructuralKind::Opaque,
            &StructuralKind::Opaque,
            &StructuralKind::Opaque,
        ]
    );
}

#[test]
fn grouped_and_alias_declarations() {
    let file = parse(
        "package app\n\ntype (\n\tIDs []int\n\tGrid [0x2][2]int\n\tName = string\n)\ntype Count int",
    );

    assert_eq!(
        file.types,
        vec![
            TypeDecl {
                name: "IDs".to_owned(),
                definition: TypeRef::sequence(int()),
                alias: false,
            },
            TypeDecl {
                name: "Grid".to_owned(),
                definition: TypeRef::array(2, TypeRef::array(2, int())),
                alias: false,
            },
            TypeDecl {
                name: "Name".to_owned(),
                definition: TypeRef::primitive(Primitive::String),
                alias: true,
            },
            TypeDecl {
                name: "Count".to_owned(),
                definition: int(),
                alias: false,
            },
        ]
    );
}

#[test]
fn other_declarations_are_skipped() {
    let file = parse(
        r#"package app

const (
	A = iota
	B
)

var table = map[string]int{
	"x": 1, // }
}

func (x *X) Equal(y *X) bool {
	if x == nil {
		return y == nil
	}
	return x.N == y.N
}

type X struct{ N int }

func helper() {}
"#,
    );

    assert_eq!(file.types.len(), 1);
    assert_eq!(fields(definition(&file, "X")), vec![("N", &int())]);
}

#[test]
fn unknown_package_is_located() {
    let err = parse_err("package app\n\ntype X struct {\n\tA  nope.Thing\n}\n");
    assert_eq!(
        err,
        DeclError::new("test.go", 4, 5, "package `nope` is not imported")
    );
}

#[test]
fn type_parameters_are_rejected() {
    for source in [
        "package app\ntype List[T any] struct{}\n",
        "package app\ntype Pair[K comparable, V any] struct{}\n",
        "package app\ntype Num[T ~int] int\n",
    ] {
        let err = parse_err(source);
        assert_eq!(err.line, 2);
        assert!(err.message.starts_with("type parameters of `"), "{err}");
    }
}

#[test]
fn array_lengths_may_name_constants() {
    let file = parse(
        r"package app

type Buffers struct {
	A [Size]byte
	B [2 * Size]int
	C [Last + 1]int
	D [Mask >> 4]int
	E [(Size - 1) << Shift]int
}

const Size = 4

const (
	First = iota
	Middle
	Last
)

const (
	Mask  uint16 = 0xff
	Shift, _     = 1, 2
)
",
    );

    let byte = TypeRef::primitive(Primitive::Byte);
    assert_eq!(
        fields(definition(&file, "Buffers")),
        vec![
            ("A", &TypeRef::array(4, byte)),
            ("B", &TypeRef::array(8, int())),
            ("C", &TypeRef::array(3, int())),
            ("D", &TypeRef::array(15, int())),
            ("E", &TypeRef::array(6, int())),
        ]
    );
}

#[test]
fn undetermined_array_lengths_are_unknown() {
    let file = parse(
        "package app\nimport \"example.com/lib\"\ntype A [lib.Size]int\ntype B [N]*A\ntype C [len(x)]int\n",
    );

    let unknown = |element| TypeRef::structural(StructuralKind::FixedArray { length: None, element });
    assert_eq!(definition(&file, "A"), &unknown(int()));
    assert_eq!(definition(&file, "B"), &unknown(TypeRef::pointer(local("A"))));
    assert_eq!(definition(&file, "C"), &unknown(int()));
}

#[test]
fn missing_array_length() {
    let err = parse_err("package app\ntype A [\n");
    assert_eq!(
        err.to_string(),
        "test.go:3:1: expected array length, found end of file"
    );
}

#[test]
fn missing_package_clause() {
    let err = parse_err("type A int\n");
    assert_eq!(err.to_string(), "test.go:1:1: expected `package`, found `type`");
}

#[test]
fn unterminated_struct() {
    let err = parse_err("package app\ntype A struct {\n\tB int\n");
    assert_eq!(err.message, "expected identifier, found end of file");
}

#[test]
fn integer_literals() {
    assert_eq!(parse_int("10"), Some(10));
    assert_eq!(parse_int("1_000"), Some(1000));
    assert_eq!(parse_int("0x1F"), Some(31));
    assert_eq!(parse_int("0b101"), Some(5));
    assert_eq!(parse_int("0o17"), Some(15));
    assert_eq!(parse_int("017"), Some(15));
    assert_eq!(parse_int("0"), Some(0));
    assert_eq!(parse_int("1.5"), None);
}
