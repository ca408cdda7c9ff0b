use pretty_assertions::assert_eq;

use crate::ty::Primitive;

use super::*;

const APP: &str = "example.com/app";

fn int() -> TypeRef {
    TypeRef::primitive(Primitive::Int)
}

#[test]
fn resolves_structural_definition() {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "Count", int());

    let kind = cat.resolve(&TypeName::new(APP, "Count"));
    assert_eq!(kind, Ok(StructuralKind::Primitive(Primitive::Int)));
}

#[test]
fn follows_named_chains() {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "A", TypeRef::named(APP, "B"))
        .define(APP, "B", TypeRef::named(APP, "C"))
        .define(APP, "C", TypeRef::sequence(int()));

    let kind = cat.resolve(&TypeName::new(APP, "A"));
    assert_eq!(kind, Ok(StructuralKind::Sequence { element: int() }));
}

#[test]
fn cyclic_chain_is_an_error() {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "A", TypeRef::named(APP, "B"))
        .define(APP, "B", TypeRef::named(APP, "A"));

    let err = cat.resolve(&TypeName::new(APP, "A"));
    assert_eq!(
        err,
        Err(CatalogError::Cyclic {
            name: "A".to_owned(),
            module: ModulePath::new(APP),
        })
    );
}

#[test]
fn missing_type_and_module() {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "A", int());

    assert_eq!(
        cat.resolve(&TypeName::new(APP, "Missing")),
        Err(CatalogError::NotFound {
            name: "Missing".to_owned(),
            module: ModulePath::new(APP),
        })
    );
    assert_eq!(
        cat.resolve(&TypeName::new("example.com/other", "A")),
        Err(CatalogError::UnknownModule {
            module: ModulePath::new("example.com/other"),
        })
    );
}

#[test]
fn error_messages_name_type_and_module() {
    let err = CatalogError::NotFound {
        name: "X".to_owned(),
        module: ModulePath::new(APP),
    };
    assert_eq!(
        err.to_string(),
        "type `X` was not found in module `example.com/app`"
    );
}

#[test]
fn foreign_roots_and_std_paths() {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "A", int())
        .define("vendor.org/lib/sub", "V", int())
        .foreign_root("vendor.org/lib");

    assert!(!cat.is_foreign(&TypeName::new(APP, "A")));
    assert!(cat.is_foreign(&TypeName::new("vendor.org/lib/sub", "V")));
    assert!(cat.is_foreign(&TypeName::new("vendor.org/lib", "V")));
    assert!(!cat.is_foreign(&TypeName::new("vendor.org/library", "V")));
    // Standard-library looking paths without definitions are foreign.
    assert!(cat.is_foreign(&TypeName::new("time", "Time")));
}

#[test]
fn std_like_module_with_definitions_is_not_foreign() {
    let mut cat = MemoryCatalog::new();
    cat.define("testdata", "X", int());

    assert!(!cat.is_foreign(&TypeName::new("testdata", "X")));
}

#[test]
fn module_metadata() {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "A", int())
        .set_module_name(APP, "application")
        .import(APP, "example.com/lib", ImportName::Alias("l".to_owned()))
        .set_location(APP, "/src/app");

    let app = ModulePath::new(APP);
    assert_eq!(cat.module_name(&app).as_deref(), Some("application"));
    assert_eq!(
        cat.imports(&app),
        &[Import::new("example.com/lib", ImportName::Alias("l".to_owned()))]
    );
    assert_eq!(cat.location(&app), Some(Path::new("/src/app")));

    let unknown = ModulePath::new("example.com/none");
    assert_eq!(cat.module_name(&unknown), None);
    assert!(cat.imports(&unknown).is_empty());
}

#[test]
fn module_name_defaults_to_last_segment() {
    let mut cat = MemoryCatalog::new();
    cat.define("example.com/app/model", "A", int());

    assert_eq!(
        cat.module_name(&ModulePath::new("example.com/app/model"))
            .as_deref(),
        Some("model")
    );
}

#[test]
fn definitions_over_foreign_types_are_opaque() {
    let mut cat = MemoryCatalog::new();
    cat.define(APP, "Stamp", TypeRef::named("time", "Time"))
        .define(APP, "Handle", TypeRef::named("example.com/vendor/db", "Conn"))
        .foreign_root("example.com/vendor");

    assert_eq!(cat.resolve(&TypeName::new(APP, "Stamp")), Ok(StructuralKind::Opaque));
    assert_eq!(cat.resolve(&TypeName::new(APP, "Handle")), Ok(StructuralKind::Opaque));
}
