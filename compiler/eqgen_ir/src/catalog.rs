//! Type Catalog boundary.
//!
//! The generator never reads source files itself. Everything it needs to
//! know about named types and modules comes through [`Catalog`]:
//! structural definitions, whether a type lies outside the boundary the
//! generator may descend into, and the import declarations of a module (for
//! qualifying references to other modules).
//!
//! [`MemoryCatalog`] is an in-memory implementation used by tests and by
//! embedders that build their type graph programmatically.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};

use crate::name::{ModulePath, TypeName};
use crate::ty::{StructuralKind, TypeRef};

/// Catalog failure. Fatal for a generation session.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("type `{name}` was not found in module `{module}`")]
    NotFound { name: String, module: ModulePath },

    #[error("module `{module}` is not known to the catalog")]
    UnknownModule { module: ModulePath },

    #[error("no import of module `{module}` declares package `{package}`")]
    UnboundPackage { package: String, module: ModulePath },

    #[error("type `{name}` in module `{module}` is defined in terms of itself")]
    Cyclic { name: String, module: ModulePath },
}

/// How a module imports another one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImportName {
    /// No explicit name: the imported module's package name is used.
    Default,
    /// `import alias "path"`
    Alias(String),
    /// `import . "path"`: symbols are used unqualified.
    Dot,
    /// `import _ "path"`: side effects only, not usable for references.
    Blank,
}

/// One import declaration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Import {
    pub path: ModulePath,
    pub name: ImportName,
}

impl Import {
    pub fn new(path: impl Into<ModulePath>, name: ImportName) -> Self {
        Self {
            path: path.into(),
            name,
        }
    }
}

/// Source of type definitions and module metadata.
pub trait Catalog {
    /// Resolve a named type to its underlying structural kind.
    ///
    /// Definitions of one named type in terms of another (`type A B`) are
    /// followed until a structural kind is reached.
    fn resolve(&self, name: &TypeName) -> Result<StructuralKind, CatalogError>;

    /// Whether `name` lies outside the boundary the generator controls.
    fn is_foreign(&self, name: &TypeName) -> bool;

    /// Declared package name of a module, if the catalog knows the module.
    fn module_name(&self, module: &ModulePath) -> Option<String>;

    /// All import declarations of `module`, across all of its files.
    fn imports(&self, module: &ModulePath) -> &[Import];

    /// Directory generated files for `module` belong in.
    fn location(&self, module: &ModulePath) -> Option<&Path>;
}

/// Follow named-to-named definitions until a structural kind is reached.
///
/// `lookup` returns the direct definition of a named type. A chain that
/// returns to a type it already visited is reported as
/// [`CatalogError::Cyclic`].
pub fn follow_definitions<F>(name: &TypeName, lookup: F) -> Result<StructuralKind, CatalogError>
where
    F: Fn(&TypeName) -> Result<TypeRef, CatalogError>,
{
    let mut visited = FxHashSet::default();
    let mut current = name.clone();
    loop {
        if !visited.insert(current.clone()) {
            return Err(CatalogError::Cyclic {
                name: name.name.clone(),
                module: name.module.clone(),
            });
        }
        match lookup(&current)? {
            TypeRef::Structural(kind) => return Ok(*kind),
            TypeRef::Named(next) => current = next,
        }
    }
}

/// Whether `module` equals `root` or lies below it.
pub fn is_under_root(module: &ModulePath, root: &ModulePath) -> bool {
    let (module, root) = (module.as_str(), root.as_str());
    module == root
        || module
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[derive(Debug, Default)]
struct ModuleEntry {
    name: String,
    types: FxHashMap<String, TypeRef>,
    imports: Vec<Import>,
    location: Option<PathBuf>,
}

/// In-memory catalog.
///
/// Modules are created on first mention, named after the last segment of
/// their path unless [`set_module_name`](Self::set_module_name) says
/// otherwise.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    modules: FxHashMap<ModulePath, ModuleEntry>,
    foreign_roots: Vec<ModulePath>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, module: &str) -> &mut ModuleEntry {
        let path = ModulePath::new(module);
        self.modules
            .entry(path)
            .or_insert_with_key(|path| ModuleEntry {
                name: path.last_segment().to_owned(),
                ..ModuleEntry::default()
            })
    }

    /// Define (or redefine) a named type.
    pub fn define(&mut self, module: &str, name: &str, definition: TypeRef) -> &mut Self {
        self.entry(module)
            .types
            .insert(name.to_owned(), definition);
        self
    }

    pub fn set_module_name(&mut self, module: &str, name: &str) -> &mut Self {
        name.clone_into(&mut self.entry(module).name);
        self
    }

    /// Record that `home` imports `path` under `name`.
    pub fn import(&mut self, home: &str, path: &str, name: ImportName) -> &mut Self {
        self.entry(home).imports.push(Import::new(path, name));
        self
    }

    pub fn set_location(&mut self, module: &str, dir: impl Into<PathBuf>) -> &mut Self {
        self.entry(module).location = Some(dir.into());
        self
    }

    /// Treat every module at or below `root` as foreign.
    pub fn foreign_root(&mut self, root: &str) -> &mut Self {
        self.foreign_roots.push(ModulePath::new(root));
        self
    }

    /// Direct definition of `name`. Foreign types the catalog does not
    /// describe are opaque, so `type A time.Time` still resolves.
    fn definition(&self, name: &TypeName) -> Result<TypeRef, CatalogError> {
        if self.is_foreign(name) && !self.modules.contains_key(&name.module) {
            return Ok(TypeRef::opaque());
        }
        let module = self
            .modules
            .get(&name.module)
            .ok_or_else(|| CatalogError::UnknownModule {
                module: name.module.clone(),
            })?;
        module
            .types
            .get(&name.name)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                name: name.name.clone(),
                module: name.module.clone(),
            })
    }
}

impl Catalog for MemoryCatalog {
    fn resolve(&self, name: &TypeName) -> Result<StructuralKind, CatalogError> {
        follow_definitions(name, |n| self.definition(n))
    }

    fn is_foreign(&self, name: &TypeName) -> bool {
        self.foreign_roots
            .iter()
            .any(|root| is_under_root(&name.module, root))
            || (name.module.is_std_like() && !self.modules.contains_key(&name.module))
    }

    fn module_name(&self, module: &ModulePath) -> Option<String> {
        self.modules.get(module).map(|m| m.name.clone())
    }

    fn imports(&self, module: &ModulePath) -> &[Import] {
        self.modules
            .get(module)
            .map(|m| m.imports.as_slice())
            .unwrap_or_default()
    }

    fn location(&self, module: &ModulePath) -> Option<&Path> {
        self.modules
            .get(module)
            .and_then(|m| m.location.as_deref())
    }
}

#[cfg(test)]
mod tests;
