//! Type Catalog backed by declaration sources.
//!
//! Modules are registered one file at a time, either from inline text or
//! by reading a directory. All files of a module must agree on the package
//! name, and a type name may be declared only once per module.
//!
//! Package qualifiers a file could not bind on its own are matched against
//! the package names imported modules declare when a definition is looked
//! up, so modules may be registered in any order.

use std::fs;
use std::path::{Path, PathBuf};

use eqgen_ir::catalog::{follow_definitions, is_under_root};
use eqgen_ir::{
    Catalog, CatalogError, Field, Import, ImportName, ModulePath, StructuralKind, TypeName,
    TypeRef,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::{DeclError, LoadError};
use crate::parse::{parse_file, pending_qualifier, PendingQualifier};

/// First line of the files this tool writes.
const OWN_HEADER: &str = "// Code generated by eqgen for type: ";

#[derive(Debug, Default)]
struct SourceModule {
    name: Option<String>,
    types: FxHashMap<String, Declared>,
    imports: Vec<Import>,
    /// Files that left package qualifiers pending.
    scopes: Vec<FileScope>,
    location: Option<PathBuf>,
}

#[derive(Debug)]
struct Declared {
    definition: TypeRef,
    /// Index into `scopes` when the definition may name pending modules.
    scope: Option<usize>,
}

#[derive(Debug)]
struct FileScope {
    file: String,
    imports: Vec<Import>,
    pending: Vec<PendingQualifier>,
}

/// Catalog of modules parsed from declaration sources.
#[derive(Debug, Default)]
pub struct SourceCatalog {
    modules: FxHashMap<ModulePath, SourceModule>,
    foreign_roots: Vec<ModulePath>,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` as file `file_name` of `module` and register its
    /// declarations.
    pub fn add_source(
        &mut self,
        module: &str,
        file_name: &str,
        text: &str,
    ) -> Result<&mut Self, LoadError> {
        let path = ModulePath::new(module);
        let parsed = parse_file(&path, file_name, text)?;
        debug!(
            module,
            file = file_name,
            types = parsed.types.len(),
            "registered declaration source"
        );

        let entry = self.modules.entry(path.clone()).or_default();
        match &entry.name {
            Some(first) if *first != parsed.package => {
                return Err(LoadError::PackageMismatch {
                    module: path,
                    first: first.clone(),
                    second: parsed.package,
                });
            }
            Some(_) => {}
            None => entry.name = Some(parsed.package),
        }

        let scope = if parsed.pending.is_empty() {
            None
        } else {
            entry.scopes.push(FileScope {
                file: file_name.to_owned(),
                imports: parsed.imports.clone(),
                pending: parsed.pending,
            });
            Some(entry.scopes.len() - 1)
        };

        for decl in parsed.types {
            if entry.types.contains_key(&decl.name) {
                return Err(LoadError::Duplicate {
                    name: decl.name,
                    module: path,
                });
            }
            entry.types.insert(
                decl.name,
                Declared {
                    definition: decl.definition,
                    scope,
                },
            );
        }
        for import in parsed.imports {
            if !entry.imports.contains(&import) {
                entry.imports.push(import);
            }
        }
        Ok(self)
    }

    /// Register every declaration source in `dir` as part of `module`.
    ///
    /// Test files and files this tool generated are skipped. Files are read in name
    /// order so errors are reported deterministically. `dir` also becomes
    /// the module's output location.
    pub fn load_dir(&mut self, module: &str, dir: &Path) -> Result<&mut Self, LoadError> {
        let io_error = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if is_declaration_source(&path) {
                files.push(path);
            }
        }
        files.sort();

        let mut loaded = 0usize;
        for path in files {
            let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            if is_own_output(&text) {
                trace!(file = %path.display(), "skipping generated file");
                continue;
            }
            let file_name = path.file_name().map_or_else(
                || path.display().to_string(),
                |name| name.to_string_lossy().into_owned(),
            );
            self.add_source(module, &file_name, &text)?;
            loaded += 1;
        }

        if loaded == 0 {
            return Err(LoadError::NoSources {
                module: ModulePath::new(module),
                dir: dir.to_path_buf(),
            });
        }
        self.set_location(module, dir);
        Ok(self)
    }

    pub fn set_location(&mut self, module: &str, dir: impl Into<PathBuf>) -> &mut Self {
        self.modules
            .entry(ModulePath::new(module))
            .or_default()
            .location = Some(dir.into());
        self
    }

    /// Treat every module at or below `root` as foreign.
    pub fn foreign_root(&mut self, root: &str) -> &mut Self {
        self.foreign_roots.push(ModulePath::new(root));
        self
    }

    /// Names of the types declared in `module`, sorted.
    pub fn type_names(&self, module: &ModulePath) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .modules
            .get(module)
            .map(|m| m.types.keys().map(String::as_str).collect())
            .unwrap_or_default();
        names.sort_unstable();
        names
    }

    /// Check that every pending package qualifier matches an import whose
    /// module declares that package name. Call once every module is
    /// registered; the error names where the qualifier is first used.
    pub fn bind_packages(&self) -> Result<(), LoadError> {
        let mut modules: Vec<(&ModulePath, &SourceModule)> = self.modules.iter().collect();
        modules.sort_unstable_by_key(|(path, _)| *path);
        for (path, module) in modules {
            for scope in &module.scopes {
                for pending in &scope.pending {
                    let Some(target) = self.bound_module(scope, &pending.qualifier) else {
                        return Err(DeclError::new(
                            &scope.file,
                            pending.line,
                            pending.column,
                            format!("no import declares package `{}`", pending.qualifier),
                        )
                        .into());
                    };
                    debug!(
                        module = %path,
                        qualifier = pending.qualifier.as_str(),
                        target = %target,
                        "bound package qualifier"
                    );
                }
            }
        }
        Ok(())
    }

    /// The default import of `scope` whose module declares package
    /// `qualifier`.
    fn bound_module(&self, scope: &FileScope, qualifier: &str) -> Option<ModulePath> {
        scope
            .imports
            .iter()
            .filter(|import| import.name == ImportName::Default)
            .find(|import| {
                self.modules
                    .get(&import.path)
                    .and_then(|m| m.name.as_deref())
                    == Some(qualifier)
            })
            .map(|import| import.path.clone())
    }

    fn definition(&self, name: &TypeName) -> Result<TypeRef, CatalogError> {
        let Some(module) = self.modules.get(&name.module) else {
            if self.is_foreign(name) {
                return Ok(TypeRef::opaque());
            }
            return Err(CatalogError::UnknownModule {
                module: name.module.clone(),
            });
        };
        let declared = module
            .types
            .get(&name.name)
            .ok_or_else(|| CatalogError::NotFound {
                name: name.name.clone(),
                module: name.module.clone(),
            })?;
        let Some(scope) = declared.scope.and_then(|index| module.scopes.get(index)) else {
            return Ok(declared.definition.clone());
        };
        rebind(&declared.definition, &mut |qualifier: &str| {
            self.bound_module(scope, qualifier)
                .ok_or_else(|| CatalogError::UnboundPackage {
                    package: qualifier.to_owned(),
                    module: name.module.clone(),
                })
        })
    }
}

impl Catalog for SourceCatalog {
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
        self.modules.get(module).and_then(|m| m.name.clone())
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

fn is_declaration_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    path.is_file()
        && path.extension().is_some_and(|ext| ext == "go")
        && !name.ends_with("_test.go")
}

/// Whether a file is output of this tool: its header comes before the
/// package clause. Files of other generators declare types like any
/// other source.
fn is_own_output(text: &str) -> bool {
    text.lines()
        .take_while(|line| !line.starts_with("package "))
        .any(|line| line.starts_with(OWN_HEADER) && line.ends_with("DO NOT EDIT"))
}

/// Copy of `ty` with every type of a pending module moved to the module
/// `bind` finds for its qualifier.
fn rebind<E>(
    ty: &TypeRef,
    bind: &mut impl FnMut(&str) -> Result<ModulePath, E>,
) -> Result<TypeRef, E> {
    let kind = match ty {
        TypeRef::Named(name) => {
            return Ok(match pending_qualifier(&name.module) {
                Some(qualifier) => TypeRef::Named(TypeName::new(bind(qualifier)?, name.name.as_str())),
                None => ty.clone(),
            });
        }
        TypeRef::Structural(kind) => kind.as_ref(),
    };
    let kind = match kind {
        StructuralKind::Record { fields } => {
            let mut rebound = Vec::with_capacity(fields.len());
            for field in fields {
                rebound.push(Field::new(field.name.as_str(), rebind(&field.ty, bind)?));
            }
            StructuralKind::Record { fields: rebound }
        }
        StructuralKind::Sequence { element } => StructuralKind::Sequence {
            element: rebind(element, bind)?,
        },
        StructuralKind::FixedArray { length, element } => StructuralKind::FixedArray {
            length: *length,
            element: rebind(element, bind)?,
        },
        StructuralKind::Map { key, value } => StructuralKind::Map {
            key: rebind(key, bind)?,
            value: rebind(value, bind)?,
        },
        StructuralKind::Indirection { referent } => StructuralKind::Indirection {
            referent: rebind(referent, bind)?,
        },
        StructuralKind::Primitive(_) | StructuralKind::Dynamic | StructuralKind::Opaque => {
            return Ok(ty.clone());
        }
    };
    Ok(TypeRef::structural(kind))
}
