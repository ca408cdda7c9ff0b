//! Reference/Import Tracker.
//!
//! While a unit is being synthesized, every symbol it uses from another
//! module (the generic-equality fallback, the byte-sequence equality, or a
//! routine generated for a type of another module) is recorded against that
//! unit together with the name the unit's home module knows the other module
//! by. Emission turns the record into the file's import block.

use std::collections::BTreeMap;

use smallvec::SmallVec;

use eqgen_ir::{Catalog, ImportName, ModulePath};

use crate::GenError;

/// How generated code in one module names symbols of another.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Qualifier {
    /// Same module: symbols are used unqualified and nothing is imported.
    Local,
    /// Dot import: symbols are used unqualified, the module is imported.
    Dot,
    /// Symbols are written `name.Symbol`.
    Package {
        name: String,
        /// The import must spell out `name` because it is an alias (or the
        /// package's declared name is unknown).
        explicit: bool,
    },
}

impl Qualifier {
    /// Qualified spelling of `symbol`.
    pub fn qualify(&self, symbol: &str) -> String {
        match self {
            Self::Local | Self::Dot => symbol.to_owned(),
            Self::Package { name, .. } => format!("{name}.{symbol}"),
        }
    }
}

/// External modules referenced by one unit, sorted by path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct References {
    modules: BTreeMap<ModulePath, Qualifier>,
}

impl References {
    /// Record a reference. Local references are not imports and are ignored.
    pub fn record(&mut self, module: ModulePath, qualifier: Qualifier) {
        if qualifier != Qualifier::Local {
            self.modules.insert(module, qualifier);
        }
    }

    /// Qualifier for symbols of `module`; [`Qualifier::Local`] when the unit
    /// never referenced it.
    pub fn qualifier(&self, module: &ModulePath) -> &Qualifier {
        self.modules.get(module).unwrap_or(&Qualifier::Local)
    }

    pub fn contains(&self, module: &ModulePath) -> bool {
        self.modules.contains_key(module)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ModulePath, &Qualifier)> {
        self.modules.iter()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Work out how code living in `home` names symbols of `target`.
///
/// Uses the name under which `home` already imports `target`. If `home`
/// imports it under two different names the choice is ambiguous and
/// generation fails. If `home` does not import it at all, the target's
/// declared package name is used (or its last path segment when the catalog
/// does not know the module).
pub fn resolve_qualifier(
    catalog: &dyn Catalog,
    home: &ModulePath,
    target: &ModulePath,
) -> Result<Qualifier, GenError> {
    if home == target {
        return Ok(Qualifier::Local);
    }

    let declared = catalog.module_name(target);
    let package_name = || {
        declared
            .clone()
            .unwrap_or_else(|| target.last_segment().to_owned())
    };

    let candidates: SmallVec<[Qualifier; 2]> = catalog
        .imports(home)
        .iter()
        .filter(|import| &import.path == target)
        .filter_map(|import| match &import.name {
            ImportName::Default => Some(Qualifier::Package {
                name: package_name(),
                explicit: declared.is_none(),
            }),
            ImportName::Alias(alias) => Some(Qualifier::Package {
                explicit: declared.as_deref() != Some(alias.as_str()),
                name: alias.clone(),
            }),
            ImportName::Dot => Some(Qualifier::Dot),
            ImportName::Blank => None,
        })
        .collect();

    let mut chosen: Option<Qualifier> = None;
    for candidate in candidates {
        match &chosen {
            None => chosen = Some(candidate),
            Some(first) if local_name(first) != local_name(&candidate) => {
                return Err(GenError::AmbiguousImport {
                    home: home.clone(),
                    module: target.clone(),
                    first: local_name(first).to_owned(),
                    second: local_name(&candidate).to_owned(),
                });
            }
            Some(_) => {}
        }
    }

    let qualifier = chosen.unwrap_or_else(|| Qualifier::Package {
        name: package_name(),
        explicit: declared.is_none(),
    });
    tracing::trace!(%home, %target, ?qualifier, "resolved module qualifier");
    Ok(qualifier)
}

/// The local name a qualifier binds in the importing file.
fn local_name(qualifier: &Qualifier) -> &str {
    match qualifier {
        Qualifier::Local => "",
        Qualifier::Dot => ".",
        Qualifier::Package { name, .. } => name,
    }
}
