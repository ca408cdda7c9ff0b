//! Module paths and qualified type names.

use std::fmt;

/// Import path of a module (package), e.g. `example.com/app/model`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `/`-separated segment of the path.
    ///
    /// Used as the package name when nothing better is known.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Package name an import of this path conventionally binds when the
    /// module's own package clause is not known.
    ///
    /// The last segment, or the one before it when the last is a major
    /// version (`example.com/lib/v2`). A `go-` prefix is dropped and the
    /// name ends at the first character that cannot start an identifier
    /// part (`gopkg.in/yaml.v3` is `yaml`).
    pub fn assumed_name(&self) -> &str {
        let mut segments = self.0.rsplit('/');
        let last = segments.next().unwrap_or_default();
        let base = match segments.next() {
            Some(parent) if is_major_version(last) => parent,
            _ => last,
        };
        let base = base.strip_prefix("go-").unwrap_or(base);
        let end = base
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(base.len());
        &base[..end]
    }

    /// Whether the path looks like a standard-library path.
    ///
    /// Standard-library paths have no `.` in their first segment
    /// (`bytes`, `encoding/json`), while third-party and user modules are
    /// rooted at a host name (`example.com/app`).
    pub fn is_std_like(&self) -> bool {
        let first = self.0.split('/').next().unwrap_or_default();
        !first.is_empty() && !first.contains('.')
    }
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModulePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// Qualified identity of a named type: defining module plus local name.
///
/// Named types are the unit of memoization during synthesis.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    pub module: ModulePath,
    pub name: String,
}

impl TypeName {
    pub fn new(module: impl Into<ModulePath>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}
