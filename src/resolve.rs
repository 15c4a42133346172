//! Mapping of coverage profile file identifiers onto the filesystem.
//!
//! Profiles name files by import path (`example.com/mod/pkg/file.go`), not
//! by location on disk. An identifier is used as-is when it already names
//! an existing file; otherwise the module path declared in `go.mod` at the
//! analysis root is stripped and the remainder joined onto the root.

use std::path::{Path, PathBuf};

use crate::error::Result;

pub const MANIFEST_FILE: &str = "go.mod";

/// Extract the module path from the contents of a `go.mod` file.
pub fn module_path(manifest: &str) -> Option<String> {
    manifest.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with([' ', '\t', '"']) {
            return None;
        }
        let rest = match rest.find("//") {
            Some(i) => &rest[..i],
            None => rest,
        };
        let module = rest.trim().trim_matches(|c| c == '"' || c == '`');
        (!module.is_empty()).then(|| module.to_string())
    })
}

/// Resolves profile file identifiers against one analysis root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    module: Option<String>,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>, module: Option<String>) -> Self {
        Self {
            root: root.into(),
            module,
        }
    }

    /// Build a resolver for `root`, reading the module path from its
    /// manifest. A missing manifest is not an error: only identifiers that
    /// are literal paths will then resolve.
    pub fn from_root(root: &Path) -> Result<Self> {
        let manifest = root.join(MANIFEST_FILE);
        let module = match std::fs::read_to_string(&manifest) {
            Ok(content) => module_path(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        if module.is_none() {
            tracing::debug!("No module path found in {}", manifest.display());
        }
        Ok(Self::new(root, module))
    }

    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// Map a profile file identifier to an existing file on disk.
    pub fn resolve(&self, file_id: &str) -> Option<PathBuf> {
        let literal = Path::new(file_id);
        if literal.is_file() {
            return Some(literal.to_path_buf());
        }

        let module = self.module.as_deref()?;
        let relative = file_id
            .strip_prefix(module)
            .and_then(|rest| rest.strip_prefix('/'))?;
        let candidate = self.root.join(relative);
        candidate.is_file().then_some(candidate)
    }
}
