//! Test fixtures for unit manifests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::manifest::MANIFEST_NAME;

/// A temporary directory holding a `Unit.toml` and any input files.
pub struct UnitFixture {
    dir: TempDir,
}

impl UnitFixture {
    /// Create a fixture with the given manifest content.
    pub fn new(manifest: &str) -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_NAME), manifest).unwrap();
        UnitFixture { dir }
    }

    /// Add a file relative to the fixture root.
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        let path = self.dir.path().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.path().join(MANIFEST_NAME)
    }
}

/// A unit with one property of every kind, all valid once `src/main.c`
/// and the `include` directory exist.
pub fn full_unit_manifest() -> &'static str {
    r#"[unit]
name = "compile"

[properties.sources]
kind = "list"
value = ["src/main.c"]

[properties.entryPoint]
kind = "file"
value = "src/main.c"

[properties.includeDir]
kind = "directory"
value = "include"

[properties.label]
kind = "pattern"
pattern = "^[a-z][a-z0-9_]*$"
value = "compile_main"

[properties.description]
kind = "string"
optional = true
"#
}
