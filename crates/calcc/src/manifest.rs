//! The optional `calc.toml` project manifest.
//!
//! ```toml
//! [package]
//! name = "demo"
//!
//! [build]
//! optimize = true
//! emit-on-error = false
//! ```

use std::path::Path;

use serde::Deserialize;

pub const MANIFEST_NAME: &str = "calc.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub package: Option<Package>,
    #[serde(default)]
    pub build: Build,
}

/// `[package]`: overrides the package name derived from the directory.
#[derive(Debug, Deserialize)]
pub struct Package {
    pub name: String,
}

/// `[build]`: defaults for options that CLI flags can switch on.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Build {
    #[serde(default)]
    pub optimize: bool,
    #[serde(default)]
    pub emit_on_error: bool,
}

impl Manifest {
    /// Read and parse a calc.toml manifest from a file path.
    pub fn from_file(path: &Path) -> Result<Manifest, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_str(&content)
    }

    /// Parse a calc.toml manifest from a string.
    pub fn from_str(content: &str) -> Result<Manifest, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse manifest: {}", e))
    }

    /// Load `dir/calc.toml` if it exists.
    pub fn find(dir: &Path) -> Result<Option<Manifest>, String> {
        let path = dir.join(MANIFEST_NAME);
        if !path.is_file() {
            return Ok(None);
        }
        Self::from_file(&path).map(Some)
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.name.as_str())
    }
}
