use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result, bail};
use camino::Utf8Path;
use serde::Deserialize;

use crate::layout::builtin;
use crate::templates;
use crate::util;

/// Root configuration document, usually `.skel/config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkelConfig {
    pub layouts: Option<BTreeMap<String, LayoutEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutEntry {
    /// Where the layout is created, relative to the working directory.
    pub base: Option<String>,
    /// Layout document, relative to the config file's directory.
    pub file: Option<String>,
}

impl SkelConfig {
    pub fn layout(&self, name: &str) -> Option<&LayoutEntry> {
        self.layouts.as_ref().and_then(|layouts| layouts.get(name))
    }

    pub fn layout_names(&self) -> impl Iterator<Item = &str> {
        self.layouts
            .iter()
            .flat_map(|layouts| layouts.keys().map(String::as_str))
    }
}

/// Load a configuration file from disk and deserialize it.
pub fn load_from_path(path: &Utf8Path) -> Result<SkelConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path))
}

pub fn write_example_config(path: &Utf8Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("{} already exists; rerun with --force to overwrite", path);
    }

    templates::write_template(path, "config/example.config.toml")
}

/// Check that every configured layout can be resolved. `config_dir` anchors relative `file` paths.
pub fn validate(config: &SkelConfig, config_dir: &Utf8Path) -> Result<()> {
    let Some(layouts) = &config.layouts else {
        return Ok(());
    };

    let mut problems = Vec::new();
    for (name, entry) in layouts {
        match (&entry.file, builtin::contains(name)) {
            (Some(file), _) => {
                let path = util::fs::resolve_from(config_dir, Utf8Path::new(file));
                if !path.is_file() {
                    problems.push(format!("layout `{name}`: file {path} does not exist"));
                }
                if entry.base.is_none() && !builtin::contains(name) {
                    problems.push(format!("layout `{name}`: missing `base`"));
                }
            }
            (None, true) => {}
            (None, false) => {
                problems.push(format!("layout `{name}`: not built in and has no `file`"));
            }
        }
        if entry.base.as_deref().is_some_and(str::is_empty) {
            problems.push(format!("layout `{name}`: `base` must not be empty"));
        }
    }

    if !problems.is_empty() {
        bail!("invalid config:\n  {}", problems.join("\n  "));
    }
    Ok(())
}

pub fn format_summary(config: &SkelConfig) -> String {
    let mut out = String::new();
    let layout_count = config.layouts.as_ref().map(|l| l.len()).unwrap_or(0);
    let _ = writeln!(out, "Layouts configured: {}", layout_count);

    if let Some(layouts) = &config.layouts {
        for (name, entry) in layouts {
            let base = entry.base.as_deref().unwrap_or("<default>");
            let source = entry.file.as_deref().unwrap_or("built-in");
            let _ = writeln!(out, "  - {} (base: {}; source: {})", name, base, source);
        }
    }

    out
}
