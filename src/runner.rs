use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::cli::{Cli, Command, ConfigCommand};
use crate::config::{self, SkelConfig};
use crate::layout::{self, Layout, Node, Tree, builtin, render};
use crate::materialize::{self, MaterializeOptions};
use crate::util;

const CONFIG_DIR: &str = ".skel";
const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ConfigPathSource {
    Explicit,
    Discovered,
    HomeDefault,
}

impl ConfigPathSource {
    fn as_str(&self) -> &'static str {
        match self {
            ConfigPathSource::Explicit => "explicit",
            ConfigPathSource::Discovered => "discovered",
            ConfigPathSource::HomeDefault => "home-default",
        }
    }
}

#[derive(Clone, Debug)]
struct ResolvedConfigPath {
    path: Utf8PathBuf,
    source: ConfigPathSource,
}

impl ResolvedConfigPath {
    fn dir(&self) -> &Utf8Path {
        self.path.parent().unwrap_or(Utf8Path::new("."))
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::from(&cli);
    ctx.apply_chdir()?;

    match cli.command {
        Command::Config { command } => handle_config_only(&ctx, command),
        other => {
            let state = AppState::new(ctx)?;
            handle_with_state(&state, other)
        }
    }
}

fn handle_with_state(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Admin => create(state, "admin", None),
        Command::Web => create(state, "web", None),
        Command::All => {
            for name in builtin::names() {
                create(state, name, None)?;
            }
            Ok(())
        }
        Command::List => handle_list(state),
        Command::Show { layout, path } => handle_show(state, &layout, path.as_deref()),
        Command::Apply { layout, into } => create(state, &layout, into),
        Command::Config { .. } => unreachable!("config commands handled earlier"),
    }
}

fn create(state: &AppState, name: &str, into: Option<PathBuf>) -> Result<()> {
    let into = into.map(utf8_path).transpose()?;
    let layout = state.resolve_layout(name, into.is_some())?;
    let base = into.unwrap_or_else(|| layout.base.clone());

    info!(layout = %layout.name, base = %base, "materializing layout");
    let options = MaterializeOptions {
        dry_run: state.ctx.dry_run,
    };
    let report = materialize::materialize(&base, &layout.tree, options)?;
    debug!(
        directories = report.directories,
        files = report.files,
        "layout complete"
    );
    Ok(())
}

fn handle_list(state: &AppState) -> Result<()> {
    println!("Built-in layouts:");
    for name in builtin::names() {
        let layout = state.resolve_layout(name, false)?;
        println!("  - {} -> {}", name, layout.base);
    }

    let custom: Vec<_> = state
        .config
        .layout_names()
        .filter(|name| !builtin::contains(name))
        .collect();
    if custom.is_empty() {
        return Ok(());
    }

    println!(
        "Configured in {} ({}):",
        state.config_path.path,
        state.config_path.source.as_str()
    );
    for name in custom {
        let entry = state.config.layout(name);
        let base = entry.and_then(|e| e.base.as_deref()).unwrap_or("<unset>");
        let file = entry.and_then(|e| e.file.as_deref()).unwrap_or("<unset>");
        println!("  - {} -> {} (from {})", name, base, file);
    }
    Ok(())
}

fn handle_show(state: &AppState, name: &str, path: Option<&str>) -> Result<()> {
    let layout = state.resolve_layout(name, true)?;
    let (root, tree) = subtree(&layout, path)?;
    print!("{}", render::outline(root.as_str(), tree));
    let (directories, files) = render::count(tree);
    println!("{} directories, {} files", directories, files);
    Ok(())
}

/// The directory at `path` inside `layout`, with its location under the layout base.
fn subtree<'a>(layout: &'a Layout, path: Option<&str>) -> Result<(Utf8PathBuf, &'a Tree)> {
    let Some(path) = path else {
        return Ok((layout.base.clone(), &layout.tree));
    };
    match layout.tree.lookup(path) {
        Some(Node::Directory(tree)) => Ok((layout.base.join(path.trim_matches('/')), tree)),
        Some(Node::File(_)) => bail!("`{}` in layout `{}` is a file", path, layout.name),
        None => bail!("layout `{}` has no directory `{}`", layout.name, path),
    }
}

fn handle_config_only(ctx: &CliContext, command: Option<ConfigCommand>) -> Result<()> {
    let resolved = ctx.resolve_config_path(&current_dir()?)?;
    match command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Path => {
            println!("{} ({})", resolved.path, resolved.source.as_str());
            Ok(())
        }
        ConfigCommand::Show => {
            let config = load_config(&resolved)?;
            println!(
                "Config: {} ({})",
                resolved.path,
                resolved.source.as_str()
            );
            print!("{}", config::format_summary(&config));
            Ok(())
        }
        ConfigCommand::Check => {
            let config = load_config(&resolved)?;
            config::validate(&config, resolved.dir())?;
            println!("{} is valid", resolved.path);
            Ok(())
        }
        ConfigCommand::Generate { path, force } => {
            let target = match path {
                Some(path) => utf8_path(path)?,
                None => resolved.path,
            };
            config::write_example_config(&target, force)?;
            println!("Wrote example config to {}", target);
            Ok(())
        }
    }
}

/// Explicit config files must exist; discovered or home defaults are optional.
fn load_config(resolved: &ResolvedConfigPath) -> Result<SkelConfig> {
    if resolved.source != ConfigPathSource::Explicit && !resolved.path.exists() {
        debug!(path = %resolved.path, "no config file; using defaults");
        return Ok(SkelConfig::default());
    }
    config::load_from_path(&resolved.path)
}

struct AppState {
    ctx: CliContext,
    config: SkelConfig,
    config_path: ResolvedConfigPath,
}

impl AppState {
    fn new(ctx: CliContext) -> Result<Self> {
        let config_path = ctx.resolve_config_path(&current_dir()?)?;
        let config = load_config(&config_path)?;
        debug!(
            path = %config_path.path,
            source = config_path.source.as_str(),
            "configuration resolved"
        );
        Ok(Self {
            ctx,
            config,
            config_path,
        })
    }

    /// Resolve a configured name, then a built-in name, then a layout file on disk.
    /// A bare file has no default base, so it is only accepted when `has_target` is set.
    fn resolve_layout(&self, name: &str, has_target: bool) -> Result<Layout> {
        if let Some(entry) = self.config.layout(name) {
            let mut layout = match &entry.file {
                Some(file) => {
                    let path = util::fs::resolve_from(self.config_path.dir(), Utf8Path::new(file));
                    let tree = layout::load_file(&path)?;
                    let base = match (&entry.base, builtin::contains(name)) {
                        (Some(base), _) => Utf8PathBuf::from(base),
                        (None, true) => builtin::load(name)?.base,
                        (None, false) => bail!(
                            "layout `{}` in {} has no `base`",
                            name,
                            self.config_path.path
                        ),
                    };
                    Layout {
                        name: name.to_owned(),
                        base,
                        tree,
                    }
                }
                None if builtin::contains(name) => builtin::load(name)?,
                None => bail!(
                    "layout `{}` in {} has no `file` and is not built in",
                    name,
                    self.config_path.path
                ),
            };
            if let Some(base) = &entry.base {
                layout.base = Utf8PathBuf::from(base);
            }
            return Ok(layout);
        }

        if builtin::contains(name) {
            return builtin::load(name);
        }

        let path = Utf8Path::new(name);
        if path.is_file() {
            if !has_target {
                bail!("layout file {} has no default location; pass --into <dir>", path);
            }
            let tree = layout::load_file(path)?;
            return Ok(Layout {
                name: path.file_stem().unwrap_or(name).to_owned(),
                base: Utf8PathBuf::from("."),
                tree,
            });
        }

        let mut known: Vec<&str> = builtin::names().collect();
        known.extend(self.config.layout_names().filter(|n| !builtin::contains(n)));
        bail!(
            "unknown layout `{}` (known: {}); pass a layout file path to use a custom one",
            name,
            known.join(", ")
        )
    }
}

#[derive(Clone, Debug)]
struct CliContext {
    chdir: Option<PathBuf>,
    file: Option<PathBuf>,
    dry_run: bool,
}

impl From<&Cli> for CliContext {
    fn from(cli: &Cli) -> Self {
        Self {
            chdir: cli.chdir.clone(),
            file: cli.file.clone(),
            dry_run: cli.dry_run,
        }
    }
}

impl CliContext {
    fn apply_chdir(&self) -> Result<()> {
        if let Some(dir) = &self.chdir {
            std::env::set_current_dir(dir)
                .with_context(|| format!("changing directory to {}", dir.display()))?;
        }
        Ok(())
    }

    /// Explicit `--file` wins, then the nearest `.skel/config.toml` above `start`,
    /// then `~/.skel/config.toml`.
    fn resolve_config_path(&self, start: &Utf8Path) -> Result<ResolvedConfigPath> {
        if let Some(file) = &self.file {
            let path = util::fs::resolve_from(start, &utf8_path(file.clone())?);
            return Ok(ResolvedConfigPath {
                path,
                source: ConfigPathSource::Explicit,
            });
        }

        let mut current = Some(start);
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if candidate.is_file() {
                return Ok(ResolvedConfigPath {
                    path: candidate,
                    source: ConfigPathSource::Discovered,
                });
            }
            current = dir.parent();
        }

        let home = match dirs::home_dir() {
            Some(home) => utf8_path(home)?,
            None => start.to_owned(),
        };
        Ok(ResolvedConfigPath {
            path: home.join(CONFIG_DIR).join(CONFIG_FILE),
            source: ConfigPathSource::HomeDefault,
        })
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("determining current directory")?;
    utf8_path(cwd)
}

fn utf8_path(path: PathBuf) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path)
        .map_err(|path| anyhow!("path {} is not valid UTF-8", path.display()))
}
