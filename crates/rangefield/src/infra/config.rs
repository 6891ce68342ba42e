//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG: &str = include_str!("../../assets/default-config.toml");
const DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".rangefield/config.toml";

/// Layered configuration loaded from defaults, user, workspace, explicit file, and env.
///
/// Every setting is optional in each layer so a higher layer can restore a value a lower one
/// changed; accessors fall back to the built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub picker: Picker,
    #[serde(default)]
    pub keybindings: Keybindings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Defaults {
    /// Form catalog opened when none is given on the command line.
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    log_level: Option<String>,
}

impl Defaults {
    fn default_log_level() -> &'static str {
        "warn"
    }

    pub fn log_level(&self) -> &str {
        self.log_level
            .as_deref()
            .unwrap_or(Self::default_log_level())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Picker {
    #[serde(default)]
    visible_rows: Option<u16>,
    #[serde(default)]
    wrap: Option<bool>,
}

impl Picker {
    fn default_visible_rows() -> u16 {
        7
    }

    /// Rows drawn per wheel.
    pub fn visible_rows(&self) -> u16 {
        self.visible_rows.unwrap_or(Self::default_visible_rows())
    }

    pub fn wrap(&self) -> bool {
        self.wrap.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Keybindings {
    #[serde(default)]
    up: Option<String>,
    #[serde(default)]
    down: Option<String>,
    #[serde(default)]
    left: Option<String>,
    #[serde(default)]
    right: Option<String>,
    #[serde(default)]
    confirm: Option<String>,
    #[serde(default)]
    reset: Option<String>,
}

impl Keybindings {
    pub fn up(&self) -> &str {
        self.up.as_deref().unwrap_or("k")
    }

    pub fn down(&self) -> &str {
        self.down.as_deref().unwrap_or("j")
    }

    pub fn left(&self) -> &str {
        self.left.as_deref().unwrap_or("h")
    }

    pub fn right(&self) -> &str {
        self.right.as_deref().unwrap_or("l")
    }

    pub fn confirm(&self) -> &str {
        self.confirm.as_deref().unwrap_or("enter")
    }

    pub fn reset(&self) -> &str {
        self.reset.as_deref().unwrap_or("r")
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    form: Option<String>,
    log_level: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            form: env::var("RANGEFIELD_FORM").ok(),
            log_level: env::var("RANGEFIELD_LOG").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(form: &str, log_level: &str) -> Self {
        Self {
            form: Some(form.to_owned()),
            log_level: Some(log_level.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env
    /// overrides, with `explicit` layered above the workspace config.
    pub fn load_with_explicit(explicit: Option<&Path>) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        if let Some(path) = explicit
            && !path.exists()
        {
            anyhow::bail!("config file not found: {}", path.display());
        }
        Self::load_with_layers(global, workspace, explicit.map(Path::to_path_buf), env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        explicit: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(DEFAULT_CONFIG)?);

        for path in [global, workspace, explicit].into_iter().flatten() {
            if path.exists() {
                layers.push(Self::from_file(&path)?);
            }
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            picker: merge_picker(self.picker, other.picker),
            keybindings: merge_keybindings(self.keybindings, other.keybindings),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        form: overlay.form.or(base.form),
        log_level: overlay.log_level.or(base.log_level),
    }
}

fn merge_picker(base: Picker, overlay: Picker) -> Picker {
    Picker {
        visible_rows: overlay.visible_rows.or(base.visible_rows),
        wrap: overlay.wrap.or(base.wrap),
    }
}

fn merge_keybindings(base: Keybindings, overlay: Keybindings) -> Keybindings {
    Keybindings {
        up: overlay.up.or(base.up),
        down: overlay.down.or(base.down),
        left: overlay.left.or(base.left),
        right: overlay.right.or(base.right),
        confirm: overlay.confirm.or(base.confirm),
        reset: overlay.reset.or(base.reset),
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("rangefield/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(form) = env.form {
        config.defaults.form = Some(form);
    }
    if let Some(log_level) = env.log_level {
        config.defaults.log_level = Some(log_level);
    }
    config
}
