//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::filter::parse_extension_list;
use crate::domain::model::FilterSpec;

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".codebind/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub output: Output,
}

/// Extension filtering applied when expanding selected directories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Filter {
    /// Comma-separated extensions; empty means every extension is accepted.
    #[serde(default)]
    include_extensions: Option<String>,
    #[serde(default)]
    exclude_extensions: Option<String>,
}

impl Filter {
    pub fn include_extensions(&self) -> Vec<String> {
        parse_extension_list(self.include_extensions.as_deref().unwrap_or_default())
    }

    pub fn exclude_extensions(&self) -> Vec<String> {
        parse_extension_list(self.exclude_extensions.as_deref().unwrap_or_default())
    }

    pub fn set_include_extensions(&mut self, raw: impl Into<String>) {
        self.include_extensions = Some(raw.into());
    }

    pub fn set_exclude_extensions(&mut self, raw: impl Into<String>) {
        self.exclude_extensions = Some(raw.into());
    }

    pub fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            include: self.include_extensions(),
            exclude: self.exclude_extensions(),
        }
    }
}

/// Shape of the assembled artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Output {
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    prepend_text: Option<String>,
    #[serde(default)]
    append_text: Option<String>,
    #[serde(default)]
    print_full_path: Option<bool>,
    #[serde(default)]
    print_folder_structure: Option<bool>,
}

impl Output {
    fn default_file_name() -> &'static str {
        "output.txt"
    }

    pub fn file_name(&self) -> String {
        self.file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| Self::default_file_name().to_owned())
    }

    pub fn prepend_text(&self) -> String {
        self.prepend_text.clone().unwrap_or_default()
    }

    pub fn append_text(&self) -> String {
        self.append_text.clone().unwrap_or_default()
    }

    pub fn print_full_path(&self) -> bool {
        self.print_full_path.unwrap_or(false)
    }

    pub fn print_folder_structure(&self) -> bool {
        self.print_folder_structure.unwrap_or(false)
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.file_name = Some(name.into());
    }

    pub fn set_prepend_text(&mut self, text: impl Into<String>) {
        self.prepend_text = Some(text.into());
    }

    pub fn set_append_text(&mut self, text: impl Into<String>) {
        self.append_text = Some(text.into());
    }

    pub fn set_print_full_path(&mut self, value: bool) {
        self.print_full_path = Some(value);
    }

    pub fn set_print_folder_structure(&mut self, value: bool) {
        self.print_folder_structure = Some(value);
    }

    /// Output path resolved against the workspace root. Absolute names are kept as is.
    pub fn resolve_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(self.file_name())
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    include_extensions: Option<String>,
    exclude_extensions: Option<String>,
    output_file: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            include_extensions: env::var("CODEBIND_INCLUDE_EXTENSIONS").ok(),
            exclude_extensions: env::var("CODEBIND_EXCLUDE_EXTENSIONS").ok(),
            output_file: env::var("CODEBIND_OUTPUT_FILE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(include: &str, output_file: &str) -> Self {
        Self {
            include_extensions: Some(include.to_owned()),
            exclude_extensions: None,
            output_file: Some(output_file.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration for `workspace_root` from defaults, the user config directory, the
    /// workspace config, and env overrides.
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = Some(workspace_root.join(DEFAULT_WORKSPACE_CONFIG_PATH));
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            filter: merge_filter(self.filter, other.filter),
            output: merge_output(self.output, other.output),
        }
    }
}

fn merge_filter(base: Filter, overlay: Filter) -> Filter {
    Filter {
        include_extensions: overlay.include_extensions.or(base.include_extensions),
        exclude_extensions: overlay.exclude_extensions.or(base.exclude_extensions),
    }
}

fn merge_output(base: Output, overlay: Output) -> Output {
    Output {
        file_name: overlay.file_name.or(base.file_name),
        prepend_text: overlay.prepend_text.or(base.prepend_text),
        append_text: overlay.append_text.or(base.append_text),
        print_full_path: overlay.print_full_path.or(base.print_full_path),
        print_folder_structure: overlay
            .print_folder_structure
            .or(base.print_folder_structure),
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("codebind/config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(include) = env.include_extensions {
        config.filter.include_extensions = Some(include);
    }
    if let Some(exclude) = env.exclude_extensions {
        config.filter.exclude_extensions = Some(exclude);
    }
    if let Some(output_file) = env.output_file {
        config.output.file_name = Some(output_file);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config = Config::load_with_layers(None, None, EnvOverrides::default())
            .expect("load default config");
        assert_eq!(config.output.file_name(), "output.txt");
        assert!(config.filter.include_extensions().is_empty());
        assert!(config.filter.exclude_extensions().is_empty());
        assert!(!config.output.print_full_path());
        assert!(!config.output.print_folder_structure());
        assert_eq!(config.output.prepend_text(), "");
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[filter]
include_extensions = ".rs, .toml"
[output]
prepend_text = "Review this code:"
print_full_path = true
"#,
        )?;

        let workspace_dir = temp.path().join("repo");
        fs::create_dir_all(workspace_dir.join(".codebind"))?;
        fs::write(
            workspace_dir.join(DEFAULT_WORKSPACE_CONFIG_PATH),
            r#"
[filter]
exclude_extensions = "lock"
[output]
file_name = "bundle.txt"
print_full_path = false
"#,
        )?;

        let config = Config::load_with_layers(
            Some(global),
            Some(workspace_dir.join(DEFAULT_WORKSPACE_CONFIG_PATH)),
            EnvOverrides::default(),
        )?;

        assert_eq!(
            config.filter.include_extensions(),
            vec![".rs".to_string(), ".toml".to_string()]
        );
        assert_eq!(config.filter.exclude_extensions(), vec![".lock".to_string()]);
        assert_eq!(config.output.file_name(), "bundle.txt");
        assert_eq!(config.output.prepend_text(), "Review this code:");
        assert!(!config.output.print_full_path());
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests(".py", "context.txt");
        let config = Config::load_with_layers(None, None, overrides)?;
        assert_eq!(config.filter.include_extensions(), vec![".py".to_string()]);
        assert_eq!(config.output.file_name(), "context.txt");
        Ok(())
    }

    #[test]
    fn output_path_is_relative_to_workspace() {
        let mut output = Output::default();
        assert_eq!(
            output.resolve_path(Path::new("/work")),
            PathBuf::from("/work/output.txt")
        );
        output.set_file_name("/tmp/elsewhere.txt");
        assert_eq!(
            output.resolve_path(Path::new("/work")),
            PathBuf::from("/tmp/elsewhere.txt")
        );
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }
}
