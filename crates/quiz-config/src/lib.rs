//! Configuration primitives and loader for the quiz-extract toolkit.
//!
//! The loader resolves `.quiz-extract.toml` files using the precedence stack
//! override flag → working directory → git root → built-in defaults.
//! Parsed settings are normalised into typed structures so downstream crates
//! never touch raw TOML.

use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".quiz-extract.toml";

/// Complete configuration resolved from defaults and on-disk overrides.
#[derive(Clone, Debug)]
pub struct Config {
    pub document: DocumentSettings,
    pub classify: ClassifySettings,
    pub selection: SelectionSettings,
    pub strip: StripSettings,
    pub export: ExportSettings,
    pub sources: ConfigSources,
}

/// Markers that structure a question document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentSettings {
    pub separator: String,
    pub quote_marker: char,
    pub heading_marker: String,
    pub split_strategy: SplitSetting,
}

/// Words that identify a true/false option pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifySettings {
    pub correct_marker: String,
    pub incorrect_marker: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionSettings {
    pub policy: PolicySetting,
}

/// Labels that start answer and analysis segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StripSettings {
    pub answer_labels: Vec<String>,
    pub analysis_labels: Vec<String>,
    pub malformed_answer_prefixes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSettings {
    pub view: ViewSetting,
    pub autosave: bool,
}

macro_rules! setting_enum {
    ($(#[$meta:meta])* $name:ident, $key:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($label => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} '{}' (expected one of: {})",
                        $key,
                        other,
                        [$($label),+].join(", ")
                    )),
                }
            }
        }
    };
}

setting_enum!(
    /// Block splitting strategy.
    SplitSetting, "split strategy", {
        Auto => "auto",
        Separator => "separator",
        Heading => "heading",
    }
);

setting_enum!(
    /// Selection policy for option toggles.
    PolicySetting, "selection policy", {
        Single => "single",
        Multi => "multi",
    }
);

setting_enum!(
    /// Which view of each block an export writes.
    ViewSetting, "export view", {
        Quoted => "quoted",
        Unquoted => "unquoted",
        Raw => "raw",
    }
);

/// Provenance information for resolved configuration.
#[derive(Clone, Debug)]
pub struct ConfigSources {
    pub working_directory: PathBuf,
    pub layers: Vec<ConfigSource>,
}

/// Specific layer of configuration (default/git/local/override).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSource {
    pub kind: ConfigSourceKind,
    pub path: Option<PathBuf>,
}

impl ConfigSource {
    fn default_layer() -> Self {
        ConfigSource {
            kind: ConfigSourceKind::Default,
            path: None,
        }
    }

    fn for_file(kind: ConfigSourceKind, path: PathBuf) -> Self {
        ConfigSource {
            kind,
            path: Some(path),
        }
    }

    fn describe(&self) -> String {
        match (&self.kind, &self.path) {
            (ConfigSourceKind::Default, _) => "built-in defaults".to_owned(),
            (kind, Some(path)) => format!("{} at {}", kind, path.display()),
            (kind, None) => kind.to_string(),
        }
    }
}

/// Kinds of configuration sources, ordered from lowest to highest precedence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigSourceKind {
    Default,
    GitRoot,
    Local,
    Override,
}

impl fmt::Display for ConfigSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigSourceKind::Default => "defaults",
            ConfigSourceKind::GitRoot => "git-root config",
            ConfigSourceKind::Local => "local config",
            ConfigSourceKind::Override => "override config",
        };
        f.write_str(label)
    }
}

/// Loader options, typically supplied by the CLI layer.
#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub override_path: Option<PathBuf>,
    pub working_dir: Option<PathBuf>,
}

impl LoadOptions {
    pub fn with_override_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.override_path = Some(path.into());
        self
    }

    pub fn with_working_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(path.into());
        self
    }
}

/// Errors surfaced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to resolve working directory {attempted}: {source}")]
    WorkingDirectory {
        attempted: PathBuf,
        source: io::Error,
    },
    #[error("override config {path} not found")]
    OverrideNotFound { path: PathBuf },
    #[error("failed to read config {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("configuration validation failed:\n{0}")]
    Validation(ConfigValidationErrors),
}

impl Config {
    /// Loads configuration using the precedence rules and returns typed settings.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let working_dir = resolve_working_dir(options.working_dir)?;
        let override_path = options
            .override_path
            .map(|path| make_absolute(&path, &working_dir));

        if let Some(path) = &override_path {
            if !path.exists() {
                return Err(ConfigError::OverrideNotFound { path: path.clone() });
            }
        }

        let default_source = ConfigSource::default_layer();
        let mut merged = defaults_layer(default_source.clone());
        let mut source_layers = vec![default_source];

        let git_root = find_git_root(&working_dir);
        let git_config_path = git_root.as_ref().map(|root| root.join(CONFIG_FILE_NAME));
        let local_config_path = working_dir.join(CONFIG_FILE_NAME);

        if let Some(path) = git_config_path.as_ref() {
            if path.exists() && Some(path) != override_path.as_ref() && path != &local_config_path {
                let source = ConfigSource::for_file(ConfigSourceKind::GitRoot, path.clone());
                merged.merge(load_layer(path, source.clone())?);
                source_layers.push(source);
            }
        }

        if local_config_path.exists() && Some(&local_config_path) != override_path.as_ref() {
            let source = ConfigSource::for_file(ConfigSourceKind::Local, local_config_path.clone());
            merged.merge(load_layer(&local_config_path, source.clone())?);
            source_layers.push(source);
        }

        if let Some(path) = override_path {
            let source = ConfigSource::for_file(ConfigSourceKind::Override, path.clone());
            merged.merge(load_layer(&path, source.clone())?);
            source_layers.push(source);
        }

        let resolved = merged.finalize().map_err(ConfigError::Validation)?;
        Ok(Config {
            document: resolved.document,
            classify: resolved.classify,
            selection: resolved.selection,
            strip: resolved.strip,
            export: resolved.export,
            sources: ConfigSources {
                working_directory: working_dir,
                layers: source_layers,
            },
        })
    }

    /// Built-in defaults without consulting the filesystem.
    pub fn builtin() -> Self {
        let source = ConfigSource::default_layer();
        let resolved = match defaults_layer(source.clone()).finalize() {
            Ok(resolved) => resolved,
            Err(errors) => unreachable!("built-in defaults are valid: {errors}"),
        };
        Config {
            document: resolved.document,
            classify: resolved.classify,
            selection: resolved.selection,
            strip: resolved.strip,
            export: resolved.export,
            sources: ConfigSources {
                working_directory: PathBuf::from("."),
                layers: vec![source],
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::builtin()
    }
}

fn resolve_working_dir(override_dir: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    match override_dir {
        Some(path) => fs::canonicalize(&path).map_err(|source| ConfigError::WorkingDirectory {
            attempted: path,
            source,
        }),
        None => env::current_dir().map_err(|source| ConfigError::WorkingDirectory {
            attempted: PathBuf::from("."),
            source,
        }),
    }
}

fn make_absolute(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn load_layer(path: &Path, source: ConfigSource) -> Result<PartialConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.into(),
        source,
    })?;
    let raw: RawConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.into(),
        source,
    })?;
    Ok(raw.into_partial(source))
}

fn defaults_layer(source: ConfigSource) -> PartialConfig {
    let located = |value: &str| Some(Located::new(value.to_string(), source.clone()));
    let located_list = |values: &[&str]| {
        Some(Located::new(
            values.iter().map(|value| value.to_string()).collect(),
            source.clone(),
        ))
    };

    PartialConfig {
        document: DocumentPartial {
            separator: located("---"),
            quote_marker: located(">"),
            heading_marker: located("##"),
            split_strategy: located("auto"),
        },
        classify: ClassifyPartial {
            correct_marker: located("正确"),
            incorrect_marker: located("错误"),
        },
        selection: SelectionPartial {
            policy: located("single"),
        },
        strip: StripPartial {
            answer_labels: located_list(&["答案", "参考答案", "answer", "reference answer"]),
            analysis_labels: located_list(&["解析", "analysis"]),
            malformed_answer_prefixes: located_list(&["AI答案为"]),
        },
        export: ExportPartial {
            view: located("quoted"),
            autosave: Some(Located::new(false, source.clone())),
        },
    }
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        if dir.join(".git").exists() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}

struct ResolvedConfig {
    document: DocumentSettings,
    classify: ClassifySettings,
    selection: SelectionSettings,
    strip: StripSettings,
    export: ExportSettings,
}

#[derive(Clone, Debug, Default)]
struct PartialConfig {
    document: DocumentPartial,
    classify: ClassifyPartial,
    selection: SelectionPartial,
    strip: StripPartial,
    export: ExportPartial,
}

fn merge_field<T>(target: &mut Option<T>, other: Option<T>) {
    if other.is_some() {
        *target = other;
    }
}

impl PartialConfig {
    fn merge(&mut self, other: PartialConfig) {
        let PartialConfig {
            document,
            classify,
            selection,
            strip,
            export,
        } = other;

        merge_field(&mut self.document.separator, document.separator);
        merge_field(&mut self.document.quote_marker, document.quote_marker);
        merge_field(&mut self.document.heading_marker, document.heading_marker);
        merge_field(&mut self.document.split_strategy, document.split_strategy);
        merge_field(&mut self.classify.correct_marker, classify.correct_marker);
        merge_field(&mut self.classify.incorrect_marker, classify.incorrect_marker);
        merge_field(&mut self.selection.policy, selection.policy);
        merge_field(&mut self.strip.answer_labels, strip.answer_labels);
        merge_field(&mut self.strip.analysis_labels, strip.analysis_labels);
        merge_field(
            &mut self.strip.malformed_answer_prefixes,
            strip.malformed_answer_prefixes,
        );
        merge_field(&mut self.export.view, export.view);
        merge_field(&mut self.export.autosave, export.autosave);
    }

    fn finalize(self) -> Result<ResolvedConfig, ConfigValidationErrors> {
        let mut errors = Vec::new();

        let separator = required_text(self.document.separator, "document.separator", &mut errors);
        if separator.chars().any(char::is_whitespace) {
            errors.push(
                ConfigValidationError::new(None, "must not contain whitespace".into())
                    .with_context("document.separator"),
            );
        }
        let quote_marker = parse_marker(self.document.quote_marker, &mut errors);
        let heading_marker = required_text(
            self.document.heading_marker,
            "document.heading_marker",
            &mut errors,
        );
        let split_strategy = parse_setting(
            self.document.split_strategy,
            "document.split_strategy",
            SplitSetting::Auto,
            &mut errors,
        );

        let correct_marker = required_text(
            self.classify.correct_marker,
            "classify.correct_marker",
            &mut errors,
        );
        let incorrect_marker = required_text(
            self.classify.incorrect_marker,
            "classify.incorrect_marker",
            &mut errors,
        );

        let policy = parse_setting(
            self.selection.policy,
            "selection.policy",
            PolicySetting::Single,
            &mut errors,
        );

        let answer_labels = label_list(self.strip.answer_labels, "strip.answer_labels", &mut errors);
        let analysis_labels =
            label_list(self.strip.analysis_labels, "strip.analysis_labels", &mut errors);
        let malformed_answer_prefixes = label_list(
            self.strip.malformed_answer_prefixes,
            "strip.malformed_answer_prefixes",
            &mut errors,
        );

        let view = parse_setting(
            self.export.view,
            "export.view",
            ViewSetting::Quoted,
            &mut errors,
        );
        let autosave = self
            .export
            .autosave
            .map(|located| located.value)
            .unwrap_or(false);

        if !errors.is_empty() {
            return Err(ConfigValidationErrors(errors));
        }

        Ok(ResolvedConfig {
            document: DocumentSettings {
                separator,
                quote_marker,
                heading_marker,
                split_strategy,
            },
            classify: ClassifySettings {
                correct_marker,
                incorrect_marker,
            },
            selection: SelectionSettings { policy },
            strip: StripSettings {
                answer_labels,
                analysis_labels,
                malformed_answer_prefixes,
            },
            export: ExportSettings { view, autosave },
        })
    }
}

fn required_text(
    located: Option<Located<String>>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> String {
    let Some(located) = located else {
        errors.push(ConfigValidationError::new(None, "is required".into()).with_context(context));
        return String::new();
    };

    let value = located.value.trim().to_string();
    if value.is_empty() {
        errors.push(
            ConfigValidationError::new(Some(located.source), "cannot be empty".into())
                .with_context(context),
        );
    }
    value
}

fn parse_marker(located: Option<Located<String>>, errors: &mut Vec<ConfigValidationError>) -> char {
    const CONTEXT: &str = "document.quote_marker";
    let Some(located) = located else {
        return '>';
    };

    let mut chars = located.value.chars();
    match (chars.next(), chars.next()) {
        (Some(marker), None) if !marker.is_whitespace() => marker,
        _ => {
            errors.push(
                ConfigValidationError::new(
                    Some(located.source),
                    format!(
                        "must be a single non-whitespace character (received '{}')",
                        located.value
                    ),
                )
                .with_context(CONTEXT),
            );
            '>'
        }
    }
}

fn parse_setting<T: FromStr<Err = String>>(
    located: Option<Located<String>>,
    context: &str,
    fallback: T,
    errors: &mut Vec<ConfigValidationError>,
) -> T {
    let Some(located) = located else {
        return fallback;
    };

    match located.value.parse() {
        Ok(value) => value,
        Err(message) => {
            errors.push(
                ConfigValidationError::new(Some(located.source), message).with_context(context),
            );
            fallback
        }
    }
}

fn label_list(
    located: Option<Located<Vec<String>>>,
    context: &str,
    errors: &mut Vec<ConfigValidationError>,
) -> Vec<String> {
    let Some(located) = located else {
        return Vec::new();
    };

    let mut labels = Vec::new();
    for label in located.value {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            errors.push(
                ConfigValidationError::new(
                    Some(located.source.clone()),
                    "labels cannot be empty".into(),
                )
                .with_context(context),
            );
            continue;
        }
        labels.push(trimmed.to_string());
    }
    labels
}

#[derive(Clone, Debug, Default)]
struct DocumentPartial {
    separator: Option<Located<String>>,
    quote_marker: Option<Located<String>>,
    heading_marker: Option<Located<String>>,
    split_strategy: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct ClassifyPartial {
    correct_marker: Option<Located<String>>,
    incorrect_marker: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct SelectionPartial {
    policy: Option<Located<String>>,
}

#[derive(Clone, Debug, Default)]
struct StripPartial {
    answer_labels: Option<Located<Vec<String>>>,
    analysis_labels: Option<Located<Vec<String>>>,
    malformed_answer_prefixes: Option<Located<Vec<String>>>,
}

#[derive(Clone, Debug, Default)]
struct ExportPartial {
    view: Option<Located<String>>,
    autosave: Option<Located<bool>>,
}

#[derive(Clone, Debug)]
struct Located<T> {
    value: T,
    source: ConfigSource,
}

impl<T> Located<T> {
    fn new(value: T, source: ConfigSource) -> Self {
        Located { value, source }
    }
}

/// Collection of validation errors encountered while resolving configuration.
#[derive(Clone, Debug)]
pub struct ConfigValidationErrors(pub Vec<ConfigValidationError>);

impl fmt::Display for ConfigValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "- {err}")?;
        }
        Ok(())
    }
}

impl ConfigValidationErrors {
    pub fn iter(&self) -> impl Iterator<Item = &ConfigValidationError> {
        self.0.iter()
    }
}

/// Validation failure with optional provenance.
#[derive(Clone, Debug)]
pub struct ConfigValidationError {
    pub source: Option<ConfigSource>,
    pub message: String,
    pub context: Option<String>,
}

impl ConfigValidationError {
    fn new(source: Option<ConfigSource>, message: String) -> Self {
        ConfigValidationError {
            source,
            message,
            context: None,
        }
    }

    fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{}: {}", context, self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if let Some(source) = &self.source {
            write!(f, " ({})", source.describe())?;
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    document: Option<RawDocument>,
    #[serde(default)]
    classify: Option<RawClassify>,
    #[serde(default)]
    selection: Option<RawSelection>,
    #[serde(default)]
    strip: Option<RawStrip>,
    #[serde(default)]
    export: Option<RawExport>,
}

impl RawConfig {
    fn into_partial(self, source: ConfigSource) -> PartialConfig {
        let at = |value| Located::new(value, source.clone());
        let mut partial = PartialConfig::default();

        if let Some(document) = self.document {
            partial.document = DocumentPartial {
                separator: document.separator.map(at),
                quote_marker: document.quote_marker.map(at),
                heading_marker: document.heading_marker.map(at),
                split_strategy: document.split_strategy.map(at),
            };
        }
        if let Some(classify) = self.classify {
            partial.classify = ClassifyPartial {
                correct_marker: classify.correct_marker.map(at),
                incorrect_marker: classify.incorrect_marker.map(at),
            };
        }
        if let Some(selection) = self.selection {
            partial.selection = SelectionPartial {
                policy: selection.policy.map(at),
            };
        }
        if let Some(strip) = self.strip {
            partial.strip = StripPartial {
                answer_labels: strip
                    .answer_labels
                    .map(|value| Located::new(value, source.clone())),
                analysis_labels: strip
                    .analysis_labels
                    .map(|value| Located::new(value, source.clone())),
                malformed_answer_prefixes: strip
                    .malformed_answer_prefixes
                    .map(|value| Located::new(value, source.clone())),
            };
        }
        if let Some(export) = self.export {
            partial.export = ExportPartial {
                view: export.view.map(at),
                autosave: export
                    .autosave
                    .map(|value| Located::new(value, source.clone())),
            };
        }

        partial
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    separator: Option<String>,
    #[serde(default)]
    quote_marker: Option<String>,
    #[serde(default)]
    heading_marker: Option<String>,
    #[serde(default)]
    split_strategy: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClassify {
    #[serde(default)]
    correct_marker: Option<String>,
    #[serde(default)]
    incorrect_marker: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSelection {
    #[serde(default)]
    policy: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStrip {
    #[serde(default)]
    answer_labels: Option<Vec<String>>,
    #[serde(default)]
    analysis_labels: Option<Vec<String>>,
    #[serde(default)]
    malformed_answer_prefixes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExport {
    #[serde(default)]
    view: Option<String>,
    #[serde(default)]
    autosave: Option<bool>,
}
