use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use quiz_config::{
    Config, ConfigError, ConfigSourceKind, LoadOptions, PolicySetting, SplitSetting, ViewSetting,
    CONFIG_FILE_NAME,
};
use tempfile::TempDir;

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let mut file = fs::File::create(path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
}

fn canonical(path: impl AsRef<Path>) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize path")
}

fn validation_message(err: ConfigError) -> String {
    match err {
        ConfigError::Validation(errors) => errors.to_string(),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn loads_defaults_when_no_files_present() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load defaults");

    assert_eq!(config.document.separator, "---");
    assert_eq!(config.document.quote_marker, '>');
    assert_eq!(config.document.heading_marker, "##");
    assert_eq!(config.document.split_strategy, SplitSetting::Auto);
    assert_eq!(config.classify.correct_marker, "正确");
    assert_eq!(config.classify.incorrect_marker, "错误");
    assert_eq!(config.selection.policy, PolicySetting::Single);
    assert_eq!(
        config.strip.malformed_answer_prefixes,
        vec!["AI答案为".to_string()]
    );
    assert_eq!(config.export.view, ViewSetting::Quoted);
    assert!(!config.export.autosave);

    assert_eq!(config.sources.working_directory, working_dir);
    assert_eq!(config.sources.layers.len(), 1);
    assert_eq!(config.sources.layers[0].kind, ConfigSourceKind::Default);
}

#[test]
fn applies_precedence_and_merges_fields() {
    let temp = TempDir::new().expect("tempdir");
    let git_root = canonical(temp.path());
    fs::create_dir(git_root.join(".git")).expect("create .git");

    write_file(
        git_root.join(CONFIG_FILE_NAME),
        r#"
        [document]
        separator = "***"
        split_strategy = "separator"

        [selection]
        policy = "multi"

        [strip]
        answer_labels = ["Answer"]
        "#,
    );

    let workspace = git_root.join("workspace");
    fs::create_dir(&workspace).expect("create workspace");

    write_file(
        workspace.join(CONFIG_FILE_NAME),
        r#"
        [document]
        split_strategy = "heading"

        [classify]
        correct_marker = "True"
        incorrect_marker = "False"
        "#,
    );

    let override_path = workspace.join("override.toml");
    write_file(
        &override_path,
        r#"
        [export]
        view = "unquoted"
        autosave = true
        "#,
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(&workspace)
            .with_override_path(&override_path),
    )
    .expect("load config with precedence");

    assert_eq!(config.document.separator, "***");
    assert_eq!(config.document.split_strategy, SplitSetting::Heading);
    assert_eq!(config.classify.correct_marker, "True");
    assert_eq!(config.classify.incorrect_marker, "False");
    assert_eq!(config.selection.policy, PolicySetting::Multi);
    assert_eq!(config.strip.answer_labels, vec!["Answer".to_string()]);
    assert_eq!(config.strip.analysis_labels.len(), 2);
    assert_eq!(config.export.view, ViewSetting::Unquoted);
    assert!(config.export.autosave);

    let kinds: Vec<_> = config
        .sources
        .layers
        .iter()
        .map(|layer| layer.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ConfigSourceKind::Default,
            ConfigSourceKind::GitRoot,
            ConfigSourceKind::Local,
            ConfigSourceKind::Override
        ]
    );
}

#[test]
fn missing_override_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(&working_dir)
            .with_override_path("missing.toml"),
    )
    .expect_err("expected missing override");

    match err {
        ConfigError::OverrideNotFound { path } => {
            assert_eq!(path, working_dir.join("missing.toml"))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_policy_surfaces_validation_error() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    write_file(
        working_dir.join(CONFIG_FILE_NAME),
        r#"
        [selection]
        policy = "several"
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(&working_dir))
        .expect_err("expected validation failure");

    let joined = validation_message(err);
    assert!(
        joined.contains("selection.policy: unknown selection policy 'several'"),
        "unexpected error output: {joined}"
    );
    assert!(joined.contains("local config at"), "{joined}");
}

#[test]
fn quote_marker_must_be_one_character() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    write_file(
        working_dir.join(CONFIG_FILE_NAME),
        r#"
        [document]
        quote_marker = ">>"
        separator = ""
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(&working_dir))
        .expect_err("expected validation failure");

    let joined = validation_message(err);
    assert!(
        joined.contains("document.quote_marker: must be a single non-whitespace character"),
        "unexpected error output: {joined}"
    );
    assert!(
        joined.contains("document.separator: cannot be empty"),
        "unexpected error output: {joined}"
    );
}

#[test]
fn empty_labels_are_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    write_file(
        working_dir.join(CONFIG_FILE_NAME),
        r#"
        [strip]
        analysis_labels = ["解析", "  "]
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(&working_dir))
        .expect_err("expected validation failure");

    let joined = validation_message(err);
    assert!(
        joined.contains("strip.analysis_labels: labels cannot be empty"),
        "unexpected error output: {joined}"
    );
}

#[test]
fn unknown_keys_fail_to_parse() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());
    write_file(
        working_dir.join(CONFIG_FILE_NAME),
        r#"
        [document]
        sepparator = "---"
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(&working_dir))
        .expect_err("expected parse failure");

    assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
}
