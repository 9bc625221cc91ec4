#![allow(missing_docs)]

use std::path::PathBuf;

use counsel_lab::load_runtime_settings_from_paths;
use tempfile::TempDir;

fn write_file(path: PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write yaml");
}

#[test]
fn merge_user_overrides_system() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("packages/conf/counsel-lab.yaml");
    let user = tmp.path().join(".config/counsel-lab/settings.yaml");

    write_file(
        system.clone(),
        r#"
llm:
  model: "gpt-5.1"
  prompt_file: "prompt.txt"
  history_window: 10
  credential_source: "auto"
log:
  path: "logs/turns.jsonl"
  export_path: "logs/turns.csv"
remote:
  table: "turn_logs"
experiment:
  session_one_prompt: "System scenario one."
"#,
    );
    write_file(
        user.clone(),
        r#"
llm:
  model: "gpt-5.1-mini"
  history_window: 6
log:
  path: "/var/lib/counsel-lab/turns.jsonl"
remote:
  url: "https://example.supabase.co"
experiment:
  session_two_prompt: "User scenario two."
"#,
    );

    let settings = load_runtime_settings_from_paths(&system, &user);
    assert_eq!(settings.llm.model.as_deref(), Some("gpt-5.1-mini"));
    assert_eq!(settings.llm.prompt_file.as_deref(), Some("prompt.txt"));
    assert_eq!(settings.llm.history_window, Some(6));
    assert_eq!(settings.llm.credential_source.as_deref(), Some("auto"));
    assert_eq!(
        settings.log.path.as_deref(),
        Some("/var/lib/counsel-lab/turns.jsonl")
    );
    assert_eq!(settings.log.export_path.as_deref(), Some("logs/turns.csv"));
    assert_eq!(settings.remote.table.as_deref(), Some("turn_logs"));
    assert_eq!(
        settings.remote.url.as_deref(),
        Some("https://example.supabase.co")
    );
    assert_eq!(
        settings.experiment.session_one_prompt.as_deref(),
        Some("System scenario one.")
    );
    assert_eq!(
        settings.experiment.session_two_prompt.as_deref(),
        Some("User scenario two.")
    );
}

#[test]
fn invalid_user_file_is_ignored() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("system.yaml");
    let user = tmp.path().join("user.yaml");
    write_file(system.clone(), "llm:\n  model: \"gpt-5.1\"\n");
    write_file(user.clone(), "llm: [not, a, map\n");

    let settings = load_runtime_settings_from_paths(&system, &user);
    assert_eq!(settings.llm.model.as_deref(), Some("gpt-5.1"));
}

#[test]
fn missing_files_yield_defaults() {
    let tmp = TempDir::new().expect("tempdir");
    let settings = load_runtime_settings_from_paths(
        &tmp.path().join("absent-system.yaml"),
        &tmp.path().join("absent-user.yaml"),
    );
    assert!(settings.llm.model.is_none());
    assert!(settings.remote.url.is_none());
    assert!(settings.experiment.session_one_prompt.is_none());
}
