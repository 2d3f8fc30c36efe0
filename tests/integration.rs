use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn cli_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("recipe-index");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    fs::write(
        data_dir.join("recipes.json"),
        r#"[
  {
    "id": "r1",
    "title": "Tomato soup",
    "description": "A quick weeknight soup",
    "ingredients": ["tomatoes", "onion", "stock"],
    "instructions": ["Chop.", "Simmer."]
  },
  {
    "id": "r2",
    "title": "Chocolate cake",
    "description": "Rich and dense",
    "ingredients": ["flour", "cocoa", "eggs"],
    "instructions": ["Mix.", "Bake."]
  }
]"#,
    )
    .unwrap();

    let config_content = format!(
        r#"[data]
corpus_path = "{root}/data/recipes.json"
store_path = "{root}/data/embeddings.json"

[embedding]
provider = "disabled"

[server]
bind = "127.0.0.1:7341"
"#,
        root = root.display()
    );

    let config_path = config_dir.join("recipes.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_cli(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = cli_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run recipe-index binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

#[test]
fn test_reset_with_disabled_provider_writes_empty_store() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_cli(&config_path, &["reset", "--progress", "human"]);
    assert!(success, "reset failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("total recipes: 2"));
    assert!(stdout.contains("embedded: 0"));
    assert!(stdout.contains("failed: 2"));
    assert!(stderr.contains("[1/2] failed  r1 (Tomato soup)"));
    assert!(stderr.contains("[2/2] failed  r2 (Chocolate cake)"));

    let store = fs::read_to_string(tmp.path().join("data/embeddings.json")).unwrap();
    assert_eq!(store.trim(), "[]");
}

#[test]
fn test_reset_json_progress() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_cli(&config_path, &["reset", "--progress", "json"]);
    assert!(success);
    assert!(stderr.contains(r#""event":"started""#));
    assert!(stderr.contains(r#""event":"done""#));
}

#[test]
fn test_reset_replaces_existing_store() {
    let (tmp, config_path) = setup_test_env();
    let store = tmp.path().join("data/embeddings.json");
    fs::write(&store, r#"[{"id": "stale", "embedding": [1.0, 0.0]}]"#).unwrap();

    let (_, _, success) = run_cli(&config_path, &["reset", "--progress", "off"]);
    assert!(success);
    assert!(!fs::read_to_string(&store).unwrap().contains("stale"));
}

#[test]
fn test_reset_missing_corpus_fails() {
    let (tmp, config_path) = setup_test_env();
    fs::remove_file(tmp.path().join("data/recipes.json")).unwrap();

    let (_, stderr, success) = run_cli(&config_path, &["reset"]);
    assert!(!success);
    assert!(stderr.contains("corpus not found"));
}

#[test]
fn test_search_before_reset_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, stderr, success) = run_cli(&config_path, &["search", "soup"]);
    assert!(!success);
    assert!(stderr.contains("not initialized"));
}

#[test]
fn test_search_empty_query_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_cli(&config_path, &["reset"]);

    let (_, stderr, success) = run_cli(&config_path, &["search", "   "]);
    assert!(!success);
    assert!(stderr.contains("query must not be empty"));
}

#[test]
fn test_search_with_disabled_provider_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_cli(&config_path, &["reset"]);

    let (_, stderr, success) = run_cli(&config_path, &["search", "soup"]);
    assert!(!success);
    assert!(stderr.contains("disabled"));
}

#[test]
fn test_invalid_config_fails() {
    let (tmp, _) = setup_test_env();
    let bad = tmp.path().join("config/bad.toml");
    fs::write(&bad, "[data]\ncorpus_path = \"x.json\"\nstore_path = \"y.json\"\n[embedding]\nprovider = \"palm\"\nmodel = \"m\"\n").unwrap();

    let (_, stderr, success) = run_cli(&bad, &["search", "soup"]);
    assert!(!success);
    assert!(stderr.contains("Unknown embedding provider"));
}
