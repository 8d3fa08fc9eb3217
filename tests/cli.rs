// End-to-end tests for the query paths of both binaries

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const TRUSTGATE: &str = env!("CARGO_BIN_EXE_trustgate");
const TRUSTGATE_QUERY: &str = env!("CARGO_BIN_EXE_trustgate-query");

fn scenario_db() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("t.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE t(id INTEGER, name TEXT);
         INSERT INTO t VALUES (1, 'a\"b');",
    )
    .unwrap();
    (dir, path)
}

fn run(bin: &str, args: &[&str]) -> Output {
    Command::new(bin)
        .args(args)
        .env_remove("TRUSTGATE_LOG")
        .output()
        .unwrap()
}

fn db_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_query_json_scenario() {
    let (_dir, db) = scenario_db();
    let out = run(TRUSTGATE, &["query", "-json", db_arg(&db), "SELECT * FROM t"]);

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "[{\"id\":1,\"name\":\"a\\\"b\"}]\n");
    assert!(out.stderr.is_empty());
}

#[test]
fn test_query_text_scenario() {
    let (_dir, db) = scenario_db();
    let out = run(TRUSTGATE, &["query", db_arg(&db), "SELECT * FROM t"]);

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "1|a\"b\n");
}

#[test]
fn test_readonly_flag_accepted() {
    let (_dir, db) = scenario_db();
    let out = run(
        TRUSTGATE,
        &["query", "-readonly", "-json", db_arg(&db), "SELECT id FROM t"],
    );

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "[{\"id\":1}]\n");
}

#[test]
fn test_missing_statement_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("x.db");
    let out = run(TRUSTGATE, &["query", "-json", db_arg(&db)]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("Usage: trustgate query [-readonly] [-json] <db_path> <sql>"));
    assert!(!stderr.contains("unable to open"));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_missing_table_reports_error() {
    let (_dir, db) = scenario_db();
    let out = run(TRUSTGATE, &["query", "-json", db_arg(&db), "SELECT * FROM nope"]);

    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("Error: "));
    assert!(stderr.contains("no such table"));
}

#[test]
fn test_missing_database_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("absent.db");
    let out = run(TRUSTGATE, &["query", db_arg(&db), "SELECT 1"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    let expected = format!("Error: unable to open database \"{}\": ", db.display());
    assert!(stderr.starts_with(&expected), "stderr was: {}", stderr);
    assert!(!db.exists());
}

#[test]
fn test_runtime_error_after_rows_exits_one() {
    let (_dir, db) = scenario_db();
    let sql = "SELECT id AS v FROM t UNION ALL SELECT abs(id - 9223372036854775807 - 2) FROM t";
    let out = run(TRUSTGATE, &["query", "-json", db_arg(&db), sql]);

    assert_eq!(out.status.code(), Some(1));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "[{\"v\":1}]\n");
    assert!(String::from_utf8_lossy(&out.stderr).contains("integer overflow"));
}

#[test]
fn test_json_and_text_row_counts_match() {
    let (_dir, db) = scenario_db();
    let sql = "SELECT id, name FROM t UNION ALL SELECT 2, NULL UNION ALL SELECT 3, 'x'";

    let text = run(TRUSTGATE, &["query", db_arg(&db), sql]);
    let json = run(TRUSTGATE, &["query", "-json", db_arg(&db), sql]);

    let rows: Vec<serde_json::Value> = serde_json::from_slice(&json.stdout).unwrap();
    assert_eq!(rows.len(), String::from_utf8_lossy(&text.stdout).lines().count());
    assert_eq!(rows[1]["name"], serde_json::Value::Null);
}

#[test]
fn test_dedicated_binary_runs_queries() {
    let (_dir, db) = scenario_db();
    let out = run(TRUSTGATE_QUERY, &["-readonly", "-json", db_arg(&db), "SELECT * FROM t"]);

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "[{\"id\":1,\"name\":\"a\\\"b\"}]\n");
}

#[test]
fn test_dedicated_binary_usage_names_itself() {
    let out = run(TRUSTGATE_QUERY, &["-json"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("Usage: "));
    assert!(stderr.contains("trustgate-query [-readonly] [-json] <db_path> <sql>"));
}

#[test]
fn test_config_prints_compiled_in_settings() {
    let out = run(TRUSTGATE, &["config"]);

    assert_eq!(out.status.code(), Some(0));
    let config: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert!(config["workdir"].as_str().unwrap().starts_with('/'));
    assert!(config["path_env"].is_string());
    assert!(!config["child_command"].as_array().unwrap().is_empty());
}
