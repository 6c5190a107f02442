use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_search-query")
}

fn write_file(path: &Path, content: &str) {
    fs::write(path, content).expect("failed to write test file");
}

fn run(args: &[&str]) -> Output {
    Command::new(bin())
        .env_remove("SEARCH_QUERY_CONFIG")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("command should run")
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_parse_joins_words_with_and() {
    let output = run(&["parse", "ice", "cream"]);
    assert_eq!(stdout_of(&output), "(\"ice\" AND \"cream\")\n");
}

#[test]
fn test_parse_collapses_whitespace_inside_one_argument() {
    let output = run(&["parse", "--op", "or", "ice   cream"]);
    assert_eq!(stdout_of(&output), "(\"ice\" OR \"cream\")\n");
}

#[test]
fn test_parse_without_words_matches_everything() {
    let output = run(&["parse"]);
    assert_eq!(stdout_of(&output), "*:*\n");
}

#[test]
fn test_term_with_lookup_and_timestamp() {
    let output = run(&["term", "-f", "pub_date__lte=2013-03-13T01:32:00"]);
    assert_eq!(
        stdout_of(&output),
        "pub_date:([* TO \"2013-03-13T01:32:00\"])\n"
    );
}

#[test]
fn test_term_with_in_lookup_list() {
    let output = run(&["term", "--field", "title__in=The lazy dog,The quick fox"]);
    assert_eq!(
        stdout_of(&output),
        "title:(\"The lazy dog\" OR \"The quick fox\")\n"
    );
}

#[test]
fn test_term_with_boost() {
    let output = run(&["term", "-f", "x=a", "--boost", "f^3"]);
    assert_eq!(stdout_of(&output), "x:\"a\" f^3\n");
}

#[test]
fn test_term_rejects_text_and_field_together() {
    let output = run(&["term", "stuff", "-f", "field=val"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("qb('stuff') & qb(field='val')"),
        "stderr should echo the suggested call, got:\n{stderr}"
    );
}

#[test]
fn test_term_rejects_two_fields() {
    let output = run(&["term", "-f", "a=1", "-f", "b=2"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("more than one field"), "got:\n{stderr}");
}

#[test]
fn test_term_rejects_unknown_lookup() {
    let output = run(&["term", "-f", "pub_date__invalid=3"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("The valid lookups are"), "got:\n{stderr}");
}

#[test]
fn test_json_output_includes_resolved_index() {
    let dir = tempdir().expect("temp dir");
    let config = dir.path().join("search.toml");
    write_file(
        &config,
        "[connections.default]\nurl = \"http://localhost:9200\"\n\n[connections.books]\nurl = \"http://search.internal:9201\"\n",
    );

    let output = run(&[
        "-F",
        "json",
        "--config",
        config.to_str().expect("utf8 path"),
        "--index",
        "books",
        "term",
        "dune",
    ]);

    let value: serde_json::Value =
        serde_json::from_str(&stdout_of(&output)).expect("stdout should be JSON");
    assert_eq!(value["query"], "\"dune\"");
    assert_eq!(value["index"], "books");
    assert_eq!(value["url"], "http://search.internal:9201");
}

#[test]
fn test_unknown_index_is_a_config_error() {
    let output = run(&["--index", "nope", "parse", "dune"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("There's no index called `nope`, the available ones are: default."),
        "got:\n{stderr}"
    );
}

#[test]
fn test_output_file_matches_stdout() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("query.txt");

    let output = run(&[
        "-o",
        out.to_str().expect("utf8 path"),
        "parse",
        "ice",
        "cream",
    ]);

    let stdout = stdout_of(&output);
    let file_content = fs::read_to_string(&out).expect("output file should exist");
    assert_eq!(file_content, stdout);
}

#[test]
fn test_missing_config_file_fails() {
    let dir = tempdir().expect("temp dir");
    let missing = dir.path().join("missing.toml");

    let output = run(&[
        "--config",
        missing.to_str().expect("utf8 path"),
        "parse",
        "dune",
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load config"), "got:\n{stderr}");
}

#[test]
fn test_term_keeps_numeric_text_as_typed() {
    let output = run(&["term", "-f", "zip=02134"]);
    assert_eq!(stdout_of(&output), "zip:\"02134\"\n");

    let output = run(&["term", "-f", "price=1.50"]);
    assert_eq!(stdout_of(&output), "price:\"1.50\"\n");
}

#[test]
fn test_parse_many_words_does_not_overflow() {
    let words: Vec<String> = (0..20_000).map(|i| format!("w{i}")).collect();
    let mut args = vec!["parse"];
    args.extend(words.iter().map(String::as_str));

    let stdout = stdout_of(&run(&args));
    assert!(stdout.starts_with("(((("));
    assert!(stdout.ends_with(" AND \"w19999\")\n"));
}

#[test]
fn test_verbose_prints_diagnostics() {
    let output = run(&["-v", "parse", "dune"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Verbosity level: 1"), "got:\n{stderr}");
    assert!(stderr.contains("Color mode: Auto"), "got:\n{stderr}");
    assert_eq!(stdout_of(&output), "\"dune\"\n");
}

#[test]
fn test_quiet_suppresses_verbose_diagnostics() {
    let output = run(&["-v", "-q", "parse", "dune"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("Verbosity level"), "got:\n{stderr}");
    assert_eq!(stdout_of(&output), "\"dune\"\n");
}
