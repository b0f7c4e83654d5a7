//! CLI integration tests for json-ref-resolver binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("json-ref-resolver"))
}

// Helper to create a temp document file
fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

mod resolve_command {
    use super::*;

    #[test]
    fn basic_resolve() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.json",
            r##"{"defs":{"Id":{"type":"integer"}},"id":{"$ref":"#/defs/Id"}}"##,
        );

        cmd()
            .args(["resolve", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r##""id":{"type":"integer"}"##))
            .stderr(predicate::str::is_empty());
    }

    #[test]
    fn resolve_with_pretty() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", r##"{"a":1,"b":{"$ref":"#/a"}}"##);

        cmd()
            .args(["resolve", doc.to_str().unwrap(), "--pretty"])
            .assert()
            .success()
            // Pretty output has newlines and indentation
            .stdout(predicate::str::contains("{\n"))
            .stdout(predicate::str::contains(r##""b": 1"##));
    }

    #[test]
    fn resolve_with_output_file() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", r##"{"a":"x","b":{"$ref":"#/a"}}"##);
        let output = dir.path().join("output.json");

        cmd()
            .args([
                "resolve",
                doc.to_str().unwrap(),
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        assert_eq!(content, r##"{"a":"x","b":"x"}"##);
    }

    #[test]
    fn resolve_preserves_key_order() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", r##"{"z":1,"a":{"$ref":"#/z"},"m":2}"##);

        cmd()
            .args(["resolve", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r##"{"z":1,"a":1,"m":2}"##));
    }

    #[test]
    fn resolve_across_files() {
        let dir = TempDir::new().unwrap();
        write_temp_file(
            &dir,
            "schemas/pet.json",
            r##"{"Pet":{"type":"object","properties":{"name":{"$ref":"#/Name"}}},"Name":{"type":"string"}}"##,
        );
        let doc = write_temp_file(
            &dir,
            "api.json",
            r##"{"pet":{"$ref":"schemas/pet.json#/Pet"}}"##,
        );

        cmd()
            .args(["resolve", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r##"{"pet":{"type":"object","properties":{"name":{"type":"string"}}}}"##,
            ));
    }
}

mod unresolved_references {
    use super::*;

    #[test]
    fn failures_reported_but_exit_success() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.json",
            r##"{"items":[1],"bad":{"$ref":"#/items/5"},"ok":{"$ref":"#/items/0"}}"##,
        );

        cmd()
            .args(["resolve", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r##""bad":null"##))
            .stdout(predicate::str::contains(r##""ok":1"##))
            .stderr(predicate::str::contains("Unresolved references:"))
            .stderr(predicate::str::contains("/bad"))
            .stderr(predicate::str::contains("out of range"));
    }

    #[test]
    fn strict_exits_one() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", r##"{"bad":{"$ref":"#/missing"}}"##);

        cmd()
            .args(["resolve", doc.to_str().unwrap(), "--strict"])
            .assert()
            .code(1)
            .stdout(predicate::str::contains(r##"{"bad":null}"##));
    }

    #[test]
    fn strict_passes_when_complete() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", r##"{"a":1,"b":{"$ref":"#/a"}}"##);

        cmd()
            .args(["resolve", doc.to_str().unwrap(), "--strict"])
            .assert()
            .success();
    }

    #[test]
    fn json_report() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", r##"{"bad":{"$ref":"#/missing"}}"##);

        let output = cmd()
            .args(["resolve", doc.to_str().unwrap(), "--report", "json"])
            .output()
            .unwrap();

        assert!(output.status.success());
        let report: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
        assert_eq!(report[0]["path"], "/bad");
        assert_eq!(report[0]["reference"], "#/missing");
        assert_eq!(report[0]["error"], r##"no property "missing" on object"##);
    }

    #[test]
    fn cycle_reported() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(
            &dir,
            "api.json",
            r##"{"x":{"$ref":"#/y"},"y":{"$ref":"#/x"}}"##,
        );

        cmd()
            .args(["resolve", doc.to_str().unwrap()])
            .assert()
            .success()
            .stdout(predicate::str::contains(r##"{"x":null,"y":null}"##))
            .stderr(predicate::str::contains("reference cycle"));
    }

    #[test]
    fn missing_referenced_file() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", r##"{"r":{"$ref":"gone.json#/X"}}"##);

        cmd()
            .args(["resolve", doc.to_str().unwrap()])
            .assert()
            .success()
            .stderr(predicate::str::contains("HTTP status 404"));
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn file_not_found() {
        cmd()
            .args(["resolve", "/nonexistent/api.json"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("file not found"));
    }

    #[test]
    fn invalid_json_document() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", "not valid json");

        cmd()
            .args(["resolve", doc.to_str().unwrap()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn unknown_report_format() {
        let dir = TempDir::new().unwrap();
        let doc = write_temp_file(&dir, "api.json", "{}");

        cmd()
            .args(["resolve", doc.to_str().unwrap(), "--report", "xml"])
            .assert()
            .failure();
    }
}

mod required_args {
    use super::*;

    #[test]
    fn missing_source() {
        cmd().args(["resolve"]).assert().failure();
    }

    #[test]
    fn missing_subcommand() {
        cmd().assert().failure();
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Dereference $ref links"));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn resolve_help() {
        cmd()
            .args(["resolve", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--strict"))
            .stdout(predicate::str::contains("--no-cache"));
    }
}

#[cfg(feature = "remote")]
mod remote {
    use super::*;

    #[test]
    fn resolve_from_url() {
        let mut server = mockito::Server::new();
        let _base = server
            .mock("GET", "/api/base.json")
            .with_status(200)
            .with_body(r##"{"widget":{"$ref":"other.json#/def/Widget"}}"##)
            .create();
        let _other = server
            .mock("GET", "/api/other.json")
            .with_status(200)
            .with_body(r##"{"def":{"Widget":{"type":"object"}}}"##)
            .create();

        cmd()
            .args(["resolve", &format!("{}/api/base.json", server.url())])
            .assert()
            .success()
            .stdout(predicate::str::contains(r##"{"widget":{"type":"object"}}"##));
    }

    #[test]
    fn source_url_404() {
        let mut server = mockito::Server::new();
        let _missing = server
            .mock("GET", "/api/base.json")
            .with_status(404)
            .create();

        cmd()
            .args(["resolve", &format!("{}/api/base.json", server.url())])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("HTTP status 404"));
    }
}
