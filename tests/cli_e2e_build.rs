//! End-to-end tests for the `distpack build` command.
//!
//! These tests invoke the binary against a temporary project. Run them with:
//!
//! ```bash
//! cargo test --features integration-tests --test cli_e2e_build
//! ```

#[allow(dead_code)]
mod common;
use common::prelude::*;

#[test]
fn test_build_help() {
    let mut cmd = cargo_bin_cmd!("distpack");
    cmd.arg("build")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Build the distribution package"))
        .stdout(predicate::str::contains("--skip-before"))
        .stdout(predicate::str::contains("--no-compile"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_build_settings_only() {
    let fixture = TestFixture::new()
        .with_config(configs::SETTINGS_ONLY)
        .with_file("src/settings.json", r#"{"server": "localhost"}"#);

    fixture
        .command()
        .args(["--color", "never", "build", "x86", "--no-compile"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Packaged 1 files"));

    fixture
        .child("dist/x86/settings.json")
        .assert(r#"{"server": "localhost"}"#);
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_build_runtime_archive() {
    let fixture = TestFixture::new()
        .with_config(configs::RUNTIME)
        .with_runtime("win32");

    fixture
        .command()
        .args(["build", "x86", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    fixture.child("dist/x86/python35.dll").assert(predicate::path::is_file());
    fixture
        .child("dist/x86/python35_d.dll")
        .assert(predicate::path::missing());
    assert_eq!(
        common::archive_names(&fixture.path().join("dist/x86/pylib.zip")),
        vec!["os.py", "json/__init__.py"]
    );
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_build_output_override() {
    let fixture = TestFixture::new()
        .with_config(configs::SETTINGS_ONLY)
        .with_file("src/settings.json", "{}");

    fixture
        .command()
        .args(["build", "x64", "--no-compile", "-o", "staging"])
        .assert()
        .success();

    fixture
        .child("staging/settings.json")
        .assert(predicate::path::is_file());
    fixture.child("dist").assert(predicate::path::missing());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_build_logs_rule_counts() {
    let fixture = TestFixture::new()
        .with_config(configs::SETTINGS_ONLY)
        .with_file("src/settings.json", "{}");

    fixture
        .command()
        .args(["build", "x86", "--no-compile"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Copied 1 files"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_build_quiet_silences_progress_logs() {
    let fixture = TestFixture::new()
        .with_config(configs::SETTINGS_ONLY)
        .with_file("src/settings.json", "{}");

    fixture
        .command()
        .args(["build", "x86", "--no-compile", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Copied").not());
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_build_unknown_arch() {
    let fixture = TestFixture::new().with_config(configs::SETTINGS_ONLY);

    fixture
        .command()
        .args(["build", "arm64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown architecture: arm64"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_build_explicit_missing_config() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["build", "x86", "--config", "nowhere.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"))
        .stderr(predicate::str::contains("hint:"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_build_rejects_unknown_config_key() {
    let fixture = TestFixture::new().with_config(configs::UNKNOWN_KEY);

    fixture
        .command()
        .args(["build", "x86", "--no-compile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("plugins"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[cfg(unix)]
fn test_build_failing_hook() {
    let config = format!(
        "{}hooks:\n  before:\n    - {{ name: runtime, program: sh, args: [\"-c\", \"exit 7\"] }}\n",
        configs::SETTINGS_ONLY
    );
    let fixture = TestFixture::new()
        .with_config(&config)
        .with_file("src/settings.json", "{}");

    fixture
        .command()
        .args(["build", "x86", "--no-compile"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("runtime"));
    fixture.child("dist").assert(predicate::path::missing());

    fixture
        .command()
        .args(["build", "x86", "--no-compile", "--skip-before"])
        .assert()
        .success();
    fixture
        .child("dist/x86/settings.json")
        .assert(predicate::path::is_file());
}
