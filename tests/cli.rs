use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn slide(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("slide").expect("bin");
    cmd.current_dir(dir)
        .env_remove("GEMINI_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("SLIDE_PROVIDER")
        .env_remove("SLIDE_MODEL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn themes_lists_the_catalog() {
    let tmp = tempfile::tempdir().unwrap();
    slide(tmp.path())
        .arg("themes")
        .assert()
        .success()
        .stdout(predicate::str::contains("modern_blue"))
        .stdout(predicate::str::contains("(default)"));
}

#[test]
fn slide_count_out_of_range_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    for count in ["2", "31"] {
        slide(tmp.path())
            .args(["generate", "Photosynthesis", "--slides", count])
            .assert()
            .failure()
            .stderr(predicate::str::contains("between 3 and 30"));
    }
    assert!(!tmp.path().join("output").exists());
}

#[test]
fn blank_topic_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    slide(tmp.path())
        .args(["generate", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please provide a topic"));
}

#[test]
fn unknown_theme_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    slide(tmp.path())
        .args(["generate", "Volcanoes", "--theme", "neon_pink"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown theme: neon_pink"));
}

#[test]
fn missing_api_key_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    slide(tmp.path())
        .args(["generate", "Volcanoes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));

    slide(tmp.path())
        .args(["--provider", "openai", "generate", "Volcanoes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn explicit_config_file_must_exist() {
    let tmp = tempfile::tempdir().unwrap();
    slide(tmp.path())
        .args(["--config", "missing.toml", "generate", "Volcanoes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.toml"));
}
