//! End-to-end tests for the `apigate` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GRAPH: &str = r#"
[[component]]
id = "org.acme.core"
packages = ["org.acme.core", "org.acme.core.internal"]

[[component.exports]]
name = "org.acme.core"

[[component.exports]]
name = "org.acme.core.internal"
friends = ["org.acme.ui"]

[[component]]
id = "org.acme.core.nl"
host = "org.acme.core"
packages = ["org.acme.core.nl"]

[[component.exports]]
name = "org.acme.core.nl"

[[component]]
id = "org.acme.ui"
packages = ["org.acme.ui"]

[[component.exports]]
name = "org.acme.ui"

[[component.requires]]
id = "org.acme.core"

[[component]]
id = "org.acme.cli"

[[component.requires]]
id = "org.acme.ui"

[[component.requires]]
id = "org.acme.core"
"#;

const BROKEN_GRAPH: &str = r#"
[[component]]
id = "org.acme.app"

[[component.requires]]
id = "org.acme.missing"

[[component]]
id = "org.acme.app.nl"
host = "org.acme.gone"
"#;

fn project(graph: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("components.toml"), graph).expect("write graph");
    dir
}

fn apigate(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("apigate").expect("binary");
    cmd.current_dir(dir).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn resolve_prints_friend_provider() {
    let dir = project(GRAPH);
    apigate(dir.path())
        .args(["resolve", "org.acme.ui", "org.acme.core.internal"])
        .assert()
        .success()
        .stdout("org.acme.core\n");
}

#[test]
fn resolve_hides_friend_packages_from_others() {
    let dir = project(GRAPH);
    apigate(dir.path())
        .args(["resolve", "org.acme.cli", "org.acme.core.internal"])
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("no component makes"));
}

#[test]
fn resolve_lists_providers_in_requirement_order() {
    let dir = project(GRAPH);
    apigate(dir.path())
        .args(["resolve", "org.acme.cli", "org.acme.ui"])
        .assert()
        .success()
        .stdout("org.acme.ui\n");
}

#[test]
fn resolve_unknown_requester_fails() {
    let dir = project(GRAPH);
    apigate(dir.path())
        .args(["resolve", "org.acme.nobody", "org.acme.core"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown component: org.acme.nobody"));
}

#[test]
fn system_library_comes_from_discovered_config() {
    let dir = project(GRAPH);
    fs::write(
        dir.path().join("apigate.toml"),
        "[resolver]\nsystem_library = \"jre\"\n",
    )
    .expect("write config");

    apigate(dir.path())
        .args(["resolve", "org.acme.ui", "java.util"])
        .assert()
        .success()
        .stdout("jre\n");
}

#[test]
fn profile_overrides_explicit_config() {
    let dir = project(GRAPH);
    fs::write(
        dir.path().join("custom.toml"),
        "[profiles.platform.resolver]\nsystem_library = \"platform\"\n",
    )
    .expect("write config");

    apigate(dir.path())
        .args([
            "--config",
            "custom.toml",
            "--profile",
            "platform",
            "resolve",
            "org.acme.ui",
            "java.lang",
        ])
        .assert()
        .success()
        .stdout("platform\n");
}

#[test]
fn unknown_profile_is_rejected() {
    let dir = project(GRAPH);
    apigate(dir.path())
        .args(["--profile", "missing", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("profile"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = project(GRAPH);
    fs::write(dir.path().join("apigate.toml"), "[resolver]\nmax_depth = 0\n")
        .expect("write config");

    apigate(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_depth"));
}

#[test]
fn describe_prints_seeded_annotations() {
    let dir = project(GRAPH);
    apigate(dir.path())
        .args(["describe", "org.acme.core"])
        .assert()
        .success()
        .stdout(predicate::str::contains("org.acme.core  API / NO_RESTRICTIONS"))
        .stdout(predicate::str::contains(
            "org.acme.core.internal  PRIVATE / NO_RESTRICTIONS  friends: org.acme.ui",
        ))
        .stdout(predicate::str::contains("org.acme.core.nl  API / NO_RESTRICTIONS"));
}

#[test]
fn check_accepts_complete_graph() {
    let dir = project(GRAPH);
    apigate(dir.path())
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("4 components, no problems found"));
}

#[test]
fn check_reports_broken_graph() {
    let dir = project(BROKEN_GRAPH);
    apigate(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "org.acme.app requires missing component org.acme.missing",
        ))
        .stderr(predicate::str::contains(
            "fragment org.acme.app.nl has no host org.acme.gone",
        ))
        .stderr(predicate::str::contains("2 problem(s)"));
}

#[test]
fn missing_graph_file_fails() {
    let dir = TempDir::new().expect("tempdir");
    apigate(dir.path())
        .args(["check", "--graph", "nowhere.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Graph file not found"));
}
