#![cfg(unix)]
#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prints what it was started with, then exits with `$FAKE_EXIT` (default 0).
const FAKE_TOOL: &str = r#"#!/bin/sh
echo "VIRTUAL_ENV=${VIRTUAL_ENV:-}"
for a in "$@"; do
  echo "ARG=$a"
done
exit "${FAKE_EXIT:-0}"
"#;

struct Sandbox {
    home: TempDir,
    bin: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let home = TempDir::new().unwrap();
        let bin = home.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        write_exec(&bin.join("fake-ipython"), FAKE_TOOL);
        std::fs::create_dir_all(home.path().join("workspace")).unwrap();
        Self { home, bin }
    }

    fn workspace(&self) -> PathBuf {
        self.home.path().join("workspace")
    }

    fn config_path(&self) -> PathBuf {
        self.home.path().join("config.yaml")
    }

    /// `pyws` with an isolated HOME, workspace, config and PATH.
    fn pyws(&self) -> Command {
        let path = format!(
            "{}:{}",
            self.bin.display(),
            std::env::var("PATH").unwrap_or_default()
        );
        let mut cmd = Command::cargo_bin("pyws").unwrap();
        cmd.current_dir(self.home.path())
            .env("HOME", self.home.path())
            .env("PYWS_WORKSPACE", self.workspace())
            .env("PYWS_CONFIG", self.config_path())
            .env("PYWS_TOOL", "fake-ipython")
            .env("PATH", path)
            .env_remove("PYWS_HISTORY_FILE")
            .env_remove("VIRTUAL_ENV")
            .env_remove("RUST_LOG");
        cmd
    }

    /// A workspace project; `with_env` adds an activate script and a
    /// project-local copy of the tool.
    fn project(&self, name: &str, with_env: bool) -> PathBuf {
        let dir = self.workspace().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        if with_env {
            let bin = dir.join(".venv/bin");
            std::fs::create_dir_all(&bin).unwrap();
            std::fs::write(
                bin.join("activate"),
                format!(
                    "VIRTUAL_ENV=\"{}\"\nexport VIRTUAL_ENV\nPATH=\"$VIRTUAL_ENV/bin:$PATH\"\nexport PATH\n",
                    dir.join(".venv").display()
                ),
            )
            .unwrap();
            write_exec(
                &bin.join("fake-ipython"),
                &FAKE_TOOL.replace("VIRTUAL_ENV=", "LOCAL VIRTUAL_ENV="),
            );
        }
        dir
    }
}

/// A `virtualenv` on the sandbox PATH whose `pip` logs its arguments.
const FAKE_VIRTUALENV: &str = "#!/bin/sh\nmkdir -p \"$1/bin\"\nprintf '#!/bin/sh\\necho \"$@\" > pip.log\\n' > \"$1/bin/pip\"\nchmod +x \"$1/bin/pip\"\n";

fn write_exec(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

fn stdout_of(cmd: &mut Command) -> String {
    let out = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(out).unwrap()
}

// ---------------------------------------------------------------------------
// pyws launch
// ---------------------------------------------------------------------------

#[test]
fn launch_named_project_activates_env_and_uses_local_tool() {
    let sb = Sandbox::new();
    let project = sb.project("toolbox", true);
    let elsewhere = TempDir::new().unwrap();

    let out = stdout_of(
        sb.pyws()
            .current_dir(elsewhere.path())
            .args(["launch", "toolbox", "--", "-c", "print('a b')"]),
    );

    assert!(
        out.contains(&format!(
            "LOCAL VIRTUAL_ENV={}",
            project.join(".venv").display()
        )),
        "unexpected output:\n{out}"
    );
    let history = sb
        .home
        .path()
        .join(".ipython/profile_default/history.sqlite");
    let expected = format!(
        "ARG=--HistoryManager.hist_file={}\nARG=--no-confirm-exit\nARG=--no-banner\nARG=-c\nARG=print('a b')\n",
        history.display()
    );
    assert!(out.ends_with(&expected), "unexpected output:\n{out}");
    assert!(!out.contains("--profile-dir"));
}

#[test]
fn launch_without_env_falls_back_to_path_tool() {
    let sb = Sandbox::new();
    sb.project("plain", false);

    sb.pyws()
        .args(["launch", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("VIRTUAL_ENV=\n"));
}

#[test]
fn launch_unknown_name_fails_without_launching() {
    let sb = Sandbox::new();
    sb.project("toolbox", true);

    sb.pyws()
        .args(["launch", "nope", "x"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cannot find specified environment"));
}

#[test]
fn launch_dot_uses_nearest_marker_and_profile() {
    let sb = Sandbox::new();
    let outer = sb.home.path().join("code/outer");
    let inner = outer.join("libs/inner");
    let deep = inner.join("src/inner/sub");
    std::fs::create_dir_all(&deep).unwrap();
    std::fs::write(outer.join("setup.py"), "").unwrap();
    std::fs::write(inner.join("setup.py"), "").unwrap();
    std::fs::create_dir_all(inner.join(".ipython_profile")).unwrap();

    let out = stdout_of(sb.pyws().current_dir(&deep).args(["launch", ".", "extra"]));
    assert!(
        out.contains(&format!(
            "ARG=--profile-dir={}",
            inner.join(".ipython_profile").display()
        )),
        "unexpected output:\n{out}"
    );
    assert!(out.ends_with("ARG=extra\n"));

    // No argument at all behaves like `.`.
    let out = stdout_of(sb.pyws().current_dir(&deep).arg("launch"));
    assert!(out.contains("--profile-dir="));
    assert!(out.ends_with("ARG=--no-banner\n"));
}

#[test]
fn launch_without_marker_fails() {
    let sb = Sandbox::new();
    std::fs::write(sb.config_path(), "manifest: pyws-marker-nobody-has.cfg\n").unwrap();

    sb.pyws()
        .arg("launch")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("cannot find project manifest"));
}

#[test]
fn launch_propagates_tool_exit_code() {
    let sb = Sandbox::new();
    sb.project("toolbox", true);

    sb.pyws()
        .env("FAKE_EXIT", "7")
        .args(["launch", "toolbox"])
        .assert()
        .code(7);
}

#[test]
fn launch_tool_killed_by_signal_reports_128_plus_signal() {
    let sb = Sandbox::new();
    let project = sb.project("toolbox", true);
    write_exec(
        &project.join(".venv/bin/fake-ipython"),
        "#!/bin/sh\necho \"VE=${VIRTUAL_ENV:-}\"\nkill -9 $$\n",
    );

    let assert = sb.pyws().args(["launch", "toolbox"]).assert().code(137);
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    assert_eq!(out, format!("VE={}\n", project.join(".venv").display()));

    // The launcher's own environment never gained the activation.
    let err = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    assert!(!err.contains("VE="), "unexpected stderr:\n{err}");
}

#[test]
fn launch_leading_separator_targets_current_project() {
    let sb = Sandbox::new();
    let project = sb.project("toolbox", true);
    std::fs::write(project.join("setup.py"), "").unwrap();

    let out = stdout_of(
        sb.pyws()
            .current_dir(&project)
            .args(["launch", "--", "-i", "x"]),
    );
    assert!(
        out.starts_with(&format!(
            "LOCAL VIRTUAL_ENV={}",
            project.join(".venv").display()
        )),
        "unexpected output:\n{out}"
    );
    assert!(out.ends_with("ARG=--no-banner\nARG=-i\nARG=x\n"), "unexpected output:\n{out}");
}

#[test]
fn launch_help_delegates_to_tool() {
    let sb = Sandbox::new();

    sb.pyws()
        .args(["launch", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ARG=--help"));
}

#[test]
fn launch_history_file_override() {
    let sb = Sandbox::new();
    sb.project("toolbox", false);

    sb.pyws()
        .args(["--history-file", "/tmp/pyws-hist.sqlite", "launch", "toolbox"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ARG=--HistoryManager.hist_file=/tmp/pyws-hist.sqlite",
        ));
}

// ---------------------------------------------------------------------------
// pyws list
// ---------------------------------------------------------------------------

#[test]
fn list_prints_sorted_project_names() {
    let sb = Sandbox::new();
    sb.project("zeta", false);
    sb.project("alpha", true);
    std::fs::create_dir_all(sb.workspace().join(".cache")).unwrap();

    sb.pyws()
        .arg("list")
        .assert()
        .success()
        .stdout("alpha\nzeta\n");

    sb.pyws()
        .args(["list", "--prefix", "z"])
        .assert()
        .success()
        .stdout("zeta\n");
}

#[test]
fn list_json_includes_probe_flags() {
    let sb = Sandbox::new();
    sb.project("alpha", true);

    let out = stdout_of(sb.pyws().args(["list", "--json"]));
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed[0]["requested_name"], "alpha");
    assert_eq!(parsed[0]["has_isolated_environment"], true);
    assert_eq!(parsed[0]["has_profile_directory"], false);
}

#[test]
fn list_missing_workspace_is_empty() {
    let sb = Sandbox::new();
    sb.pyws()
        .env("PYWS_WORKSPACE", sb.home.path().join("nowhere"))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ---------------------------------------------------------------------------
// pyws new
// ---------------------------------------------------------------------------

#[test]
fn new_scaffolds_into_workspace() {
    let sb = Sandbox::new();

    write_exec(&sb.bin.join("virtualenv"), FAKE_VIRTUALENV);

    sb.pyws()
        .args(["new", "toolbox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pyws launch toolbox"));

    let project = sb.workspace().join("toolbox");
    assert!(project.join("setup.py").is_file());
    assert!(project.join("src/toolbox/toolbox.py").is_file());
    assert!(project.join(".ipython_profile").is_dir());
    assert!(project.join(".venv/bin/pip").is_file());
    assert_eq!(
        std::fs::read_to_string(project.join("pip.log")).unwrap(),
        "install -e .[dev,test]\n"
    );

    sb.pyws()
        .args(["new", "toolbox", "--no-venv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("project already exists"));
}

#[test]
fn new_without_venv_uses_given_module() {
    let sb = Sandbox::new();

    sb.pyws()
        .args(["new", "toolbox", "--module", "cli", "--no-venv"])
        .assert()
        .success();

    let project = sb.workspace().join("toolbox");
    assert!(project.join("src/toolbox/cli.py").is_file());
    assert!(!project.join(".venv").exists());
}

#[test]
fn new_rejects_invalid_name() {
    let sb = Sandbox::new();
    sb.pyws()
        .args(["new", "Bad-Name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid project name"));
    assert!(!sb.workspace().join("Bad-Name").exists());
}

// ---------------------------------------------------------------------------
// pyws venv / format
// ---------------------------------------------------------------------------

#[test]
fn venv_recreates_env_and_installs_editable() {
    let sb = Sandbox::new();
    let project = sb.project("toolbox", true);
    std::fs::write(project.join(".venv/stale"), "").unwrap();
    write_exec(&sb.bin.join("virtualenv"), FAKE_VIRTUALENV);

    sb.pyws()
        .args(["venv", "toolbox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("virtualenv"));

    assert!(!project.join(".venv/stale").exists());
    assert_eq!(
        std::fs::read_to_string(project.join("pip.log")).unwrap(),
        "install -e .[dev,test]\n"
    );
}

#[test]
fn format_runs_configured_commands_in_project() {
    let sb = Sandbox::new();
    let project = sb.project("toolbox", false);
    std::fs::write(
        sb.config_path(),
        "formatters:\n  - program: sh\n    args: [\"-c\", \"echo formatted > fmt.log\"]\n",
    )
    .unwrap();

    sb.pyws().args(["format", "toolbox"]).assert().success();
    assert_eq!(
        std::fs::read_to_string(project.join("fmt.log")).unwrap(),
        "formatted\n"
    );
}

#[test]
fn format_failure_reports_command() {
    let sb = Sandbox::new();
    sb.project("toolbox", false);
    std::fs::write(
        sb.config_path(),
        "formatters:\n  - program: sh\n    args: [\"-c\", \"echo lint-error; exit 2\"]\n",
    )
    .unwrap();

    sb.pyws()
        .args(["format", "toolbox"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exit code 2"))
        .stderr(predicate::str::contains("lint-error"));
}

// ---------------------------------------------------------------------------
// pyws config
// ---------------------------------------------------------------------------

#[test]
fn config_init_refuses_to_overwrite() {
    let sb = Sandbox::new();

    sb.pyws().args(["config", "init"]).assert().success();
    let written = std::fs::read_to_string(sb.config_path()).unwrap();
    assert!(written.contains("manifest: setup.py"));

    sb.pyws()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    sb.pyws()
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn config_show_reports_effective_settings() {
    let sb = Sandbox::new();

    let out = stdout_of(sb.pyws().args(["config", "show", "--json"]));
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["settings"]["tool"], "fake-ipython");
    assert_eq!(
        parsed["settings"]["workspace_root"],
        sb.workspace().display().to_string()
    );
}
