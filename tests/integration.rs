use std::path::Path;
use std::process::{Command, Output};

fn bpbind_cmd(fixture: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bpbind"));
    cmd.current_dir(Path::new("tests/fixtures").join(fixture));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn bind_prints_qualified_methods() {
    let output = bpbind_cmd("game")
        .args(["bind", "src/Player.cs:21", "src/Program.cs:5:9"])
        .output()
        .unwrap();
    assert!(output.status.success(), "bind failed: {}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("BOUND    src/Player.cs:21:1  Game.Actors.Player.TakeDamage"), "got: {out}");
    assert!(out.contains("BOUND    src/Program.cs:5:9  Program.Main"), "got: {out}");
}

#[test]
fn bind_unbound_exits_one_with_hint() {
    let output = bpbind_cmd("game").args(["bind", "src/Player.cs:7"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("UNBOUND  src/Player.cs:7:1  (not inside method)"));
    assert!(stderr(&output).contains("hint:"));
}

#[test]
fn bind_json_reports_special_members_and_failures() {
    let output = bpbind_cmd("game")
        .args([
            "bind",
            "--format",
            "json",
            "src/Player.cs:11",
            "src/Player.cs:16",
            "src/Player.cs:2",
            "src/Missing.cs:1",
        ])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = json.as_array().unwrap();
    assert_eq!(reports.len(), 4);

    assert_eq!(reports[0]["status"], "bound");
    assert_eq!(reports[0]["namespace"], "Game.Actors");
    assert_eq!(reports[0]["type"], "Player");
    assert_eq!(reports[0]["method"], ".ctor");
    assert_eq!(reports[0]["line"], 11);

    assert_eq!(reports[1]["method"], "get_Health");

    assert_eq!(reports[2]["status"], "unbound");
    assert_eq!(reports[2]["reason"], "no_bindable_node");

    assert_eq!(reports[3]["reason"], "io_error");
}

#[test]
fn invalid_location_exits_two() {
    let output = bpbind_cmd("game").args(["bind", "src/Player.cs:0"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error: Invalid Location"));
}

#[test]
fn scopes_lists_methods_in_source_order() {
    let output = bpbind_cmd("game").args(["scopes", "src"]).output().unwrap();
    assert!(output.status.success(), "scopes failed: {}", stderr(&output));

    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(lines, vec![
        "src/Player.cs:9-12  Game.Actors.Player..ctor",
        "src/Player.cs:16-16  Game.Actors.Player.get_Health",
        "src/Player.cs:19-22  Game.Actors.Player.TakeDamage",
        "src/Program.cs:3-6  Program.Main",
    ]);
}

#[test]
fn scopes_json_has_line_ranges() {
    let output = bpbind_cmd("game")
        .args(["scopes", "--format", "json", "src/Program.cs"])
        .output()
        .unwrap();
    assert!(output.status.success(), "scopes failed: {}", stderr(&output));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["file"], "src/Program.cs");
    assert_eq!(json[0]["namespace"], "");
    assert_eq!(json[0]["method"], "Main");
    assert_eq!(json[0]["start_line"], 3);
    assert_eq!(json[0]["end_line"], 6);
}

#[test]
fn scopes_on_missing_explicit_file_exits_two() {
    let output = bpbind_cmd("game").args(["scopes", "src/Missing.cs"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error: Cannot Bind"));
}

#[test]
fn config_restricts_extensions() {
    let output = bpbind_cmd("configured")
        .args(["bind", "--format", "json", "Tool.cs:7", "build.csx:5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["namespace"], "Tools");
    assert_eq!(json[0]["method"], "Run");
    assert_eq!(json[1]["reason"], "unsupported_language");
}

#[test]
fn malformed_config_exits_two() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".bpbind.toml"), "workers = \"many\"\n").unwrap();
    std::fs::write(dir.path().join("A.cs"), "class A\n{\n    void M()\n    {\n        int x = 0;\n    }\n}\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_bpbind"))
        .current_dir(dir.path())
        .args(["bind", "A.cs:5"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error: Invalid Config"));
}
