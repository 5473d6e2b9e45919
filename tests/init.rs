use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_pulse"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "pulse init failed: {}", String::from_utf8_lossy(&output.stderr));

    let config_path = dir.path().join(".pulse.toml");
    assert!(config_path.exists(), ".pulse.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[input]"));
    assert!(content.contains("[report]"));
    assert!(content.contains("[dashboard]"));

    // Commented-out keys leave every default in place
    let config: pulse_core::PulseConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.dashboard.top_n, 5);
    assert!(config.report.html);
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".pulse.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_pulse"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".pulse.toml")).unwrap();
    assert_eq!(content, "# existing");
}
