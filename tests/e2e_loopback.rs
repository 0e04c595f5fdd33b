
use std::ffi::OsStr;
use std::fs;

use tempfile::tempdir;

use support_loopback::{expect_success, free_udp_port, run_tprobe, write_file};

#[test]
fn e2e_help_lists_subcommands() -> Result<(), String> {
    let output = run_tprobe(["--help"])?;
    expect_success(&output)?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["send", "receive", "send-receive", "forward"] {
        if !stdout.contains(name) {
            return Err(format!("Help is missing '{}': {}", name, stdout));
        }
    }
    Ok(())
}

#[test]
fn e2e_send_receive_writes_outputs() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let cbr_port = free_udp_port()?;
    let trace_port = free_udp_port()?;
    if cbr_port == trace_port {
        return Ok(());
    }

    write_file(
        &dir.path().join("traces/burst.txt"),
        "# tag time size\n0 0.0 300\n1 0.25 300\n2 0.5 300\n",
    )?;
    let command_path = dir.path().join("loopback.json");
    write_file(
        &command_path,
        &format!(
            r#"[{{
              "127.0.0.1": {{
                "{cbr_port}": [
                  {{ "type": "cbr", "rate": 80000, "size": 200, "endTime": 1.0 }}
                ],
                "{trace_port}": [
                  {{ "type": "file", "path": "traces/burst.txt", "endTime": 1.0 }}
                ]
              }}
            }}]"#
        ),
    )?;

    let output = run_tprobe([
        OsStr::new("send-receive"),
        command_path.as_os_str(),
        OsStr::new("0"),
        OsStr::new("--start-delay-ms"),
        OsStr::new("100"),
        OsStr::new("--summary"),
        OsStr::new("--plot"),
    ])?;
    expect_success(&output)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.contains("Experiment: loopback-000") {
        return Err(format!("Missing experiment header: {}", stdout));
    }

    let summary = fs::read_to_string(dir.path().join("loopback.csv"))
        .map_err(|err| format!("read summary failed: {}", err))?;
    let lines: Vec<&str> = summary.lines().collect();
    if lines.first() != Some(&"name,port,inputRate,inputCV,outputRate,outputCV") {
        return Err(format!("Unexpected summary header: {}", summary));
    }
    if lines.len() != 3 {
        return Err(format!("Expected one row per port: {}", summary));
    }

    let plot_dir = dir.path().join("loopback").join("0");
    for name in [
        format!("{}.in", cbr_port),
        format!("{}.out", cbr_port),
        format!("{}.in", trace_port),
    ] {
        let content = fs::read_to_string(plot_dir.join(&name))
            .map_err(|err| format!("read plot {} failed: {}", name, err))?;
        if !content.starts_with("id,time,rate\n") {
            return Err(format!("Unexpected plot header in {}: {}", name, content));
        }
    }
    Ok(())
}

#[test]
fn e2e_unknown_experiment_fails() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let command_path = dir.path().join("single.json");
    write_file(
        &command_path,
        r#"[{ "127.0.0.1": { "9": [ { "type": "cbr", "rate": 8000, "size": 100, "endTime": 1 } ] } }]"#,
    )?;

    let output = run_tprobe([OsStr::new("send"), command_path.as_os_str(), OsStr::new("4")])?;
    if output.status.success() {
        return Err("Expected an out-of-range experiment id to fail".to_owned());
    }
    Ok(())
}
