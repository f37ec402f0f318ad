#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use bytes::BytesMut;
use tlmsync::frame::{encode_stream, RecordSpec};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/tlmsync-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn tlmsync() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tlmsync"));
    cmd.arg("--log-level").arg("error");
    cmd
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

fn battery_capture() -> Vec<u8> {
    let frame = [
        RecordSpec::float(0, 1, 0, 3.7),
        RecordSpec::float(0, 1, 1, 3.7),
    ];
    let mut wire = BytesMut::new();
    // Leading noise the synchronizer has to skip.
    wire.extend_from_slice(&[0x12, 0x34, 0xFF, 0x00]);
    encode_stream(&[&frame, &frame], &mut wire).expect("frames should encode");
    wire.to_vec()
}

#[test]
fn replay_file_emits_battery_readings_as_json() {
    let dir = unique_temp_dir("replay");
    let capture = dir.join("capture.bin");
    std::fs::write(&capture, battery_capture()).expect("capture should be writable");

    let output = tlmsync()
        .arg("--format")
        .arg("json")
        .arg("replay")
        .arg(&capture)
        .output()
        .expect("replay should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let readings = json_lines(&output);
    assert_eq!(readings.len(), 4);
    assert_eq!(readings[0]["name"], "battery_1_voltage");
    assert_eq!(readings[0]["value"], "3.7v");
    assert_eq!(readings[1]["name"], "battery_2_voltage");
    assert_eq!(readings[1]["value"], "3.7v");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn encode_output_replays_from_stdin() {
    let encoded = tlmsync()
        .arg("encode")
        .arg("--record")
        .arg("0:1:0:3.7")
        .arg("--record")
        .arg("0x00:0x01:0x01:3.7")
        .arg("--frames")
        .arg("3")
        .output()
        .expect("encode should run");
    assert!(encoded.status.success());
    assert!(!encoded.stdout.is_empty());

    let mut child = tlmsync()
        .arg("--format")
        .arg("json")
        .arg("replay")
        .arg("-")
        .arg("--latest")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("replay should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(&encoded.stdout)
        .expect("stdin should accept capture");
    let output = child.wait_with_output().expect("replay should finish");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("battery_1_voltage"));
    assert!(stdout.contains("battery_2_voltage"));
    assert!(stdout.contains("3.7v"));
}

#[test]
fn table_lists_builtin_entries() {
    let output = tlmsync()
        .arg("--format")
        .arg("json")
        .arg("table")
        .output()
        .expect("table should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("battery_1_voltage"));
    assert!(stdout.contains("battery_2_voltage"));
}

#[test]
fn zero_chunk_size_is_a_usage_error() {
    let dir = unique_temp_dir("chunk");
    let capture = dir.join("capture.bin");
    std::fs::write(&capture, battery_capture()).expect("capture should be writable");

    let output = tlmsync()
        .arg("replay")
        .arg(&capture)
        .arg("--chunk-size")
        .arg("0")
        .output()
        .expect("replay should run");

    assert_eq!(output.status.code(), Some(64));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_table_file_fails() {
    let output = tlmsync()
        .arg("--table")
        .arg("/nonexistent/tlmsync-table.json")
        .arg("table")
        .output()
        .expect("table should run");

    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn malformed_encode_record_is_a_usage_error() {
    let output = tlmsync()
        .arg("encode")
        .arg("--record")
        .arg("0:1:0")
        .output()
        .expect("encode should run");

    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn follow_capture_prints_every_reading_before_eof() {
    let dir = unique_temp_dir("follow");
    let capture = dir.join("capture.bin");
    std::fs::write(&capture, battery_capture()).expect("capture should be writable");

    let output = tlmsync()
        .arg("--format")
        .arg("json")
        .arg("follow")
        .arg(&capture)
        .arg("--interval")
        .arg("1ms")
        .output()
        .expect("follow should run");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let readings = json_lines(&output);
    let names: Vec<&str> = readings
        .iter()
        .map(|r| r["name"].as_str().expect("name should be a string"))
        .collect();
    assert_eq!(
        names,
        [
            "battery_1_voltage",
            "battery_2_voltage",
            "battery_1_voltage",
            "battery_2_voltage"
        ]
    );
    assert!(readings.iter().all(|r| r["value"] == "3.7v"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn follow_count_stops_after_n_readings() {
    let dir = unique_temp_dir("follow-count");
    let capture = dir.join("capture.bin");
    std::fs::write(&capture, battery_capture()).expect("capture should be writable");

    let output = tlmsync()
        .arg("--format")
        .arg("json")
        .arg("follow")
        .arg(&capture)
        .arg("--interval")
        .arg("1ms")
        .arg("--count")
        .arg("1")
        .output()
        .expect("follow should run");

    assert_eq!(output.status.code(), Some(0));
    let readings = json_lines(&output);
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0]["name"], "battery_1_voltage");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn follow_missing_path_fails() {
    let output = tlmsync()
        .arg("follow")
        .arg("/nonexistent/tlmsync-capture.bin")
        .arg("--interval")
        .arg("1ms")
        .output()
        .expect("follow should run");

    assert!(!output.status.success());
}

#[test]
fn whole_number_voltage_keeps_fractional_digit() {
    let dir = unique_temp_dir("whole");
    let capture = dir.join("capture.bin");
    let mut wire = BytesMut::new();
    encode_stream(
        &[&[RecordSpec::float(0, 1, 0, 12.0), RecordSpec::float(0, 1, 1, 0.0)]],
        &mut wire,
    )
    .expect("frame should encode");
    std::fs::write(&capture, &wire).expect("capture should be writable");

    let output = tlmsync()
        .arg("--format")
        .arg("json")
        .arg("replay")
        .arg(&capture)
        .output()
        .expect("replay should run");

    assert!(output.status.success());
    let readings = json_lines(&output);
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0]["value"], "12.0v");
    assert_eq!(readings[1]["value"], "0.0v");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn max_check_size_beyond_input_queue_is_a_usage_error() {
    let dir = unique_temp_dir("window");
    let capture = dir.join("capture.bin");
    std::fs::write(&capture, battery_capture()).expect("capture should be writable");

    let output = tlmsync()
        .arg("--max-check-size")
        .arg("9000")
        .arg("replay")
        .arg(&capture)
        .output()
        .expect("replay should run");

    assert_eq!(output.status.code(), Some(64));
    let _ = std::fs::remove_dir_all(dir);
}
