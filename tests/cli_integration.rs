//! Exit status and output of the two binaries on bad input

use std::process::{Command, Output};

fn rand_io_perf(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rand_io_perf"))
        .args(args)
        .output()
        .expect("failed to run rand_io_perf")
}

fn micro_bench(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_micro_bench"))
        .args(args)
        .output()
        .expect("failed to run micro_bench")
}

#[test]
fn test_rand_io_usage_errors_exit_one() {
    let cases: [&[&str]; 5] = [
        &[],
        &["8"],
        &["eight", "/dev/null"],
        &["-q", "8", "/dev/null"],
        &["0", "/dev/null"],
    ];
    for args in cases {
        let output = rand_io_perf(args);
        assert_eq!(output.status.code(), Some(1), "args {:?}", args);
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Usage") || stderr.contains("usage"), "{}", stderr);
    }
}

#[test]
fn test_rand_io_missing_device() {
    let dir = tempfile::tempdir().unwrap();
    let device = dir.path().join("missing");
    let output = rand_io_perf(&["-w", "1", device.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot open block device"), "{}", stderr);
    assert!(!device.exists());
}

#[test]
#[ignore]
fn test_rand_io_full_run_on_file() {
    let temp = tempfile::NamedTempFile::new().unwrap();
    temp.as_file().set_len(4 * 1_048_576).unwrap();

    let output = rand_io_perf(&["-r", "4", temp.path().to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let rate: u64 = stdout.trim().strip_suffix(" iops/sec").unwrap().parse().unwrap();
    assert!(rate > 0);
}

#[test]
fn test_micro_unknown_benchmark() {
    let output = micro_bench(&["frobnicate", "1"]);
    assert_eq!(output.status.code(), Some(255));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_micro_parse_failures() {
    for args in [
        &["memset"][..],
        &["cpu", "0", "1", "2"],
        &["--frobnicate", "cpu", "0"],
        &["--dst_align", "3", "memset", "64", "1"],
        &["--src_align", "100", "memcpy", "64", "1"],
        &["--data_size", "0", "memset", "64", "1"],
        &["--lock_to_cpu"],
        &["sleep", "sleep", "1"],
        &["cpu", "0", "-5"],
    ] {
        let output = micro_bench(args);
        assert_eq!(output.status.code(), Some(255), "args {:?}", args);
        assert!(output.stdout.is_empty(), "args {:?}", args);
    }
}

#[test]
fn test_help_succeeds() {
    let output = micro_bench(&["--help"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--no_print_each_iter"));
    assert!(stdout.contains("memread NUM_BYTES"));
}
