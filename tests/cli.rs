use assert_cmd::Command;

mod common;

#[test]
fn runs() {
    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.assert().success();
}

#[test]
fn outputs_tool_name() {
    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.arg("-V");
    cmd.assert().success().stdout("sbd 0.1.0\n");
}

// Split subcommand tests

#[test]
fn split_prints_text_report() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let patches = temp.path().join("patches");
    common::create_patches(&patches, &["a", "b", "c", "d"], &["a", "b", "c"]);

    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.arg("split")
        .arg(&patches)
        .arg(temp.path().join("out"))
        .args(["--seed", "5"]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("Split 3 labeled image(s)"))
        .stdout(predicates::str::contains("skipped 1 image(s) without labels"))
        .stdout(predicates::str::contains("nc=1, names=[class0]"));

    assert!(temp.path().join("out/data.yaml").is_file());
}

#[test]
fn split_json_output_format() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let patches = temp.path().join("patches");
    common::create_numbered_patches(&patches, 10, 10);

    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.arg("split")
        .arg(&patches)
        .arg(temp.path().join("out"))
        .args(["--class", "boat", "--class", "ship", "--output", "json"]);
    let output = cmd.assert().success().get_output().stdout.clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("parse json report");
    assert_eq!(report["labeled_images"], 10);
    assert_eq!(report["nc"], 2);
    assert_eq!(report["splits"][0]["images"], 7);
    assert_eq!(report["splits"][1]["images"], 2);
    assert_eq!(report["splits"][2]["images"], 1);
}

#[test]
fn split_custom_ratios() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let patches = temp.path().join("patches");
    let output = temp.path().join("out");
    common::create_numbered_patches(&patches, 10, 10);

    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.arg("split").arg(&patches).arg(&output).args([
        "--train-ratio",
        "0.5",
        "--val-ratio",
        "0.5",
        "--test-ratio",
        "0",
    ]);
    cmd.assert().success();

    assert_eq!(common::file_names(&output.join("train/images")).len(), 5);
    assert_eq!(common::file_names(&output.join("val/images")).len(), 5);
    assert!(common::file_names(&output.join("test/images")).is_empty());
}

#[test]
fn split_missing_source_layout_fails() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.arg("split")
        .arg(temp.path().join("nowhere"))
        .arg(temp.path().join("out"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("Invalid patch layout"));
}

// Train subcommand tests

#[test]
fn train_requires_split_paths() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.arg("train")
        .arg("--output-dir")
        .arg(temp.path().join("runs"))
        .args(["--train-images", "t"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("--from-split"));
}

#[test]
fn train_rejects_malformed_override() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.arg("train")
        .arg("--output-dir")
        .arg(temp.path().join("runs"))
        .args(["--train-images", "t", "--val-images", "v", "--set", "device"]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("not key=value"));
}

#[cfg(unix)]
#[test]
fn train_prints_best_model_path() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let runs = temp.path().join("runs");

    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.arg("train")
        .arg("--output-dir")
        .arg(&runs)
        .args([
            "--train-images",
            "t",
            "--val-images",
            "v",
            "--class",
            "boat",
            "--name",
            "boats",
            "--yolo-bin",
            "true",
        ]);
    cmd.assert()
        .success()
        .stdout(predicates::str::contains("boats/weights/best.pt"));

    assert!(runs.join("data.yaml").is_file());
}

#[cfg(unix)]
#[test]
fn train_reads_paths_from_split_output() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let patches = temp.path().join("patches");
    let splits = temp.path().join("splits");
    let runs = temp.path().join("runs");
    common::create_numbered_patches(&patches, 5, 5);

    Command::cargo_bin("sbd")
        .unwrap()
        .arg("split")
        .arg(&patches)
        .arg(&splits)
        .args(["--class", "boat"])
        .assert()
        .success();

    Command::cargo_bin("sbd")
        .unwrap()
        .env("SBD_YOLO_BIN", "true")
        .arg("train")
        .arg("--output-dir")
        .arg(&runs)
        .arg("--from-split")
        .arg(&splits)
        .assert()
        .success();

    let yaml = std::fs::read_to_string(runs.join("data.yaml")).expect("read run yaml");
    assert!(yaml.contains("train/images"));
    assert!(yaml.contains("- boat"));
}

#[cfg(unix)]
#[test]
fn train_reports_trainer_failure() {
    let temp = tempfile::tempdir().expect("create temp dir");

    let mut cmd = Command::cargo_bin("sbd").unwrap();
    cmd.arg("train")
        .arg("--output-dir")
        .arg(temp.path().join("runs"))
        .args([
            "--train-images",
            "t",
            "--val-images",
            "v",
            "--yolo-bin",
            "false",
        ]);
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("exited unsuccessfully"));
}
