use assert_cmd::Command;
use std::fs;
use tempfile::tempdir;

fn takcard(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("takcard").unwrap();
    cmd.arg("--db")
        .arg(dir.join("words.db"))
        .arg("--settings")
        .arg(dir.join("settings.json"));
    cmd
}

#[test]
fn import_then_list_words() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("vocab.csv");
    fs::write(&csv, "english,vietnamese\nhello,xin chào\ncat,con mèo\n").unwrap();

    let out = takcard(dir.path()).arg("import").arg(&csv).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("imported 2 words"), "{stdout}");

    let out = takcard(dir.path()).arg("import").arg(&csv).output().unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("imported 0 words (2 skipped"), "{stdout}");

    let out = takcard(dir.path()).args(["words", "--search", "mèo"]).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("cat"));
    assert!(!stdout.contains("hello"));
}

#[test]
fn quiz_without_words_says_so() {
    let dir = tempdir().unwrap();
    let out = takcard(dir.path()).arg("quiz").write_stdin("").output().unwrap();
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("no words in the dictionary"));
}

#[test]
fn quiz_ended_early_lands_in_history() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("vocab.csv");
    fs::write(&csv, "english,vietnamese\nwater,nước\n").unwrap();
    takcard(dir.path()).arg("import").arg(&csv).assert().success();

    let out = takcard(dir.path())
        .args(["quiz", "--mode", "testing", "--questions", "3"])
        .write_stdin("nước\n:q\n")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("correct (+10), score 10"), "{stdout}");
    assert!(stdout.contains("1/2 correct"), "{stdout}");

    let out = takcard(dir.path()).arg("history").output().unwrap();
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("testing"), "{stdout}");
    assert!(stdout.contains("score    10"), "{stdout}");
}

#[test]
fn settings_are_saved_and_rejected_when_out_of_range() {
    let dir = tempdir().unwrap();
    let out = takcard(dir.path())
        .args(["settings", "--difficulty", "5", "--reveal", "limit:2"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let saved = fs::read_to_string(dir.path().join("settings.json")).unwrap();
    assert!(saved.contains("\"difficulty\": 5"));
    assert!(saved.contains("\"max_uses\": 2"));

    takcard(dir.path())
        .args(["settings", "--reveal", "time"])
        .assert()
        .success();
    let saved = fs::read_to_string(dir.path().join("settings.json")).unwrap();
    assert!(saved.contains("\"seconds\": 10"));

    takcard(dir.path())
        .args(["settings", "--difficulty", "9"])
        .assert()
        .failure();
    takcard(dir.path())
        .args(["settings", "--reveal", "hp"])
        .assert()
        .failure();
}
