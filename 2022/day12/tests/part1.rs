use assert_cmd::Command;
use predicates::prelude::predicate::str;

#[test]
fn part1_output_right_answer() {
    let mut cmd = Command::cargo_bin("part1").unwrap();
    cmd.arg("inputs.txt");

    cmd.assert()
        .success()
        .stdout(str::contains("Shortest path is 31"));
}

#[test]
fn part1_reads_default_input_path() {
    let mut cmd = Command::cargo_bin("part1").unwrap();

    cmd.assert()
        .success()
        .stdout(str::contains("Shortest path is 31"));
}

#[test]
fn part1_fails_when_end_is_unreachable() {
    let mut cmd = Command::cargo_bin("part1").unwrap();
    cmd.arg("unreachable.txt");

    cmd.assert()
        .failure()
        .stderr(str::contains("There's no path from (0, 0) to (0, 4)"));
}

#[test]
fn part1_fails_on_missing_file() {
    let mut cmd = Command::cargo_bin("part1").unwrap();
    cmd.arg("no_such_file.txt");

    cmd.assert()
        .failure()
        .stderr(str::contains("no_such_file.txt"));
}
