use assert_cmd::Command;
use predicates::prelude::predicate::str;

#[test]
fn part1_2_output_right_answer() {
    let mut cmd = Command::cargo_bin("part1_2").unwrap();
    cmd.arg("inputs.txt");

    cmd.assert()
        .success()
        .stdout(str::contains(
            "The sum of correctly ordered packet pair indices is 13",
        ))
        .stdout(str::contains("The decoder key is 140"));
}

#[test]
fn part1_2_reports_divider_positions() {
    let mut cmd = Command::cargo_bin("part1_2").unwrap();

    cmd.assert()
        .success()
        .stderr(str::contains("Found divider packet [[2]] at 10."))
        .stderr(str::contains("Found divider packet [[6]] at 14."));
}

#[test]
fn part1_2_rejects_malformed_packet() {
    let mut cmd = Command::cargo_bin("part1_2").unwrap();
    cmd.arg("malformed.txt");

    cmd.assert()
        .failure()
        .stderr(str::contains("line 2([1,(2)])"))
        .stderr(str::contains("Invalid character(()"));
}

#[test]
fn part1_2_fails_on_missing_file() {
    let mut cmd = Command::cargo_bin("part1_2").unwrap();
    cmd.arg("no_such_file.txt");

    cmd.assert()
        .failure()
        .stderr(str::contains("no_such_file.txt"));
}

#[test]
fn part1_2_handles_deeply_nested_packets() {
    let mut cmd = Command::cargo_bin("part1_2").unwrap();
    cmd.arg("deep.txt");

    cmd.assert()
        .success()
        .stdout(str::contains(
            "The sum of correctly ordered packet pair indices is 1",
        ))
        .stdout(str::contains("The decoder key is 3"));
}
