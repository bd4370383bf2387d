use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("covmap")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("legend"));
}

#[test]
fn legend_subcommand_writes_png() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("heatmap.png");
    Command::cargo_bin("covmap")
        .unwrap()
        .args(["legend", "--width", "40", "--height", "2", "-o"])
        .arg(&out)
        .assert()
        .success();
    assert!(std::fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn stats_ranks_states_by_weekly_cases() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("states.csv");
    std::fs::write(
        &csv,
        "date,state,fips,cases,deaths\n\
         2020-04-01,Georgia,13,5,0\n\
         2020-04-01,Florida,12,10,0\n\
         2020-04-02,Georgia,13,6,0\n\
         2020-04-02,Florida,12,30,1\n",
    )
    .unwrap();
    let saved = dir.path().join("summary.json");
    Command::cargo_bin("covmap")
        .unwrap()
        .args(["stats", "--top", "1", "--states"])
        .arg(&csv)
        .arg("--save")
        .arg(&saved)
        .assert()
        .success()
        .stdout(predicate::str::contains("Florida • 30 cases total"))
        .stdout(predicate::str::contains("Georgia").not());
    assert!(saved.exists());
}

#[test]
fn report_requires_inputs() {
    Command::cargo_bin("covmap")
        .unwrap()
        .arg("report")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--national"));
}
