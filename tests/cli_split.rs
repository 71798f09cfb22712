use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn command_split() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    let output = cmd
        .arg("split")
        .arg("tests/efg/three_blocks.gfa")
        .arg("tests/efg/three_blocks.gaf")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(
        stdout,
        "\
read1\t10\t0\t4\t+\t>A\t4\t0\t4\t0\t0\t255
read1\t10\t4\t6\t+\t>B2\t3\t0\t2\t0\t0\t255
read1\t10\t7\t10\t+\t>C\t3\t0\t3\t0\t0\t255
read1\t10\t7\t10\t+\t>C\t3\t0\t3\t0\t0\t255
read2\t8\t0\t3\t+\t<C\t3\t0\t3\t0\t0\t255
"
    );

    Ok(())
}

#[test]
fn command_split_keep_single() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    let output = cmd
        .arg("split")
        .arg("tests/efg/three_blocks.gfa")
        .arg("tests/efg/three_blocks.gaf")
        .arg("--keep-single")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), 6);
    assert!(stdout.contains("read1\t10\t6\t7\t+\t>B2\t3\t2\t3\t0\t0\t255"));

    Ok(())
}

#[test]
fn command_split_stdin() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("split")
        .arg("tests/efg/two_blocks.gfa")
        .arg("stdin")
        .write_stdin("q1\t8\t1\t7\t+\t>A>B\t8\t1\t7\t6\t6\t60\n");
    cmd.assert().success().stdout(predicate::str::diff(
        "q1\t8\t1\t4\t+\t>A\t4\t1\t4\t0\t0\t255\nq1\t8\t4\t7\t+\t>B\t4\t0\t3\t0\t0\t255\n",
    ));

    Ok(())
}

#[test]
fn command_split_bad_record() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("split")
        .arg("tests/efg/two_blocks.gfa")
        .arg("stdin")
        .write_stdin("q1\t8\t1\t7\t-\t>A>B\t8\t1\t7\n");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("forward strand"));

    Ok(())
}
