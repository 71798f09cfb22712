use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const THREE_BLOCKS_SPLIT: &str = "\
read1\t10\t0\t4\t+\t>A\t4\t0\t4\t0\t0\t255
read1\t10\t4\t6\t+\t>B2\t3\t0\t2\t0\t0\t255
read1\t10\t6\t7\t+\t>B2\t3\t2\t3\t0\t0\t255
read1\t10\t7\t10\t+\t>C\t3\t0\t3\t0\t0\t255
read2\t8\t0\t3\t+\t<C\t3\t0\t3\t0\t0\t255
";

fn sorted_lines(s: &str) -> Vec<String> {
    let mut lines: Vec<String> = s.lines().map(|l| l.to_string()).collect();
    lines.sort();
    lines
}

#[test]
fn command_invalid() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("foobar");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("recognized"));

    Ok(())
}

#[test]
fn command_chain_perfect() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    let output = cmd
        .arg("chain")
        .arg("tests/efg/two_blocks.gfa")
        .arg("tests/efg/two_blocks.gaf")
        .arg("--global")
        .arg("--no-split")
        .arg("--stats")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;

    assert!(output.status.success());
    assert_eq!(
        stdout,
        "q1\t8\t0\t4\t+\t>A\t4\t0\t4\t0\t0\t255\nq1\t8\t4\t8\t+\t>B\t4\t0\t4\t0\t0\t255\n"
    );
    assert!(stderr.contains("chained 2 seeds for 1 reads"));
    assert!(stderr.contains("max chaining cost is 0"));

    Ok(())
}

#[test]
fn command_chain_gz() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    let output = cmd
        .arg("chain")
        .arg("tests/efg/two_blocks.gfa")
        .arg("tests/efg/two_blocks.gaf.gz")
        .arg("--semi-global")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), 2);

    Ok(())
}

#[test]
fn command_chain_split() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    let output = cmd
        .arg("chain")
        .arg("tests/efg/three_blocks.gfa")
        .arg("tests/efg/three_blocks.gaf")
        .arg("--global")
        .arg("--stats")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;

    assert!(output.status.success());
    assert_eq!(stdout, THREE_BLOCKS_SPLIT);
    assert!(stderr.contains("chained 4 seeds for 2 reads"));
    assert!(stderr.contains("max chaining cost is 6"));

    Ok(())
}

#[test]
fn command_chain_drop_single() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    let output = cmd
        .arg("chain")
        .arg("tests/efg/three_blocks.gfa")
        .arg("tests/efg/three_blocks.gaf")
        .arg("--global")
        .arg("--split-drop-single")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), 4);
    assert!(!stdout.contains("read1\t10\t6\t7\t"));

    Ok(())
}

#[test]
fn command_chain_semi_global() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    let output = cmd
        .arg("chain")
        .arg("tests/efg/three_blocks.gfa")
        .arg("tests/efg/three_blocks.gaf")
        .arg("--semi-global")
        .arg("--no-split")
        .arg("--stats")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;

    assert!(output.status.success());
    assert_eq!(stdout.lines().count(), 3);
    assert!(stdout.contains("read1\t10\t0\t6\t+\t>A>B2\t7\t0\t6\t0\t0\t255"));
    // the leading gap of read2 only costs its query length
    assert!(stderr.contains("max chaining cost is 5"));

    Ok(())
}

#[test]
fn command_chain_parallel() -> anyhow::Result<()> {
    for threads in ["0", "3"] {
        for unsorted in [false, true] {
            let mut cmd = Command::cargo_bin("efgchain")?;
            cmd.arg("chain")
                .arg("tests/efg/three_blocks.gfa")
                .arg("tests/efg/three_blocks.gaf")
                .arg("--global")
                .arg("--parallel")
                .arg(threads);
            if unsorted {
                cmd.arg("--unsorted-input");
            }
            let output = cmd.output()?;
            let stdout = String::from_utf8(output.stdout)?;

            assert!(output.status.success());
            assert_eq!(sorted_lines(&stdout), sorted_lines(THREE_BLOCKS_SPLIT));
        }
    }

    Ok(())
}

#[test]
fn command_chain_non_contiguous() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("chain")
        .arg("tests/efg/three_blocks.gfa")
        .arg("tests/efg/non_contiguous.gaf")
        .arg("--global");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not contiguous"))
        .stderr(predicate::str::contains("--unsorted-input"));

    let mut cmd = Command::cargo_bin("efgchain")?;
    let output = cmd
        .arg("chain")
        .arg("tests/efg/three_blocks.gfa")
        .arg("tests/efg/non_contiguous.gaf")
        .arg("--global")
        .arg("--unsorted-input")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    assert_eq!(stdout, THREE_BLOCKS_SPLIT);

    Ok(())
}

#[test]
fn command_chain_alternative() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("efgchain")?;
    let output = cmd
        .arg("chain")
        .arg("tests/efg/three_blocks.gfa")
        .arg("tests/efg/three_blocks.gaf")
        .arg("--global")
        .arg("--no-split")
        .arg("--alternative-chains")
        .arg("1")
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;

    assert!(output.status.success());
    // the decoy of read1 forms the second chain
    assert!(stdout.contains("read1\t10\t7\t10\t+\t>C\t3\t0\t3\t0\t0\t255"));
    assert_eq!(stdout.lines().count(), 4);

    Ok(())
}

#[test]
fn command_chain_outfile() -> anyhow::Result<()> {
    let temp = tempdir()?;
    let outfile = temp.path().join("chains.gaf");

    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("chain")
        .arg("tests/efg/three_blocks.gfa")
        .arg("tests/efg/three_blocks.gaf")
        .arg("--global")
        .arg("-o")
        .arg(&outfile);
    cmd.assert().success().stdout(predicate::str::is_empty());

    assert_eq!(fs::read_to_string(&outfile)?, THREE_BLOCKS_SPLIT);

    Ok(())
}

#[test]
fn command_chain_bad_args() -> anyhow::Result<()> {
    // mode is required
    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("chain")
        .arg("tests/efg/two_blocks.gfa")
        .arg("tests/efg/two_blocks.gaf");
    cmd.assert().failure();

    // and exclusive
    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("chain")
        .arg("tests/efg/two_blocks.gfa")
        .arg("tests/efg/two_blocks.gaf")
        .arg("--global")
        .arg("--semi-global");
    cmd.assert().failure();

    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("chain")
        .arg("tests/efg/two_blocks.gfa")
        .arg("tests/efg/two_blocks.gaf")
        .arg("--global")
        .arg("--ramp-up-factor")
        .arg("1");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("greater than 1"));

    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("chain")
        .arg("tests/efg/missing.gfa")
        .arg("tests/efg/two_blocks.gaf")
        .arg("--global");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("could not open"));

    Ok(())
}

#[test]
fn command_chain_unknown_node() -> anyhow::Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("anchors.gaf");
    fs::write(&input, "q1\t8\t0\t4\t+\t>Z\t4\t0\t4\t4\t4\t60\n")?;

    let mut cmd = Command::cargo_bin("efgchain")?;
    cmd.arg("chain")
        .arg("tests/efg/two_blocks.gfa")
        .arg(&input)
        .arg("--global");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown node id `Z`"));

    Ok(())
}
