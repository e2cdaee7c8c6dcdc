use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*;
use std::path::{PathBuf,Path};
use std::process::Command; // Run programs
use tempfile;
type STDRESULT = Result<(),Box<dyn std::error::Error>>;

// Write test data into the temporary directory, returning its path.
fn write_input(temp_dir: &tempfile::TempDir,name: &str,dat: &[u8]) -> Result<PathBuf,Box<dyn std::error::Error>> {
    let path = temp_dir.path().join(name);
    std::fs::write(&path,dat)?;
    Ok(path)
}

fn run(subcommand: &str,in_path: &Path,out_path: &Path) -> STDRESULT {
    let mut cmd = Command::cargo_bin("huffcompressor")?;
    cmd.arg(subcommand)
        .arg("-i").arg(in_path)
        .arg("-o").arg(out_path)
        .assert()
        .success();
    Ok(())
}

fn round_trip_test(dat: &[u8]) -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_input(&temp_dir,"original.bin",dat)?;
    let cmp_path = temp_dir.path().join("compressed.huf");
    let out_path = temp_dir.path().join("expanded.bin");
    run("compress",&in_path,&cmp_path)?;
    run("expand",&cmp_path,&out_path)?;
    match std::fs::read(out_path) {
        Ok(v) => assert_eq!(v,dat.to_vec()),
        _ => panic!("unable to read expanded file")
    }
    Ok(())
}

#[test]
fn text_round_trip() -> STDRESULT {
    let mut dat = Vec::new();
    for _i in 0..200 {
        dat.append(&mut "I am Sam. Sam I am. I do not like this Sam I am.\r\n".as_bytes().to_vec());
    }
    round_trip_test(&dat)
}

#[test]
fn binary_round_trip() -> STDRESULT {
    let dat: Vec<u8> = (0..=255).chain((0..=255).rev()).collect();
    round_trip_test(&dat)?;
    round_trip_test(&[0xff;1000])?;
    round_trip_test(&[])
}

#[test]
fn compressed_format() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_input(&temp_dir,"aaab.txt","AAAB".as_bytes())?;
    let out_path = temp_dir.path().join("aaab.huf");
    let mut cmd = Command::cargo_bin("huffcompressor")?;
    cmd.arg("compress")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("compressed 4 into 12"));
    assert_eq!(std::fs::read(out_path)?,vec![0,0,0,4,0,1,0,0x41,1,0,0x42,0x10]);
    Ok(())
}

#[test]
fn corrupt_file_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_input(&temp_dir,"bad.huf",&[0,0,0,4,9,1,0,0x41])?;
    let out_path = temp_dir.path().join("bad.txt");
    let mut cmd = Command::cargo_bin("huffcompressor")?;
    cmd.arg("expand")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidTreeFlag(9)"));
    Ok(())
}

#[test]
fn bad_invocation_fails() -> STDRESULT {
    let temp_dir = tempfile::tempdir()?;
    let in_path = write_input(&temp_dir,"x.txt","xyz".as_bytes())?;
    let out_path = temp_dir.path().join("x.huf");
    let mut cmd = Command::cargo_bin("huffcompressor")?;
    cmd.arg("squash")
        .arg("-i").arg(&in_path)
        .arg("-o").arg(&out_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("squash"));
    let mut cmd = Command::cargo_bin("huffcompressor")?;
    cmd.arg("compress")
        .arg("-i").arg(&in_path)
        .assert()
        .failure();
    assert!(!out_path.exists());
    Ok(())
}
