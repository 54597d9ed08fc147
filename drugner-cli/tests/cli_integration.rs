//! Testes de integração do binário `drugner`

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const DOC_A: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document id="DDI-DrugBank.d1">
  <sentence id="DDI-DrugBank.d1.s0" text="Take acetyl salicylic acid now.">
    <entity id="DDI-DrugBank.d1.s0.e0" charOffset="5-25" type="drug" text="acetyl salicylic acid"/>
  </sentence>
  <sentence id="DDI-DrugBank.d1.s1" text="No interaction.">
  </sentence>
</document>"#;

const DOC_B: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<document id="DDI-MedLine.d2">
  <sentence id="DDI-MedLine.d2.s0" text="Beta and alpha blockers">
    <entity id="DDI-MedLine.d2.s0.e0" charOffset="0-3;15-22" type="group" text="Beta blockers"/>
  </sentence>
</document>"#;

const DOC_OUT_OF_RANGE: &str = r#"<document id="d3">
  <sentence id="d3.s0" text="Take aspirin">
    <entity id="d3.s0.e0" charOffset="40-47" type="drug" text="aspirin"/>
  </sentence>
</document>"#;

fn corpus(docs: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, xml) in docs {
        fs::write(dir.path().join(name), xml).unwrap();
    }
    dir
}

fn drugner(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("drugner").unwrap();
    cmd.env_remove("RUST_LOG").env_remove("DRUGNER_CONFIG").arg(dir);
    cmd
}

#[test]
fn test_crfsuite_table_on_stdout() {
    let dir = corpus(&[("a.xml", DOC_A), ("b.xml", DOC_B)]);
    let output = drugner(dir.path()).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();

    assert!(lines[0].starts_with("DDI-DrugBank.d1.s0\tTake\t0\t3\tO\tform=Take\t"));
    assert!(lines[1].starts_with("DDI-DrugBank.d1.s0\tacetyl\t5\t10\tB-drug\t"));
    assert!(lines[2].starts_with("DDI-DrugBank.d1.s0\tsalicylic\t12\t20\tI-drug\t"));
    assert!(lines[3].starts_with("DDI-DrugBank.d1.s0\tacid\t22\t25\tI-drug\t"));
    assert!(lines[4].starts_with("DDI-DrugBank.d1.s0\tnow\t27\t29\tO\t"));
    assert!(lines[5].starts_with("DDI-DrugBank.d1.s0\t.\t30\t30\tO\t"));
    assert!(lines[5].contains("\tEoS\t"));
    assert_eq!(lines[6], "");

    // Documentos em ordem de nome de arquivo; entidade descontínua usa só "Beta"
    let beta = lines
        .iter()
        .find(|l| l.starts_with("DDI-MedLine.d2.s0\tBeta\t"))
        .unwrap();
    assert!(beta.contains("\tB-group\t"));
    let blockers = lines
        .iter()
        .find(|l| l.starts_with("DDI-MedLine.d2.s0\tblockers\t"))
        .unwrap();
    assert!(blockers.contains("\tO\t"));
    assert!(stdout.ends_with("\n\n"));
}

#[test]
fn test_jsonl_format() {
    let dir = corpus(&[("a.xml", DOC_A)]);
    drugner(dir.path())
        .args(["--format", "jsonl"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""token":"acetyl""#))
        .stdout(predicate::str::contains(r#""tag":"B-drug""#));
}

#[test]
fn test_output_file() {
    let dir = corpus(&[("a.xml", DOC_A)]);
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("train.feat");

    drugner(dir.path())
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = fs::read_to_string(&out).unwrap();
    assert!(content.contains("\tsalicylic\t12\t20\tI-drug\t"));
}

#[test]
fn test_lenient_mode_tags_out_of_range_span_as_o() {
    let dir = corpus(&[("c.xml", DOC_OUT_OF_RANGE)]);
    drugner(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("d3.s0\taspirin\t5\t11\tO\t"));
}

#[test]
fn test_strict_mode_fails_on_out_of_range_span() {
    let dir = corpus(&[("c.xml", DOC_OUT_OF_RANGE)]);
    drugner(dir.path())
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside sentence"));
}

#[test]
fn test_malformed_document_aborts_by_default() {
    let dir = corpus(&[("a.xml", DOC_A), ("b.xml", "<document><sentence id=\"x\"/></document>")]);
    drugner(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required attribute"));
}

#[test]
fn test_abort_keeps_earlier_documents_and_stops() {
    let dir = corpus(&[("a.xml", DOC_A), ("b.xml", "<document>"), ("c.xml", DOC_B)]);
    drugner(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("DDI-DrugBank.d1.s0\tacetyl"))
        .stdout(predicate::str::contains("DDI-MedLine.d2.s0").not())
        .stderr(predicate::str::contains("b.xml"));
}

#[test]
fn test_keep_going_skips_malformed_document() {
    let dir = corpus(&[("a.xml", DOC_A), ("b.xml", "<document>"), ("c.xml", DOC_B)]);
    drugner(dir.path())
        .arg("--keep-going")
        .assert()
        .success()
        .stdout(predicate::str::contains("DDI-DrugBank.d1.s0\tacetyl"))
        .stdout(predicate::str::contains("DDI-MedLine.d2.s0\tBeta"));
}

#[test]
fn test_parallel_output_matches_sequential() {
    let dir = corpus(&[("a.xml", DOC_A), ("b.xml", DOC_B), ("c.xml", DOC_OUT_OF_RANGE)]);
    let sequential = drugner(dir.path()).output().unwrap();
    let parallel = drugner(dir.path()).arg("--parallel").output().unwrap();
    assert!(sequential.status.success());
    assert_eq!(sequential.stdout, parallel.stdout);
}

#[test]
fn test_config_enables_contributors() {
    let dir = corpus(&[("a.xml", DOC_A)]);
    let res = TempDir::new().unwrap();
    fs::write(res.path().join("HSDB.txt"), "acid\nsalicylic\n").unwrap();
    fs::write(
        res.path().join("drugner.toml"),
        "[contributors]\ndigits = true\nlexicon = true\ndrug_lists = [\"HSDB.txt\"]\n",
    )
    .unwrap();

    let output = drugner(dir.path())
        .arg("--config")
        .arg(res.path().join("drugner.toml"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let salicylic = stdout
        .lines()
        .find(|l| l.contains("\tsalicylic\t"))
        .unwrap();
    assert!(salicylic.ends_with("\thas_punct=No\thas_numbers=No\tisDrug=1\tisDrugLower=1"));
}

#[test]
fn test_missing_input_dir_fails() {
    drugner(Path::new("/nonexistent/corpus"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read corpus directory"));
}
