use fs2::FileExt;
use lopdf::content::{Content, Operation};
use lopdf::{Object, Stream, dictionary};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const ARTICLE: &str = "The city council met on Tuesday to debate the transit budget. \
Members argued for more frequent buses on the eastern routes. \
The mayor proposed funding the plan through a small parking levy. \
Several residents spoke in favour of protected bike lanes. \
Opponents warned that the levy would hurt downtown shops. \
After a long debate the council approved the budget by seven votes to two.";

fn docsum(home: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("docsum");
    cmd.current_dir(home)
        .env("DOCSUM_HOME", home)
        .env_remove("DOCSUM_CONFIG_PATH")
        .env_remove("DOCSUM_LOCK_FILE")
        .env_remove("DOCSUM_API_URL")
        .env_remove("HF_API_TOKEN")
        .env_remove("DOCSUM_API_TOKEN");
    cmd
}

fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations }.encode().expect("encode content");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).expect("write pdf");
}

#[test]
fn short_input_is_rejected_before_any_call() {
    let tmp = tempdir().expect("tempdir");

    docsum(tmp.path())
        .args(["summarize", "--text", "Far too short to summarize."])
        .assert()
        .failure()
        .stdout(predicate::str::contains("E001_INPUT_TOO_SHORT"))
        .stdout(predicate::str::contains("provide more content"));
}

#[test]
fn segment_summaries_come_from_the_inference_endpoint() {
    let tmp = tempdir().expect("tempdir");
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/")
        .match_header("authorization", "Bearer hf_cli_test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"summary_text": "The council approved a transit budget funded by a parking levy."}]"#)
        .expect(1)
        .create();

    docsum(tmp.path())
        .env("DOCSUM_API_URL", server.url())
        .env("HF_API_TOKEN", "hf_cli_test")
        .args(["summarize", "--text", ARTICLE])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The council approved a transit budget funded by a parking levy.",
        ))
        .stdout(predicate::str::contains("used_fallback=false"))
        .stderr(predicate::str::contains("processing segment 1 of 1"));

    mock.assert();
}

#[test]
fn missing_credential_falls_back_to_extractive_summary() {
    let tmp = tempdir().expect("tempdir");

    docsum(tmp.path())
        .args(["summarize", "--text", ARTICLE])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The city council met on Tuesday to debate the transit budget.",
        ))
        .stdout(predicate::str::contains("used_fallback=true"))
        .stdout(predicate::str::contains("warning[E005_CONFIG_MISSING]"))
        .stdout(predicate::str::contains("warning[E007_ALL_SEGMENTS_EMPTY]"));
}

#[test]
fn json_report_carries_the_structured_result() {
    let tmp = tempdir().expect("tempdir");
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_body("upstream exploded")
        .create();

    let output = docsum(tmp.path())
        .env("DOCSUM_API_URL", server.url())
        .env("DOCSUM_API_TOKEN", "hf_cli_test")
        .args(["summarize", "--json", "--key-points", "2", "--text", ARTICLE])
        .output()
        .expect("run docsum");
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).expect("json report");
    assert_eq!(report["command"], "summarize");
    assert_eq!(report["ok"], true);
    assert_eq!(report["data"]["used_fallback"], true);
    assert_eq!(report["data"]["metrics"]["segments_submitted"], 1);
    assert_eq!(report["data"]["metrics"]["segments_succeeded"], 0);
    assert_eq!(
        report["data"]["key_points"].as_array().map(Vec::len),
        Some(2)
    );
}

#[test]
fn plain_text_file_is_summarized() {
    let tmp = tempdir().expect("tempdir");
    let notes = tmp.path().join("notes.txt");
    fs::write(&notes, format!("\n\n{ARTICLE}\n")).expect("write notes");

    docsum(tmp.path())
        .arg("summarize")
        .arg("--file")
        .arg(&notes)
        .assert()
        .success()
        .stdout(predicate::str::contains("source.kind=PlainText"));
}

#[test]
fn pdf_file_is_summarized_page_by_page() {
    let tmp = tempdir().expect("tempdir");
    let pdf = tmp.path().join("report.pdf");
    write_pdf(&pdf, &["First page text.", "", "Third page text."]);

    docsum(tmp.path())
        .env("DOCSUM_MIN_INPUT_CHARS", "10")
        .arg("summarize")
        .arg("--file")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("source.kind=Pdf"))
        .stdout(predicate::str::contains("source.pages_total=3"))
        .stdout(predicate::str::contains("source.pages_skipped=1"))
        .stdout(predicate::str::contains("First page text. Third page text."));
}

#[test]
fn stdin_is_read_when_no_input_flag_is_given() {
    let tmp = tempdir().expect("tempdir");

    docsum(tmp.path())
        .arg("summarize")
        .write_stdin(ARTICLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("source.origin=stdin"));
}

#[test]
fn unreadable_file_is_reported() {
    let tmp = tempdir().expect("tempdir");

    docsum(tmp.path())
        .arg("summarize")
        .arg("--file")
        .arg(tmp.path().join("missing.txt"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("E004_SOURCE_UNREADABLE"));
}

#[test]
fn concurrent_run_is_refused_while_lock_is_held() {
    let tmp = tempdir().expect("tempdir");
    let lock_path = tmp.path().join("docsum.lock");
    let held = fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .expect("open lock");
    held.try_lock_exclusive().expect("hold lock");

    docsum(tmp.path())
        .args(["summarize", "--text", ARTICLE])
        .assert()
        .failure()
        .stdout(predicate::str::contains("E002_ALREADY_RUNNING"));

    FileExt::unlock(&held).expect("release lock");
}
