use std::fs;
use std::path::PathBuf;

use attercop::pipeline::{ExtractPipeline, Pipeline, PreprocessPipeline};
use attercop::text::{PreprocessConfig, Standardizer};
use attercop::tweet::{ExtractOptions, TweetConfig};
use serde_json::Value;

fn status(id: &str, text: &str) -> String {
    format!(
        r#"{{"id_str": "{id}", "text": "{text}", "lang": "en", "user": {{"id_str": "u{id}", "screen_name": "someone"}}}}"#
    )
}

fn read_records(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn extract_no_source() {
    let src = PathBuf::from("svdkjljlkmjlmdsfljkf");
    let dst = PathBuf::from("fzjoijzoecijzoiej");

    let p = ExtractPipeline::new(
        src,
        dst,
        TweetConfig::default(),
        ExtractOptions::default(),
        false,
    );
    assert!(p.run().is_err());
}

#[test]
fn extract_keeps_input_order_and_skips_bad_lines() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("statuses.jsonl");
    let dst = dir.path().join("extracted.jsonl");

    let lines = [
        status("1", "first"),
        String::new(),
        status("2", "second"),
        "not json at all".to_string(),
        status("3", "third"),
    ];
    fs::write(&src, lines.join("\n")).unwrap();

    let p = ExtractPipeline::new(
        src,
        dst.clone(),
        TweetConfig::default(),
        ExtractOptions::default(),
        false,
    );
    p.run().unwrap();

    let records = read_records(&dst);
    assert_eq!(records.len(), 3);
    let ids: Vec<&str> = records
        .iter()
        .map(|record| record["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(records[0]["text"], "first");
    assert_eq!(records[0]["user.screen_name"], "someone");
}

#[test]
fn extract_full_shape_keeps_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("statuses.jsonl");
    let dst = dir.path().join("extracted.jsonl");
    fs::write(&src, status("1", "hello")).unwrap();

    let p = ExtractPipeline::new(
        src,
        dst.clone(),
        TweetConfig::default(),
        ExtractOptions::default(),
        false,
    );
    p.run().unwrap();

    let records = read_records(&dst);
    let record = records[0].as_object().unwrap();
    assert!(record.contains_key("in_reply_to_status_id"));
    assert!(record["in_reply_to_status_id"].is_null());
    assert_eq!(record["is_retweet"], false);
}

#[test]
fn extract_compact_shape_drops_nulls() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("statuses.jsonl");
    let dst = dir.path().join("extracted.jsonl");
    fs::write(&src, status("1", "hello")).unwrap();

    let p = ExtractPipeline::new(
        src,
        dst.clone(),
        TweetConfig::default(),
        ExtractOptions::default(),
        true,
    );
    p.run().unwrap();

    let records = read_records(&dst);
    let record = records[0].as_object().unwrap();
    assert_eq!(record["id"], "1");
    assert!(!record.contains_key("in_reply_to_status_id"));
    assert!(!record.contains_key("is_retweet"));
    assert_eq!(record["user"]["screen_name"], "someone");
}

#[test]
fn preprocess_no_text_column() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("rows.csv");
    let dst = dir.path().join("preprocessed.csv");
    fs::write(&src, "id,label\n1,a\n").unwrap();

    let p = PreprocessPipeline::new(
        src,
        dst,
        Standardizer::Identity,
        PreprocessConfig::default(),
    );
    assert!(p.run().is_err());
}

#[test]
fn preprocess_rewrites_text_and_drops_empty_rows() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("rows.csv");
    let dst = dir.path().join("preprocessed.csv");
    fs::write(
        &src,
        "id,text,label\n1,KEEP This  Text,a\n2,,b\n3,   ,c\n4,Second Keeper,d\n",
    )
    .unwrap();

    let config = PreprocessConfig {
        lower_case: true,
        ..Default::default()
    };
    let p = PreprocessPipeline::new(src, dst.clone(), Standardizer::Identity, config);
    p.run().unwrap();

    let mut reader = csv::Reader::from_path(&dst).unwrap();
    assert_eq!(
        reader.headers().unwrap(),
        &csv::StringRecord::from(vec!["id", "text", "label"])
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|row| row.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0], &csv::StringRecord::from(vec!["1", "keep this text", "a"]));
    assert_eq!(&rows[1], &csv::StringRecord::from(vec!["4", "second keeper", "d"]));
}
