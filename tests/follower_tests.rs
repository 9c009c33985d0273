use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use tempfile::tempdir;

use tabwatch::follower::{load_existing, FileFollower, Outcome};

fn append(path: &Path, text: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
}

#[test]
fn test_new_lines_appear_once_complete() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(&path, "").unwrap();

    let mut follower = FileFollower::new(&path);
    assert_eq!(follower.poll(), Outcome::NoChange);

    // one finished line and the start of another
    append(&path, "{\"a\": 1}\n{\"a\"");
    assert_eq!(
        follower.poll(),
        Outcome::NewLines(vec!["{\"a\": 1}".to_string()])
    );
    // the partial line stays buffered
    assert_eq!(follower.poll(), Outcome::NoChange);

    append(&path, ": 2}\n");
    assert_eq!(
        follower.poll(),
        Outcome::NewLines(vec!["{\"a\": 2}".to_string()])
    );
}

#[test]
fn test_crlf_line_endings_are_stripped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(&path, "one\r\ntwo\r\n").unwrap();

    let mut follower = FileFollower::new(&path);
    assert_eq!(
        follower.poll(),
        Outcome::NewLines(vec!["one".to_string(), "two".to_string()])
    );
}

#[test]
fn test_truncation_is_reported_then_reading_restarts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(&path, "one\ntwo\n").unwrap();

    let mut follower = FileFollower::new(&path);
    assert_eq!(
        follower.poll(),
        Outcome::NewLines(vec!["one".to_string(), "two".to_string()])
    );

    // the file shrank, e.g. logrotate copytruncate
    fs::write(&path, "fresh\n").unwrap();
    assert_eq!(follower.poll(), Outcome::Truncated);
    assert_eq!(follower.position(), 0);
    assert_eq!(follower.poll(), Outcome::NewLines(vec!["fresh".to_string()]));
}

#[test]
fn test_a_replaced_file_is_reported_as_truncated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(&path, "{\"n\": 1}\n{\"n\": 2}\n").unwrap();

    let mut follower = FileFollower::new(&path);
    assert!(matches!(follower.poll(), Outcome::NewLines(_)));

    // rotate-and-rename: the replacement is bigger than everything read so
    // far, so size alone would keep reading from the stale offset
    let staged = dir.path().join("log.jsonl.new");
    fs::write(
        &staged,
        "{\"fresh\": 1, \"pad\": \"0123456789012345678901234567890\"}\n{\"fresh\": 2}\n",
    )
    .unwrap();
    fs::rename(&staged, &path).unwrap();

    assert_eq!(follower.poll(), Outcome::Truncated);
    assert_eq!(follower.position(), 0);
    let lines = match follower.poll() {
        Outcome::NewLines(lines) => lines,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(
        lines,
        vec![
            "{\"fresh\": 1, \"pad\": \"0123456789012345678901234567890\"}".to_string(),
            "{\"fresh\": 2}".to_string(),
        ]
    );
}

#[test]
fn test_missing_file_is_unavailable_until_it_returns() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");

    let mut follower = FileFollower::new(&path);
    assert!(matches!(follower.poll(), Outcome::Unavailable(_)));
    assert!(matches!(follower.poll(), Outcome::Unavailable(_)));

    fs::write(&path, "back\n").unwrap();
    assert_eq!(follower.poll(), Outcome::NewLines(vec!["back".to_string()]));
}

#[test]
fn test_load_existing_stops_at_the_last_complete_line() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(&path, "one\ntwo\nthr").unwrap();

    let (lines, offset) = load_existing(&path).unwrap();
    assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    assert_eq!(offset, 8);

    // the follower picks up where the load stopped and completes the tail
    let mut follower = FileFollower::from_offset(&path, offset);
    assert_eq!(follower.poll(), Outcome::NoChange);
    append(&path, "ee\n");
    assert_eq!(follower.poll(), Outcome::NewLines(vec!["three".to_string()]));
}

#[test]
fn test_load_existing_with_crlf() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");
    fs::write(&path, "a\r\nb\r\n").unwrap();

    let (lines, offset) = load_existing(&path).unwrap();
    assert_eq!(lines, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(offset, 6);
}

#[test]
fn test_big_bursts_arrive_over_several_polls() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.jsonl");

    let mut content = String::new();
    for n in 0..3000 {
        content.push_str(&format!("{{\"n\": {}, \"pad\": \"0123456789012345678901234567890\"}}\n", n));
    }
    fs::write(&path, &content).unwrap();

    let mut follower = FileFollower::new(&path);
    let mut collected = Vec::new();
    let mut polls = 0;
    loop {
        match follower.poll() {
            Outcome::NewLines(lines) => {
                polls += 1;
                collected.extend(lines);
            }
            Outcome::NoChange => break,
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
    assert_eq!(collected.len(), 3000);
    assert!(polls > 1, "a burst larger than one read should take several polls");
    assert_eq!(collected[0], "{\"n\": 0, \"pad\": \"0123456789012345678901234567890\"}");
    assert_eq!(follower.position(), content.len() as u64);
}
