//! Integration tests for tee sources over real filesystem and writer targets
//!
//! Each scenario reads a message through a `TeeSource` and then reads the
//! mirror back independently.

use std::fs::File;

use brook::prelude::*;
use brook::io::FileSink;

const MESSAGE: &str = "Hello, товарищ!";

fn tee_text<S: Source>(tee: S) -> String {
    TextOf::new(tee).as_string().unwrap()
}

fn writer_target() -> TextSink<WriterSink<Vec<u8>>> {
    TextSink::new(WriterSink::new(Vec::new()))
}

fn written(target: &TextSink<WriterSink<Vec<u8>>>) -> String {
    String::from_utf8(target.get_ref().borrow().clone()).unwrap()
}

#[test]
fn copies_from_input_to_path() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("tee.txt");

    let seen = tee_text(TeeSource::new(
        BytesSource::from(MESSAGE),
        PathSink::new(&output),
    ));

    assert_eq!(seen, MESSAGE);
    assert_eq!(TextOf::new(PathSource::new(&output)).as_string().unwrap(), MESSAGE);
}

#[test]
fn copies_from_input_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("tee.txt");
    let sink = FileSink::new(File::create(&output).unwrap());

    let seen = tee_text(TeeSource::new(BytesSource::from(MESSAGE), &sink));

    assert_eq!(seen, MESSAGE);
    assert_eq!(TextOf::new(PathSource::new(&output)).as_string().unwrap(), MESSAGE);
}

#[test]
fn copies_from_input_to_writer() {
    let target = writer_target();

    let seen = tee_text(TeeSource::new(BytesSource::from(MESSAGE), &target));

    assert_eq!(seen, MESSAGE);
    assert_eq!(written(&target), MESSAGE);
}

#[test]
fn copies_from_input_with_size_to_writer() {
    let target = writer_target();

    let seen = tee_text(TeeSource::new(BytesSource::from(MESSAGE), &target).with_size(1));

    assert_eq!(seen, MESSAGE);
    assert_eq!(written(&target), MESSAGE);
}

#[test]
fn copies_from_input_with_charset_to_writer() {
    let target = writer_target();

    let seen = tee_text(
        TeeSource::new(BytesSource::from(MESSAGE), &target).with_charset(Charset::Utf8),
    );

    assert_eq!(seen, MESSAGE);
    assert_eq!(written(&target), MESSAGE);
}

#[test]
fn copies_from_input_with_charset_and_size_to_writer() {
    let target = writer_target();

    let seen = tee_text(
        TeeSource::new(BytesSource::from(MESSAGE), &target)
            .with_charset(Charset::Utf8)
            .with_size(1),
    );

    assert_eq!(seen, MESSAGE);
    assert_eq!(written(&target), MESSAGE);
}

#[test]
fn copies_from_input_with_charset_by_name_to_writer() {
    let target = writer_target();

    let tee = TeeSource::new(BytesSource::from(MESSAGE), &target)
        .with_charset_name(Charset::Utf8.name())
        .unwrap();

    assert_eq!(tee_text(tee), MESSAGE);
    assert_eq!(written(&target), MESSAGE);
}

#[test]
fn copies_from_input_with_charset_by_name_and_size_to_writer() {
    let target = writer_target();

    let tee = TeeSource::new(BytesSource::from(MESSAGE), &target)
        .with_charset_name("utf-8")
        .unwrap()
        .with_size(1);

    assert_eq!(tee_text(tee), MESSAGE);
    assert_eq!(written(&target), MESSAGE);
}

#[test]
fn unknown_charset_name_fails_at_construction() {
    let target = writer_target();

    let err = TeeSource::new(BytesSource::from(MESSAGE), &target)
        .with_charset_name("klingon")
        .unwrap_err();

    assert!(matches!(err, ConfigError::UnsupportedCharset { .. }));
    assert!(target.get_ref().borrow().is_empty());
}

#[test]
fn transcodes_into_character_sink_charset() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("utf16.txt");
    let target = TextSink::new(PathSink::new(&output)).with_charset(Charset::Utf16Be);

    let seen = tee_text(TeeSource::new(BytesSource::from(MESSAGE), &target));

    assert_eq!(seen, MESSAGE);
    let stored = TextOf::new(PathSource::new(&output)).with_charset(Charset::Utf16Be);
    assert_eq!(stored.as_string().unwrap(), MESSAGE);
}

#[test]
fn byte_sink_ignores_charset() {
    let target = WriterSink::new(Vec::new());
    let upstream = BytesSource::text(MESSAGE, Charset::Utf16Le);

    let tee = TeeSource::new(upstream.clone(), &target).with_charset(Charset::Latin1);
    let seen = TextOf::new(tee).with_charset(Charset::Utf16Le);

    assert_eq!(seen.as_string().unwrap(), MESSAGE);
    assert_eq!(target.borrow().as_slice(), upstream.as_bytes());
}

#[test]
fn every_open_mirrors_again() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("log.txt");
    let tee = TeeSource::new(BytesSource::from("line\n"), PathSink::new(&output).appending());

    assert_eq!(tee_text(&tee), "line\n");
    assert_eq!(tee_text(&tee), "line\n");

    assert_eq!(
        TextOf::new(PathSource::new(&output)).as_string().unwrap(),
        "line\nline\n"
    );
}

#[test]
fn tee_sink_duplicates_transfer() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("copy.txt");
    let memory = WriterSink::new(Vec::new());
    let sink = TeeSink::new(PathSink::new(&output), &memory);

    let moved = Transfer::new()
        .between(&BytesSource::from(MESSAGE), &sink)
        .unwrap();

    assert_eq!(moved, MESSAGE.len() as u64);
    assert_eq!(memory.borrow().as_slice(), MESSAGE.as_bytes());
    assert_eq!(TextOf::new(PathSource::new(&output)).as_string().unwrap(), MESSAGE);
}
