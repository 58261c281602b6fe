#![allow(missing_docs)]

use std::io::{self, Cursor, Read};

use partwise::{Multipart, MultipartConfig, MultipartError, Part};

#[test]
fn parses_two_parts_and_ends_cleanly() {
    let body = concat!(
        "--XBOUND\r\n",
        "Content-Disposition: form-data; name=\"alpha\"\r\n",
        "\r\n",
        "one\r\n",
        "--XBOUND\r\n",
        "Content-Disposition: form-data; name=\"beta\"; filename=\"b.txt\"\r\n",
        "Content-Type: text/plain\r\n",
        "\r\n",
        "two\r\n",
        "--XBOUND--\r\n"
    );

    let mut multipart =
        Multipart::new("XBOUND", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    assert!(multipart.has_next().expect("first advance should succeed"));
    let mut first = multipart.next_part().expect("first part should open");
    let headers = first.headers().expect("first headers should decode");
    assert_eq!(headers.field_name, "alpha");
    assert!(headers.file_name.is_none());
    assert_eq!(&Part::bytes(&mut first).expect("first body should read")[..], b"one");

    assert!(multipart.has_next().expect("second advance should succeed"));
    let mut second = multipart.next_part().expect("second part should open");
    let headers = second.headers().expect("second headers should decode");
    assert_eq!(headers.field_name, "beta");
    assert_eq!(headers.file_name.as_deref(), Some("b.txt"));
    assert_eq!(&Part::bytes(&mut second).expect("second body should read")[..], b"two");

    assert!(!multipart.has_next().expect("end should be clean"));
    assert_eq!(multipart.parts_completed(), 2);
    assert!(matches!(
        multipart.next_part().expect_err("iteration is over"),
        MultipartError::StreamClosed
    ));
}

#[test]
fn parses_minimal_single_part_exchange() {
    let body = "--X\r\nA: 1\r\n\r\nhello\r\n--X--\r\n";
    let mut multipart =
        Multipart::new("X", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    let mut part = multipart.next_part().expect("part should open");
    let lines: Vec<&[u8]> = part.raw_headers().lines().collect();
    assert_eq!(lines, vec![&b"A: 1"[..]]);
    assert_eq!(&Part::bytes(&mut part).expect("body should read")[..], b"hello");
    assert!(!multipart.has_next().expect("end should be clean"));
}

#[test]
fn results_are_identical_for_every_read_fragmentation() {
    let body = concat!(
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"a\"\r\n",
        "\r\n",
        "body with tricky tails \r\n--BOUN and \r\n--B plus \r and -- dashes\r\n",
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"b\"\r\n",
        "\r\n",
        "\r\n",
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"c\"\r\n",
        "\r\n",
        "final\r\n",
        "--BOUND--\r\n"
    );

    let expected = collect_parts(Multipart::new(
        "BOUND",
        Cursor::new(body.as_bytes().to_vec()),
    ));

    // A byte-at-a-time source splits the delimiter at every possible offset;
    // larger strides exercise every other refill fragmentation.
    for chunk in 1..=body.len() {
        let reader = TrickleReader::new(body.as_bytes().to_vec(), chunk);
        let parsed = collect_parts(Multipart::new("BOUND", reader));
        assert_eq!(parsed, expected, "chunk size {chunk} changed the outcome");
    }
}

#[test]
fn small_windows_do_not_change_the_outcome() {
    let body = concat!(
        "--AB\r\n",
        "Content-Disposition: form-data; name=\"x\"\r\n",
        "\r\n",
        "0123456789 split me \r\n-- across windows\r\n",
        "--AB--\r\n"
    );

    let expected = collect_parts(Multipart::new("AB", Cursor::new(body.as_bytes().to_vec())));

    // Smallest legal window for this boundary, with a fragmented source.
    let delimiter_len = "\r\n--AB".len();
    for buffer_size in [delimiter_len + 2, delimiter_len + 3, 16, 32] {
        for chunk in [1, 2, 3, 7] {
            let config = MultipartConfig {
                buffer_size,
                ..MultipartConfig::default()
            };
            let reader = TrickleReader::new(body.as_bytes().to_vec(), chunk);
            let parsed = collect_parts(Multipart::with_config("AB", reader, config));
            assert_eq!(
                parsed, expected,
                "buffer {buffer_size} / chunk {chunk} changed the outcome"
            );
        }
    }
}

#[test]
fn zero_length_body_is_a_valid_part() {
    let body = concat!(
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"empty\"\r\n",
        "\r\n",
        "\r\n",
        "--BOUND--\r\n"
    );
    let mut multipart =
        Multipart::new("BOUND", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    let mut part = multipart.next_part().expect("part should open");
    assert_eq!(part.headers().expect("headers should decode").field_name, "empty");
    assert!(Part::bytes(&mut part).expect("empty body should read").is_empty());
    assert!(!multipart.has_next().expect("end should be clean"));
}

#[test]
fn preamble_before_the_first_boundary_is_discarded() {
    let body = concat!(
        "this preamble is ignored per the multipart grammar\r\n",
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"field\"\r\n",
        "\r\n",
        "value\r\n",
        "--BOUND--\r\n"
    );
    let mut multipart =
        Multipart::new("BOUND", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    let mut part = multipart.next_part().expect("part should open");
    assert_eq!(&Part::bytes(&mut part).expect("body should read")[..], b"value");
    assert!(!multipart.has_next().expect("end should be clean"));
}

#[test]
fn trailing_bytes_after_the_terminal_boundary_are_never_read() {
    // The source fails hard on any read past the terminal boundary; a
    // byte-at-a-time trickle guarantees the parser would trip if it looked.
    let body = "--B\r\nContent-Disposition: form-data; name=\"f\"\r\n\r\nok\r\n--B--";
    let reader = FailAfterEnd::new(TrickleReader::new(body.as_bytes().to_vec(), 1));
    let mut multipart = Multipart::new("B", reader).expect("boundary should be valid");

    let mut part = multipart.next_part().expect("part should open");
    assert_eq!(&Part::bytes(&mut part).expect("body should read")[..], b"ok");
    drop(part);
    assert!(!multipart.has_next().expect("end should be clean"));
    assert!(!multipart.has_next().expect("end stays clean"));
}

#[test]
fn trailing_garbage_after_the_terminal_boundary_is_accepted() {
    let body = concat!(
        "--B\r\n",
        "Content-Disposition: form-data; name=\"f\"\r\n",
        "\r\n",
        "ok\r\n",
        "--B--\r\n",
        "epilogue junk that is not multipart at all"
    );
    let mut multipart =
        Multipart::new("B", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    let mut part = multipart.next_part().expect("part should open");
    assert_eq!(&Part::bytes(&mut part).expect("body should read")[..], b"ok");
    assert!(!multipart.has_next().expect("end should be clean"));
}

#[test]
fn reserializing_parsed_parts_reproduces_the_input() {
    let body = concat!(
        "--RT\r\n",
        "Content-Disposition: form-data; name=\"one\"\r\n",
        "\r\n",
        "first body\r\n",
        "--RT\r\n",
        "Content-Disposition: form-data; name=\"two\"\r\n",
        "Content-Type: application/octet-stream\r\n",
        "\r\n",
        "second -- body \r with stray markers\r\n",
        "--RT--\r\n"
    );
    let mut multipart =
        Multipart::new("RT", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    let mut rebuilt = Vec::new();
    while multipart.has_next().expect("advance should succeed") {
        let mut part = multipart.next_part().expect("part should open");
        rebuilt.extend_from_slice(b"--RT\r\n");
        for line in part.raw_headers().lines() {
            rebuilt.extend_from_slice(line);
            rebuilt.extend_from_slice(b"\r\n");
        }
        rebuilt.extend_from_slice(b"\r\n");
        rebuilt.extend_from_slice(&Part::bytes(&mut part).expect("body should read"));
        rebuilt.extend_from_slice(b"\r\n");
    }
    rebuilt.extend_from_slice(b"--RT--\r\n");

    assert_eq!(rebuilt, body.as_bytes());
}

#[test]
fn missing_terminal_boundary_is_malformed() {
    let body = "--B\r\nContent-Disposition: form-data; name=\"f\"\r\n\r\ntrunca";
    let mut multipart =
        Multipart::new("B", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    let mut part = multipart.next_part().expect("part should open");
    let err = Part::bytes(&mut part).expect_err("truncated body must fail");
    assert!(matches!(err, MultipartError::MalformedStream { .. }));
}

#[test]
fn end_of_source_before_any_boundary_is_malformed() {
    let mut multipart = Multipart::new("B", Cursor::new(&b"no boundary anywhere"[..]))
        .expect("boundary should be valid");

    let err = multipart.has_next().expect_err("preamble must fail");
    assert!(matches!(err, MultipartError::MalformedStream { .. }));
}

#[test]
fn end_of_source_inside_headers_is_malformed() {
    let body = "--B\r\nContent-Disposition: form-data; na";
    let mut multipart =
        Multipart::new("B", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    let err = multipart.has_next().expect_err("headers must fail");
    assert!(matches!(err, MultipartError::MalformedStream { .. }));
}

#[test]
fn unexpected_bytes_after_a_boundary_are_malformed() {
    let body = "--B\r\nContent-Disposition: form-data; name=\"f\"\r\n\r\nok\r\n--Bxx\r\n";
    let mut multipart =
        Multipart::new("B", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    let mut part = multipart.next_part().expect("part should open");
    assert_eq!(&Part::bytes(&mut part).expect("body should read")[..], b"ok");
    drop(part);
    let err = multipart.has_next().expect_err("bad marker must fail");
    assert!(matches!(err, MultipartError::MalformedStream { .. }));
}

#[test]
fn every_pull_after_a_failure_reports_stream_closed() {
    let mut multipart = Multipart::new("B", Cursor::new(&b"garbage"[..]))
        .expect("boundary should be valid");

    assert!(multipart.has_next().is_err());
    assert!(matches!(
        multipart.has_next().expect_err("failed parser stays closed"),
        MultipartError::StreamClosed
    ));
    assert!(matches!(
        multipart.next_part().expect_err("failed parser stays closed"),
        MultipartError::StreamClosed
    ));
}

#[test]
fn advancing_past_an_unread_part_discards_its_body() {
    let body = concat!(
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"skipped\"\r\n",
        "\r\n",
        "a long body the caller never asks for\r\n",
        "--BOUND\r\n",
        "Content-Disposition: form-data; name=\"wanted\"\r\n",
        "\r\n",
        "kept\r\n",
        "--BOUND--\r\n"
    );
    let mut multipart =
        Multipart::new("BOUND", Cursor::new(body.as_bytes())).expect("boundary should be valid");

    let part = multipart.next_part().expect("first part should open");
    drop(part);

    let mut part = multipart.next_part().expect("second part should open");
    assert_eq!(part.headers().expect("headers should decode").field_name, "wanted");
    assert_eq!(&Part::bytes(&mut part).expect("body should read")[..], b"kept");
    assert!(!multipart.has_next().expect("end should be clean"));
}

fn collect_parts<R: Read>(
    multipart: Result<Multipart<R>, MultipartError>,
) -> Vec<(Vec<Vec<u8>>, Vec<u8>)> {
    let mut multipart = multipart.expect("parser should initialize");
    let mut parts = Vec::new();
    while multipart.has_next().expect("advance should succeed") {
        let mut part = multipart.next_part().expect("part should open");
        let lines = part.raw_headers().lines().map(<[u8]>::to_vec).collect();
        let body = Part::bytes(&mut part).expect("body should read").to_vec();
        parts.push((lines, body));
    }
    parts
}

struct TrickleReader {
    data: Vec<u8>,
    at: usize,
    chunk: usize,
}

impl TrickleReader {
    fn new(data: Vec<u8>, chunk: usize) -> Self {
        Self { data, at: 0, chunk }
    }
}

impl Read for TrickleReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let end = (self.at + self.chunk).min(self.data.len());
        let take = (end - self.at).min(buf.len());
        buf[..take].copy_from_slice(&self.data[self.at..self.at + take]);
        self.at += take;
        Ok(take)
    }
}

struct FailAfterEnd<R> {
    inner: R,
}

impl<R> FailAfterEnd<R> {
    fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> Read for FailAfterEnd<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        if read == 0 {
            return Err(io::Error::other("read past end of request"));
        }
        Ok(read)
    }
}
