//! Request-line parsing and query handling.

mod common;

use common::ChunkReader;
use embassy_futures::block_on;
use myrtio_cam_core::http::{Error, HttpMethod, int_param, query_param, read_request};

#[test]
fn parses_request_line_with_query() {
    let mut reader = ChunkReader::new(&[b"GET /control?var=quality&val=10 HTTP/1.1\r\n\r\n"]);
    let mut buf = [0u8; 512];

    let request = block_on(read_request(&mut reader, &mut buf))
        .unwrap()
        .unwrap();

    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.target, "/control?var=quality&val=10");
    assert_eq!(request.path(), "/control");
    assert_eq!(request.query(), "var=quality&val=10");
}

#[test]
fn reads_request_split_across_chunks() {
    let mut reader = ChunkReader::new(&[
        b"GET /sta",
        b"tus HTTP/1.1\r\nHost: cam\r",
        b"\n\r\n",
    ]);
    let mut buf = [0u8; 512];

    let request = block_on(read_request(&mut reader, &mut buf))
        .unwrap()
        .unwrap();

    assert_eq!(request.path(), "/status");
    assert_eq!(request.query(), "");
}

#[test]
fn clean_eof_yields_none() {
    let mut reader = ChunkReader::new(&[]);
    let mut buf = [0u8; 512];

    let request = block_on(read_request(&mut reader, &mut buf)).unwrap();

    assert!(request.is_none());
}

#[test]
fn garbage_is_a_parse_error() {
    let mut reader = ChunkReader::new(&[b"\xff\xfe\x01 nonsense\r\n\r\n"]);
    let mut buf = [0u8; 512];

    let result = block_on(read_request(&mut reader, &mut buf));

    assert!(matches!(result, Err(Error::Parse)));
}

#[test]
fn non_get_methods_are_recognized() {
    let mut reader = ChunkReader::new(&[b"POST /control HTTP/1.1\r\n\r\n"]);
    let mut buf = [0u8; 512];

    let request = block_on(read_request(&mut reader, &mut buf))
        .unwrap()
        .unwrap();

    assert_eq!(request.method, HttpMethod::Post);
}

#[test]
fn query_lookup() {
    let query = "var=framesize&val=8";

    assert_eq!(query_param(query, "var"), Some("framesize"));
    assert_eq!(int_param(query, "val"), Some(8));
    assert_eq!(query_param(query, "missing"), None);
    assert_eq!(int_param("val=abc", "val"), None);
    assert_eq!(int_param("val=-2", "val"), Some(-2));
}
