use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};

use anvil::http::request::{Method, ParseError, ParserState, Request};

/// Hands out at most `chunk` bytes per read, simulating a stream that
/// fragments however the network pleases.
struct ChunkReader {
    data: Vec<u8>,
    chunk: usize,
    pos: usize,
}

impl ChunkReader {
    fn new(data: &str, chunk: usize) -> Self {
        Self {
            data: data.as_bytes().to_vec(),
            chunk,
            pos: 0,
        }
    }
}

impl AsyncRead for ChunkReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.pos >= this.data.len() {
            return Poll::Ready(Ok(()));
        }
        let end = (this.pos + this.chunk).min(this.data.len());
        let n = (end - this.pos).min(buf.remaining());
        buf.put_slice(&this.data[this.pos..this.pos + n]);
        this.pos += n;
        Poll::Ready(Ok(()))
    }
}

async fn parse(data: &str, chunk: usize) -> Result<Request, ParseError> {
    let mut reader = ChunkReader::new(data, chunk);
    Request::from_reader(&mut reader).await
}

#[tokio::test]
async fn test_good_request_line() {
    let request = parse(
        "GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n",
        3,
    )
    .await
    .unwrap();

    let line = request.request_line().unwrap();
    assert_eq!(line.method, Method::GET);
    assert_eq!(line.request_target, "/coffee");
    assert_eq!(line.http_version, "1.1");
    assert_eq!(request.state(), ParserState::Done);
}

#[tokio::test]
async fn test_result_is_the_same_at_any_fragmentation() {
    let data =
        "POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 11\r\n\r\nhello world";

    let tiny = parse(data, 1).await.unwrap();
    let medium = parse(data, 17).await.unwrap();
    let whole = parse(data, data.len()).await.unwrap();

    assert_eq!(tiny.request_line(), whole.request_line());
    assert_eq!(medium.request_line(), whole.request_line());
    assert_eq!(tiny.headers, whole.headers);
    assert_eq!(medium.headers, whole.headers);
    assert_eq!(tiny.body(), b"hello world");
    assert_eq!(medium.body(), whole.body());
}

#[tokio::test]
async fn test_headers_are_parsed_and_merged() {
    let request = parse(
        "GET / HTTP/1.1\r\nHost: localhost:42069\r\nHost: localhost:42070\r\nAccept: */*\r\n\r\n",
        5,
    )
    .await
    .unwrap();

    assert_eq!(
        request.header("host"),
        Some("localhost:42069, localhost:42070")
    );
    assert_eq!(request.header("Accept"), Some("*/*"));
}

#[tokio::test]
async fn test_request_without_headers() {
    let request = parse("GET / HTTP/1.1\r\n\r\n", 4).await.unwrap();

    assert!(request.headers.is_empty());
    assert!(request.body().is_empty());
    assert_eq!(request.state(), ParserState::Done);
}

#[tokio::test]
async fn test_malformed_request_lines() {
    let cases = [
        "/coffee HTTP/1.1\r\n\r\n",
        "GET HTTP/1.1\r\n\r\n",
        "GET /coffee\r\n\r\n",
        "GET /coffee HTTP/1.1 extra\r\n\r\n",
        "GET /coffee HTP/1.1\r\n\r\n",
        "GET /coffee HTTP/1.1/2\r\n\r\n",
    ];
    for case in cases {
        assert!(parse(case, 3).await.is_err(), "expected error for {case:?}");
    }
}

#[tokio::test]
async fn test_lowercase_method_is_rejected() {
    let result = parse("get / HTTP/1.1\r\n\r\n", 2).await;
    assert!(matches!(result, Err(ParseError::MethodNotUppercase(_))));
}

#[tokio::test]
async fn test_unknown_method_is_rejected() {
    let result = parse("BREW /coffee HTTP/1.1\r\n\r\n", 6).await;
    assert!(matches!(result, Err(ParseError::UnsupportedMethod(_))));
}

#[tokio::test]
async fn test_wrong_version_is_rejected() {
    let result = parse("GET / HTTP/1.0\r\n\r\n", 8).await;
    assert!(matches!(result, Err(ParseError::UnsupportedVersion(_))));
}

#[tokio::test]
async fn test_malformed_header_is_fatal() {
    let result = parse("GET / HTTP/1.1\r\nHost localhost:42069\r\n\r\n", 3).await;
    assert!(matches!(result, Err(ParseError::FieldLine(_))));
}

#[tokio::test]
async fn test_body_matching_content_length() {
    let request = parse(
        "POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 13\r\n\r\nhello world!\n",
        3,
    )
    .await
    .unwrap();

    assert_eq!(request.body(), b"hello world!\n");
    assert_eq!(request.state(), ParserState::Done);
}

#[tokio::test]
async fn test_body_shorter_than_content_length() {
    let result = parse(
        "POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 20\r\n\r\npartial content",
        3,
    )
    .await;

    assert!(matches!(
        result,
        Err(ParseError::BodyTooShort {
            expected: 20,
            actual: 15
        })
    ));
}

#[tokio::test]
async fn test_body_longer_than_content_length() {
    let result = parse(
        "POST /submit HTTP/1.1\r\nHost: localhost:42069\r\nContent-Length: 4\r\n\r\npartial content",
        5,
    )
    .await;

    assert!(matches!(
        result,
        Err(ParseError::BodyTooLong { expected: 4, .. })
    ));
}

#[tokio::test]
async fn test_content_length_must_be_numeric() {
    let result = parse("POST /submit HTTP/1.1\r\nContent-Length: lots\r\n\r\nabc", 7).await;

    assert!(matches!(result, Err(ParseError::InvalidContentLength(_))));
}

#[tokio::test]
async fn test_header_with_empty_value() {
    let request = parse("GET / HTTP/1.1\r\nX-Debug: \r\n\r\n", 3).await.unwrap();
    assert_eq!(request.header("x-debug"), Some(""));
}

#[tokio::test]
async fn test_no_content_length_means_no_body() {
    let request = parse("GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n\r\n", 3)
        .await
        .unwrap();

    assert!(request.body().is_empty());
}

#[tokio::test]
async fn test_eof_before_request_line_completes() {
    let result = parse("GET /coffee HT", 4).await;
    assert!(matches!(result, Err(ParseError::UnfinishedRequestLine)));
}

#[tokio::test]
async fn test_eof_before_header_section_ends() {
    let result = parse("GET /coffee HTTP/1.1\r\nHost: localhost:42069\r\n", 4).await;
    assert!(matches!(result, Err(ParseError::UnfinishedHeaders)));
}

#[test]
fn test_parse_after_done_is_an_error() {
    let mut request = Request::new();
    let consumed = request.parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(consumed, 18);
    assert_eq!(request.state(), ParserState::Done);

    let result = request.parse(b"GET / HTTP/1.1\r\n\r\n");
    assert!(matches!(result, Err(ParseError::ParseAfterDone)));
}

#[test]
fn test_one_increment_can_cross_states() {
    // request line, all headers, and the terminator arrive in one read
    let mut request = Request::new();
    let data = b"GET / HTTP/1.1\r\nHost: localhost:42069\r\n\r\n";

    let consumed = request.parse(data).unwrap();
    assert_eq!(consumed, data.len());
    assert_eq!(request.state(), ParserState::Done);
    assert_eq!(request.header("host"), Some("localhost:42069"));
}
