use super::*;
use crate::encode::raster::OutputFormat;

#[test]
fn blank_key_is_rejected() {
    assert!(matches!(
        TinifySink::new("  "),
        Err(CardError::Compression(_))
    ));
}

#[test]
fn debug_hides_the_key() {
    let sink = TinifySink::new("secret-key").unwrap();
    let dbg = format!("{sink:?}");
    assert!(!dbg.contains("secret-key"));
    assert!(dbg.contains(TINIFY_SHRINK_URL));
}

#[test]
fn unreachable_service_is_a_compression_error_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("card.jpeg");
    let mut sink = TinifySink::new("key")
        .unwrap()
        .with_endpoint("http://127.0.0.1:1/shrink");
    let card = EncodedCard {
        path: path.clone(),
        format: OutputFormat::Jpeg,
        width: 1,
        height: 1,
        bytes: vec![0xFF, 0xD8],
    };

    let err = sink.write(&card).unwrap_err();
    assert!(matches!(err, CardError::Compression(_)), "{err}");
    assert!(!path.exists());
}

/// One request seen by [`serve`].
#[derive(Debug)]
struct Seen {
    method: String,
    path: String,
    auth: Option<String>,
    body: Vec<u8>,
}

/// Answer one request per entry of `responses` on a local port, closing each connection.
///
/// `{base}` in a response is replaced with the server's own `http://127.0.0.1:<port>`.
fn serve(responses: Vec<String>) -> (String, std::thread::JoinHandle<Vec<Seen>>) {
    use std::io::{BufRead, BufReader, Read, Write};

    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let own = base.clone();
    let handle = std::thread::spawn(move || {
        let mut seen = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            let mut parts = request_line.split_whitespace();
            let method = parts.next().unwrap_or_default().to_owned();
            let path = parts.next().unwrap_or_default().to_owned();

            let mut len = 0usize;
            let mut auth = None;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    match name.trim().to_ascii_lowercase().as_str() {
                        "content-length" => len = value.trim().parse().unwrap(),
                        "authorization" => auth = Some(value.trim().to_owned()),
                        _ => {}
                    }
                }
            }
            let mut body = vec![0; len];
            reader.read_exact(&mut body).unwrap();
            seen.push(Seen {
                method,
                path,
                auth,
                body,
            });

            stream
                .write_all(response.replace("{base}", &own).as_bytes())
                .unwrap();
            stream.flush().unwrap();
        }
        seen
    });
    (base, handle)
}

fn created(location: &str) -> String {
    format!(
        "HTTP/1.1 201 Created\r\nLocation: {location}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    )
}

fn card_at(path: std::path::PathBuf) -> EncodedCard {
    EncodedCard {
        path,
        format: OutputFormat::Png,
        width: 1,
        height: 1,
        bytes: b"\x89PNG-original".to_vec(),
    }
}

#[test]
fn without_a_store_the_compressed_card_is_downloaded_to_the_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out/card.png");
    let (base, server) = serve(vec![
        created("{base}/output/abc"),
        "HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\ntiny".to_owned(),
    ]);

    let mut sink = TinifySink::new("key")
        .unwrap()
        .with_endpoint(format!("{base}/shrink"));
    sink.write(&card_at(path.clone())).unwrap();

    let seen = server.join().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!((seen[0].method.as_str(), seen[0].path.as_str()), ("POST", "/shrink"));
    assert_eq!(seen[0].body, b"\x89PNG-original");
    // base64("api:key")
    assert_eq!(seen[0].auth.as_deref(), Some("Basic YXBpOmtleQ=="));
    assert_eq!((seen[1].method.as_str(), seen[1].path.as_str()), ("GET", "/output/abc"));
    assert_eq!(std::fs::read(&path).unwrap(), b"tiny");
}

#[test]
fn with_a_store_the_service_keeps_the_card_and_nothing_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("card.png");
    let (base, server) = serve(vec![
        created("{base}/output/abc"),
        "HTTP/1.1 200 OK\r\nLocation: https://bucket.example/cards/og.png\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_owned(),
    ]);
    let store: CloudStore = serde_json::from_str(
        r#"{"service":"s3","region":"us-west-1","path":"bucket/cards/og.png"}"#,
    )
    .unwrap();

    let mut sink = TinifySink::new("key")
        .unwrap()
        .with_endpoint(format!("{base}/shrink"))
        .with_store(Some(store));
    sink.write(&card_at(path.clone())).unwrap();

    let seen = server.join().unwrap();
    assert_eq!((seen[1].method.as_str(), seen[1].path.as_str()), ("POST", "/output/abc"));
    let request: serde_json::Value = serde_json::from_slice(&seen[1].body).unwrap();
    assert_eq!(request["store"]["service"], "s3");
    assert_eq!(request["store"]["path"], "bucket/cards/og.png");
    assert!(!path.exists());
}

#[test]
fn rejected_upload_reports_the_status() {
    let dir = tempfile::tempdir().unwrap();
    let (base, server) = serve(vec![
        "HTTP/1.1 401 Unauthorized\r\nContent-Length: 12\r\nConnection: close\r\n\r\nbad key here".to_owned(),
    ]);
    let mut sink = TinifySink::new("key")
        .unwrap()
        .with_endpoint(format!("{base}/shrink"));

    let err = sink.write(&card_at(dir.path().join("card.png"))).unwrap_err();
    server.join().unwrap();
    let msg = err.to_string();
    assert!(msg.contains("401") && msg.contains("bad key here"), "{msg}");
}
