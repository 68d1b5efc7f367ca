//! Minimal HTTP/1.1 server for install-engine integration tests.
//!
//! Serves a single static body on GET. By default the response carries the
//! CDN conventions the engine relies on: a Content-Length and an ETag whose
//! value is the quoted hex MD5 of the body. Options can misdeclare the
//! length, truncate the body mid-stream, lie in the ETag, drop headers, or
//! fail with a status.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use md5::{Digest, Md5};

#[derive(Debug, Clone, Default)]
pub struct ResourceServerOptions {
    /// Served as Content-Length instead of the body's real length.
    pub declared_len: Option<u64>,
    /// Send only the first N bytes of the body, then close the connection.
    pub truncate_to: Option<usize>,
    /// Served as the ETag value instead of the body's quoted hex MD5.
    pub etag_override: Option<String>,
    /// Leave the ETag header out entirely.
    pub omit_etag: bool,
    /// Leave the Content-Length header out entirely (body is then delimited
    /// by connection close).
    pub omit_content_length: bool,
    /// Respond 404 with an empty body.
    pub not_found: bool,
}

/// The quoted hex MD5 the server would send for `body`.
pub fn etag_for(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Md5::digest(body)))
}

/// Starts a server in a background thread serving `body` with the default
/// (well-behaved) options. Returns the base URL. Runs until process exit.
pub fn start(body: Vec<u8>) -> String {
    start_with_options(body, ResourceServerOptions::default())
}

/// Like `start` but with customized misbehavior.
pub fn start_with_options(body: Vec<u8>, opts: ResourceServerOptions) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let opts = Arc::new(opts);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let opts = Arc::clone(&opts);
            thread::spawn(move || handle(stream, &body, &opts));
        }
    });
    format!("http://127.0.0.1:{}/", port)
}

fn handle(mut stream: std::net::TcpStream, body: &[u8], opts: &ResourceServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));

    // Drain the request head; the engine only ever sends GET.
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let method = request.split_whitespace().next().unwrap_or("");
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\n\r\n");
        return;
    }
    if opts.not_found {
        let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    let declared = opts.declared_len.unwrap_or(body.len() as u64);
    let mut head = String::from("HTTP/1.1 200 OK\r\n");
    if !opts.omit_content_length {
        head.push_str(&format!("Content-Length: {}\r\n", declared));
    }
    if !opts.omit_etag {
        let etag = opts
            .etag_override
            .clone()
            .unwrap_or_else(|| etag_for(body));
        head.push_str(&format!("ETag: {}\r\n", etag));
    }
    head.push_str("Connection: close\r\n\r\n");

    let sent = match opts.truncate_to {
        Some(n) => &body[..n.min(body.len())],
        None => body,
    };
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(sent);
    // Dropping the stream closes the connection, which is what makes a
    // truncated body look like a server that died mid-transfer.
}
