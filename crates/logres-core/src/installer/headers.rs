//! Response header capture for the streaming GET.

/// Metadata pulled from the final response's headers.
#[derive(Debug, Clone, Default)]
pub(super) struct ResponseMeta {
    pub content_length: Option<u64>,
    pub etag: Option<String>,
}

/// True for an HTTP status line (`HTTP/1.1 200 OK`, `HTTP/2 200`).
pub(super) fn is_status_line(line: &str) -> bool {
    line.starts_with("HTTP/")
}

/// Value of `name: value` if the line carries that header (case-insensitive).
pub(super) fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (n, v) = line.split_once(':')?;
    if n.trim().eq_ignore_ascii_case(name) {
        Some(v.trim())
    } else {
        None
    }
}

/// `Content-Length` of a single header line, if that is what the line is.
pub(super) fn content_length_of(line: &str) -> Option<u64> {
    header_value(line, "content-length")?.parse().ok()
}

/// Parse captured header lines into [`ResponseMeta`].
///
/// Outer double quotes on the ETag are removed here; hex-to-base64
/// conversion is the checksum module's business.
pub(super) fn parse_response_meta(lines: &[String]) -> ResponseMeta {
    let mut meta = ResponseMeta::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(len) = content_length_of(line) {
            meta.content_length = Some(len);
        }
        if let Some(value) = header_value(line, "etag") {
            meta.etag = Some(value.trim_matches('"').to_string());
        }
    }
    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_length_and_etag() {
        let lines = [
            "HTTP/1.1 200 OK".to_string(),
            "Content-Length: 12345".to_string(),
            "ETag: \"b1946ac92492d2347c6235b4d2611184\"".to_string(),
        ];
        let meta = parse_response_meta(&lines);
        assert_eq!(meta.content_length, Some(12345));
        assert_eq!(meta.etag.as_deref(), Some("b1946ac92492d2347c6235b4d2611184"));
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let lines = ["content-LENGTH: 7".to_string(), "etag: abc".to_string()];
        let meta = parse_response_meta(&lines);
        assert_eq!(meta.content_length, Some(7));
        assert_eq!(meta.etag.as_deref(), Some("abc"));
    }

    #[test]
    fn missing_headers_stay_none() {
        let lines = ["HTTP/1.1 200 OK".to_string(), "Server: fixture".to_string()];
        let meta = parse_response_meta(&lines);
        assert!(meta.content_length.is_none());
        assert!(meta.etag.is_none());
    }

    #[test]
    fn unparseable_length_is_ignored() {
        let lines = ["Content-Length: lots".to_string()];
        assert!(parse_response_meta(&lines).content_length.is_none());
    }

    #[test]
    fn status_lines_are_recognized() {
        assert!(is_status_line("HTTP/1.1 301 Moved Permanently"));
        assert!(is_status_line("HTTP/2 200"));
        assert!(!is_status_line("ETag: \"abc\""));
    }

    #[test]
    fn single_line_content_length() {
        assert_eq!(content_length_of("Content-Length: 99"), Some(99));
        assert_eq!(content_length_of("Content-Type: text/plain"), None);
        assert_eq!(content_length_of("no colon here"), None);
    }
}
