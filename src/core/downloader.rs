//! URL downloader for new GIF assets.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use reqwest::blocking::Client;
use tracing::{debug, warn};
use url::Url;

use crate::config::Settings;
use crate::constants;
use crate::error::PublishError;

/// Downloads `url` into `dest`, returning the number of bytes written.
///
/// # Errors
///
/// Returns [`PublishError::Download`] when the URL is not http(s), the
/// request fails, the server answers with an error or HTML, the body is
/// larger than the configured limit, nothing was received, or `dest`
/// cannot be written.
pub fn download_gif(url: &str, dest: &Path, settings: &Settings) -> Result<u64, PublishError> {
    let parsed = Url::parse(url).map_err(|e| PublishError::Download(format!("{url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(PublishError::Download(format!(
            "unsupported URL scheme '{}'",
            parsed.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(settings.http_timeout)
        .user_agent(settings.user_agent.as_str())
        .build()
        .map_err(|e| {
            PublishError::Download(format!("{}: {e}", constants::ERR_HTTP_CLIENT_BUILD_FAILED))
        })?;

    let response = client.get(parsed).send().map_err(|e| {
        PublishError::Download(format!("{}: {e}", constants::ERR_NETWORK_REQUEST_FAILED))
    })?;

    if !response.status().is_success() {
        return Err(PublishError::Download(format!(
            "{}{}",
            constants::ERR_SERVER_ERROR,
            response.status()
        )));
    }

    if let Some(content_type) = response.headers().get("content-type") {
        let ct = content_type.to_str().unwrap_or("").to_lowercase();
        if ct.contains("text/html") {
            return Err(PublishError::Download(constants::ERR_HTML_CONTENT.to_string()));
        }
        if !ct.contains(constants::GIF_CONTENT_TYPE) {
            warn!(content_type = %ct, "response is not declared as image/gif");
        }
    }

    if let (Some(limit), Some(declared)) =
        (settings.max_download_bytes, response.content_length())
    {
        if declared > limit {
            return Err(too_large(limit));
        }
    }

    let mut file = File::create(dest).map_err(|e| {
        PublishError::Download(format!(
            "{} {}: {e}",
            constants::ERR_WRITE_FAILED,
            dest.display()
        ))
    })?;
    let written = match settings.max_download_bytes {
        Some(limit) => {
            let mut limited = response.take(limit.saturating_add(1));
            let written = io::copy(&mut limited, &mut file).map_err(read_failed)?;
            if written > limit {
                return Err(too_large(limit));
            }
            written
        }
        None => {
            let mut response = response;
            io::copy(&mut response, &mut file).map_err(read_failed)?
        }
    };

    if written == 0 {
        return Err(PublishError::Download(constants::ERR_EMPTY_CONTENT.to_string()));
    }

    debug!(bytes = written, dest = %dest.display(), "download complete");
    Ok(written)
}

fn read_failed(e: io::Error) -> PublishError {
    PublishError::Download(format!("{}: {e}", constants::ERR_READ_CONTENT_FAILED))
}

fn too_large(limit: u64) -> PublishError {
    PublishError::Download(format!(
        "{}{} MiB",
        constants::ERR_TOO_LARGE,
        limit / (1024 * 1024)
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one HTTP response on a local port and return its URL.
    pub(crate) fn serve_once(status: &str, content_type: &str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).map(|n| n > 2).unwrap_or(false) {
                    line.clear();
                }
                let _ = stream.write_all(head.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
            }
        });
        format!("http://{addr}/reaction.gif")
    }

    fn settings() -> Settings {
        Settings::defaults(".")
    }

    #[test]
    fn test_download_writes_body() {
        let url = serve_once("200 OK", "image/gif", constants::MINIMAL_GIF.to_vec());
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.gif");

        let written = download_gif(&url, &dest, &settings()).unwrap();
        assert_eq!(written, constants::MINIMAL_GIF.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), constants::MINIMAL_GIF);
    }

    #[test]
    fn test_download_rejects_empty_body() {
        let url = serve_once("200 OK", "image/gif", Vec::new());
        let dir = tempfile::tempdir().unwrap();
        let err = download_gif(&url, &dir.path().join("out.gif"), &settings()).unwrap_err();
        assert!(matches!(err, PublishError::Download(ref m) if m == constants::ERR_EMPTY_CONTENT));
    }

    #[test]
    fn test_download_rejects_server_error() {
        let url = serve_once("404 Not Found", "text/plain", b"missing".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let err = download_gif(&url, &dir.path().join("out.gif"), &settings()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_download_rejects_html() {
        let url = serve_once("200 OK", "text/html; charset=utf-8", b"<html></html>".to_vec());
        let dir = tempfile::tempdir().unwrap();
        let err = download_gif(&url, &dir.path().join("out.gif"), &settings()).unwrap_err();
        assert!(err.to_string().contains("HTML"));
    }

    #[test]
    fn test_download_enforces_size_limit() {
        let url = serve_once("200 OK", "image/gif", vec![b'G'; 2 * 1024 * 1024]);
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings();
        settings.max_download_bytes = Some(1024 * 1024);
        let err = download_gif(&url, &dir.path().join("out.gif"), &settings).unwrap_err();
        assert!(err.to_string().contains("size limit"));
    }

    #[test]
    fn test_download_accepts_other_content_types() {
        let url = serve_once(
            "200 OK",
            "application/octet-stream",
            constants::MINIMAL_GIF.to_vec(),
        );
        let dir = tempfile::tempdir().unwrap();
        let written = download_gif(&url, &dir.path().join("out.gif"), &settings()).unwrap();
        assert_eq!(written, constants::MINIMAL_GIF.len() as u64);
    }

    #[test]
    fn test_download_without_size_limit() {
        let size = 6 * 1024 * 1024;
        let url = serve_once("200 OK", "application/octet-stream", vec![b'G'; size]);
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.gif");
        let mut settings = settings();
        settings.max_download_bytes = None;

        let written = download_gif(&url, &dest, &settings).unwrap();
        assert_eq!(written, size as u64);
        assert_eq!(std::fs::metadata(&dest).unwrap().len(), size as u64);
    }

    #[test]
    fn test_unwritable_destination_is_a_download_error() {
        let url = serve_once("200 OK", "image/gif", constants::MINIMAL_GIF.to_vec());
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("out.gif");
        let err = download_gif(&url, &dest, &settings()).unwrap_err();
        assert!(matches!(err, PublishError::Download(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_download_rejects_non_http_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            download_gif("ftp://example.com/a.gif", &dir.path().join("out.gif"), &settings())
                .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
