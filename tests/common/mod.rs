#![allow(dead_code)] // each test binary uses a different subset of helpers

pub mod test_server {
    use std::sync::Once;

    /// Ensures may coroutines are configured only once per test binary
    static MAY_INIT: Once = Once::new();

    pub fn setup_may_runtime() {
        MAY_INIT.call_once(|| {
            may::config().set_stack_size(0x8000);
        });
    }
}

pub mod http {
    use std::io::{Read, Write};
    use std::net::{SocketAddr, TcpStream};
    use std::time::Duration;

    /// Minimal parsed HTTP response for assertions
    #[derive(Debug)]
    pub struct HttpResponse {
        pub status: u16,
        pub headers: Vec<(String, String)>,
        pub body: String,
    }

    impl HttpResponse {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Send one HTTP/1.1 request over a fresh connection and parse the
    /// response. Reads until the announced Content-Length has arrived (or
    /// EOF/timeout when none was announced).
    pub fn send_request(
        addr: SocketAddr,
        method: &str,
        path: &str,
        body: Option<&str>,
    ) -> HttpResponse {
        let mut stream = TcpStream::connect(addr).expect("connect to test server");
        stream
            .set_read_timeout(Some(Duration::from_secs(5)))
            .expect("set read timeout");

        let body = body.unwrap_or("");
        let request = format!(
            "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream
            .write_all(request.as_bytes())
            .expect("write request");

        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            match stream.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    raw.extend_from_slice(&buf[..n]);
                    if response_complete(&raw) {
                        break;
                    }
                }
                Err(_) => break,
            }
        }

        parse_response(&raw)
    }

    fn headers_end(raw: &[u8]) -> Option<usize> {
        raw.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
    }

    fn response_complete(raw: &[u8]) -> bool {
        let Some(body_start) = headers_end(raw) else {
            return false;
        };
        let head = String::from_utf8_lossy(&raw[..body_start]);
        let content_length = head.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())?
        });
        match content_length {
            Some(len) => raw.len() >= body_start + len,
            None => false,
        }
    }

    fn parse_response(raw: &[u8]) -> HttpResponse {
        let body_start = headers_end(raw).expect("complete response head");
        let head = String::from_utf8_lossy(&raw[..body_start]);
        let mut lines = head.lines();

        let status_line = lines.next().expect("status line");
        let status = status_line
            .split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .expect("numeric status code");

        let headers: Vec<(String, String)> = lines
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .collect();

        let content_length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok());
        let mut body_bytes = &raw[body_start..];
        if let Some(len) = content_length {
            body_bytes = &body_bytes[..len.min(body_bytes.len())];
        }

        HttpResponse {
            status,
            headers,
            body: String::from_utf8_lossy(body_bytes).to_string(),
        }
    }
}
