//! Chart data client
//!
//! Blocking HTTP client for the backend chart-data endpoint. Calls are made
//! from worker threads, never from the UI thread.

use crate::api::{ChartDataResponse, ChartRequest, ErrorResponse};
use crate::config::AppConfig;
use crate::data::SeriesError;
use reqwest::cookie::{CookieStore, Jar};
use percent_encoding::percent_decode_str;
use reqwest::Url;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Path of the chart-data endpoint, relative to the backend root.
pub const CHART_DATA_PATH: &str = "/api/chart-data/";

/// Header carrying the CSRF token.
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid backend URL '{0}'")]
    InvalidUrl(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{}", server_error_text(.status, .message))]
    Server { status: u16, message: Option<String> },
    #[error("Invalid response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid chart data: {0}")]
    InvalidSeries(#[from] SeriesError),
}

impl FetchError {
    /// Message to show the user.
    ///
    /// Server errors show the server's own message verbatim, or `fallback`
    /// when it sent none.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            FetchError::Server { message: Some(m), .. } => m.clone(),
            FetchError::Server { message: None, .. } => fallback.to_string(),
            other => other.to_string(),
        }
    }
}

fn server_error_text(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(m) => m.clone(),
        None => format!("Server returned status {}", status),
    }
}

/// Anything that can answer a chart-data request.
pub trait ChartDataSource: Send + Sync {
    fn fetch_chart_data(&self, request: &ChartRequest) -> Result<ChartDataResponse, FetchError>;
}

/// HTTP implementation of [`ChartDataSource`].
pub struct ChartDataClient {
    base_url: Url,
    csrf_cookie_name: String,
    jar: Arc<Jar>,
    /// Set once the backend root has been fetched for the CSRF cookie.
    primed: AtomicBool,
    client: reqwest::blocking::Client,
}

impl ChartDataClient {
    pub fn new(config: &AppConfig) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|_| FetchError::InvalidUrl(config.base_url.clone()))?;

        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::blocking::Client::builder().cookie_provider(jar.clone());
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url,
            csrf_cookie_name: config.csrf_cookie_name.clone(),
            jar,
            primed: AtomicBool::new(false),
            client: builder.build()?,
        })
    }

    fn endpoint(&self) -> Result<Url, FetchError> {
        self.base_url
            .join(CHART_DATA_PATH)
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))
    }

    fn cookie_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base_url)?;
        let header = header.to_str().ok()?;
        csrf_token_from_cookies(header, &self.csrf_cookie_name)
    }

    /// Token from the cookie jar. The first call without a cookie primes
    /// the jar with a GET of the backend root; later calls never retry.
    fn csrf_token(&self) -> String {
        if let Some(token) = self.cookie_token() {
            return token;
        }
        if self.primed.swap(true, Ordering::SeqCst) {
            return String::new();
        }

        debug!("No {} cookie yet, requesting {}", self.csrf_cookie_name, self.base_url);
        if let Err(e) = self.client.get(self.base_url.clone()).send() {
            warn!("Failed to prime CSRF cookie: {}", e);
        }

        self.cookie_token().unwrap_or_default()
    }
}

impl ChartDataSource for ChartDataClient {
    fn fetch_chart_data(&self, request: &ChartRequest) -> Result<ChartDataResponse, FetchError> {
        let url = self.endpoint()?;
        let token = self.csrf_token();

        info!(
            company_id = %request.company_id,
            start = %request.start_date,
            end = %request.end_date,
            aggregation = %request.aggregation,
            "Requesting chart data"
        );

        let response = self
            .client
            .post(url)
            .header(CSRF_HEADER, token)
            .json(request)
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;
        interpret_response(status, &body)
    }
}

/// Turn a status code and body into a validated response or an error.
pub fn interpret_response(status: u16, body: &str) -> Result<ChartDataResponse, FetchError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|e| e.error)
            .filter(|m| !m.is_empty());
        warn!(status, message = ?message, "Chart data request failed");
        return Err(FetchError::Server { status, message });
    }

    let response: ChartDataResponse = serde_json::from_str(body)?;
    response.chart_data.validate()?;

    if response.data_points != response.chart_data.len() {
        warn!(
            data_points = response.data_points,
            series_len = response.chart_data.len(),
            "data_points disagrees with series length"
        );
    }

    Ok(response)
}

/// Find a cookie value in a `name=value; name2=value2` header and
/// percent-decode it.
pub fn csrf_token_from_cookies(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(str::trim)
        .find_map(|cookie| {
            let (key, value) = cookie.split_once('=')?;
            if key != name {
                return None;
            }
            let decoded = percent_decode_str(value).decode_utf8().ok()?;
            Some(decoded.into_owned())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Aggregation;
    use chrono::NaiveDate;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc::{channel, Receiver};
    use std::thread;

    const OK_BODY: &str = r#"{
        "chart_data": {
            "dates": ["2023-01-03", "2023-01-04"],
            "opens": [10.0, 10.5], "highs": [11.0, 10.8], "lows": [9.5, 10.1],
            "closes": [10.5, 10.2], "volumes": [1000, 1500]
        },
        "data_points": 2,
        "company_name": "Acme",
        "start_date": "2023-01-01",
        "end_date": "2023-01-10",
        "aggregation": "daily"
    }"#;

    #[test]
    fn test_success_response() {
        let response = interpret_response(200, OK_BODY).unwrap();
        assert_eq!(response.company_name, "Acme");
        assert_eq!(response.aggregation, Aggregation::Daily);
        assert_eq!(response.chart_data.len(), 2);
    }

    #[test]
    fn test_server_error_message_is_verbatim() {
        let err = interpret_response(404, r#"{"error":"no data"}"#).unwrap_err();
        assert_eq!(err.user_message("Failed to load chart data"), "no data");
        assert_eq!(err.to_string(), "no data");
    }

    #[test]
    fn test_server_error_without_message_uses_fallback() {
        let err = interpret_response(500, "{}").unwrap_err();
        assert_eq!(err.user_message("Failed to load chart data"), "Failed to load chart data");

        let err = interpret_response(502, "<html>Bad Gateway</html>").unwrap_err();
        assert_eq!(err.user_message("Failed to load data"), "Failed to load data");
    }

    #[test]
    fn test_malformed_success_body() {
        let err = interpret_response(200, "not json").unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_inconsistent_series_rejected() {
        let body = OK_BODY.replace("[1000, 1500]", "[1000]");
        let err = interpret_response(200, &body).unwrap_err();
        assert!(matches!(err, FetchError::InvalidSeries(_)));
    }

    #[test]
    fn test_csrf_token_lookup() {
        let header = "sessionid=abc; csrftoken=tok123; theme=dark";
        assert_eq!(csrf_token_from_cookies(header, "csrftoken"), Some("tok123".to_string()));
        assert_eq!(csrf_token_from_cookies(header, "csrf"), None);
        assert_eq!(csrf_token_from_cookies("", "csrftoken"), None);
        assert_eq!(
            csrf_token_from_cookies("csrftoken=a%2Bb%3D", "csrftoken"),
            Some("a+b=".to_string())
        );
    }

    #[test]
    fn test_server_error_without_message_names_status() {
        let err = FetchError::Server {
            status: 503,
            message: None,
        };
        assert_eq!(err.to_string(), "Server returned status 503");
    }

    /// A request as received by the local test backend.
    #[derive(Debug)]
    struct CapturedRequest {
        request_line: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    impl CapturedRequest {
        fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    fn read_request(stream: &TcpStream) -> std::io::Result<CapturedRequest> {
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line)?;

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line)?;
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((k, v)) = line.split_once(':') {
                headers.push((k.trim().to_string(), v.trim().to_string()));
            }
        }

        let length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = vec![0u8; length];
        reader.read_exact(&mut body)?;

        Ok(CapturedRequest {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Minimal backend on an ephemeral port. GET serves the root page,
    /// setting `set_cookie` if given; POST answers with `OK_BODY`.
    fn spawn_backend(set_cookie: Option<&'static str>) -> (String, Receiver<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = channel();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let Ok(request) = read_request(&stream) else { continue };

                let is_get = request.request_line.starts_with("GET ");
                let (content_type, cookie, body) = if is_get {
                    let cookie = set_cookie
                        .map(|c| format!("Set-Cookie: {}\r\n", c))
                        .unwrap_or_default();
                    ("text/html", cookie, "<html></html>")
                } else {
                    ("application/json", String::new(), OK_BODY)
                };
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n{}\r\n{}",
                    content_type,
                    body.len(),
                    cookie,
                    body
                );
                let _ = stream.write_all(response.as_bytes());

                if tx.send(request).is_err() {
                    break;
                }
            }
        });

        (format!("http://{}", addr), rx)
    }

    fn next_request(rx: &Receiver<CapturedRequest>) -> CapturedRequest {
        rx.recv_timeout(Duration::from_secs(5))
            .expect("backend did not receive a request")
    }

    fn client_for(base_url: String) -> ChartDataClient {
        let config = AppConfig {
            base_url,
            ..AppConfig::default()
        };
        ChartDataClient::new(&config).unwrap()
    }

    fn sample_request() -> ChartRequest {
        ChartRequest {
            company_id: "5".to_string(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
            aggregation: Aggregation::Daily,
        }
    }

    fn assert_chart_post(request: &CapturedRequest, token: &str) {
        assert_eq!(request.request_line, "POST /api/chart-data/ HTTP/1.1");
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("x-csrftoken"), Some(token));

        let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "company_id": "5",
                "start_date": "2023-01-01",
                "end_date": "2023-01-10",
                "aggregation": "daily",
            })
        );
    }

    #[test]
    fn test_post_uses_cookie_from_jar() {
        let (base_url, rx) = spawn_backend(None);
        let client = client_for(base_url);
        client
            .jar
            .add_cookie_str("csrftoken=preset%2Dtok; Path=/", &client.base_url);

        let response = client.fetch_chart_data(&sample_request()).unwrap();
        assert_eq!(response.company_name, "Acme");

        // No priming GET when the cookie is already there.
        let post = next_request(&rx);
        assert_chart_post(&post, "preset-tok");
        assert!(post.header("cookie").unwrap_or("").contains("csrftoken="));
    }

    #[test]
    fn test_missing_cookie_primes_from_backend_root() {
        let (base_url, rx) = spawn_backend(Some("csrftoken=primed123; Path=/"));
        let client = client_for(base_url);

        client.fetch_chart_data(&sample_request()).unwrap();
        client.fetch_chart_data(&sample_request()).unwrap();

        let get = next_request(&rx);
        assert_eq!(get.request_line, "GET / HTTP/1.1");
        assert_chart_post(&next_request(&rx), "primed123");
        assert_chart_post(&next_request(&rx), "primed123");
    }

    #[test]
    fn test_priming_runs_once_without_cookie() {
        let (base_url, rx) = spawn_backend(None);
        let client = client_for(base_url);

        client.fetch_chart_data(&sample_request()).unwrap();
        client.fetch_chart_data(&sample_request()).unwrap();

        assert_eq!(next_request(&rx).request_line, "GET / HTTP/1.1");
        assert_chart_post(&next_request(&rx), "");
        assert_chart_post(&next_request(&rx), "");
    }

    #[test]
    fn test_endpoint_url() {
        let config = AppConfig {
            base_url: "http://127.0.0.1:8000".to_string(),
            ..AppConfig::default()
        };
        let client = ChartDataClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "http://127.0.0.1:8000/api/chart-data/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = AppConfig {
            base_url: "not a url".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            ChartDataClient::new(&config),
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
