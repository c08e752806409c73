//! HTTP collaborators on a blocking `reqwest` client.
//!
//! Requests are described by [`HttpRequest`] and sent through an
//! [`HttpClient`], the same way external tools go through a
//! [`CommandRunner`](super::CommandRunner). Uploads, webhook announcements,
//! hosting service APIs and the SDKMAN! vendor API all use it.

use super::{Announcement, Announcer, Uploader};
use crate::release::{
    error::{Error, ErrorExt, Result},
    props::PropertyContext,
    settings::UploaderConfig,
    templates,
};
use reqwest::{Method, blocking::Client, header::CONTENT_TYPE};
use serde_json::{Value, json};
use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

/// Time a request may take before it is abandoned.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    Empty,
    Json(Value),
    /// Raw file contents, streamed.
    File(PathBuf),
    /// A `multipart/form-data` form holding one file field.
    Multipart { field: String, path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Header {
    name: String,
    value: String,
    secret: bool,
}

/// An HTTP request, ready to be sent by an [`HttpClient`].
///
/// Secret headers and masked URLs never show up when the request is
/// displayed or logged.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    masked_url: bool,
    headers: Vec<Header>,
    pub basic_auth: Option<(String, String)>,
    pub body: HttpBody,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            masked_url: false,
            headers: Vec::new(),
            basic_auth: None,
            body: HttpBody::Empty,
            timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header {
            name: name.into(),
            value: value.into(),
            secret: false,
        });
        self
    }

    /// Adds a header that must never show up in logs.
    pub fn secret_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header {
            name: name.into(),
            value: value.into(),
            secret: true,
        });
        self
    }

    /// Hides the URL when displayed. Webhook URLs carry their credentials.
    pub fn masked(mut self) -> Self {
        self.masked_url = true;
        self
    }

    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    pub fn json(mut self, payload: Value) -> Self {
        self.body = HttpBody::Json(payload);
        self
    }

    pub fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.body = HttpBody::File(path.as_ref().to_path_buf());
        self
    }

    pub fn multipart(mut self, field: impl Into<String>, path: impl AsRef<Path>) -> Self {
        self.body = HttpBody::Multipart {
            field: field.into(),
            path: path.as_ref().to_path_buf(),
        };
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Value of the header `name`, secrets included.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.masked_url {
            write!(f, "{} ********", self.method)
        } else {
            write!(f, "{} {}", self.method, self.url)
        }
    }
}

/// Status and body of a finished request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends HTTP requests.
pub trait HttpClient {
    /// Sends `request`. A non-2xx status is not an error here.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;

    /// Sends `request` and turns a non-2xx status into [`Error::RequestFailed`].
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        log::debug!("sending {}", request);
        let response = self.execute(request)?;
        if response.success() {
            Ok(response)
        } else {
            Err(Error::RequestFailed {
                request: request.to_string(),
                status: response.status,
                body: response.body.trim().to_string(),
            })
        }
    }
}

/// [`HttpClient`] backed by `reqwest::blocking`.
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .timeout(request.timeout);
        for header in &request.headers {
            builder = builder.header(&header.name, &header.value);
        }
        if let Some((username, password)) = &request.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }
        builder = match &request.body {
            HttpBody::Empty => builder,
            HttpBody::Json(payload) => builder.json(payload),
            HttpBody::File(path) => {
                let file = File::open(path).fs_context("opening upload", path)?;
                builder.body(file)
            }
            HttpBody::Multipart { field, path } => {
                let form = reqwest::blocking::multipart::Form::new()
                    .file(field.clone(), path)
                    .fs_context("opening upload", path)?;
                builder.multipart(form)
            }
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

/// Uploads artifacts with an HTTP `PUT`.
pub struct HttpUploader {
    http: Arc<dyn HttpClient>,
}

impl HttpUploader {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

impl Uploader for HttpUploader {
    fn upload(&self, config: &UploaderConfig, artifact: &Path, props: &PropertyContext) -> Result<()> {
        let template = config
            .upload_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| Error::config(format!("upload.{}.upload_url is not set", config.name)))?;
        let url = templates::render_str("upload url", template, props)?;

        let mut request = HttpRequest::put(url)
            .header(CONTENT_TYPE.as_str(), "application/octet-stream")
            .file(artifact);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            request = request.basic_auth(username, password);
        }
        log::info!("uploading {} to {}", artifact.display(), request.url);
        self.http.send(&request)?;
        Ok(())
    }
}

/// Posts announcements to webhooks. The `log` kind only logs.
pub struct WebhookAnnouncer {
    http: Arc<dyn HttpClient>,
}

impl WebhookAnnouncer {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    fn payload(announcement: &Announcement) -> Value {
        match announcement.kind.as_str() {
            "discord" => json!({ "content": announcement.message }),
            "slack" | "webhook" => json!({ "text": announcement.message }),
            // Other channels receive the message as a JSON string.
            _ => Value::String(announcement.message.clone()),
        }
    }
}

impl Announcer for WebhookAnnouncer {
    fn announce(&self, announcement: &Announcement) -> Result<()> {
        if announcement.kind == "log" {
            log::info!("{}", announcement.message);
            return Ok(());
        }
        let endpoint = announcement
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| {
                Error::config(format!("announcer {} has no endpoint", announcement.name))
            })?;

        let mut request = HttpRequest::post(endpoint)
            .masked()
            .json(Self::payload(announcement));
        for (name, value) in &announcement.headers {
            request = request.secret_header(name, value);
        }
        self.http.send(&request)?;
        log::info!("announced to {}", announcement.name);
        Ok(())
    }
}
