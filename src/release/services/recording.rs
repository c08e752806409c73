//! Test doubles that record every interaction instead of performing it.

use super::{
    Announcement, Announcer, CommandLine, CommandOutput, CommandRunner, HttpClient, HttpRequest,
    HttpResponse, ReleaseRepository, RepositoryHandle, Services, Signer, Uploader,
};
use crate::release::{
    error::Result,
    props::PropertyContext,
    settings::{Signing, UploaderConfig},
};
use std::{
    fs,
    path::Path,
    sync::{Arc, Mutex},
};

/// Records commands and answers them with exit code 0, or 1 for commands
/// starting with one of the failing prefixes.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    failing: Vec<String>,
    calls: Mutex<Vec<CommandLine>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(prefix: &str) -> Self {
        Self {
            failing: vec![prefix.to_string()],
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Recorded commands as displayed, secrets masked.
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn execute(&self, command: &CommandLine) -> Result<CommandOutput> {
        let display = command.to_string();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.clone());
        }
        if self.failing.iter().any(|prefix| display.starts_with(prefix.as_str())) {
            return Ok(CommandOutput {
                code: 1,
                stdout: String::new(),
                stderr: format!("{} failed", command.program),
            });
        }
        Ok(CommandOutput::default())
    }
}

/// Records requests and answers them with `200 {}`, or with the response of
/// the first rule whose prefix matches the displayed request.
#[derive(Debug, Default)]
pub struct RecordingHttp {
    responses: Vec<(String, HttpResponse)>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responding(mut self, prefix: &str, status: u16, body: &str) -> Self {
        self.responses.push((
            prefix.to_string(),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        ));
        self
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Recorded requests as displayed, masked URLs hidden.
    pub fn requests(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }
}

impl HttpClient for RecordingHttp {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let display = request.to_string();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }
        let response = self
            .responses
            .iter()
            .find(|(prefix, _)| display.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| HttpResponse {
                status: 200,
                body: "{}".to_string(),
            });
        Ok(response)
    }
}

/// Repository, uploader, announcer and signer writing to one shared journal.
#[derive(Debug, Clone, Default)]
pub struct RecordingServices {
    journal: Arc<Mutex<Vec<String>>>,
    pub runner: Arc<RecordingRunner>,
    pub http: Arc<RecordingHttp>,
}

impl RecordingServices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_runner(runner: RecordingRunner) -> Self {
        Self {
            runner: Arc::new(runner),
            ..Self::default()
        }
    }

    pub fn services(&self) -> Services {
        Services {
            runner: Arc::clone(&self.runner) as Arc<dyn CommandRunner>,
            http: Arc::clone(&self.http) as Arc<dyn HttpClient>,
            repository: Box::new(self.clone()),
            uploader: Box::new(self.clone()),
            announcer: Box::new(self.clone()),
            signer: Box::new(self.clone()),
        }
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().map(|j| j.clone()).unwrap_or_default()
    }

    fn record(&self, entry: String) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.push(entry);
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ReleaseRepository for RecordingServices {
    fn resolve_repo_url(&self, owner: &str, name: &str) -> Result<String> {
        Ok(format!("https://github.com/{}/{}", owner, name))
    }

    fn resolve_token(&self) -> Option<String> {
        Some("token".into())
    }

    fn create_or_find_repository(
        &self,
        owner: &str,
        name: &str,
        _token: Option<&str>,
    ) -> Result<RepositoryHandle> {
        self.record(format!("repository {}/{}", owner, name));
        Ok(RepositoryHandle {
            owner: owner.to_string(),
            name: name.to_string(),
            url: self.resolve_repo_url(owner, name)?,
            clone_url: format!("https://github.com/{}/{}.git", owner, name),
        })
    }

    fn create_release(&self, props: &PropertyContext) -> Result<()> {
        self.record(format!("release {}", props.tag_name()));
        Ok(())
    }

    fn upload_asset(&self, tag_name: &str, path: &Path) -> Result<()> {
        self.record(format!("asset {} {}", tag_name, file_name(path)));
        Ok(())
    }
}

impl Uploader for RecordingServices {
    fn upload(&self, config: &UploaderConfig, artifact: &Path, _props: &PropertyContext) -> Result<()> {
        self.record(format!("upload {} {}", config.name, file_name(artifact)));
        Ok(())
    }
}

impl Announcer for RecordingServices {
    fn announce(&self, announcement: &Announcement) -> Result<()> {
        self.record(format!("announce {} {}", announcement.name, announcement.message));
        Ok(())
    }
}

impl Signer for RecordingServices {
    fn sign(&self, _signing: &Signing, file: &Path, signature: &Path) -> Result<()> {
        self.record(format!("sign {}", file_name(file)));
        fs::write(signature, b"signature")?;
        Ok(())
    }
}
