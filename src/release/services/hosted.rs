//! [`ReleaseRepository`] talking to the hosting service's REST API.
//!
//! GitHub uses `/repos` under `api.github.com` (or `/api/v3` on Enterprise
//! hosts), GitLab uses `/api/v4/projects` and Gitea and Codeberg use
//! `/api/v1/repos`. Generic services have no release API.

use super::{HttpClient, HttpRequest, ReleaseRepository, RepositoryHandle};
use crate::release::{
    error::{Error, Result},
    props::{PropertyContext, keys},
    settings::{ReleaseService, ServiceKind},
};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;
use std::{path::Path, sync::Arc};

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub struct HostedRepository {
    service: ReleaseService,
    project_name: String,
    http: Arc<dyn HttpClient>,
}

impl HostedRepository {
    pub fn new(service: ReleaseService, project_name: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            service,
            project_name: project_name.to_string(),
            http,
        }
    }

    /// Owner and name of the repository releases are created in.
    fn release_repository(&self) -> (&str, &str) {
        let name = self
            .service
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.project_name);
        (self.service.owner(), name)
    }

    fn is_github_com(&self) -> bool {
        self.service.host() == "github.com"
    }

    fn api_base(&self) -> Result<String> {
        let host = self.service.host();
        Ok(match self.service.service {
            ServiceKind::Github if self.is_github_com() => "https://api.github.com".to_string(),
            ServiceKind::Github => format!("https://{}/api/v3", host),
            ServiceKind::Gitlab => format!("https://{}/api/v4", host),
            ServiceKind::Gitea | ServiceKind::Codeberg => format!("https://{}/api/v1", host),
            ServiceKind::Generic => {
                crate::bail!("release service `generic` does not support releases")
            }
        })
    }

    /// API path of a repository, relative to [`api_base`](Self::api_base).
    fn repository_path(&self, owner: &str, name: &str) -> String {
        match self.service.service {
            ServiceKind::Gitlab => format!("/projects/{}", encode(&format!("{}/{}", owner, name))),
            _ => format!("/repos/{}/{}", owner, name),
        }
    }

    /// Adds the service's authentication to `request`.
    fn authorize(&self, request: HttpRequest, token: Option<&str>) -> HttpRequest {
        let request = match self.service.service {
            ServiceKind::Github => request.header(ACCEPT.as_str(), "application/vnd.github+json"),
            _ => request.header(ACCEPT.as_str(), "application/json"),
        };
        let Some(token) = token.map(str::to_string).or_else(|| self.resolve_token()) else {
            return request;
        };
        match self.service.service {
            ServiceKind::Gitlab => request.secret_header("PRIVATE-TOKEN", token),
            ServiceKind::Gitea | ServiceKind::Codeberg => {
                request.secret_header(AUTHORIZATION.as_str(), format!("token {}", token))
            }
            _ => request.secret_header(AUTHORIZATION.as_str(), format!("Bearer {}", token)),
        }
    }

    fn repository_exists(&self, owner: &str, name: &str, token: Option<&str>) -> Result<bool> {
        let url = format!("{}{}", self.api_base()?, self.repository_path(owner, name));
        let request = self.authorize(HttpRequest::get(url), token);
        let response = self.http.execute(&request)?;
        match response.status {
            404 => Ok(false),
            _ if response.success() => Ok(true),
            status => Err(Error::RequestFailed {
                request: request.to_string(),
                status,
                body: response.body.trim().to_string(),
            }),
        }
    }

    fn create_repository(&self, owner: &str, name: &str, token: Option<&str>) -> Result<()> {
        let api = self.api_base()?;
        let request = match self.service.service {
            ServiceKind::Gitlab => {
                let namespace = self.authorize(
                    HttpRequest::get(format!("{}/namespaces/{}", api, encode(owner))),
                    token,
                );
                let namespace_id = self.http.send(&namespace)?.json()?["id"].clone();
                HttpRequest::post(format!("{}/projects", api)).json(json!({
                    "name": name,
                    "path": name,
                    "namespace_id": namespace_id,
                    "visibility": "public",
                }))
            }
            _ => {
                let personal = self.service.username.as_deref() == Some(owner);
                let url = if personal {
                    format!("{}/user/repos", api)
                } else {
                    format!("{}/orgs/{}/repos", api, owner)
                };
                HttpRequest::post(url).json(json!({ "name": name, "private": false }))
            }
        };
        self.http.send(&self.authorize(request, token))?;
        Ok(())
    }

    /// Id of the release tagged `tag_name`.
    fn release_id(&self, owner: &str, name: &str, tag_name: &str) -> Result<u64> {
        let url = format!(
            "{}{}/releases/tags/{}",
            self.api_base()?,
            self.repository_path(owner, name),
            encode(tag_name)
        );
        let release = self.http.send(&self.authorize(HttpRequest::get(url), None))?.json()?;
        release["id"]
            .as_u64()
            .ok_or_else(|| Error::tool(format!("release {} of {}/{} has no id", tag_name, owner, name)))
    }
}

impl ReleaseRepository for HostedRepository {
    fn resolve_repo_url(&self, owner: &str, name: &str) -> Result<String> {
        self.service.resolve_repo_url(owner, name)
    }

    fn resolve_token(&self) -> Option<String> {
        self.service.token.clone()
    }

    fn create_or_find_repository(
        &self,
        owner: &str,
        name: &str,
        token: Option<&str>,
    ) -> Result<RepositoryHandle> {
        if self.repository_exists(owner, name, token)? {
            log::debug!("repository {}/{} found", owner, name);
        } else {
            log::info!("creating repository {}/{}", owner, name);
            self.create_repository(owner, name, token)?;
        }
        Ok(RepositoryHandle {
            owner: owner.to_string(),
            name: name.to_string(),
            url: self.service.resolve_repo_url(owner, name)?,
            clone_url: self.service.resolve_clone_url(owner, name)?,
        })
    }

    fn create_release(&self, props: &PropertyContext) -> Result<()> {
        let (owner, name) = self.release_repository();
        let tag = props.tag_name();
        let title = props.text(keys::RELEASE_NAME);
        let url = format!("{}{}/releases", self.api_base()?, self.repository_path(owner, name));
        let payload = match self.service.service {
            ServiceKind::Github => json!({
                "tag_name": tag,
                "name": title,
                "target_commitish": self.service.branch(),
                "generate_release_notes": true,
            }),
            ServiceKind::Gitlab => json!({
                "tag_name": tag,
                "name": title,
                "ref": self.service.branch(),
            }),
            _ => json!({
                "tag_name": tag,
                "name": title,
                "target_commitish": self.service.branch(),
            }),
        };
        self.http.send(&self.authorize(HttpRequest::post(url).json(payload), None))?;
        Ok(())
    }

    fn upload_asset(&self, tag_name: &str, path: &Path) -> Result<()> {
        let (owner, name) = self.release_repository();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::tool(format!("{} is not a file", path.display())))?;
        let api = self.api_base()?;
        let repository = self.repository_path(owner, name);

        match self.service.service {
            ServiceKind::Github => {
                let id = self.release_id(owner, name, tag_name)?;
                let uploads = if self.is_github_com() {
                    "https://uploads.github.com".to_string()
                } else {
                    format!("https://{}/api/uploads", self.service.host())
                };
                let request = HttpRequest::post(format!(
                    "{}{}/releases/{}/assets?name={}",
                    uploads,
                    repository,
                    id,
                    encode(&file_name)
                ))
                .header(CONTENT_TYPE.as_str(), "application/octet-stream")
                .file(path);
                self.http.send(&self.authorize(request, None))?;
            }
            ServiceKind::Gitlab => {
                // Files go to the generic package registry, the release links them.
                let version = tag_name.trim_start_matches('v');
                let package_url = format!(
                    "{}{}/packages/generic/{}/{}/{}",
                    api,
                    repository,
                    encode(name),
                    encode(version),
                    encode(&file_name)
                );
                let upload = HttpRequest::put(&package_url).file(path);
                self.http.send(&self.authorize(upload, None))?;
                let link = HttpRequest::post(format!(
                    "{}{}/releases/{}/assets/links",
                    api,
                    repository,
                    encode(tag_name)
                ))
                .json(json!({ "name": file_name, "url": package_url }));
                self.http.send(&self.authorize(link, None))?;
            }
            _ => {
                let id = self.release_id(owner, name, tag_name)?;
                let request = HttpRequest::post(format!(
                    "{}{}/releases/{}/assets?name={}",
                    api,
                    repository,
                    id,
                    encode(&file_name)
                ))
                .multipart("attachment", path);
                self.http.send(&self.authorize(request, None))?;
            }
        }
        log::debug!("uploaded {} to {}/{} {}", file_name, owner, name, tag_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::services::{HttpBody, recording::RecordingHttp};
    use std::path::PathBuf;

    fn repository(kind: ServiceKind, http: &Arc<RecordingHttp>) -> HostedRepository {
        let service = ReleaseService {
            service: kind,
            owner: Some("acme".into()),
            token: Some("secret".into()),
            ..Default::default()
        };
        HostedRepository::new(service, "app", Arc::clone(http) as Arc<dyn HttpClient>)
    }

    #[test]
    fn creates_missing_repository() {
        let http = Arc::new(RecordingHttp::new().responding(
            "GET https://api.github.com/repos/acme/homebrew-tap",
            404,
            "",
        ));
        let handle = repository(ServiceKind::Github, &http)
            .create_or_find_repository("acme", "homebrew-tap", None)
            .unwrap();

        assert_eq!(handle.clone_url, "https://github.com/acme/homebrew-tap.git");
        assert_eq!(
            http.requests(),
            vec![
                "GET https://api.github.com/repos/acme/homebrew-tap",
                "POST https://api.github.com/orgs/acme/repos"
            ]
        );
        let calls = http.calls();
        assert_eq!(calls[0].header_value("authorization"), Some("Bearer secret"));
        assert_eq!(
            calls[1].body,
            HttpBody::Json(json!({ "name": "homebrew-tap", "private": false }))
        );
    }

    #[test]
    fn existing_repository_is_reused() {
        let http = Arc::new(RecordingHttp::new());
        repository(ServiceKind::Codeberg, &http)
            .create_or_find_repository("acme", "tap", Some("override"))
            .unwrap();
        assert_eq!(http.requests(), vec!["GET https://codeberg.org/api/v1/repos/acme/tap"]);
        assert_eq!(http.calls()[0].header_value("authorization"), Some("token override"));
    }

    #[test]
    fn github_assets_go_to_the_uploads_host() {
        let http = Arc::new(RecordingHttp::new().responding(
            "GET https://api.github.com/repos/acme/app/releases/tags/v1.0.0",
            200,
            r#"{"id": 7}"#,
        ));
        repository(ServiceKind::Github, &http)
            .upload_asset("v1.0.0", Path::new("out/app.zip"))
            .unwrap();
        assert_eq!(
            http.requests(),
            vec![
                "GET https://api.github.com/repos/acme/app/releases/tags/v1.0.0",
                "POST https://uploads.github.com/repos/acme/app/releases/7/assets?name=app.zip"
            ]
        );
        assert_eq!(http.calls()[1].body, HttpBody::File(PathBuf::from("out/app.zip")));
    }

    #[test]
    fn gitlab_links_registry_packages() {
        let http = Arc::new(RecordingHttp::new());
        let repo = repository(ServiceKind::Gitlab, &http);
        let mut props = PropertyContext::new();
        props.put(keys::TAG_NAME, "v1.0.0");
        props.put(keys::RELEASE_NAME, "Release v1.0.0");
        repo.create_release(&props).unwrap();
        repo.upload_asset("v1.0.0", Path::new("app.zip")).unwrap();

        assert_eq!(
            http.requests(),
            vec![
                "POST https://gitlab.com/api/v4/projects/acme%2Fapp/releases",
                "PUT https://gitlab.com/api/v4/projects/acme%2Fapp/packages/generic/app/1.0.0/app.zip",
                "POST https://gitlab.com/api/v4/projects/acme%2Fapp/releases/v1.0.0/assets/links"
            ]
        );
        assert_eq!(http.calls()[0].header_value("private-token"), Some("secret"));
    }

    #[test]
    fn generic_service_cannot_release() {
        let http = Arc::new(RecordingHttp::new());
        let repo = repository(ServiceKind::Generic, &http);
        assert!(repo.create_release(&PropertyContext::new()).is_err());
        assert!(http.requests().is_empty());
    }
}
