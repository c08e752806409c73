//! SDKMAN! vendor releases.
//!
//! Nothing is generated: publishing calls the vendor API once per artifact,
//! then makes the version the default for major releases and announces it.

use super::{ToolProcessor, or_default, variant};
use crate::release::{
    builder::ReleaseContext,
    error::Result,
    props::{PropertyContext, keys},
    services::HttpRequest,
    settings::{Distribution, Packager, PackagerType, Sdkman, SdkmanCommand},
};
use reqwest::Method;
use serde_json::{Value, json};
use std::time::Duration;

pub struct SdkmanProcessor;

const VENDOR_API: &str = "https://vendors.sdkman.io";

/// One vendor API call.
#[derive(Debug, Clone, PartialEq)]
struct Call {
    method: Method,
    path: &'static str,
    payload: Value,
}

/// Calls publishing the release described by `props`.
fn calls(command: SdkmanCommand, props: &PropertyContext) -> Vec<Call> {
    let candidate = props.text("sdkmanCandidate");
    let version = props.text(keys::PROJECT_VERSION);

    let mut calls: Vec<Call> = props
        .get(keys::ARTIFACTS)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|artifact| Call {
            method: Method::POST,
            path: "/release",
            payload: json!({
                "candidate": candidate,
                "version": version,
                "platform": Sdkman::platform_id(artifact["platform"].as_str().unwrap_or_default()),
                "url": artifact["url"],
                "checksums": { "SHA-256": artifact["checksumSha256"] },
            }),
        })
        .collect();

    if command == SdkmanCommand::Major {
        calls.push(Call {
            method: Method::PUT,
            path: "/default",
            payload: json!({ "candidate": candidate, "version": version }),
        });
    }
    calls.push(Call {
        method: Method::POST,
        path: "/announce/struct",
        payload: json!({
            "candidate": candidate,
            "version": version,
            "url": props.text("sdkmanReleaseNotesUrl"),
        }),
    });
    calls
}

fn request(sdkman: &Sdkman, call: &Call) -> HttpRequest {
    let timeout = Duration::from_secs(sdkman.connect_timeout() + sdkman.read_timeout());
    HttpRequest::new(call.method.clone(), format!("{}{}", VENDOR_API, call.path))
        .timeout(timeout)
        .header("Accept", "application/json")
        .secret_header("Consumer-Key", sdkman.consumer_key.as_deref().unwrap_or_default())
        .secret_header("Consumer-Token", sdkman.consumer_token.as_deref().unwrap_or_default())
        .json(call.payload.clone())
}

impl ToolProcessor for SdkmanProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Sdkman
    }

    fn fill_props(
        &self,
        ctx: &ReleaseContext,
        _distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let sdkman = variant!(packager, Sdkman);
        props.put("sdkmanCandidate", or_default(&sdkman.candidate, ctx.model().project.name()));
        let notes = or_default(&sdkman.release_notes_url, &props.text(keys::RELEASE_NOTES_URL));
        let notes = crate::release::templates::render_str("sdkman release notes", &notes, props)?;
        props.put("sdkmanReleaseNotesUrl", notes);
        props.put("sdkmanCommand", sdkman.command().as_str());
        Ok(())
    }

    fn publish(
        &self,
        ctx: &ReleaseContext,
        _distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<()> {
        let sdkman = variant!(packager, Sdkman);
        let calls = calls(sdkman.command(), props);
        if ctx.is_dry_run() {
            for call in &calls {
                log::info!("dry-run: would {} {}{}", call.method, VENDOR_API, call.path);
            }
            return Ok(());
        }
        for call in &calls {
            ctx.services().http.send(&request(sdkman, call))?;
            log::debug!("{} {} done", call.method, call.path);
        }
        log::info!(
            "✓ released {} {} on SDKMAN!",
            props.text("sdkmanCandidate"),
            props.text(keys::PROJECT_VERSION)
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::{
        platform::{
            processor_for,
            tests::{fixture, props_for},
        },
        services::{HttpBody, recording::RecordingServices},
    };

    const MODEL: &str = r#"
        [project]
        name = "app"
        version = "5.0.0"

        [release]
        owner = "acme"

        [packagers.sdkman]
        active = "ALWAYS"
        candidate = "acme-app"
        consumer_key = "key"
        consumer_token = "token"

        [[distributions]]
        name = "app"
        type = "JAVA_BINARY"
        [[distributions.artifacts]]
        path = "dist/app-5.0.0.zip"
    "#;

    #[test]
    fn major_release_sets_the_default_and_announces() {
        let dir = tempfile::tempdir().unwrap();
        let recording = RecordingServices::new();
        let ctx = fixture(MODEL, dir.path(), &["dist/app-5.0.0.zip"], &recording);
        let props = props_for(&ctx, PackagerType::Sdkman);
        assert_eq!(props.text("sdkmanCandidate"), "acme-app");
        assert_eq!(props.text("sdkmanCommand"), "major");

        let distribution = &ctx.model().distributions[0];
        let packager = distribution.packagers.get(PackagerType::Sdkman).unwrap();
        processor_for(PackagerType::Sdkman)
            .publish(&ctx, distribution, packager, &props)
            .unwrap();

        assert_eq!(
            recording.http.requests(),
            vec![
                "POST https://vendors.sdkman.io/release",
                "PUT https://vendors.sdkman.io/default",
                "POST https://vendors.sdkman.io/announce/struct"
            ]
        );
        let release = &recording.http.calls()[0];
        assert_eq!(release.header_value("consumer-key"), Some("key"));
        match &release.body {
            HttpBody::Json(payload) => assert_eq!(payload["platform"], "UNIVERSAL"),
            other => panic!("expected a JSON body, got {:?}", other),
        }
        assert!(recording.runner.commands().is_empty());
    }

    #[test]
    fn minor_release_skips_the_default() {
        let mut props = PropertyContext::new();
        props.put("sdkmanCandidate", "app");
        props.put(keys::PROJECT_VERSION, "1.0.1");
        props.put(
            keys::ARTIFACTS,
            json!([
                { "platform": "osx-aarch_64", "url": "u1", "checksumSha256": "c1" },
                { "platform": "linux-x86_64", "url": "u2", "checksumSha256": "c2" },
            ]),
        );
        let calls = calls(SdkmanCommand::Minor, &props);
        let paths: Vec<&str> = calls.iter().map(|c| c.path).collect();
        assert_eq!(paths, vec!["/release", "/release", "/announce/struct"]);
        assert_eq!(calls[0].payload["platform"], "MAC_ARM64");
        assert_eq!(calls[1].payload["checksums"]["SHA-256"], "c2");
    }
}
