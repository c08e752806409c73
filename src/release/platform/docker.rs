//! Docker images.
//!
//! The prepare directory doubles as build context: the Dockerfile at its root
//! and the distribution artifact under `assembly/`.

use super::{ToolProcessor, copy_prepared, prepare_templates, render_all, variant};
use crate::release::{
    builder::{ReleaseContext, tool_detection::HAS_DOCKER},
    error::Result,
    props::{PropertyContext, keys},
    services::CommandLine,
    settings::{Distribution, DistributionType, Docker, DockerRegistry, Packager, PackagerType},
    templates,
    utils::fs,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub struct DockerProcessor;

fn image_names(props: &PropertyContext) -> Vec<String> {
    props
        .get("dockerImageNames")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn build_command(context: &Path, images: &[String], props: &PropertyContext) -> CommandLine {
    let mut command = CommandLine::new("docker").args(["build", "-f", "Dockerfile"]);
    for arg in props
        .get("dockerBuildArgs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
    {
        command = command.args(["--build-arg", arg]);
    }
    for image in images {
        command = command.args(["-t", image.as_str()]);
    }
    command.arg(".").current_dir(context)
}

/// Image reference inside `registry`. Docker Hub images keep their name.
fn registry_image(registry: &DockerRegistry, image: &str) -> String {
    if registry.server_name.trim().is_empty() {
        image.to_string()
    } else {
        format!("{}/{}", registry.server_name.trim_end_matches('/'), image)
    }
}

fn push_commands(registry: &DockerRegistry, images: &[String]) -> Vec<CommandLine> {
    let mut login = CommandLine::new("docker").arg("login");
    if !registry.server_name.trim().is_empty() {
        login = login.arg(registry.server_name.as_str());
    }
    let login = login
        .args(["-u", registry.username.as_deref().unwrap_or_default(), "-p"])
        .secret_arg(registry.resolve_password().unwrap_or_default());

    let mut commands = vec![login];
    for image in images {
        let target = registry_image(registry, image);
        if &target != image {
            commands.push(CommandLine::new("docker").args(["tag", image.as_str(), target.as_str()]));
        }
        commands.push(CommandLine::new("docker").args(["push", target.as_str()]));
    }
    let mut logout = CommandLine::new("docker").arg("logout");
    if !registry.server_name.trim().is_empty() {
        logout = logout.arg(registry.server_name.as_str());
    }
    commands.push(logout);
    commands
}

fn fill_labels(docker: &Docker, props: &PropertyContext) -> Result<Value> {
    let mut labels = Map::new();
    for (key, value) in docker.labels() {
        let value = match value {
            Value::String(text) => Value::String(templates::render_str("docker label", &text, props)?),
            other => other,
        };
        labels.insert(key, value);
    }
    Ok(Value::Object(labels))
}

impl ToolProcessor for DockerProcessor {
    fn packager_type(&self) -> PackagerType {
        PackagerType::Docker
    }

    fn fill_props(
        &self,
        _ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &mut PropertyContext,
    ) -> Result<()> {
        let docker = variant!(packager, Docker);
        let base_image = templates::render_str(
            "docker base image",
            &docker.base_image(distribution.distribution_type),
            props,
        )?;
        props.put("dockerBaseImage", base_image);
        let labels = fill_labels(docker, props)?;
        props.put("dockerLabels", labels);
        let pre = render_all("docker pre command", &docker.pre_commands, props)?;
        props.put("dockerPreCommands", pre);
        let post = render_all("docker post command", &docker.post_commands, props)?;
        props.put("dockerPostCommands", post);
        let build_args = render_all("docker build arg", &docker.build_args, props)?;
        props.put("dockerBuildArgs", build_args);
        let images = render_all("docker image name", &docker.image_names(), props)?;
        props.put("dockerImageNames", images);
        props.put(
            "dockerSingleJar",
            distribution.distribution_type == DistributionType::SingleJar,
        );
        Ok(())
    }

    fn prepare(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<Vec<PathBuf>> {
        let mut files = prepare_templates(ctx, distribution, packager, props, &|name| {
            self.output_path(packager, props, name)
        })?;

        let artifact = PathBuf::from(props.text(keys::DISTRIBUTION_ARTIFACT));
        let target = ctx
            .prepare_directory(&distribution.name, PackagerType::Docker)
            .join("assembly")
            .join(props.artifact_file());
        fs::copy_file(&artifact, &target)?;
        files.push(target);
        Ok(files)
    }

    fn package(
        &self,
        ctx: &ReleaseContext,
        distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<Vec<PathBuf>> {
        let files = copy_prepared(ctx, distribution, packager)?;
        if !*HAS_DOCKER {
            log::warn!("docker is not available, no image built for {}", distribution.name);
            return Ok(files);
        }
        let context = ctx.package_directory(&distribution.name, PackagerType::Docker);
        let images = image_names(props);
        ctx.services()
            .runner
            .run(&build_command(&context, &images, props))?;
        log::info!("✓ built {}", images.join(", "));
        Ok(files)
    }

    fn publish(
        &self,
        ctx: &ReleaseContext,
        _distribution: &Distribution,
        packager: &Packager,
        props: &PropertyContext,
    ) -> Result<()> {
        let docker = variant!(packager, Docker);
        if docker.registries.is_empty() {
            log::info!("no docker registries configured, nothing to push");
            return Ok(());
        }
        let images = image_names(props);
        for registry in &docker.registries {
            let name = if registry.server_name.is_empty() {
                "docker.io"
            } else {
                registry.server_name.as_str()
            };
            if ctx.is_dry_run() {
                log::info!("dry-run: would push {} to {}", images.join(", "), name);
                continue;
            }
            for command in push_commands(registry, &images) {
                ctx.services().runner.run(&command)?;
            }
            log::info!("✓ pushed {} to {}", images.join(", "), name);
        }
        Ok(())
    }
}
