//! Dockerfile analyzer
//!
//! Extracts resources from Dockerfile instructions line by line:
//!
//! - `FROM` → `base_image` (attributes: image, tag, stage)
//! - `ENV` → `env_var` per variable
//! - `ARG` → `build_arg`
//! - `EXPOSE` → `exposed_port` per port
//! - `USER` → `user`
//!
//! Compose files are matched to the docker provider as well; they contain
//! no instructions and produce an empty resource list.

use std::path::Path;

use async_trait::async_trait;

use super::{read_file, Analyzer};
use crate::error::AnalysisError;
use crate::models::{Location, Provider, Resource};

pub struct DockerAnalyzer;

#[async_trait]
impl Analyzer for DockerAnalyzer {
    fn provider(&self) -> Provider {
        Provider::Docker
    }

    async fn analyze(&self, path: &Path) -> Result<Vec<Resource>, AnalysisError> {
        let content = read_file(path).await?;
        let file = path.display().to_string();
        let mut resources = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let mut parts = trimmed.split_whitespace();
            let Some(instruction) = parts.next() else {
                continue;
            };
            let args: Vec<&str> = parts.collect();
            let location = Location::new(&file, line_no, line_no);

            match instruction.to_uppercase().as_str() {
                "FROM" => resources.push(parse_from(&file, line_no, &args, location)?),
                "ENV" => resources.extend(parse_key_values("env_var", &args, &location)),
                "ARG" => resources.extend(parse_key_values("build_arg", &args, &location)),
                "EXPOSE" => resources.extend(parse_expose(&args, &location)),
                "USER" => {
                    if let Some(user) = args.first() {
                        // USER name[:group]
                        let name = user.split(':').next().unwrap_or(user);
                        resources.push(Resource::new("user", name, Provider::Docker, location));
                    }
                }
                _ => {}
            }
        }

        Ok(resources)
    }
}

/// Parse `FROM [--platform=...] image[:tag] [AS stage]`
fn parse_from(
    file: &str,
    line_no: usize,
    args: &[&str],
    location: Location,
) -> Result<Resource, AnalysisError> {
    let image_ref = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .ok_or_else(|| AnalysisError::Parse {
            path: file.to_string(),
            message: format!("FROM instruction without an image on line {}", line_no),
        })?;

    let (image, tag) = split_image_tag(image_ref);

    let mut resource =
        Resource::new("base_image", *image_ref, Provider::Docker, location)
            .with_attribute("image", image);
    if let Some(tag) = tag {
        resource = resource.with_attribute("tag", tag);
    }

    let stage = args
        .iter()
        .position(|a| a.eq_ignore_ascii_case("AS"))
        .and_then(|i| args.get(i + 1));
    if let Some(stage) = stage {
        resource = resource.with_attribute("stage", *stage);
    }

    Ok(resource)
}

/// Split an image reference into (image, tag), treating a colon followed by
/// a '/' as a registry port rather than a tag.
fn split_image_tag(image_ref: &str) -> (&str, Option<&str>) {
    match image_ref.rfind(':') {
        Some(pos) if !image_ref[pos + 1..].contains('/') => {
            (&image_ref[..pos], Some(&image_ref[pos + 1..]))
        }
        _ => (image_ref, None),
    }
}

/// Parse `ENV K=V K2=V2`, `ENV K V`, `ARG K[=V]`
fn parse_key_values(resource_type: &str, args: &[&str], location: &Location) -> Vec<Resource> {
    let mut resources = Vec::new();

    if args.len() >= 2 && !args[0].contains('=') {
        // Legacy space-separated form: one key, rest is the value
        let resource = Resource::new(resource_type, args[0], Provider::Docker, location.clone())
            .with_attribute("value", args[1..].join(" "));
        return vec![resource];
    }

    for arg in args {
        let (key, value) = match arg.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (*arg, None),
        };
        if key.is_empty() {
            continue;
        }

        let mut resource =
            Resource::new(resource_type, key, Provider::Docker, location.clone());
        if let Some(value) = value {
            resource = resource.with_attribute("value", value.trim_matches('"'));
        }
        resources.push(resource);
    }

    resources
}

/// Parse `EXPOSE port[/proto] ...`
fn parse_expose(args: &[&str], location: &Location) -> Vec<Resource> {
    args.iter()
        .map(|arg| {
            let (port, protocol) = match arg.split_once('/') {
                Some((p, proto)) => (p, proto),
                None => (*arg, "tcp"),
            };
            Resource::new("exposed_port", port, Provider::Docker, location.clone())
                .with_attribute("protocol", protocol)
        })
        .collect()
}
