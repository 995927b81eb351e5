//! Version resolution from the source header.

use crate::bundler::error::{ConfigError, ErrorExt, Result};
use crate::bundler::process::{Invoker, ToolRunner};
use crate::bundler::Settings;
use crate::source::RevisionSource;
use regex::Regex;
use std::fmt;
use std::path::Path;

/// Kind of build being produced.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildKind {
    /// Published release; version used verbatim, every failure fatal.
    Release,
    /// Non-release build; version gets a VCS revision suffix.
    #[serde(rename = "devbuild")]
    DevBuild,
}

impl BuildKind {
    /// Spelling used on the command line and by the solution generator.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildKind::Release => "release",
            BuildKind::DevBuild => "devbuild",
        }
    }

    /// Parses the command-line spelling.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "release" => Some(BuildKind::Release),
            "devbuild" => Some(BuildKind::DevBuild),
            _ => None,
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved product version.
///
/// Release versions are the macro value verbatim. Dev versions are the macro
/// value padded to two components followed by the revision.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Version(String);

/// Components a dev base may have before the revision is appended.
const DEV_BASE_COMPONENTS: usize = 2;

impl Version {
    /// Uses `value` as is.
    ///
    /// The value must be dot-separated digits; it is not padded.
    pub fn release(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        check_numeric(&value)?;
        Ok(Self(value))
    }

    /// Pads `base` to two components and appends the digits of `identifier`.
    ///
    /// The result always has exactly three components.
    pub fn dev(base: &str, identifier: &str) -> Result<Self> {
        let mut version = dev_base(base)?;
        let revision: String = identifier.chars().filter(char::is_ascii_digit).collect();
        if revision.is_empty() {
            return Err(ConfigError::EmptyRevision {
                identifier: identifier.trim().to_string(),
            }
            .into());
        }

        version.push('.');
        version.push_str(&revision);
        Ok(Self(version))
    }

    /// The version string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Dot-separated components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_numeric(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ConfigError::EmptyVersion.into());
    }
    if !value
        .split('.')
        .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(ConfigError::InvalidVersion {
            version: value.to_string(),
            reason: "only digits separated by single dots are allowed",
        }
        .into());
    }
    Ok(())
}

/// Validates a dev base and pads it with `.0` to two components.
fn dev_base(base: &str) -> Result<String> {
    check_numeric(base)?;
    let count = base.split('.').count();
    if count > DEV_BASE_COMPONENTS {
        return Err(ConfigError::InvalidVersion {
            version: base.to_string(),
            reason: "a dev build base has at most two components",
        }
        .into());
    }
    let mut padded = base.to_string();
    for _ in count..DEV_BASE_COMPONENTS {
        padded.push_str(".0");
    }
    Ok(padded)
}

/// Returns the literal of the first `#define <macro_name> "..."` line.
///
/// A one-character prefix before the opening quote (`L"1.0"`) is accepted.
pub async fn read_macro_value(file: &Path, macro_name: &str) -> Result<String> {
    let bytes = tokio::fs::read(file)
        .await
        .fs_context("reading version header", file)?;
    let content = String::from_utf8_lossy(&bytes);

    let pattern = Regex::new(&format!(
        r#"^\s*#define\s+{}\s+\w?"(.*?)""#,
        regex::escape(macro_name)
    ))
    .map_err(|e| crate::bundler::Error::GenericError(format!("invalid macro pattern: {e}")))?;

    content
        .lines()
        .find_map(|line| pattern.captures(line))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ConfigError::MacroNotFound {
                macro_name: macro_name.to_string(),
                file: file.to_path_buf(),
            }
            .into()
        })
}

/// Resolves the version for this run.
pub async fn resolve<R: ToolRunner>(
    build_kind: BuildKind,
    settings: &Settings,
    invoker: &Invoker<R>,
) -> Result<Version> {
    let header = settings.header_path();
    let macro_name = &settings.version_settings().macro_name;
    let base = read_macro_value(&header, macro_name).await?;
    log::debug!("{} = {:?} in {}", macro_name, base, header.display());

    match build_kind {
        BuildKind::Release => Version::release(base),
        BuildKind::DevBuild => {
            // Reject a bad base before asking version control.
            dev_base(&base)?;
            let source = RevisionSource::from_settings(settings);
            let identifier = source.identifier(settings.repo_root(), invoker).await?;
            log::debug!("Revision identifier: {}", identifier.trim());
            Version::dev(&base, &identifier)
        }
    }
}
