//! Version control revision lookup for dev builds.

use crate::bundler::Settings;
use crate::bundler::error::{Error, Result};
use crate::bundler::process::{Invoker, ToolCommand, ToolRunner};
use std::path::Path;

/// Version control system of the source checkout.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vcs {
    /// Local revision number from `hg id -n`.
    #[default]
    Mercurial,
    /// Number of commits reachable from `HEAD`.
    Git,
}

/// Where the dev build revision comes from.
#[derive(Clone, Debug)]
pub enum RevisionSource {
    /// Query the Mercurial client.
    Mercurial {
        /// `hg` program
        program: String,
    },
    /// Walk the Git history in-process.
    Git,
}

impl RevisionSource {
    /// Picks the source configured in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.version_settings().vcs {
            Vcs::Mercurial => Self::Mercurial {
                program: settings.tools().hg.clone(),
            },
            Vcs::Git => Self::Git,
        }
    }

    /// Returns the raw, monotonically increasing identifier of the checkout.
    ///
    /// The identifier may carry non-digit decoration (Mercurial appends `+`
    /// for a dirty working copy); callers keep only the digits.
    pub async fn identifier<R: ToolRunner>(
        &self,
        repo: &Path,
        invoker: &Invoker<R>,
    ) -> Result<String> {
        match self {
            Self::Mercurial { program } => {
                let command = ToolCommand::new("resolve revision", program.as_str())
                    .arg("id")
                    .arg("-R")
                    .arg_path(repo)
                    .arg("-n");
                Ok(invoker.invoke(&command).await?.stdout)
            }
            Self::Git => {
                if invoker.cancellation().is_cancelled() {
                    return Err(Error::Cancelled {
                        stage: "resolve revision".into(),
                    });
                }
                let repo = repo.to_path_buf();
                tokio::task::spawn_blocking(move || git_commit_count(&repo))
                    .await
                    .map_err(|e| Error::Git(format!("revision walk task failed: {e}")))?
                    .map(|count| count.to_string())
            }
        }
    }
}

fn git_commit_count(repo: &Path) -> Result<usize> {
    let repo = gix::open(repo).map_err(|e| Error::Git(e.to_string()))?;
    let head = repo.head_commit().map_err(|e| Error::Git(e.to_string()))?;
    let walk = head
        .ancestors()
        .all()
        .map_err(|e| Error::Git(e.to_string()))?;

    let mut count = 0;
    for info in walk {
        info.map_err(|e| Error::Git(e.to_string()))?;
        count += 1;
    }
    Ok(count)
}
