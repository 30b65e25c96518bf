//! Rendering and atomic persistence of the runtime artifacts.
//!
//! Both documents are serialized before anything touches disk. Changed files
//! are staged next to their destination and renamed into place, so a reader
//! sees either the old or the new content of a file and never a partial one.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use agentregistry_core::{
    COMPOSE_FILE_NAME, GATEWAY_FILE_NAME, LocalRuntimeConfig, compose_file_path,
    gateway_file_path,
};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to render {artifact}: {source}")]
    Render {
        artifact: &'static str,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PersistError {
    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Serialized artifacts, ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifacts {
    pub compose_yaml: String,
    pub gateway_yaml: String,
}

pub fn render_artifacts(config: &LocalRuntimeConfig) -> Result<RenderedArtifacts, PersistError> {
    let compose_yaml =
        serde_yaml::to_string(&config.docker_compose).map_err(|source| PersistError::Render {
            artifact: COMPOSE_FILE_NAME,
            source,
        })?;
    let gateway_yaml =
        serde_yaml::to_string(&config.agent_gateway).map_err(|source| PersistError::Render {
            artifact: GATEWAY_FILE_NAME,
            source,
        })?;
    Ok(RenderedArtifacts {
        compose_yaml,
        gateway_yaml,
    })
}

/// A file that needs replacing, with what it held before.
struct PendingWrite<'a> {
    path: PathBuf,
    staged: PathBuf,
    content: &'a str,
    previous: Option<Vec<u8>>,
}

/// Write both artifacts into `runtime_dir`.
///
/// Returns `true` when at least one file changed. Files whose bytes already
/// match are left untouched. On error every staged file is removed and
/// files already renamed into place are restored.
pub async fn write_artifacts(
    runtime_dir: &Path,
    rendered: &RenderedArtifacts,
) -> Result<bool, PersistError> {
    write_artifacts_with(runtime_dir, rendered, |from, to| fs::rename(from, to)).await
}

/// [`write_artifacts`] with the final rename step supplied by the caller.
async fn write_artifacts_with<R, F>(
    runtime_dir: &Path,
    rendered: &RenderedArtifacts,
    rename: R,
) -> Result<bool, PersistError>
where
    R: Fn(PathBuf, PathBuf) -> F,
    F: Future<Output = io::Result<()>>,
{
    fs::create_dir_all(runtime_dir)
        .await
        .map_err(|e| PersistError::io("create", runtime_dir, e))?;

    let mut pending = Vec::with_capacity(2);
    for (path, content) in [
        (compose_file_path(runtime_dir), rendered.compose_yaml.as_str()),
        (gateway_file_path(runtime_dir), rendered.gateway_yaml.as_str()),
    ] {
        let previous = read_existing(&path).await?;
        if previous.as_deref() == Some(content.as_bytes()) {
            debug!(path = %path.display(), "Artifact unchanged");
            continue;
        }
        pending.push(PendingWrite {
            staged: staged_path(&path),
            path,
            content,
            previous,
        });
    }

    if pending.is_empty() {
        return Ok(false);
    }

    for (index, write) in pending.iter().enumerate() {
        if let Err(e) = fs::write(&write.staged, write.content).await {
            discard_staged(&pending[..=index]).await;
            return Err(PersistError::io("stage", &write.staged, e));
        }
    }

    for (index, write) in pending.iter().enumerate() {
        if let Err(e) = rename(write.staged.clone(), write.path.clone()).await {
            restore(&pending[..index]).await;
            discard_staged(&pending[index..]).await;
            return Err(PersistError::io("replace", &write.path, e));
        }
        debug!(path = %write.path.display(), "Artifact written");
    }

    Ok(true)
}

async fn read_existing(path: &Path) -> Result<Option<Vec<u8>>, PersistError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PersistError::io("read", path, e)),
    }
}

/// `<dir>/.<file>.tmp`
fn staged_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.tmp"))
}

async fn discard_staged(writes: &[PendingWrite<'_>]) {
    for write in writes {
        if let Err(e) = fs::remove_file(&write.staged).await {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %write.staged.display(), "Failed to remove staged artifact: {e}");
            }
        }
    }
}

async fn restore(writes: &[PendingWrite<'_>]) {
    for write in writes {
        let result = match &write.previous {
            Some(bytes) => fs::write(&write.path, bytes).await,
            None => fs::remove_file(&write.path).await,
        };
        if let Err(e) = result {
            warn!(path = %write.path.display(), "Failed to restore artifact: {e}");
        }
    }
}
