//! Where resources and their logs come from.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::UserFacingError;
use crate::logs::{LogBatch, LogLine, LogQuery};
use crate::resource::{Resource, ResourceStatus};

/// How often a followed log file is checked for new lines.
const FOLLOW_INTERVAL: Duration = Duration::from_millis(250);

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn list_resources(&self) -> Result<Vec<Resource>>;

    async fn remove_resource(&self, resource: &Resource) -> Result<()>;

    async fn restart_resource(&self, resource: &Resource) -> Result<()>;

    /// Fetch the history of `resource` and, when the query follows, a live
    /// channel that stays open until `token` is cancelled or the receiver
    /// is dropped.
    async fn fetch_logs(
        &self,
        resource: &Resource,
        query: &LogQuery,
        token: CancellationToken,
    ) -> Result<LogBatch>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Inventory {
    #[serde(default)]
    resources: Vec<Resource>,
}

/// Resources described by a JSON inventory file.
pub struct InventoryRepository {
    path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl InventoryRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Inventory> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(UserFacingError::new(
                    "Inventory not found",
                    format!(
                        "No inventory at {}. Create it or pass --inventory.",
                        self.path.display()
                    ),
                )
                .into());
            }
            Err(e) => {
                return Err(e)
                    .wrap_err_with(|| format!("Failed to read {}", self.path.display()));
            }
        };
        serde_json::from_str(&content)
            .wrap_err_with(|| format!("Invalid inventory {}", self.path.display()))
    }

    async fn write(&self, inventory: &Inventory) -> Result<()> {
        let content = serde_json::to_string_pretty(inventory)?;
        tokio::fs::write(&self.path, content)
            .await
            .wrap_err_with(|| format!("Failed to write {}", self.path.display()))
    }

    /// Apply `change` to the entry matching `resource` and save.
    async fn modify(
        &self,
        resource: &Resource,
        change: impl FnOnce(&mut Vec<Resource>, usize),
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut inventory = self.read().await?;
        let id = resource.id();
        let Some(index) = inventory.resources.iter().position(|r| r.id() == id) else {
            return Err(UserFacingError::new(
                "Resource not found",
                format!("{id} is no longer in the inventory"),
            )
            .into());
        };
        change(&mut inventory.resources, index);
        self.write(&inventory).await
    }

    fn log_path(&self, resource: &Resource) -> Result<PathBuf> {
        let Some(file) = &resource.log_file else {
            return Err(UserFacingError::new(
                "No logs",
                format!("{} has no log file configured", resource.name),
            )
            .into());
        };
        if file.is_absolute() {
            return Ok(file.clone());
        }
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        Ok(base.join(file))
    }
}

#[async_trait]
impl ResourceRepository for InventoryRepository {
    async fn list_resources(&self) -> Result<Vec<Resource>> {
        let inventory = self.read().await?;
        debug!(
            "Read {} resources from {}",
            inventory.resources.len(),
            self.path.display()
        );
        Ok(inventory.resources)
    }

    async fn remove_resource(&self, resource: &Resource) -> Result<()> {
        self.modify(resource, |resources, index| {
            resources.remove(index);
        })
        .await?;
        info!("Removed {}", resource.id());
        Ok(())
    }

    async fn restart_resource(&self, resource: &Resource) -> Result<()> {
        self.modify(resource, |resources, index| {
            resources[index].status = ResourceStatus::Running;
        })
        .await?;
        info!("Restarted {}", resource.id());
        Ok(())
    }

    async fn fetch_logs(
        &self,
        resource: &Resource,
        query: &LogQuery,
        token: CancellationToken,
    ) -> Result<LogBatch> {
        let path = self.log_path(resource)?;
        let content = tokio::fs::read_to_string(&path)
            .await
            .wrap_err_with(|| format!("Failed to read logs {}", path.display()))?;
        let history = query.apply(content.lines().map(LogLine::parse));

        let live = query.follow.then(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            let offset = content.len() as u64;
            tokio::spawn(follow_file(path, offset, query.clone(), tx, token));
            rx
        });

        Ok(LogBatch { history, live })
    }
}

/// Forward lines appended to `path` after `offset` until the receiver is
/// gone or `token` is cancelled.
async fn follow_file(
    path: PathBuf,
    mut offset: u64,
    query: LogQuery,
    tx: mpsc::UnboundedSender<LogLine>,
    token: CancellationToken,
) {
    let mut partial = String::new();
    let mut ticker = tokio::time::interval(FOLLOW_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = token.cancelled() => break,
            () = tx.closed() => break,
            _ = ticker.tick() => {}
        }

        match read_from(&path, &mut offset).await {
            Ok(chunk) => {
                partial.push_str(&chunk);
                // Only complete lines are forwarded
                while let Some(end) = partial.find('\n') {
                    let raw: String = partial.drain(..=end).collect();
                    let line = LogLine::parse(&raw);
                    if query.matches(&line) && tx.send(line).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                warn!("Stopped following {}: {e:#}", path.display());
                break;
            }
        }
    }
    debug!("Follow task for {} finished", path.display());
}

async fn read_from(path: &Path, offset: &mut u64) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    if len < *offset {
        // Truncated or rotated, start over
        *offset = 0;
    }
    file.seek(SeekFrom::Start(*offset)).await?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).await?;
    *offset += buf.len() as u64;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
