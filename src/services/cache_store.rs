//! 缓存文件读写 - 业务能力层
//!
//! 只负责"读写 cache.json"，缓存是否有效由
//! [`CatalogLoader`](super::CatalogLoader) 判断。

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};

use crate::error::FileError;
use crate::models::CacheSnapshot;

/// 缓存文件
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取缓存快照
    ///
    /// 文件不存在或无法解析时返回 `None`，由调用方重新获取。
    pub async fn load(&self) -> Option<CacheSnapshot> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            warn!("缓存文件不存在, 正在重新获取课程信息");
            return None;
        }
        match self.read().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!("{}, 正在重新获取课程信息", e);
                None
            }
        }
    }

    async fn read(&self) -> Result<CacheSnapshot, FileError> {
        let path = self.path.display().to_string();
        let content = fs::read(&self.path).await.map_err(|source| FileError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        serde_json::from_slice(&content).map_err(|source| FileError::JsonFailed { path, source })
    }

    /// 写入缓存快照
    pub async fn save(&self, snapshot: &CacheSnapshot) -> Result<(), FileError> {
        let path = self.path.display().to_string();
        let content = serde_json::to_vec(snapshot).map_err(|source| FileError::JsonFailed {
            path: path.clone(),
            source,
        })?;
        fs::write(&self.path, &content)
            .await
            .map_err(|source| FileError::WriteFailed { path, source })?;
        debug!("缓存写入 {} 字节", content.len());
        Ok(())
    }
}
