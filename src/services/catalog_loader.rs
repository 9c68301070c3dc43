//! 缓存校验 - 业务能力层
//!
//! 学期与已选课程每次都实时获取；缓存只有在学号、学期、已选课程集合
//! 都与实时数据一致时才会被使用（关闭校验时只要能解析就使用）。
//! 否则重新获取全部课程并写回缓存。

use tracing::{info, warn};

use super::cache_store::CacheStore;
use super::catalog_fetcher::CatalogFetcher;
use crate::clients::{Authenticator, PortalApi};
use crate::error::AuthError;
use crate::infrastructure::Session;
use crate::models::CacheSnapshot;

/// 课程目录加载器
pub struct CatalogLoader<'a, A, P> {
    fetcher: CatalogFetcher<'a, A, P>,
    store: &'a CacheStore,
    verify: bool,
}

impl<'a, A: Authenticator, P: PortalApi> CatalogLoader<'a, A, P> {
    pub fn new(session: &'a Session<A>, api: &'a P, store: &'a CacheStore, verify: bool) -> Self {
        Self {
            fetcher: CatalogFetcher::new(session, api),
            store,
            verify,
        }
    }

    /// 读取缓存，失效时重新获取并写回
    pub async fn load_or_rebuild(&self, id: &str) -> Result<CacheSnapshot, AuthError> {
        info!("正在加载缓存文件");
        let semester = self.fetcher.fetch_semester().await?;
        let selected = self.fetcher.fetch_selected(&semester).await?;

        if let Some(snapshot) = self.store.load().await {
            if !self.verify {
                info!("✓ 缓存文件校验关闭, 成功从缓存文件加载课程信息");
                return Ok(snapshot);
            }
            if snapshot.matches(id, &semester, &selected) {
                info!("✓ 成功从缓存文件加载课程信息");
                return Ok(snapshot);
            }
            warn!("缓存文件已过期, 正在重新获取课程信息");
        }

        let courses = self.fetcher.fetch(&semester).await?;
        let snapshot = CacheSnapshot {
            id: id.to_string(),
            semester,
            courses,
            selected,
        };

        match self.store.save(&snapshot).await {
            Ok(()) => info!("✓ 已将课程信息写入缓存文件"),
            Err(e) => warn!("⚠️ 课程信息写入缓存文件失败, 下次启动将重新获取: {}", e),
        }
        Ok(snapshot)
    }
}
