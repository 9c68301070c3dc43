//! 选课编排 - 编排层
//!
//! ## 职责
//!
//! 1. **建立会话**：使用预置的身份认证信息，或立即登录
//! 2. **加载目录**：校验缓存，必要时重新获取全部课程
//! 3. **解析目标**：按配置中的课程名称构建目标队列
//! 4. **调度选课**：交给 `SelectionScheduler` 运行到结束
//! 5. **输出统计**：无论正常结束还是登录失败，都输出选课成功的课程
//!
//! 登录失败在任何阶段都会结束整个流程，但不会被当作程序错误返回。

use std::sync::Arc;

use crate::clients::{Authenticator, CasAuthenticator, PortalApi, TisClient};
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::Session;
use crate::services::{CacheStore, CatalogLoader};
use crate::utils::logging::{log_startup, log_targets, print_final_stats};
use crate::workflow::{RunReport, SchedulerTiming, SelectionScheduler, TargetQueue, Termination};

/// 应用主结构
pub struct App {
    config: Config,
    authenticator: CasAuthenticator,
    api: TisClient,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> AppResult<Self> {
        log_startup(&config);

        let authenticator = CasAuthenticator::new(&config)?;
        let api = TisClient::new(&config)?;

        Ok(Self {
            config,
            authenticator,
            api,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(self) -> RunReport {
        let report = run_enrollment(&self.config, self.authenticator, self.api).await;
        print_final_stats(&report);
        report
    }
}

/// 完整的选课流程：会话 → 目录 → 目标队列 → 调度
pub async fn run_enrollment<A: Authenticator, P: PortalApi>(
    config: &Config,
    authenticator: A,
    api: P,
) -> RunReport {
    let aborted = |e| RunReport {
        termination: Termination::Aborted(e),
        accepted: Vec::new(),
        remaining: config.courses.clone(),
    };

    let session = match Session::establish(
        config.credential.clone(),
        authenticator,
        config.cookies.clone(),
    )
    .await
    {
        Ok(session) => Arc::new(session),
        Err(e) => return aborted(e),
    };
    let api = Arc::new(api);

    let store = CacheStore::new(&config.cache_path);
    let snapshot = match CatalogLoader::new(&session, api.as_ref(), &store, config.verify_cache)
        .load_or_rebuild(&config.credential.id)
        .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => return aborted(e),
    };

    let queue = TargetQueue::resolve(&config.courses, &snapshot.courses);
    log_targets(&queue);

    SelectionScheduler::new(
        session,
        api,
        snapshot.semester,
        queue,
        SchedulerTiming::from(config),
    )
    .run()
    .await
}
