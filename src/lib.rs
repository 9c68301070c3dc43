//! # Course Select
//!
//! 一个用于自动选课的 Rust 应用程序
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 与远端系统交互，只负责"发请求、解析响应"
//! - `CasAuthenticator` - CAS → TIS 三步登录
//! - `TisClient` - 学期 / 已选课程 / 可选课程 / 加入购物车
//!
//! ### ② 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有唯一可变的共享状态
//! - `Session` - 身份认证信息、串行化的重新登录、会话过期自动重试
//!
//! ### ③ 业务能力层（Services）
//! - `CatalogFetcher` - 获取课程目录
//! - `CacheStore` / `CatalogLoader` - 缓存读写与校验
//! - `classify` - 选课结果分类
//!
//! ### ④ 流程层（Workflow）
//! - `TargetQueue` - 目标课程队列
//! - `SelectionScheduler` - 选课调度循环
//!
//! ### ⑤ 编排层（Orchestration）
//! - `App` - 应用生命周期与最终统计
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod test_support;

// 重新导出常用类型
pub use clients::{Authenticator, CasAuthenticator, PortalApi, TisClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::Session;
pub use models::{CacheSnapshot, Catalog, CatalogEntry, CourseCategory, Credential, Semester, TokenSet};
pub use orchestrator::{run_enrollment, App};
pub use services::{classify, Outcome};
pub use utils::logging;
pub use workflow::{RunReport, SchedulerTiming, SelectionScheduler, TargetQueue, Termination};
