//! 选课调度 - 流程层
//!
//! 对队首课程反复发起"加入购物车"请求，直到队列清空或登录彻底失败。
//!
//! 每一轮：
//! 1. 记录开始时间，在独立任务中发起一次请求（经过会话包装）
//! 2. 最多等待 `attempt_deadline`
//! 3. 根据分类结果决定移除队首还是保留
//! 4. 超时：立即进入下一轮；未知提示或请求出错：等满截止时间；否则等待 `idle_interval`
//!
//! 超时只是不再等待，请求本身不会被取消，服务器仍可能处理它。
//! 被放弃的请求完成后会在之后某一轮开始时被收集，按同样的规则应用结果。
//! 重复提交由服务器在下一次请求时返回"已选"来处理。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

use super::target_queue::TargetQueue;
use crate::clients::{Authenticator, PortalApi};
use crate::config::Config;
use crate::error::{ApiError, AuthError, ResilientError};
use crate::infrastructure::Session;
use crate::models::{CatalogEntry, Semester};
use crate::services::{classify, Outcome};

/// 调度节奏
#[derive(Debug, Clone, Copy)]
pub struct SchedulerTiming {
    /// 单次请求的截止时间
    pub attempt_deadline: Duration,
    /// 无需等待时两次请求之间的间隔
    pub idle_interval: Duration,
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            attempt_deadline: Duration::from_millis(1200),
            idle_interval: Duration::from_millis(100),
        }
    }
}

impl From<&Config> for SchedulerTiming {
    fn from(config: &Config) -> Self {
        Self {
            attempt_deadline: config.attempt_deadline,
            idle_interval: config.idle_interval,
        }
    }
}

/// 调度结束的原因
#[derive(Debug)]
pub enum Termination {
    /// 队列已清空
    Drained,
    /// 登录失败，放弃剩余课程
    Aborted(AuthError),
}

/// 调度结果
#[derive(Debug)]
pub struct RunReport {
    pub termination: Termination,
    /// 选课成功的课程，按成功顺序
    pub accepted: Vec<String>,
    /// 未处理完的课程
    pub remaining: Vec<String>,
}

impl RunReport {
    pub fn is_drained(&self) -> bool {
        matches!(self.termination, Termination::Drained)
    }
}

/// 单次请求的结果
struct AttemptReport {
    course: CatalogEntry,
    result: Result<Result<String, ApiError>, AuthError>,
}

/// 选课调度器
pub struct SelectionScheduler<A, P> {
    session: Arc<Session<A>>,
    api: Arc<P>,
    semester: Arc<Semester>,
    queue: TargetQueue,
    accepted: Vec<String>,
    timing: SchedulerTiming,
    abandoned: Vec<JoinHandle<AttemptReport>>,
}

impl<A: Authenticator, P: PortalApi> SelectionScheduler<A, P> {
    pub fn new(
        session: Arc<Session<A>>,
        api: Arc<P>,
        semester: Semester,
        queue: TargetQueue,
        timing: SchedulerTiming,
    ) -> Self {
        Self {
            session,
            api,
            semester: Arc::new(semester),
            queue,
            accepted: Vec::new(),
            timing,
            abandoned: Vec::new(),
        }
    }

    /// 运行到队列清空或登录失败
    pub async fn run(mut self) -> RunReport {
        let termination = match self.drive().await {
            Ok(()) => Termination::Drained,
            Err(e) => Termination::Aborted(e),
        };
        for handle in self.abandoned.drain(..) {
            handle.abort();
        }

        RunReport {
            termination,
            accepted: self.accepted,
            remaining: self.queue.iter().map(|e| e.name.clone()).collect(),
        }
    }

    async fn drive(&mut self) -> Result<(), AuthError> {
        loop {
            self.harvest_abandoned().await?;
            let Some(course) = self.queue.head().cloned() else {
                return Ok(());
            };

            let start = Instant::now();
            let mut handle = tokio::spawn(attempt(
                self.session.clone(),
                self.api.clone(),
                self.semester.clone(),
                course,
            ));

            let needs_wait = match timeout(self.timing.attempt_deadline, &mut handle).await {
                Err(_) => {
                    debug!("选课请求超过 {:?} 未返回, 不再等待", self.timing.attempt_deadline);
                    self.abandoned.push(handle);
                    continue;
                }
                Ok(Err(e)) => {
                    warn!("选课任务异常退出: {}", e);
                    true
                }
                Ok(Ok(report)) => self.apply(report)?,
            };

            if needs_wait {
                let remaining = self.timing.attempt_deadline.saturating_sub(start.elapsed());
                if !remaining.is_zero() {
                    sleep(remaining).await;
                }
            } else {
                sleep(self.timing.idle_interval).await;
            }
        }
    }

    /// 收集已经完成的超时请求
    async fn harvest_abandoned(&mut self) -> Result<(), AuthError> {
        let (finished, pending): (Vec<_>, Vec<_>) =
            self.abandoned.drain(..).partition(|h| h.is_finished());
        self.abandoned = pending;

        for handle in finished {
            match handle.await {
                Ok(report) => {
                    self.apply(report)?;
                }
                Err(e) => warn!("选课任务异常退出: {}", e),
            }
        }
        Ok(())
    }

    /// 应用一次请求的结果，返回是否需要等满截止时间
    fn apply(&mut self, report: AttemptReport) -> Result<bool, AuthError> {
        let AttemptReport { course, result } = report;
        let message = match result? {
            Ok(message) => message,
            Err(e) => {
                warn!("选课 \"{}\" 时发生未知错误, 正在重试: {}", course.name, e);
                return Ok(true);
            }
        };

        let outcome = classify(&message);
        if outcome.resolves_target() {
            self.queue.remove_if_head(&course.name);
        }
        match outcome {
            Outcome::Accepted => {
                info!("✅ 选课 \"{}\" {}, 进行下一课程", course.name, message);
                if !self.accepted.contains(&course.name) {
                    self.accepted.push(course.name);
                }
            }
            Outcome::PermanentlyRejected => info!("\"{}\" {}, 跳过该课程", course.name, message),
            Outcome::RetryAfterBackoff => info!("\"{}\" {}, 正在重试", course.name, message),
            Outcome::RetryImmediately => info!("\"{}\" {}, 等待重试", course.name, message),
        }
        Ok(outcome.needs_explicit_wait())
    }
}

/// 对一门课程发起一次加入购物车请求
async fn attempt<A: Authenticator, P: PortalApi>(
    session: Arc<Session<A>>,
    api: Arc<P>,
    semester: Arc<Semester>,
    course: CatalogEntry,
) -> AttemptReport {
    let target = course.clone();
    let result = session
        .resilient(move |tokens| {
            let (api, semester, target) = (api.clone(), semester.clone(), target.clone());
            async move { api.add_to_cart(&tokens, &semester, &target).await }
        })
        .await;

    let result = match result {
        Ok(message) => Ok(Ok(message)),
        Err(ResilientError::Api(e)) => Ok(Err(e)),
        Err(ResilientError::Auth(e)) => Err(e),
    };
    AttemptReport { course, result }
}
