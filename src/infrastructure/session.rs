//! 会话 - 基础设施层
//!
//! 持有唯一可变的共享状态：当前的身份认证信息。
//! 身份认证信息整体替换，读到的永远是一整套。
//!
//! [`Session::resilient`] 是会话过期的唯一处理点：
//! 操作返回 [`ApiError::SessionExpired`] 时重新登录并从头重新执行操作。
//! 重新登录由 `renewal` 锁串行化，并发操作中只有第一个真正去登录，
//! 其余的等待它完成后直接使用新的身份认证信息；
//! 如果那次登录失败，等待者直接得到失败结果，不会再次提交密码。

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::clients::Authenticator;
use crate::error::{ApiError, AuthError, ResilientError};
use crate::models::{Credential, TokenSet};

/// 带代数的身份认证信息，每次重新登录代数加一
#[derive(Debug, Clone)]
struct ActiveTokens {
    generation: u64,
    tokens: Arc<TokenSet>,
}

/// 某一代身份认证信息的重新登录已经失败
#[derive(Debug)]
struct FailedRenewal {
    generation: u64,
    reason: String,
}

/// 会话
pub struct Session<A> {
    credential: Credential,
    authenticator: A,
    active: RwLock<ActiveTokens>,
    /// 串行化重新登录，同时记录最近一次失败
    renewal: Mutex<Option<FailedRenewal>>,
}

impl<A: Authenticator> Session<A> {
    /// 建立会话
    ///
    /// 预置的身份认证信息可用时直接使用，否则立即登录。
    pub async fn establish(
        credential: Credential,
        authenticator: A,
        seeded: Option<TokenSet>,
    ) -> Result<Self, AuthError> {
        let tokens = match seeded.filter(TokenSet::is_usable) {
            Some(tokens) => {
                info!("✓ 已从配置文件中加载身份认证信息");
                tokens
            }
            None => {
                warn!("配置文件中未包含身份认证信息, 正在尝试获取");
                login(&authenticator, &credential).await?
            }
        };

        Ok(Self {
            credential,
            authenticator,
            active: RwLock::new(ActiveTokens {
                generation: 0,
                tokens: Arc::new(tokens),
            }),
            renewal: Mutex::new(None),
        })
    }

    /// 当前身份认证信息
    pub async fn tokens(&self) -> Arc<TokenSet> {
        self.active.read().await.tokens.clone()
    }

    /// 当前代数
    pub async fn generation(&self) -> u64 {
        self.active.read().await.generation
    }

    async fn snapshot(&self) -> ActiveTokens {
        self.active.read().await.clone()
    }

    /// 使 `observed` 代的身份认证信息失效
    ///
    /// 如果等锁期间别人已经完成了重新登录，直接返回新的那一代；
    /// 如果别人对同一代的重新登录已经失败，直接返回该失败。
    async fn renew(&self, observed: u64) -> Result<ActiveTokens, AuthError> {
        let mut failed = self.renewal.lock().await;

        let current = self.snapshot().await;
        if current.generation > observed {
            return Ok(current);
        }
        if let Some(failure) = failed.as_ref().filter(|f| f.generation == current.generation) {
            return Err(AuthError::RenewalFailed {
                reason: failure.reason.clone(),
            });
        }

        let tokens = match login(&self.authenticator, &self.credential).await {
            Ok(tokens) => tokens,
            Err(e) => {
                *failed = Some(FailedRenewal {
                    generation: current.generation,
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };
        *failed = None;
        let renewed = ActiveTokens {
            generation: current.generation + 1,
            tokens: Arc::new(tokens),
        };
        *self.active.write().await = renewed.clone();
        Ok(renewed)
    }

    /// 执行一个网络操作，会话过期时自动重新登录并重试
    ///
    /// 没有重试次数上限：只在操作成功、操作返回其他错误，
    /// 或登录失败（[`AuthError`]）时返回。每次重试都使用比上一次更新的身份认证信息。
    pub async fn resilient<T, F, Fut>(&self, mut operation: F) -> Result<T, ResilientError>
    where
        F: FnMut(Arc<TokenSet>) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut active = self.snapshot().await;
        loop {
            match operation(active.tokens.clone()).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_session_expired() => {
                    warn!("身份认证信息已过期, 重新进行身份认证 ({})", e);
                    active = self.renew(active.generation).await?;
                }
                Err(e) => return Err(ResilientError::Api(e)),
            }
        }
    }

    /// 在 [`resilient`](Self::resilient) 之上，对其他错误也无限重试
    ///
    /// 用于必须拿到结果的查询；只有登录失败会返回。
    pub async fn retry_forever<T, F, Fut>(&self, what: &str, mut operation: F) -> Result<T, AuthError>
    where
        F: FnMut(Arc<TokenSet>) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        loop {
            match self.resilient(&mut operation).await {
                Ok(value) => return Ok(value),
                Err(ResilientError::Auth(e)) => return Err(e),
                Err(ResilientError::Api(e)) => {
                    warn!("获取{}失败, 正在尝试重新获取: {}", what, e);
                }
            }
        }
    }
}

/// 按凭据中的重试策略执行登录
async fn login<A: Authenticator>(authenticator: &A, credential: &Credential) -> Result<TokenSet, AuthError> {
    loop {
        match authenticator.authenticate(credential).await {
            Ok(tokens) => {
                info!(
                    "✓ 身份认证信息获取成功: JSESSIONID: {}, route: {}",
                    tokens.session_id, tokens.route
                );
                return Ok(tokens);
            }
            Err(e) if credential.retry => {
                warn!("身份认证信息获取失败, 正在重试: {}", e);
            }
            Err(e) => {
                error!("身份认证信息获取失败: {}", e);
                return Err(e);
            }
        }
    }
}
