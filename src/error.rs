//! 错误类型
//!
//! 按关注点划分：配置、身份认证、接口调用、文件。
//! `ApiError::SessionExpired` 是唯一的"可恢复"信号，由
//! [`Session::resilient`](crate::infrastructure::Session::resilient) 统一处理。

use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 身份认证错误
    #[error("身份认证错误: {0}")]
    Auth(#[from] AuthError),
    /// 接口调用错误
    #[error("接口错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// HTTP 客户端创建失败
    #[error("HTTP 客户端创建失败: {0}")]
    Client(#[from] reqwest::Error),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("无法读取配置文件 {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 {path}: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 缺少必要字段
    #[error("配置文件缺少字段 \"{0}\"")]
    MissingField(&'static str),
    /// 请求头无效
    #[error("无效的请求头 \"{name}\"")]
    InvalidHeader { name: String },
    /// 取值无效
    #[error("字段 \"{field}\" 取值无效: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// 身份认证错误，对整个流程是致命的
#[derive(Debug, Error)]
pub enum AuthError {
    /// 登录页面中找不到 execution 字段
    #[error("登录页面中缺少 execution 字段")]
    MissingExecution,
    /// 响应中缺少指定 cookie
    #[error("{step} 响应中缺少 cookie \"{name}\"")]
    MissingCookie { step: &'static str, name: &'static str },
    /// 响应中缺少跳转地址
    #[error("{step} 响应中缺少跳转地址")]
    MissingRedirect { step: &'static str },
    /// 跳转目标不符合预期
    #[error("{step} 跳转异常: status={status}, location={location:?}")]
    UnexpectedRedirect {
        step: &'static str,
        status: u16,
        location: Option<String>,
    },
    /// 同一代身份认证信息的重新登录已经失败
    #[error("身份认证已失败: {reason}")]
    RenewalFailed { reason: String },
    /// 网络请求失败
    #[error("{step} 请求失败: {source}")]
    Transport {
        step: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// 接口调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 身份认证信息已过期（出现了不应出现的跳转）
    #[error("身份认证信息已过期 ({endpoint})")]
    SessionExpired { endpoint: &'static str },
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// 响应解析失败
    #[error("响应解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// 响应缺少字段
    #[error("响应缺少字段 ({endpoint}): {field}")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },
}

impl ApiError {
    /// 是否为会话过期信号
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON 解析或序列化失败
    #[error("JSON 处理失败 ({path}): {source}")]
    JsonFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 经过 [`Session::resilient`](crate::infrastructure::Session::resilient) 包装后的错误
///
/// 会话过期已被吸收，只剩致命的认证失败和操作本身的错误。
#[derive(Debug, Error)]
pub enum ResilientError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Api(ApiError),
}

impl From<ResilientError> for AppError {
    fn from(err: ResilientError) -> Self {
        match err {
            ResilientError::Auth(e) => AppError::Auth(e),
            ResilientError::Api(e) => AppError::Api(e),
        }
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
