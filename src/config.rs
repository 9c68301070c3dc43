//! 程序配置
//!
//! 从 TOML 文件加载，路径由 `CONFIG_PATH` 指定（默认 `./config.toml`）。

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::models::{Credential, TokenSet};

const DEFAULT_CONFIG_PATH: &str = "./config.toml";
const DEFAULT_CACHE_PATH: &str = "./cache.json";

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 登录凭据
    pub credential: Credential,
    /// 是否校验缓存
    pub verify_cache: bool,
    /// 单次选课请求的截止时间
    pub attempt_deadline: Duration,
    /// 两次选课请求之间的最小间隔
    pub idle_interval: Duration,
    /// 每个请求都携带的请求头
    pub headers: HeaderMap,
    /// 预置的身份认证信息
    pub cookies: Option<TokenSet>,
    /// 目标课程名称，按优先级排列
    pub courses: Vec<String>,
    /// 缓存文件路径
    pub cache_path: String,
    // --- 远端地址 ---
    pub cas_base_url: String,
    pub tis_base_url: String,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    info: Option<RawInfo>,
    http: Option<RawHttp>,
    courses: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    id: Option<String>,
    password: Option<String>,
    #[serde(default)]
    retry: bool,
    #[serde(default = "default_true")]
    verify_cache: bool,
}

#[derive(Debug, Default, Deserialize)]
struct RawHttp {
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    cookies: BTreeMap<String, String>,
    #[serde(default = "default_attempt_deadline_ms")]
    attempt_deadline_ms: u64,
    #[serde(default = "default_idle_interval_ms")]
    idle_interval_ms: u64,
    cas_base_url: Option<String>,
    tis_base_url: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_attempt_deadline_ms() -> u64 {
    1200
}

fn default_idle_interval_ms() -> u64 {
    100
}

impl Config {
    /// 按环境变量定位配置文件与缓存文件并加载
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load(&path)?;
        if let Ok(cache_path) = std::env::var("CACHE_PATH") {
            config.cache_path = cache_path;
        }
        Ok(config)
    }

    /// 从指定路径加载配置文件
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseFailed { source, .. } => ConfigError::ParseFailed {
                path: path.to_string(),
                source,
            },
            other => other,
        })
    }

    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content).map_err(|source| ConfigError::ParseFailed {
            path: String::new(),
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let info = raw.info.ok_or(ConfigError::MissingField("info"))?;
        let http = raw.http.ok_or(ConfigError::MissingField("http"))?;
        let courses = raw.courses.ok_or(ConfigError::MissingField("courses"))?;

        let id = info.id.filter(|v| !v.is_empty());
        let password = info.password.filter(|v| !v.is_empty());
        let (Some(id), Some(password)) = (id, password) else {
            return Err(ConfigError::MissingField("info.id / info.password"));
        };

        if http.attempt_deadline_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.attempt_deadline_ms",
                reason: "必须大于 0".to_string(),
            });
        }

        Ok(Self {
            credential: Credential {
                id,
                password,
                retry: info.retry,
            },
            verify_cache: info.verify_cache,
            attempt_deadline: Duration::from_millis(http.attempt_deadline_ms),
            idle_interval: Duration::from_millis(http.idle_interval_ms),
            headers: build_headers(&http.headers)?,
            cookies: seeded_tokens(&http.cookies),
            courses,
            cache_path: DEFAULT_CACHE_PATH.to_string(),
            cas_base_url: http
                .cas_base_url
                .unwrap_or_else(|| "https://cas.sustech.edu.cn".to_string()),
            tis_base_url: http
                .tis_base_url
                .unwrap_or_else(|| "https://tis.sustech.edu.cn".to_string()),
        })
    }
}

fn build_headers(raw: &BTreeMap<String, String>) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    for (name, value) in raw {
        let invalid = || ConfigError::InvalidHeader { name: name.clone() };
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
        let header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

/// 配置文件中的 cookie 只有在 `JSESSIONID` 与 `route` 都非空时才会被使用
fn seeded_tokens(cookies: &BTreeMap<String, String>) -> Option<TokenSet> {
    let tokens = TokenSet {
        tgc: cookies.get("TGC").cloned().unwrap_or_default(),
        session_id: cookies.get("JSESSIONID").cloned().unwrap_or_default(),
        route: cookies.get("route").cloned().unwrap_or_default(),
    };
    tokens.is_usable().then_some(tokens)
}
