use std::fmt;

/// 登录凭据
#[derive(Clone)]
pub struct Credential {
    /// 学号
    pub id: String,
    /// 密码
    pub password: String,
    /// 认证失败时是否无限重试
    pub retry: bool,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("id", &self.id)
            .field("password", &"***")
            .field("retry", &self.retry)
            .finish()
    }
}

/// 身份认证信息
///
/// 整体生成、整体替换，不允许只更新其中一部分。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    /// CAS 票据授予凭证 (`TGC`)
    pub tgc: String,
    /// TIS 会话 (`JSESSIONID`)
    pub session_id: String,
    /// TIS 路由 (`route`)
    pub route: String,
}

impl TokenSet {
    /// 是否可直接用于 TIS 请求
    ///
    /// 预置在配置文件里的信息可以不带 `TGC`，它只在登录过程中使用。
    pub fn is_usable(&self) -> bool {
        !self.session_id.is_empty() && !self.route.is_empty()
    }

    /// TIS 请求使用的 `Cookie` 头
    pub fn cookie_header(&self) -> String {
        format!("JSESSIONID={}; route={}", self.session_id, self.route)
    }
}
