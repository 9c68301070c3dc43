/// CAS 统一身份认证客户端
///
/// 完成 CAS → TIS 的三步登录，产出一整套 [`TokenSet`]。
use std::collections::HashMap;

use regex::Regex;
use reqwest::header::COOKIE;
use reqwest::Client;
use tracing::{debug, info};

use super::http::{build_client, cookie_header, location, parse_set_cookies};
use super::Authenticator;
use crate::config::Config;
use crate::error::AuthError;
use crate::models::{Credential, TokenSet};

/// CAS 登录客户端
pub struct CasAuthenticator {
    client: Client,
    cas_base_url: String,
    tis_base_url: String,
}

impl CasAuthenticator {
    /// 创建新的认证客户端
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        Ok(Self::from_client(
            build_client(&config.headers)?,
            &config.cas_base_url,
            &config.tis_base_url,
        ))
    }

    fn from_client(client: Client, cas_base_url: &str, tis_base_url: &str) -> Self {
        Self {
            client,
            cas_base_url: cas_base_url.trim_end_matches('/').to_string(),
            tis_base_url: tis_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn login_url(&self) -> String {
        format!("{}/cas/login", self.cas_base_url)
    }

    fn tis_landing_url(&self) -> String {
        format!("{}/authentication/main", self.tis_base_url)
    }

    /// 第一步：提交学号密码，获取 `TGC`
    async fn fetch_tgc(&self, credential: &Credential) -> Result<String, AuthError> {
        const STEP: &str = "CAS 登录";
        let transport = |source: reqwest::Error| AuthError::Transport { step: STEP, source };

        let page = self
            .client
            .get(self.login_url())
            .send()
            .await
            .map_err(transport)?;
        let page_cookies = parse_set_cookies(page.headers());
        let html = page.text().await.map_err(transport)?;
        let execution = extract_execution(&html).ok_or(AuthError::MissingExecution)?;

        let form = [
            ("username", credential.id.as_str()),
            ("password", credential.password.as_str()),
            ("execution", execution.as_str()),
            ("_eventId", "submit"),
            ("geolocation", ""),
        ];
        let mut request = self.client.post(self.login_url()).form(&form);
        if !page_cookies.is_empty() {
            request = request.header(COOKIE, cookie_header(&page_cookies));
        }
        let resp = request.send().await.map_err(transport)?;

        let tgc = parse_set_cookies(resp.headers())
            .remove("TGC")
            .ok_or(AuthError::MissingCookie { step: STEP, name: "TGC" })?;
        info!("✓ 成功获取CAS身份认证信息");
        Ok(tgc)
    }

    /// 第二步：从 TIS 入口获取 `JSESSIONID` 与 `route`
    async fn fetch_session_markers(&self) -> Result<(String, String), AuthError> {
        const STEP: &str = "TIS 入口";
        let resp = self
            .client
            .get(self.tis_landing_url())
            .send()
            .await
            .map_err(|source| AuthError::Transport { step: STEP, source })?;

        let mut cookies = parse_set_cookies(resp.headers());
        let session_id = cookies.remove("JSESSIONID").ok_or(AuthError::MissingCookie {
            step: STEP,
            name: "JSESSIONID",
        })?;
        let route = cookies
            .remove("route")
            .ok_or(AuthError::MissingCookie { step: STEP, name: "route" })?;
        Ok((session_id, route))
    }

    /// 第三步：用 `TGC` 换取 service ticket，再到 TIS 兑现
    async fn redeem_service_ticket(
        &self,
        tgc: &str,
        session_id: &str,
        route: &str,
    ) -> Result<(), AuthError> {
        const STEP: &str = "ticket 兑换";
        let transport = |source: reqwest::Error| AuthError::Transport { step: STEP, source };

        let service = format!("{}/cas", self.tis_base_url);
        let resp = self
            .client
            .get(self.login_url())
            .query(&[("service", service.as_str())])
            .header(COOKIE, format!("TGC={}", tgc))
            .send()
            .await
            .map_err(transport)?;
        let ticket_url = location(resp.headers()).ok_or(AuthError::MissingRedirect { step: STEP })?;
        debug!("service ticket 地址: {}", ticket_url);

        let mut markers = HashMap::new();
        markers.insert("JSESSIONID".to_string(), session_id.to_string());
        markers.insert("route".to_string(), route.to_string());
        let resp = self
            .client
            .get(&ticket_url)
            .header(COOKIE, cookie_header(&markers))
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status().as_u16();
        let landing = location(resp.headers());
        if status != 302 || landing.as_deref() != Some(self.tis_landing_url().as_str()) {
            return Err(AuthError::UnexpectedRedirect {
                step: STEP,
                status,
                location: landing,
            });
        }
        info!("✓ 成功获取TIS身份认证信息");
        Ok(())
    }
}

impl Authenticator for CasAuthenticator {
    async fn authenticate(&self, credential: &Credential) -> Result<TokenSet, AuthError> {
        let tgc = self.fetch_tgc(credential).await?;
        let (session_id, route) = self.fetch_session_markers().await?;
        self.redeem_service_ticket(&tgc, &session_id, &route).await?;

        Ok(TokenSet {
            tgc,
            session_id,
            route,
        })
    }
}

/// 从登录页面中提取隐藏字段 `execution`
fn extract_execution(html: &str) -> Option<String> {
    let input = Regex::new(r#"<input[^>]*name\s*=\s*"execution"[^>]*>"#).ok()?;
    let value = Regex::new(r#"value\s*=\s*"([^"]*)""#).ok()?;

    let tag = input.find(html)?;
    value
        .captures(tag.as_str())
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_execution_either_attribute_order() {
        let html = r#"<form><input type="hidden" name="execution" value="e1s1-token"/></form>"#;
        assert_eq!(extract_execution(html).as_deref(), Some("e1s1-token"));

        let reversed = r#"<input value="abc==" type="hidden" name="execution">"#;
        assert_eq!(extract_execution(reversed).as_deref(), Some("abc=="));
    }

    #[test]
    fn test_extract_execution_missing() {
        let html = r#"<input type="hidden" name="lt" value="LT-1"/>"#;
        assert_eq!(extract_execution(html), None);
    }

    #[test]
    fn test_urls_trim_trailing_slash() {
        let auth = CasAuthenticator::from_client(
            Client::new(),
            "https://cas.example/",
            "https://tis.example/",
        );
        assert_eq!(auth.login_url(), "https://cas.example/cas/login");
        assert_eq!(auth.tis_landing_url(), "https://tis.example/authentication/main");
    }
}
