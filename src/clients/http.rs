//! HTTP 辅助函数
//!
//! 所有请求都不自动跟随跳转：跳转本身就是协议的一部分
//! （登录流程中的 ticket，查询接口中的会话过期）。

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, LOCATION, SET_COOKIE};
use reqwest::{redirect, Client, Response};

use crate::error::ApiError;

/// 单个请求的传输层超时
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 创建不跟随跳转的 HTTP 客户端
pub fn build_client(headers: &HeaderMap) -> reqwest::Result<Client> {
    Client::builder()
        .redirect(redirect::Policy::none())
        .default_headers(headers.clone())
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// 从 `Set-Cookie` 头中提取 name → value
pub fn parse_set_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect()
}

/// 拼接 `Cookie` 请求头
pub fn cookie_header(pairs: &HashMap<String, String>) -> String {
    let mut names: Vec<&String> = pairs.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| format!("{}={}", name, pairs[name]))
        .collect::<Vec<_>>()
        .join("; ")
}

/// 读取 `Location` 头
pub fn location(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// 查询接口出现跳转即视为会话过期
pub fn ensure_no_redirect(resp: Response, endpoint: &'static str) -> Result<Response, ApiError> {
    if resp.status().is_redirection() {
        return Err(ApiError::SessionExpired { endpoint });
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_set_cookies() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("JSESSIONID=ABC123; Path=/; HttpOnly"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("route=r-9; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("garbage"));

        let cookies = parse_set_cookies(&headers);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["JSESSIONID"], "ABC123");
        assert_eq!(cookies["route"], "r-9");
    }

    #[test]
    fn test_cookie_header_is_sorted() {
        let mut pairs = HashMap::new();
        pairs.insert("route".to_string(), "r".to_string());
        pairs.insert("JSESSIONID".to_string(), "s".to_string());
        assert_eq!(cookie_header(&pairs), "JSESSIONID=s; route=r");
    }

    #[test]
    fn test_redirect_means_session_expired() {
        let resp = Response::from(
            ::http::Response::builder()
                .status(302)
                .header("Location", "https://cas.example/login")
                .body("")
                .unwrap(),
        );
        let err = ensure_no_redirect(resp, "queryYxkc").unwrap_err();
        assert!(err.is_session_expired());

        let ok = Response::from(::http::Response::builder().status(200).body("{}").unwrap());
        assert!(ensure_no_redirect(ok, "queryYxkc").is_ok());
    }
}
