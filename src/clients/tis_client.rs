/// TIS 选课系统客户端
///
/// 封装学期查询、已选课程、可选课程与加入购物车四个接口。
/// 任何跳转响应都会被转换为 [`ApiError::SessionExpired`]。
use reqwest::header::COOKIE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::http::{build_client, ensure_no_redirect};
use super::PortalApi;
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{CatalogEntry, CourseCategory, Semester, TokenSet};

const QUERY_SEMESTER: &str = "Xsxk/queryXkdqXnxq";
const QUERY_SELECTED: &str = "Xsxk/queryYxkc";
const QUERY_COURSES: &str = "Xsxk/queryKxrw";
const ADD_TO_CART: &str = "Xsxk/addGouwuche";

/// 单页查询的最大条数
const PAGE_SIZE: &str = "1000";

/// TIS 选课客户端
pub struct TisClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SelectedResponse {
    #[serde(rename = "yxkcList")]
    yxkc_list: Vec<CourseRecord>,
}

#[derive(Debug, Deserialize)]
struct CoursesResponse {
    #[serde(rename = "kxrwList")]
    kxrw_list: CoursePage,
}

#[derive(Debug, Deserialize)]
struct CoursePage {
    list: Vec<CourseRecord>,
}

#[derive(Debug, Deserialize)]
struct CourseRecord {
    #[serde(default, deserialize_with = "deserialize_id")]
    id: String,
    rwmc: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: Option<String>,
}

impl TisClient {
    /// 创建新的选课客户端
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        Ok(Self {
            client: build_client(&config.headers)?,
            base_url: config.tis_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 带身份认证信息提交表单，并把响应体解析为 `T`
    async fn post_form<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        tokens: &TokenSet,
        form: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let resp = self
            .client
            .post(format!("{}/{}", self.base_url, endpoint))
            .header(COOKIE, tokens.cookie_header())
            .form(form)
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed { endpoint, source })?;

        let resp = ensure_no_redirect(resp, endpoint)?;
        let body = resp
            .bytes()
            .await
            .map_err(|source| ApiError::RequestFailed { endpoint, source })?;
        debug!("{} 响应 {} 字节", endpoint, body.len());

        serde_json::from_slice(&body).map_err(|source| ApiError::JsonParseFailed { endpoint, source })
    }
}

/// 查询类接口共用的分页与培养类型参数
fn query_form(semester: &Semester, keyword: &str) -> Vec<(&'static str, String)> {
    let mut form: Vec<(&'static str, String)> = semester.form_fields().into_iter().collect();
    form.extend([
        ("p_pylx", "1".to_string()),
        ("mxpylx", "1".to_string()),
        ("p_xkfsdm", keyword.to_string()),
        ("pageNum", "1".to_string()),
        ("pageSize", PAGE_SIZE.to_string()),
    ]);
    form
}

fn cart_form(semester: &Semester, course: &CatalogEntry) -> Vec<(&'static str, String)> {
    let mut form: Vec<(&'static str, String)> = vec![
        ("p_pylx", "1".to_string()),
        ("p_xktjz", "rwtjzyx".to_string()),
    ];
    form.extend(semester.form_fields());
    form.extend([
        ("p_xkfsdm", course.kind.keyword().to_string()),
        ("p_id", course.id.clone()),
        ("p_sfxsgwckb", "1".to_string()),
    ]);
    form
}

impl PortalApi for TisClient {
    async fn query_semester(&self, tokens: &TokenSet) -> Result<Semester, ApiError> {
        self.post_form(QUERY_SEMESTER, tokens, &[("mxpylx", "1".to_string())])
            .await
    }

    async fn query_selected(
        &self,
        tokens: &TokenSet,
        semester: &Semester,
    ) -> Result<Vec<String>, ApiError> {
        let resp: SelectedResponse = self
            .post_form(QUERY_SELECTED, tokens, &query_form(semester, "yixuan"))
            .await?;
        Ok(resp.yxkc_list.into_iter().map(|c| c.rwmc).collect())
    }

    async fn query_courses(
        &self,
        tokens: &TokenSet,
        semester: &Semester,
        category: CourseCategory,
    ) -> Result<Vec<CatalogEntry>, ApiError> {
        let resp: CoursesResponse = self
            .post_form(QUERY_COURSES, tokens, &query_form(semester, category.keyword()))
            .await?;
        Ok(resp
            .kxrw_list
            .list
            .into_iter()
            .map(|c| CatalogEntry {
                id: c.id,
                name: c.rwmc,
                kind: category,
            })
            .collect())
    }

    async fn add_to_cart(
        &self,
        tokens: &TokenSet,
        semester: &Semester,
        course: &CatalogEntry,
    ) -> Result<String, ApiError> {
        let resp: MessageResponse = self
            .post_form(ADD_TO_CART, tokens, &cart_form(semester, course))
            .await?;
        resp.message.ok_or(ApiError::MissingField {
            endpoint: ADD_TO_CART,
            field: "message",
        })
    }
}

/// 课程 ID 可能是字符串也可能是数字
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer course id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
