//! 远端系统客户端
//!
//! `Authenticator` 与 `PortalApi` 是上层唯一依赖的接口，
//! 测试中可以替换为不访问网络的实现。

use std::future::Future;

use crate::error::{ApiError, AuthError};
use crate::models::{CatalogEntry, CourseCategory, Credential, Semester, TokenSet};

pub mod cas_client;
pub mod http;
pub mod tis_client;

pub use cas_client::CasAuthenticator;
pub use tis_client::TisClient;

/// 登录协议：执行一次完整的登录，产出新的身份认证信息
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<TokenSet, AuthError>> + Send;
}

/// 选课系统接口
///
/// 每个调用都只执行一次请求；会话过期以 [`ApiError::SessionExpired`] 返回。
pub trait PortalApi: Send + Sync + 'static {
    /// 当前学期
    fn query_semester(
        &self,
        tokens: &TokenSet,
    ) -> impl Future<Output = Result<Semester, ApiError>> + Send;

    /// 已选课程名称
    fn query_selected(
        &self,
        tokens: &TokenSet,
        semester: &Semester,
    ) -> impl Future<Output = Result<Vec<String>, ApiError>> + Send;

    /// 某一类别下的全部可选课程
    fn query_courses(
        &self,
        tokens: &TokenSet,
        semester: &Semester,
        category: CourseCategory,
    ) -> impl Future<Output = Result<Vec<CatalogEntry>, ApiError>> + Send;

    /// 加入购物车，返回服务器的提示信息
    fn add_to_cart(
        &self,
        tokens: &TokenSet,
        semester: &Semester,
        course: &CatalogEntry,
    ) -> impl Future<Output = Result<String, ApiError>> + Send;
}
