//! 课程目录获取 - 业务能力层
//!
//! 学期、已选课程、六个类别的可选课程。
//! 每个查询都经过会话包装，传输或解析失败时无限重试。

use futures::future::try_join_all;
use tracing::info;

use crate::clients::{Authenticator, PortalApi};
use crate::error::AuthError;
use crate::infrastructure::Session;
use crate::models::{Catalog, CourseCategory, Semester};

/// 课程目录获取服务
pub struct CatalogFetcher<'a, A, P> {
    session: &'a Session<A>,
    api: &'a P,
}

impl<'a, A: Authenticator, P: PortalApi> CatalogFetcher<'a, A, P> {
    pub fn new(session: &'a Session<A>, api: &'a P) -> Self {
        Self { session, api }
    }

    /// 当前学期
    pub async fn fetch_semester(&self) -> Result<Semester, AuthError> {
        let api = self.api;
        let semester = self
            .session
            .retry_forever("学期信息", |tokens| async move { api.query_semester(&tokens).await })
            .await?;
        info!("✓ 成功获取学期信息");
        Ok(semester)
    }

    /// 已选课程名称
    pub async fn fetch_selected(&self, semester: &Semester) -> Result<Vec<String>, AuthError> {
        let api = self.api;
        let selected = self
            .session
            .retry_forever("已选课程", |tokens| async move {
                api.query_selected(&tokens, semester).await
            })
            .await?;
        info!("✓ 成功获取已选课程: {} 门", selected.len());
        Ok(selected)
    }

    /// 获取全部类别的课程并合并为目录
    ///
    /// 各类别并发查询；同名课程按类别顺序后者覆盖前者。
    pub async fn fetch(&self, semester: &Semester) -> Result<Catalog, AuthError> {
        let api = self.api;
        let session = self.session;

        let queries = CourseCategory::ALL.into_iter().map(|category| async move {
            let what = format!("\"{}\" 的课程信息", category.label());
            let entries = session
                .retry_forever(&what, |tokens| async move {
                    api.query_courses(&tokens, semester, category).await
                })
                .await?;
            info!("✓ 已成功获取 \"{}\" 的全部课程 ({} 门)", category.label(), entries.len());
            Ok::<_, AuthError>(entries)
        });

        let mut catalog = Catalog::new();
        for entries in try_join_all(queries).await? {
            for entry in entries {
                catalog.insert(entry.name.clone(), entry);
            }
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{credential, entry, tokens, FakeAuthenticator, FakePortal};
    use std::sync::atomic::Ordering;

    #[tokio::test(start_paused = true)]
    async fn test_merges_categories_last_write_wins() {
        let portal = FakePortal::new("s0")
            .with_courses(
                CourseCategory::GeneralRequired,
                vec![entry("1", "数学分析", CourseCategory::GeneralRequired)],
            )
            .with_courses(
                CourseCategory::Retake,
                vec![
                    entry("2", "数学分析", CourseCategory::Retake),
                    entry("3", "大学物理", CourseCategory::Retake),
                ],
            );
        let session = Session::establish(credential(false), FakeAuthenticator::new(), Some(tokens("s0")))
            .await
            .unwrap();

        let fetcher = CatalogFetcher::new(&session, &portal);
        let catalog = fetcher.fetch(&portal.semester).await.unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["数学分析"].kind, CourseCategory::Retake);
        assert_eq!(catalog["数学分析"].id, "2");
        assert_eq!(portal.course_queries.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_session_renewed_once_for_fan_out() {
        let portal = FakePortal::new("s1").with_courses(
            CourseCategory::InPlan,
            vec![entry("7", "线性代数", CourseCategory::InPlan)],
        );
        let session = Session::establish(credential(false), FakeAuthenticator::new(), Some(tokens("stale")))
            .await
            .unwrap();

        let fetcher = CatalogFetcher::new(&session, &portal);
        let catalog = fetcher.fetch(&portal.semester).await.unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(session.generation().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_category_failure_retried() {
        let portal = FakePortal::new("s0").with_courses(
            CourseCategory::Freshman,
            vec![entry("9", "新生研讨课", CourseCategory::Freshman)],
        );
        portal
            .broken_categories
            .lock()
            .unwrap()
            .insert(CourseCategory::Freshman, 2);
        let session = Session::establish(credential(false), FakeAuthenticator::new(), Some(tokens("s0")))
            .await
            .unwrap();

        let catalog = CatalogFetcher::new(&session, &portal)
            .fetch(&portal.semester)
            .await
            .unwrap();

        assert!(catalog.contains_key("新生研讨课"));
        assert_eq!(portal.course_queries.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_fatal_auth_failure_propagates() {
        let portal = FakePortal::new("s1");
        let auth = FakeAuthenticator::new().failing_first(usize::MAX);
        let session = Session::establish(credential(false), auth, Some(tokens("stale")))
            .await
            .unwrap();

        let result = CatalogFetcher::new(&session, &portal).fetch_semester().await;
        assert!(result.is_err());
    }
}
