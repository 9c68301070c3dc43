//! 单元测试共用的假实现，不访问网络

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;

use crate::clients::{Authenticator, PortalApi};
use crate::error::{ApiError, AuthError};
use crate::models::{CatalogEntry, CourseCategory, Credential, Semester, TokenSet};

pub fn credential(retry: bool) -> Credential {
    Credential {
        id: "12345678".to_string(),
        password: "secret".to_string(),
        retry,
    }
}

pub fn tokens(session_id: &str) -> TokenSet {
    TokenSet {
        tgc: format!("tgc-{session_id}"),
        session_id: session_id.to_string(),
        route: "r".to_string(),
    }
}

pub fn semester() -> Semester {
    Semester {
        p_xn: json!("2024-2025"),
        p_xq: json!("2"),
        p_xnxq: json!("2024-20252"),
    }
}

pub fn entry(id: &str, name: &str, kind: CourseCategory) -> CatalogEntry {
    CatalogEntry {
        id: id.to_string(),
        name: name.to_string(),
        kind,
    }
}

/// 第 n 次登录产出会话 `s{n}`
pub struct FakeAuthenticator {
    calls: AtomicUsize,
    fail_first: usize,
    delay: Duration,
}

impl FakeAuthenticator {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_first: 0,
            delay: Duration::ZERO,
        }
    }

    pub fn failing_first(mut self, n: usize) -> Self {
        self.fail_first = n;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Authenticator for FakeAuthenticator {
    async fn authenticate(&self, _credential: &Credential) -> Result<TokenSet, AuthError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if n <= self.fail_first {
            return Err(AuthError::MissingExecution);
        }
        Ok(tokens(&format!("s{n}")))
    }
}

/// 购物车接口的预设响应
#[derive(Debug, Clone)]
pub enum CartReply {
    Message(&'static str),
    Delayed(Duration, &'static str),
    Broken,
}

/// 假的选课系统
///
/// 会话 ID 与 `valid_session` 不一致的请求一律视为过期。
pub struct FakePortal {
    pub valid_session: Mutex<String>,
    pub semester: Semester,
    pub selected: Vec<String>,
    pub courses: HashMap<CourseCategory, Vec<CatalogEntry>>,
    pub cart_replies: Mutex<VecDeque<CartReply>>,
    pub default_reply: &'static str,
    pub cart_calls: Mutex<Vec<(String, Instant)>>,
    pub course_queries: AtomicUsize,
    pub broken_categories: Mutex<HashMap<CourseCategory, usize>>,
}

impl FakePortal {
    pub fn new(valid_session: &str) -> Self {
        Self {
            valid_session: Mutex::new(valid_session.to_string()),
            semester: semester(),
            selected: Vec::new(),
            courses: HashMap::new(),
            cart_replies: Mutex::new(VecDeque::new()),
            default_reply: "选课成功",
            cart_calls: Mutex::new(Vec::new()),
            course_queries: AtomicUsize::new(0),
            broken_categories: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_courses(mut self, category: CourseCategory, entries: Vec<CatalogEntry>) -> Self {
        self.courses.insert(category, entries);
        self
    }

    pub fn with_replies(self, replies: impl IntoIterator<Item = CartReply>) -> Self {
        self.cart_replies.lock().unwrap().extend(replies);
        self
    }

    pub fn with_default_reply(mut self, reply: &'static str) -> Self {
        self.default_reply = reply;
        self
    }

    pub fn cart_call_names(&self) -> Vec<String> {
        self.cart_calls.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn cart_call_times(&self) -> Vec<Instant> {
        self.cart_calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    fn check(&self, tokens: &TokenSet, endpoint: &'static str) -> Result<(), ApiError> {
        if *self.valid_session.lock().unwrap() == tokens.session_id {
            Ok(())
        } else {
            Err(ApiError::SessionExpired { endpoint })
        }
    }
}

impl PortalApi for FakePortal {
    async fn query_semester(&self, tokens: &TokenSet) -> Result<Semester, ApiError> {
        self.check(tokens, "queryXkdqXnxq")?;
        Ok(self.semester.clone())
    }

    async fn query_selected(&self, tokens: &TokenSet, _semester: &Semester) -> Result<Vec<String>, ApiError> {
        self.check(tokens, "queryYxkc")?;
        Ok(self.selected.clone())
    }

    async fn query_courses(
        &self,
        tokens: &TokenSet,
        _semester: &Semester,
        category: CourseCategory,
    ) -> Result<Vec<CatalogEntry>, ApiError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.check(tokens, "queryKxrw")?;
        self.course_queries.fetch_add(1, Ordering::SeqCst);
        {
            let mut broken = self.broken_categories.lock().unwrap();
            if let Some(left) = broken.get_mut(&category) {
                if *left > 0 {
                    *left -= 1;
                    return Err(ApiError::MissingField {
                        endpoint: "queryKxrw",
                        field: "kxrwList",
                    });
                }
            }
        }
        Ok(self.courses.get(&category).cloned().unwrap_or_default())
    }

    async fn add_to_cart(
        &self,
        tokens: &TokenSet,
        _semester: &Semester,
        course: &CatalogEntry,
    ) -> Result<String, ApiError> {
        self.cart_calls
            .lock()
            .unwrap()
            .push((course.name.clone(), Instant::now()));
        self.check(tokens, "addGouwuche")?;

        let reply = self.cart_replies.lock().unwrap().pop_front();
        match reply {
            None => Ok(self.default_reply.to_string()),
            Some(CartReply::Message(m)) => Ok(m.to_string()),
            Some(CartReply::Delayed(delay, m)) => {
                tokio::time::sleep(delay).await;
                Ok(m.to_string())
            }
            Some(CartReply::Broken) => Err(ApiError::MissingField {
                endpoint: "addGouwuche",
                field: "message",
            }),
        }
    }
}
