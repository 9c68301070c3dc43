//! 目标课程队列
//!
//! 启动时按配置中的名称从目录中解析一次，之后只会移除队首。

use std::collections::VecDeque;

use tracing::warn;

use crate::models::{Catalog, CatalogEntry};

/// 目标课程队列
#[derive(Debug, Clone, Default)]
pub struct TargetQueue {
    entries: VecDeque<CatalogEntry>,
}

impl TargetQueue {
    /// 按名称从目录中解析目标课程，找不到的课程跳过
    pub fn resolve(names: &[String], catalog: &Catalog) -> Self {
        let entries = names
            .iter()
            .filter_map(|name| match catalog.get(name) {
                Some(entry) => Some(entry.clone()),
                None => {
                    warn!("\"{}\" - 课程名称已选择或不存在, 跳过该课程", name);
                    None
                }
            })
            .collect();
        Self { entries }
    }

    pub fn head(&self) -> Option<&CatalogEntry> {
        self.entries.front()
    }

    /// 仅当 `name` 仍是队首时移除它
    pub fn remove_if_head(&mut self, name: &str) -> bool {
        if self.head().is_some_and(|head| head.name == name) {
            self.entries.pop_front();
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }
}
