use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{Catalog, Semester};

/// 缓存快照，对应磁盘上的缓存文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// 学号
    pub id: String,
    /// 学期
    pub semester: Semester,
    /// 课程目录
    pub courses: Catalog,
    /// 已选课程名称
    pub selected: Vec<String>,
}

impl CacheSnapshot {
    /// 快照是否与当前状态一致
    ///
    /// 已选课程按集合比较，与顺序无关。
    pub fn matches(&self, id: &str, semester: &Semester, selected: &[String]) -> bool {
        if self.id != id || &self.semester != semester {
            return false;
        }
        let cached: HashSet<&str> = self.selected.iter().map(String::as_str).collect();
        let live: HashSet<&str> = selected.iter().map(String::as_str).collect();
        cached == live
    }
}
