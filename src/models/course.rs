use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 选课类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseCategory {
    /// 通识必修选课
    #[serde(rename = "bxxk")]
    GeneralRequired,
    /// 通识选修选课
    #[serde(rename = "xxxk")]
    GeneralElective,
    /// 培养方案内课程
    #[serde(rename = "kzyxk")]
    InPlan,
    /// 非培养方案内课程
    #[serde(rename = "zynknjxk")]
    OutOfPlan,
    /// 计划内选课新生
    #[serde(rename = "jhnxk")]
    Freshman,
    /// 重修选课
    #[serde(rename = "cxxk")]
    Retake,
}

impl CourseCategory {
    /// 全部类别，按合并顺序排列
    pub const ALL: [CourseCategory; 6] = [
        CourseCategory::GeneralRequired,
        CourseCategory::GeneralElective,
        CourseCategory::InPlan,
        CourseCategory::OutOfPlan,
        CourseCategory::Freshman,
        CourseCategory::Retake,
    ];

    /// 接口使用的类别关键字 (`p_xkfsdm`)
    pub fn keyword(self) -> &'static str {
        match self {
            CourseCategory::GeneralRequired => "bxxk",
            CourseCategory::GeneralElective => "xxxk",
            CourseCategory::InPlan => "kzyxk",
            CourseCategory::OutOfPlan => "zynknjxk",
            CourseCategory::Freshman => "jhnxk",
            CourseCategory::Retake => "cxxk",
        }
    }

    /// 显示名称
    pub fn label(self) -> &'static str {
        match self {
            CourseCategory::GeneralRequired => "通识必修选课",
            CourseCategory::GeneralElective => "通识选修选课",
            CourseCategory::InPlan => "培养方案内课程",
            CourseCategory::OutOfPlan => "非培养方案内课程",
            CourseCategory::Freshman => "计划内选课新生",
            CourseCategory::Retake => "重修选课",
        }
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 可选课程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// 教学任务 ID
    pub id: String,
    /// 课程显示名称
    pub name: String,
    /// 所属类别
    pub kind: CourseCategory,
}

/// 课程目录：显示名称 → 课程
pub type Catalog = HashMap<String, CatalogEntry>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_name_matches_keyword() {
        for category in CourseCategory::ALL {
            assert_eq!(serde_json::to_value(category).unwrap(), category.keyword());
        }
    }

    #[test]
    fn test_entry_serializes_keyword() {
        let entry = CatalogEntry {
            id: "42".to_string(),
            name: "数学分析".to_string(),
            kind: CourseCategory::Retake,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "cxxk");
    }
}
