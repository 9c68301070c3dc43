use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 当前学期
///
/// 由远端返回，只做相等比较，不解释其内容。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Semester {
    /// 学年
    pub p_xn: Value,
    /// 学期
    pub p_xq: Value,
    /// 学年学期组合键
    pub p_xnxq: Value,
}

impl Semester {
    /// 转为表单字段
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("p_xn", form_value(&self.p_xn)),
            ("p_xq", form_value(&self.p_xq)),
            ("p_xnxq", form_value(&self.p_xnxq)),
        ]
    }
}

fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
