//! 选课结果分类
//!
//! 服务器只返回一段自由文本，这里按固定优先级把它映射为控制流结果：
//! 成功 > 永久拒绝 > 频率限制 > 未知。

/// 成功标记
const ACCEPTED_MARKER: &str = "成功";

/// 永久拒绝标记：冲突、已选、已满、超过可选分数
const REJECTED_MARKERS: [&str; 4] = ["冲突", "已选", "已满", "超过可选分数"];

/// 频率限制标记
const RATE_LIMIT_MARKER: &str = "选课请求频率过高";

/// 单次选课请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 选课成功
    Accepted,
    /// 冲突 / 已选 / 已满 / 超分，不再重试
    PermanentlyRejected,
    /// 请求过于频繁，按正常节奏重试
    RetryAfterBackoff,
    /// 未知提示，等待后重试
    RetryImmediately,
}

impl Outcome {
    /// 该结果是否结束当前课程
    pub fn resolves_target(self) -> bool {
        matches!(self, Outcome::Accepted | Outcome::PermanentlyRejected)
    }

    /// 是否需要等满整个截止时间再发下一次请求
    pub fn needs_explicit_wait(self) -> bool {
        matches!(self, Outcome::RetryImmediately)
    }
}

/// 对服务器提示信息分类，永不失败
pub fn classify(message: &str) -> Outcome {
    if message.contains(ACCEPTED_MARKER) {
        Outcome::Accepted
    } else if REJECTED_MARKERS.iter().any(|m| message.contains(m)) {
        Outcome::PermanentlyRejected
    } else if message.contains(RATE_LIMIT_MARKER) {
        Outcome::RetryAfterBackoff
    } else {
        Outcome::RetryImmediately
    }
}
