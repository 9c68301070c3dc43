//! 基础设施层
//!
//! 持有稀缺资源（身份认证信息），只暴露能力。

pub mod session;

pub use session::Session;
