//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! enrollment (App / run_enrollment)
//!     ↓
//! workflow::SelectionScheduler (目标队列上的调度循环)
//!     ↓
//! services (能力层：目录获取 / 缓存 / 结果分类)
//!     ↓
//! infrastructure (基础设施：Session)
//!     ↓
//! clients (CAS / TIS)
//! ```

pub mod enrollment;

pub use enrollment::{run_enrollment, App};
