//! 检测模块：请求拦截判断核心逻辑
#[allow(clippy::module_inception)]
pub mod detector;
pub mod route;

// 导出核心接口
pub use self::detector::{DetectOutcome, Detector, SkipReason};
pub use self::route::{RouteMatcher, RouteVerdict};
