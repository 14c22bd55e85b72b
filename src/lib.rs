//! rsnapsearch - 预渲染代理请求分类器
//! 判断请求是否来自搜索引擎爬虫、是否应转发到预渲染服务，并还原 `_escaped_fragment_` URL

// 导出全局错误类型
pub use self::error::{RsnResult, RsnapsearchError};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, DetectorConfig};

// 导出规则模块核心接口
pub use self::rule::{
    ExtensionRules, ExtensionsTable, RobotRules, RobotsTable, RuleDocument, RuleLoader, RuleTable,
};

// 导出请求模型
pub use self::request::{Request, RequestBuilder};

// 导出工具模块核心接口
pub use self::utils::{HeaderConverter, SplitQuery, UrlBuilder, ESCAPED_FRAGMENT_KEY};

// 导出检测模块核心接口
pub use self::detector::{DetectOutcome, Detector, RouteMatcher, RouteVerdict, SkipReason};

// 声明所有子模块
pub mod config;
pub mod detector;
pub mod error;
pub mod request;
pub mod rule;
pub mod utils;
