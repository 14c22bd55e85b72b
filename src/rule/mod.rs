//! 规则模块：负责规则表的加载、数据模型与结构校验
pub mod loader;
pub mod model;

// 导出核心接口
pub use self::loader::RuleLoader;
pub use self::model::{
    ExtensionRules, ExtensionsTable, RobotRules, RobotsTable, RuleDocument, RuleTable,
};
