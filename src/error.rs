//! 全局错误类型定义

use std::io::Error as IoError;
use std::path::PathBuf;

use regex::Error as RegexError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum RsnapsearchError {
    // 配置相关错误
    #[error("配置冲突：{0}")]
    ConfigurationError(String),

    // 规则表来源相关错误
    #[error("规则文件读取失败[{}]：{source}", .path.display())]
    ResourceError {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("规则解析失败：{0}")]
    RuleParseError(String),

    // 规则表结构被破坏（加载时或 detect 调用时校验）
    #[error("规则表 `{table}` 结构损坏，字段 `{field}`：{reason}")]
    RuleTableCorruption {
        table: &'static str,
        field: String,
        reason: String,
    },

    // 路由正则编译错误
    #[error("路由正则编译失败：{0}")]
    RegexCompileError(#[from] RegexError),

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
    #[error("无效输入：{0}")]
    InvalidInput(String),
}

impl RsnapsearchError {
    /// 构造规则表结构损坏错误
    pub(crate) fn corruption(
        table: &'static str,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::RuleTableCorruption {
            table,
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 是否为规则表结构损坏
    pub fn is_corruption(&self) -> bool {
        matches!(self, Self::RuleTableCorruption { .. })
    }
}

// 全局Result类型
pub type RsnResult<T> = Result<T, RsnapsearchError>;
