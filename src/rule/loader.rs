//! 规则加载管理器
//! 负责加载内置规则表或调用方指定的 JSON 规则文件

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::debug;

use super::model::{ExtensionsTable, RobotsTable, RuleTable};
use crate::error::{RsnResult, RsnapsearchError};

static EMBEDDED_ROBOTS_JSON: &str = include_str!("../../data/robots.json");
static EMBEDDED_EXTENSIONS_JSON: &str = include_str!("../../data/extensions.json");

/// 内置规则表，首次访问时解析一次；每个检测器持有各自的副本
static EMBEDDED_ROBOTS: Lazy<RsnResult<RobotsTable>> =
    Lazy::new(|| RuleLoader::parse(EMBEDDED_ROBOTS_JSON).and_then(RobotsTable::from_value));
static EMBEDDED_EXTENSIONS: Lazy<RsnResult<ExtensionsTable>> =
    Lazy::new(|| RuleLoader::parse(EMBEDDED_EXTENSIONS_JSON).and_then(ExtensionsTable::from_value));

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 加载爬虫规则表（None 使用内置 robots.json）
    pub fn load_robots(path: Option<&Path>) -> RsnResult<RobotsTable> {
        let table = match path {
            Some(path) => Self::read_file(path).and_then(RobotsTable::from_value)?,
            None => Self::embedded(&EMBEDDED_ROBOTS)?,
        };

        if let Ok(rules) = table.validate() {
            debug!(
                "爬虫规则表加载完成，来源：{}，match {} 条，ignore {} 条",
                Self::describe(path),
                rules.matches.len(),
                rules.ignores.len()
            );
        }
        Ok(table)
    }

    /// 加载扩展名规则表（None 使用内置 extensions.json）
    pub fn load_extensions(path: Option<&Path>) -> RsnResult<ExtensionsTable> {
        let table = match path {
            Some(path) => Self::read_file(path).and_then(ExtensionsTable::from_value)?,
            None => Self::embedded(&EMBEDDED_EXTENSIONS)?,
        };

        if let Ok(rules) = table.validate() {
            debug!(
                "扩展名规则表加载完成，来源：{}，generic {} 条，allowed 分组 {} 个",
                Self::describe(path),
                rules.generic.len(),
                rules.allowed.len()
            );
        }
        Ok(table)
    }

    fn read_file(path: &Path) -> RsnResult<Value> {
        let content = fs::read_to_string(path).map_err(|source| RsnapsearchError::ResourceError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|e| {
            RsnapsearchError::RuleParseError(format!("{}：{}", path.display(), e))
        })
    }

    fn parse(content: &str) -> RsnResult<Value> {
        Ok(serde_json::from_str(content)?)
    }

    fn embedded<T: RuleTable + Clone>(cell: &'static Lazy<RsnResult<T>>) -> RsnResult<T> {
        match Lazy::force(cell) {
            Ok(table) => Ok(table.clone()),
            Err(e) => Err(RsnapsearchError::RuleParseError(format!(
                "内置规则表 {} 损坏：{}",
                T::NAME,
                e
            ))),
        }
    }

    fn describe(path: Option<&Path>) -> String {
        path.map(|p| p.display().to_string())
            .unwrap_or_else(|| "内置".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_json(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_embedded_defaults() {
        let robots = RuleLoader::load_robots(None).unwrap();
        assert!(robots.contains(RobotsTable::MATCH, "Bingbot"));
        assert!(robots.contains(RobotsTable::IGNORE, "SnapSearch"));

        let extensions = RuleLoader::load_extensions(None).unwrap();
        assert!(extensions.contains(ExtensionsTable::GENERIC, "html"));
    }

    #[test]
    fn test_embedded_copies_are_independent() {
        // 测试场景：修改一份副本不影响后续加载
        let mut first = RuleLoader::load_robots(None).unwrap();
        first.push(RobotsTable::IGNORE, "Googlebot").unwrap();
        let second = RuleLoader::load_robots(None).unwrap();
        assert!(!second.contains(RobotsTable::IGNORE, "Googlebot"));
    }

    #[test]
    fn test_external_robots_file() {
        let file = temp_json(r#"{"match": ["Testbot"], "ignore": []}"#);
        let robots = RuleLoader::load_robots(Some(file.path())).unwrap();
        assert!(robots.contains(RobotsTable::MATCH, "Testbot"));
        assert!(!robots.contains(RobotsTable::MATCH, "Bingbot"));
    }

    #[test]
    fn test_external_extensions_file() {
        let file = temp_json(r#"{"generic": ["test"], "allowed": {}}"#);
        let extensions = RuleLoader::load_extensions(Some(file.path())).unwrap();
        assert!(extensions.contains(ExtensionsTable::GENERIC, "test"));
    }

    #[test]
    fn test_missing_file_is_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no_such_file.json");
        let err = RuleLoader::load_robots(Some(&missing)).unwrap_err();
        assert!(matches!(err, RsnapsearchError::ResourceError { ref path, .. } if *path == missing));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let file = temp_json("{ not json");
        let err = RuleLoader::load_extensions(Some(file.path())).unwrap_err();
        assert!(matches!(err, RsnapsearchError::RuleParseError(_)));
    }

    #[test]
    fn test_wrong_shape_is_corruption() {
        let file = temp_json(r#"{"match": "Googlebot", "ignore": []}"#);
        let err = RuleLoader::load_robots(Some(file.path())).unwrap_err();
        assert!(err.is_corruption());
    }
}
