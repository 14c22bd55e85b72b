//! 检测器配置管理，存储所有可配置项

use std::path::PathBuf;

/// 检测器配置
#[derive(Debug, Clone, Default)]
pub struct DetectorConfig {
    // 是否校验请求路径的文件扩展名
    pub check_file_extensions: bool,
    // 自定义爬虫规则表（None 表示使用内置 robots.json）
    pub robots_json: Option<PathBuf>,
    // 自定义扩展名规则表（None 表示使用内置 extensions.json）
    pub extensions_json: Option<PathBuf>,
    // 命中任一正则即不拦截
    pub ignored_routes: Vec<String>,
    // 非空时，必须命中其中之一才可能拦截
    pub matched_routes: Vec<String>,
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> DetectorConfig {
        DetectorConfig::default()
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: DetectorConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check_file_extensions(mut self, check: bool) -> Self {
        self.config.check_file_extensions = check;
        self
    }

    pub fn robots_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.robots_json = Some(path.into());
        self
    }

    pub fn extensions_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.extensions_json = Some(path.into());
        self
    }

    /// 追加一条忽略路由
    pub fn ignored_route(mut self, pattern: impl Into<String>) -> Self {
        self.config.ignored_routes.push(pattern.into());
        self
    }

    pub fn ignored_routes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ignored_routes = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// 追加一条白名单路由
    pub fn matched_route(mut self, pattern: impl Into<String>) -> Self {
        self.config.matched_routes.push(pattern.into());
        self
    }

    pub fn matched_routes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.matched_routes = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> DetectorConfig {
        self.config
    }
}
