//! Prerender request detector core module
//! 预渲染请求检测器核心
//! 核心职责：
//! 1. 加载并持有爬虫规则表与扩展名规则表（内置/本地文件）
//! 2. 按固定顺序执行方法、scheme、路由、爬虫、扩展名检查，输出是否拦截
//! 3. 拦截时还原规范 URL（含 `_escaped_fragment_` 转换）
//!
//! 规则表允许通过 `robots_mut` / `extensions_mut` 在两次检测之间原地修改，
//! 每次 `detect` 都会重新校验结构。修改需要 `&mut Detector`，
//! 多线程共享同一检测器并在运行时调整规则时，由调用方自行加锁（例如外层 `RwLock`）。

use std::fmt;

use tracing::{debug, trace};

use super::route::{RouteMatcher, RouteVerdict};
use crate::config::{ConfigManager, DetectorConfig};
use crate::error::{RsnResult, RsnapsearchError};
use crate::request::Request;
use crate::rule::{ExtensionsTable, RobotsTable, RuleLoader};
use crate::utils::{UrlBuilder, ESCAPED_FRAGMENT_KEY};

/// 不拦截的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// 没有可用的请求上下文
    NoRequestContext,
    /// 非 GET 请求（或缺少请求方法）
    MethodNotGet,
    /// 非 http/https 请求
    NonWebScheme,
    /// 命中忽略路由
    IgnoredRoute,
    /// 未识别为爬虫
    NotCrawler,
    /// 命中爬虫忽略列表
    IgnoredCrawler,
    /// 未命中白名单路由
    UnmatchedRoute,
    /// 扩展名不在可预渲染列表中
    IneligibleExtension,
    /// 无法还原 URL（缺少 host 等）
    UnresolvableUrl,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoRequestContext => "no_request_context",
            SkipReason::MethodNotGet => "method_not_get",
            SkipReason::NonWebScheme => "non_web_scheme",
            SkipReason::IgnoredRoute => "ignored_route",
            SkipReason::NotCrawler => "not_crawler",
            SkipReason::IgnoredCrawler => "ignored_crawler",
            SkipReason::UnmatchedRoute => "unmatched_route",
            SkipReason::IneligibleExtension => "ineligible_extension",
            SkipReason::UnresolvableUrl => "unresolvable_url",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 检测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectOutcome {
    /// 拦截，转发给预渲染服务的规范 URL
    Intercept { url: String },
    /// 不拦截
    Skip(SkipReason),
}

impl DetectOutcome {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, DetectOutcome::Intercept { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            DetectOutcome::Intercept { url } => Some(url),
            DetectOutcome::Skip(_) => None,
        }
    }

    pub fn into_url(self) -> Option<String> {
        match self {
            DetectOutcome::Intercept { url } => Some(url),
            DetectOutcome::Skip(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            DetectOutcome::Intercept { .. } => None,
            DetectOutcome::Skip(reason) => Some(*reason),
        }
    }
}

/// 预渲染请求检测器
#[derive(Debug, Clone)]
pub struct Detector {
    check_file_extensions: bool,
    robots: RobotsTable,
    extensions: ExtensionsTable,
    routes: RouteMatcher,
}

impl Detector {
    /// 使用默认配置（内置规则表、不校验扩展名、无路由规则）创建检测器
    pub fn new() -> RsnResult<Self> {
        Self::with_config(ConfigManager::get_default())
    }

    /// 使用自定义配置创建检测器
    /// - 指定了扩展名规则文件但未开启扩展名校验：配置冲突
    /// - 规则文件不存在或无法解析：加载失败
    /// - 路由正则非法：编译失败
    pub fn with_config(config: DetectorConfig) -> RsnResult<Self> {
        if let Some(path) = &config.extensions_json {
            if !config.check_file_extensions {
                return Err(RsnapsearchError::ConfigurationError(format!(
                    "指定了扩展名规则文件 {}，但 check_file_extensions 未开启",
                    path.display()
                )));
            }
        }

        let robots = RuleLoader::load_robots(config.robots_json.as_deref())?;
        let extensions = RuleLoader::load_extensions(config.extensions_json.as_deref())?;
        let routes = RouteMatcher::new(&config.ignored_routes, &config.matched_routes)?;

        debug!(
            "检测器初始化完成，check_file_extensions={}，忽略路由 {} 条，白名单路由 {} 条",
            config.check_file_extensions,
            routes.ignored_patterns().len(),
            routes.matched_patterns().len()
        );

        Ok(Self {
            check_file_extensions: config.check_file_extensions,
            robots,
            extensions,
            routes,
        })
    }

    pub fn check_file_extensions(&self) -> bool {
        self.check_file_extensions
    }

    pub fn robots(&self) -> &RobotsTable {
        &self.robots
    }

    pub fn robots_mut(&mut self) -> &mut RobotsTable {
        &mut self.robots
    }

    pub fn extensions(&self) -> &ExtensionsTable {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut ExtensionsTable {
        &mut self.extensions
    }

    pub fn routes(&self) -> &RouteMatcher {
        &self.routes
    }

    /// 检测请求是否需要拦截并转发到预渲染服务
    /// 规则表结构损坏时返回错误；其余任何不满足条件的情况都是 `DetectOutcome::Skip`
    pub fn detect(&self, request: &Request) -> RsnResult<DetectOutcome> {
        let robots = self.robots.validate()?;
        let extensions = self.extensions.validate()?;

        // 1. 仅拦截 GET
        if request.method() != Some("GET") {
            return Ok(self.skip(SkipReason::MethodNotGet));
        }

        // 2. 仅拦截 http/https
        let is_web = request
            .scheme()
            .is_some_and(|s| s.eq_ignore_ascii_case("http") || s.eq_ignore_ascii_case("https"));
        if !is_web {
            return Ok(self.skip(SkipReason::NonWebScheme));
        }

        // 3. 忽略路由优先于一切爬虫判断；白名单结论留到第 6 步使用
        let path = request.decoded_path();
        let route = self.routes.verdict(&path);
        if route == RouteVerdict::Ignored {
            return Ok(self.skip(SkipReason::IgnoredRoute));
        }

        // 4. 爬虫识别：UA 命中 match 列表，或携带 _escaped_fragment_
        let user_agent = request.user_agent();
        let escaped_fragment = UrlBuilder::has_escaped_fragment(request.query_string());
        let crawler_signal = robots
            .matched_token(user_agent)
            .or_else(|| escaped_fragment.then_some(ESCAPED_FRAGMENT_KEY));
        let Some(signal) = crawler_signal else {
            return Ok(self.skip(SkipReason::NotCrawler));
        };

        // 5. ignore 列表优先于 match 列表
        if let Some(token) = robots.ignored_token(user_agent) {
            trace!("UA 命中忽略条目 {}，覆盖爬虫标识 {}", token, signal);
            return Ok(self.skip(SkipReason::IgnoredCrawler));
        }

        // 6. 白名单路由
        if route == RouteVerdict::Unmatched {
            return Ok(self.skip(SkipReason::UnmatchedRoute));
        }

        // 7. 扩展名校验：无扩展名视为页面路由；_escaped_fragment_ 请求总是页面快照，不校验
        if self.check_file_extensions && !escaped_fragment {
            if let Some(extension) = request.extension() {
                if !extensions.is_eligible(&extension) {
                    return Ok(self.skip(SkipReason::IneligibleExtension));
                }
            }
        }

        // 8. 还原规范 URL
        match UrlBuilder::build(request) {
            Ok(url) => {
                debug!("拦截爬虫请求，标识：{}，URL：{}", signal, url);
                Ok(DetectOutcome::Intercept { url })
            }
            Err(e) => {
                debug!("爬虫请求无法还原 URL：{}", e);
                Ok(self.skip(SkipReason::UnresolvableUrl))
            }
        }
    }

    /// 请求上下文可能缺失时的入口：None 直接视为不拦截
    pub fn detect_optional(&self, request: Option<&Request>) -> RsnResult<DetectOutcome> {
        match request {
            Some(request) => self.detect(request),
            None => Ok(self.skip(SkipReason::NoRequestContext)),
        }
    }

    /// 还原请求的规范 URL（不做任何拦截判断）
    pub fn get_encoded_url(&self, request: &Request) -> RsnResult<String> {
        UrlBuilder::build(request)
    }

    fn skip(&self, reason: SkipReason) -> DetectOutcome {
        trace!("请求不拦截：{}", reason);
        DetectOutcome::Skip(reason)
    }
}
