//! 路由匹配：忽略路由与白名单路由
//! 正则按子串语义搜索解码后的路径（不隐式锚定），`^/matched` 即前缀匹配

use regex::RegexSet;

use crate::error::RsnResult;

/// 路由匹配结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteVerdict {
    /// 命中忽略路由
    Ignored,
    /// 配置了白名单但未命中任何一条
    Unmatched,
    /// 可继续检测
    Eligible,
}

/// 路由匹配器
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    ignored: RegexSet,
    matched: RegexSet,
}

impl RouteMatcher {
    /// 编译路由正则，任一条非法即失败
    pub fn new<I, M>(ignored_routes: I, matched_routes: M) -> RsnResult<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        M: IntoIterator,
        M::Item: AsRef<str>,
    {
        Ok(Self {
            ignored: RegexSet::new(ignored_routes)?,
            matched: RegexSet::new(matched_routes)?,
        })
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignored.is_match(path)
    }

    /// 白名单为空时放行所有路径
    pub fn is_matched(&self, path: &str) -> bool {
        self.matched.is_empty() || self.matched.is_match(path)
    }

    pub fn verdict(&self, path: &str) -> RouteVerdict {
        if self.is_ignored(path) {
            RouteVerdict::Ignored
        } else if !self.is_matched(path) {
            RouteVerdict::Unmatched
        } else {
            RouteVerdict::Eligible
        }
    }

    pub fn ignored_patterns(&self) -> &[String] {
        self.ignored.patterns()
    }

    pub fn matched_patterns(&self) -> &[String] {
        self.matched.patterns()
    }
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self {
            ignored: RegexSet::empty(),
            matched: RegexSet::empty(),
        }
    }
}
