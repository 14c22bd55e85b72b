//! URL 还原工具
//! 根据请求环境还原绝对 URL，并把 `_escaped_fragment_` 还原为 `#!` 片段

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::{RsnResult, RsnapsearchError};
use crate::request::Request;

/// AJAX 爬取约定使用的查询参数名
pub const ESCAPED_FRAGMENT_KEY: &str = "_escaped_fragment_";

/// Host 中出现即会改写 URL 其他部分的分隔符
const AUTHORITY_DELIMITERS: &[char] = &['/', '?', '#', '@', '\\'];

/// 拆分后的查询串
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitQuery<'a> {
    /// 其余参数，保持原始顺序与编码
    pub remaining: Vec<&'a str>,
    /// 解码后的 `_escaped_fragment_` 值；参数不存在时为 None
    pub escaped_fragment: Option<String>,
}

/// URL 还原工具
pub struct UrlBuilder;

impl UrlBuilder {
    /// 还原请求的规范 URL
    pub fn build(request: &Request) -> RsnResult<String> {
        let scheme = request
            .scheme()
            .ok_or_else(|| RsnapsearchError::InvalidInput("请求缺少 URL scheme".to_string()))?;
        let authority = Self::authority(request, scheme)?;
        if let Some(c) = authority.chars().find(|c| AUTHORITY_DELIMITERS.contains(c)) {
            return Err(RsnapsearchError::InvalidInput(format!(
                "主机名 {:?} 含非法字符 {:?}",
                authority, c
            )));
        }
        let mut url = Url::parse(&format!("{}://{}", scheme, authority))?;
        if !url.username().is_empty() || url.password().is_some() || url.fragment().is_some() {
            return Err(RsnapsearchError::InvalidInput(format!(
                "主机名 {:?} 不是单纯的 host[:port]",
                authority
            )));
        }

        let path = request.raw_path();
        url.set_path(if path.is_empty() { "/" } else { path.as_str() });

        let split = Self::split_query(request.query_string());
        if split.remaining.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&split.remaining.join("&")));
        }

        if let Some(fragment) = split.escaped_fragment {
            url.set_fragment(Some(&format!("!{}", fragment)));
        }

        Ok(url.to_string())
    }

    /// 拆出 `_escaped_fragment_`，其余参数原样保留；多次出现时取第一个
    pub fn split_query(query: &str) -> SplitQuery<'_> {
        let mut remaining = Vec::new();
        let mut escaped_fragment = None;

        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if Self::decode(key) == ESCAPED_FRAGMENT_KEY {
                if escaped_fragment.is_none() {
                    escaped_fragment = Some(Self::decode(value));
                }
            } else {
                remaining.push(pair);
            }
        }

        SplitQuery {
            remaining,
            escaped_fragment,
        }
    }

    /// 查询串中是否携带 `_escaped_fragment_`
    pub fn has_escaped_fragment(query: &str) -> bool {
        Self::split_query(query).escaped_fragment.is_some()
    }

    /// HTTP_HOST 优先；否则 SERVER_NAME + 非默认端口
    fn authority(request: &Request, scheme: &str) -> RsnResult<String> {
        if let Some(host) = request.http_host() {
            return Ok(host.to_string());
        }

        let name = request.server_name().ok_or_else(|| {
            RsnapsearchError::InvalidInput("请求缺少 HTTP_HOST 与 SERVER_NAME".to_string())
        })?;
        let default_port = if scheme.eq_ignore_ascii_case("https") {
            "443"
        } else {
            "80"
        };
        match request.server_port() {
            Some(port) if port != default_port => Ok(format!("{}:{}", name, port)),
            _ => Ok(name.to_string()),
        }
    }

    fn decode(raw: &str) -> String {
        percent_decode_str(raw).decode_utf8_lossy().into_owned()
    }
}
