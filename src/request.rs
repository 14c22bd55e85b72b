//! 请求描述：CGI/WSGI 风格的环境变量映射
//! 检测器只读取其中少量键，缺失的键一律按「不拦截」处理，不会报错

use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

pub const REQUEST_METHOD: &str = "REQUEST_METHOD";
pub const URL_SCHEME: &str = "wsgi.url_scheme";
pub const HTTP_HOST: &str = "HTTP_HOST";
pub const SERVER_NAME: &str = "SERVER_NAME";
pub const SERVER_PORT: &str = "SERVER_PORT";
pub const SCRIPT_NAME: &str = "SCRIPT_NAME";
pub const PATH_INFO: &str = "PATH_INFO";
pub const QUERY_STRING: &str = "QUERY_STRING";
pub const HTTP_USER_AGENT: &str = "HTTP_USER_AGENT";

/// 请求环境映射
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Request {
    environ: BTreeMap<String, String>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.environ.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.environ.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.environ.remove(key)
    }

    pub fn environ(&self) -> &BTreeMap<String, String> {
        &self.environ
    }

    pub fn method(&self) -> Option<&str> {
        self.get(REQUEST_METHOD)
    }

    pub fn scheme(&self) -> Option<&str> {
        self.non_empty(URL_SCHEME)
    }

    pub fn http_host(&self) -> Option<&str> {
        self.non_empty(HTTP_HOST)
    }

    pub fn server_name(&self) -> Option<&str> {
        self.non_empty(SERVER_NAME)
    }

    pub fn server_port(&self) -> Option<&str> {
        self.non_empty(SERVER_PORT)
    }

    pub fn user_agent(&self) -> &str {
        self.get(HTTP_USER_AGENT).unwrap_or_default()
    }

    pub fn query_string(&self) -> &str {
        self.get(QUERY_STRING).unwrap_or_default()
    }

    /// SCRIPT_NAME + PATH_INFO，保持原始编码
    pub fn raw_path(&self) -> String {
        let script = self.get(SCRIPT_NAME).unwrap_or_default();
        let path = self.get(PATH_INFO).unwrap_or_default();
        format!("{}{}", script, path)
    }

    /// 百分号解码后的路径，用于路由匹配与扩展名提取
    pub fn decoded_path(&self) -> String {
        percent_decode_str(&self.raw_path())
            .decode_utf8_lossy()
            .into_owned()
    }

    /// 路径最后一段的扩展名；无扩展名（页面路由）返回 None
    /// 以 `/` 结尾的路径最后一段为空，视为页面路由；`.hidden` 这类点号开头的段没有扩展名
    pub fn extension(&self) -> Option<String> {
        let path = self.decoded_path();
        let segment = path.rsplit('/').next().unwrap_or_default();
        let (stem, ext) = segment.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_string())
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Request {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            environ: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for Request {
    fn from(environ: BTreeMap<String, String>) -> Self {
        Self { environ }
    }
}

/// 请求构建器（链式 API）
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn method(self, method: impl Into<String>) -> Self {
        self.set(REQUEST_METHOD, method)
    }

    pub fn scheme(self, scheme: impl Into<String>) -> Self {
        self.set(URL_SCHEME, scheme)
    }

    pub fn host(self, host: impl Into<String>) -> Self {
        self.set(HTTP_HOST, host)
    }

    pub fn server_name(self, name: impl Into<String>) -> Self {
        self.set(SERVER_NAME, name)
    }

    pub fn server_port(self, port: impl Into<String>) -> Self {
        self.set(SERVER_PORT, port)
    }

    pub fn script_name(self, script: impl Into<String>) -> Self {
        self.set(SCRIPT_NAME, script)
    }

    pub fn path(self, path: impl Into<String>) -> Self {
        self.set(PATH_INFO, path)
    }

    pub fn query(self, query: impl Into<String>) -> Self {
        self.set(QUERY_STRING, query)
    }

    pub fn user_agent(self, user_agent: impl Into<String>) -> Self {
        self.set(HTTP_USER_AGENT, user_agent)
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.insert(key, value);
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_environ_keys() {
        let request = Request::builder()
            .method("GET")
            .scheme("http")
            .server_name("localhost")
            .server_port("80")
            .path("/snapsearch")
            .user_agent("Googlebot")
            .build();

        assert_eq!(request.method(), Some("GET"));
        assert_eq!(request.get(URL_SCHEME), Some("http"));
        assert_eq!(request.server_port(), Some("80"));
        assert_eq!(request.user_agent(), "Googlebot");
        assert_eq!(request.query_string(), "");
        assert_eq!(request.http_host(), None);
    }

    #[test]
    fn test_empty_values_treated_as_missing() {
        let request: Request = [(HTTP_HOST, ""), (URL_SCHEME, "")].into_iter().collect();
        assert_eq!(request.http_host(), None);
        assert_eq!(request.scheme(), None);
    }

    #[test]
    fn test_decoded_path_joins_script_name() {
        let request = Request::builder()
            .script_name("/app")
            .path("/caf%C3%A9/menu%20list")
            .build();
        assert_eq!(request.raw_path(), "/app/caf%C3%A9/menu%20list");
        assert_eq!(request.decoded_path(), "/app/café/menu list");
    }

    #[test]
    fn test_extension_extraction() {
        let ext = |path: &str| Request::builder().path(path).build().extension();
        assert_eq!(ext("/index.html"), Some("html".to_string()));
        assert_eq!(ext("/music/song.MP3"), Some("MP3".to_string()));
        assert_eq!(ext("/blog/post"), None);
        assert_eq!(ext("/blog.v2/post"), None);
        assert_eq!(ext("/"), None);
        assert_eq!(ext(""), None);
        assert_eq!(ext("/trailing."), None);
        assert_eq!(ext("/.hidden"), None);
        assert_eq!(ext("/archive.tar.gz"), Some("gz".to_string()));
        // 测试场景：以 / 结尾的目录式路由不取上一段的点号后缀
        assert_eq!(ext("/music.v2/"), None);
        assert_eq!(ext("/a%2Fb.php"), Some("php".to_string()));
        assert_eq!(ext("/dir\\file.mp3"), Some("mp3".to_string()));
    }

    #[test]
    fn test_deserialize_from_flat_json() {
        let request: Request = serde_json::from_str(
            r#"{"REQUEST_METHOD": "GET", "wsgi.url_scheme": "https", "PATH_INFO": "/"}"#,
        )
        .unwrap();
        assert_eq!(request.method(), Some("GET"));
        assert_eq!(request.scheme(), Some("https"));
    }
}
