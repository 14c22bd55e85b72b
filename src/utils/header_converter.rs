//! Header格式转换工具
//! 在框架边界把 `http::Request` 一次性转换为检测器使用的请求环境映射

use std::collections::BTreeMap;

use http::header::HeaderMap;

use crate::request::{
    Request, HTTP_HOST, PATH_INFO, QUERY_STRING, REQUEST_METHOD, SERVER_NAME, SERVER_PORT,
    URL_SCHEME,
};

/// Header转换工具
pub struct HeaderConverter;

impl HeaderConverter {
    /// 将HeaderMap转换为 CGI 风格的环境变量（`User-Agent` -> `HTTP_USER_AGENT`）
    /// 同名 Header 以逗号拼接，非 ASCII 值跳过
    pub fn to_environ(header_map: &HeaderMap) -> BTreeMap<String, String> {
        let mut environ: BTreeMap<String, String> = BTreeMap::new();

        for (key, value) in header_map.iter() {
            let Ok(value_str) = value.to_str() else {
                continue;
            };
            let env_key = format!("HTTP_{}", key.as_str().to_ascii_uppercase().replace('-', "_"));

            environ
                .entry(env_key)
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(value_str);
                })
                .or_insert_with(|| value_str.to_string());
        }

        environ
    }

    /// 将 `http::Request` 转换为请求环境映射
    /// URI 未携带 scheme 时（常见于服务端收到的 origin-form 请求）使用 `default_scheme`
    pub fn to_request<B>(request: &http::Request<B>, default_scheme: &str) -> Request {
        let uri = request.uri();
        let mut environ = Self::to_environ(request.headers());

        environ.insert(REQUEST_METHOD.to_string(), request.method().as_str().to_string());
        environ.insert(
            URL_SCHEME.to_string(),
            uri.scheme_str().unwrap_or(default_scheme).to_string(),
        );
        if !environ.contains_key(HTTP_HOST) {
            if let Some(authority) = uri.authority() {
                environ.insert(HTTP_HOST.to_string(), authority.as_str().to_string());
            }
        }
        if let Some(host) = uri.host() {
            environ.insert(SERVER_NAME.to_string(), host.to_string());
        }
        if let Some(port) = uri.port_u16() {
            environ.insert(SERVER_PORT.to_string(), port.to_string());
        }
        environ.insert(PATH_INFO.to_string(), uri.path().to_string());
        environ.insert(
            QUERY_STRING.to_string(),
            uri.query().unwrap_or_default().to_string(),
        );

        Request::from(environ)
    }
}
