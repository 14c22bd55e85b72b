//! 工具模块：URL 还原与框架边界的请求转换
pub mod header_converter;
pub mod url_builder;

// 导出核心接口
pub use self::header_converter::HeaderConverter;
pub use self::url_builder::{SplitQuery, UrlBuilder, ESCAPED_FRAGMENT_KEY};
