//! 规则表数据模型定义
//! 规则表以原始 JSON 文档形式持有，允许调用方在运行时原地修改；
//! 每次检测前通过 `validate` 重新校验结构，结构损坏时报错而不是当作空规则。

use serde_json::{Map, Value};

use crate::error::{RsnResult, RsnapsearchError};

/// 规则表原始文档
pub type RuleDocument = Map<String, Value>;

/// 规则表公共能力
pub trait RuleTable {
    /// 规则表名称（用于错误信息与日志）
    const NAME: &'static str;

    fn document(&self) -> &RuleDocument;

    fn document_mut(&mut self) -> &mut RuleDocument;

    /// 读取字段原始值
    fn field(&self, name: &str) -> Option<&Value> {
        self.document().get(name)
    }

    /// 获取字段的可变句柄，可写入任意 JSON 值
    fn field_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.document_mut().get_mut(name)
    }

    /// 整体替换字段，返回旧值
    fn set_field(&mut self, name: &str, value: Value) -> Option<Value> {
        self.document_mut().insert(name.to_string(), value)
    }

    /// 字段列表中是否存在指定条目（字段损坏时返回 false）
    fn contains(&self, field: &str, entry: &str) -> bool {
        match self.field(field) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .any(|item| item == entry),
            _ => false,
        }
    }

    /// 向列表字段追加条目；字段缺失时新建列表，字段不是列表时报错
    fn push(&mut self, field: &str, entry: impl Into<String>) -> RsnResult<()> {
        let value = self
            .document_mut()
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        match value {
            Value::Array(items) => {
                items.push(Value::String(entry.into()));
                Ok(())
            }
            other => Err(RsnapsearchError::corruption(
                Self::NAME,
                field,
                format!("期望字符串列表，实际为 {}", json_kind(other)),
            )),
        }
    }
}

/// 爬虫规则表（robots.json）
#[derive(Debug, Clone, PartialEq)]
pub struct RobotsTable {
    doc: RuleDocument,
}

/// 校验通过后的爬虫规则视图
#[derive(Debug, Clone)]
pub struct RobotRules<'a> {
    pub matches: Vec<&'a str>,
    pub ignores: Vec<&'a str>,
}

impl RobotsTable {
    pub const MATCH: &'static str = "match";
    pub const IGNORE: &'static str = "ignore";

    /// 从 JSON 文档构建并立即校验
    pub fn from_value(value: Value) -> RsnResult<Self> {
        let table = Self {
            doc: into_document(Self::NAME, value)?,
        };
        table.validate()?;
        Ok(table)
    }

    /// 校验结构，返回借用视图
    pub fn validate(&self) -> RsnResult<RobotRules<'_>> {
        Ok(RobotRules {
            matches: string_list(Self::NAME, &self.doc, Self::MATCH)?,
            ignores: string_list(Self::NAME, &self.doc, Self::IGNORE)?,
        })
    }
}

impl RuleTable for RobotsTable {
    const NAME: &'static str = "robots";

    fn document(&self) -> &RuleDocument {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut RuleDocument {
        &mut self.doc
    }
}

impl RobotRules<'_> {
    /// 返回 UA 中命中的第一个匹配条目
    pub fn matched_token(&self, user_agent: &str) -> Option<&str> {
        find_token(&self.matches, user_agent)
    }

    /// 返回 UA 中命中的第一个忽略条目
    pub fn ignored_token(&self, user_agent: &str) -> Option<&str> {
        find_token(&self.ignores, user_agent)
    }
}

/// 扩展名规则表（extensions.json）
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionsTable {
    doc: RuleDocument,
}

/// 校验通过后的扩展名规则视图
#[derive(Debug, Clone)]
pub struct ExtensionRules<'a> {
    pub generic: Vec<&'a str>,
    /// 分组名 -> 该组额外允许的扩展名
    pub allowed: Vec<(&'a str, Vec<&'a str>)>,
}

impl ExtensionsTable {
    pub const GENERIC: &'static str = "generic";
    pub const ALLOWED: &'static str = "allowed";

    pub fn from_value(value: Value) -> RsnResult<Self> {
        let table = Self {
            doc: into_document(Self::NAME, value)?,
        };
        table.validate()?;
        Ok(table)
    }

    /// 校验结构：generic 必须为字符串列表；allowed 可缺失或为 null，存在时必须为「分组 -> 字符串列表」
    pub fn validate(&self) -> RsnResult<ExtensionRules<'_>> {
        let generic = string_list(Self::NAME, &self.doc, Self::GENERIC)?;

        let allowed = match self.doc.get(Self::ALLOWED) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(groups)) => {
                let mut allowed = Vec::with_capacity(groups.len());
                for (group, entries) in groups {
                    let field = format!("{}.{}", Self::ALLOWED, group);
                    allowed.push((group.as_str(), string_items(Self::NAME, &field, entries)?));
                }
                allowed
            }
            Some(other) => {
                return Err(RsnapsearchError::corruption(
                    Self::NAME,
                    Self::ALLOWED,
                    format!("期望「分组 -> 扩展名列表」对象，实际为 {}", json_kind(other)),
                ))
            }
        };

        Ok(ExtensionRules { generic, allowed })
    }
}

impl RuleTable for ExtensionsTable {
    const NAME: &'static str = "extensions";

    fn document(&self) -> &RuleDocument {
        &self.doc
    }

    fn document_mut(&mut self) -> &mut RuleDocument {
        &mut self.doc
    }
}

impl ExtensionRules<'_> {
    /// 扩展名是否可预渲染（忽略大小写与前导点）
    pub fn is_eligible(&self, extension: &str) -> bool {
        let extension = normalize_extension(extension);
        let hit = |entry: &&str| normalize_extension(entry).eq_ignore_ascii_case(extension);
        self.generic.iter().any(hit)
            || self
                .allowed
                .iter()
                .any(|(_, entries)| entries.iter().any(hit))
    }
}

fn normalize_extension(extension: &str) -> &str {
    extension.trim().trim_start_matches('.')
}

/// 在 UA 中按 ASCII 忽略大小写查找条目，空条目不参与匹配
fn find_token<'t>(tokens: &[&'t str], user_agent: &str) -> Option<&'t str> {
    let haystack = user_agent.to_ascii_lowercase();
    tokens
        .iter()
        .copied()
        .filter(|token| !token.is_empty())
        .find(|token| haystack.contains(&token.to_ascii_lowercase()))
}

fn into_document(table: &'static str, value: Value) -> RsnResult<RuleDocument> {
    match value {
        Value::Object(doc) => Ok(doc),
        other => Err(RsnapsearchError::corruption(
            table,
            "<root>",
            format!("期望 JSON 对象，实际为 {}", json_kind(&other)),
        )),
    }
}

fn string_list<'a>(
    table: &'static str,
    doc: &'a RuleDocument,
    field: &str,
) -> RsnResult<Vec<&'a str>> {
    match doc.get(field) {
        Some(value) => string_items(table, field, value),
        None => Err(RsnapsearchError::corruption(table, field, "缺少必需字段")),
    }
}

fn string_items<'a>(table: &'static str, field: &str, value: &'a Value) -> RsnResult<Vec<&'a str>> {
    let Value::Array(items) = value else {
        return Err(RsnapsearchError::corruption(
            table,
            field,
            format!("期望字符串列表，实际为 {}", json_kind(value)),
        ));
    };
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str().ok_or_else(|| {
                RsnapsearchError::corruption(
                    table,
                    field,
                    format!("第 {} 项期望字符串，实际为 {}", idx, json_kind(item)),
                )
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
