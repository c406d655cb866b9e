//! ushop-adapter-odata - 导航路径分析器
//!
//! 将 `ProductService.Products(ID='P100')` 形式的导航路径解析为目标实体主键

use serde_json::{Number, Value};
use ushop_errors::{AppError, AppResult};
use ushop_ports::{AnalysisResult, QueryAnalyzer, Row, Selector};

/// 默认主键字段名
pub const DEFAULT_KEY: &str = "ID";

/// 基于 OData 导航路径的查询分析器
///
/// 路径按 `/` 分段，最后一段是目标实体，必须带有主键谓词。
/// 支持 `'P100'`（绑定到默认主键）、`ID='P100'`、`ID=42`、`flag=true`，
/// 多个谓词以逗号分隔；字符串中的 `''` 表示一个单引号。
#[derive(Debug, Clone)]
pub struct NavigationPathAnalyzer {
    default_key: String,
}

impl Default for NavigationPathAnalyzer {
    fn default() -> Self {
        Self {
            default_key: DEFAULT_KEY.to_string(),
        }
    }
}

impl NavigationPathAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置位置参数绑定的主键名
    pub fn with_default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = key.into();
        self
    }

    fn parse_keys(&self, entity: &str, predicates: &str) -> AppResult<Row> {
        let parts = split_outside_quotes(predicates, ',')?;
        let mut keys = Row::new();

        for part in &parts {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid(format!("empty key predicate on {}", entity)));
            }

            let (name, literal) = match split_outside_quotes(part, '=')?.as_slice() {
                [literal] if parts.len() == 1 => (self.default_key.as_str(), *literal),
                [_] => {
                    return Err(invalid(format!(
                        "positional key on {} must be the only predicate",
                        entity
                    )));
                }
                [name, literal] => (name.trim(), *literal),
                _ => return Err(invalid(format!("malformed key predicate '{}'", part))),
            };

            if !is_identifier(name) {
                return Err(invalid(format!("invalid key name '{}'", name)));
            }

            let value = parse_literal(literal.trim())?;
            if keys.insert(name.to_string(), value).is_some() {
                return Err(invalid(format!("duplicate key '{}' on {}", name, entity)));
            }
        }

        Ok(keys)
    }
}

impl QueryAnalyzer for NavigationPathAnalyzer {
    fn analyze(&self, selector: &Selector) -> AppResult<AnalysisResult> {
        let path = selector.as_str().trim();
        if path.is_empty() {
            return Err(invalid("empty navigation path".to_string()));
        }

        let mut target = None;
        for segment in split_outside_quotes(path, '/')? {
            target = Some(parse_segment(segment.trim())?);
        }

        let (entity, predicates) =
            target.ok_or_else(|| invalid("empty navigation path".to_string()))?;
        let predicates = predicates
            .ok_or_else(|| invalid(format!("target {} has no key predicate", entity)))?;

        let keys = self.parse_keys(entity, predicates)?;

        tracing::debug!(
            selector = %selector,
            entity,
            keys = keys.len(),
            "Navigation path analyzed"
        );

        Ok(AnalysisResult::new(entity, keys))
    }
}

fn invalid(msg: String) -> AppError {
    AppError::validation(format!("Unresolvable selector: {}", msg))
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// 按分隔符切分，忽略引号内的分隔符
fn split_outside_quotes(input: &str, separator: char) -> AppResult<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;

    for (i, c) in input.char_indices() {
        if c == '\'' {
            quoted = !quoted;
        } else if c == separator && !quoted {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }

    if quoted {
        return Err(invalid(format!("unterminated string in '{}'", input)));
    }

    parts.push(&input[start..]);
    Ok(parts)
}

/// 解析 `Entity` 或 `Entity(predicates)`
fn parse_segment(segment: &str) -> AppResult<(&str, Option<&str>)> {
    let (name, predicates) = match segment.find('(') {
        None => (segment, None),
        Some(open) => {
            let inner = segment[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| invalid(format!("unbalanced parentheses in '{}'", segment)))?;
            (&segment[..open], Some(inner))
        }
    };

    let name = name.trim();
    if !is_identifier(name) {
        return Err(invalid(format!("invalid segment '{}'", segment)));
    }

    Ok((name, predicates))
}

fn parse_literal(raw: &str) -> AppResult<Value> {
    if let Some(rest) = raw.strip_prefix('\'') {
        let inner = rest
            .strip_suffix('\'')
            .ok_or_else(|| invalid(format!("unterminated string {}", raw)))?;
        if inner.replace("''", "").contains('\'') {
            return Err(invalid(format!("unescaped quote in {}", raw)));
        }
        return Ok(Value::String(inner.replace("''", "'")));
    }

    match raw {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }

    let unsupported = || invalid(format!("unsupported key literal '{}'", raw));

    // 只有带小数点或指数的字面量才按浮点解析，整数溢出直接拒绝
    if raw.contains(['.', 'e', 'E']) {
        return raw
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(unsupported);
    }

    if let Ok(n) = raw.parse::<i64>() {
        return Ok(Value::from(n));
    }

    raw.parse::<u64>().map(Value::from).map_err(|_| unsupported())
}
