//! Style Definition Parser
//!
//! Reads object-literal style definitions from JSON:
//!
//! ```json
//! {
//!   "display": "flex",
//!   "vars": { "--gap": "4px" },
//!   ":hover": { "color": "red" },
//!   "selectors": { ".parent:focus &": { "outline": "none" } },
//!   "@media": { "screen and (min-width: 768px)": { "padding": 10 } },
//!   "@supports": { "(display: grid)": { "display": "grid" } }
//! }
//! ```
//!
//! Key order is kept. Pseudo and selector bodies only take properties and
//! `vars`.

use crate::definition::{PropertyValue, StyleBlock, StyleDefinition, Value};
use crate::selectors::is_simple_pseudo;
use crate::{StyleError, UnsupportedKeyError};
use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

/// JSON style definition parser
pub struct DefinitionParser;

impl DefinitionParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a definition from JSON text
    pub fn parse_str(&self, json: &str) -> Result<StyleDefinition, StyleError> {
        let value: Json = serde_json::from_str(json).map_err(|e| StyleError::InvalidDefinition {
            path: "$".to_string(),
            message: e.to_string(),
        })?;
        self.parse_value(&value)
    }

    /// Parse a definition from a JSON value
    pub fn parse_value(&self, value: &Json) -> Result<StyleDefinition, StyleError> {
        self.parse_definition(as_object(value, "$")?, "$")
    }

    fn parse_definition(
        &self,
        object: &Map<String, Json>,
        path: &str,
    ) -> Result<StyleDefinition, StyleError> {
        let mut definition = StyleDefinition::new();

        for (key, value) in object {
            let here = format!("{path}.{key}");
            match key.as_str() {
                "vars" => definition.vars.extend(parse_vars(value, &here)?),
                "selectors" => {
                    for (selector, body) in as_object(value, &here)? {
                        let body_path = format!("{here}[{selector:?}]");
                        let block = self.parse_block(as_object(body, &body_path)?, &body_path)?;
                        definition.selectors.insert(selector.clone(), block);
                    }
                }
                "@media" => definition.media.extend(self.parse_conditions(value, &here)?),
                "@supports" => definition.supports.extend(self.parse_conditions(value, &here)?),
                _ if key.starts_with(':') => {
                    if !is_simple_pseudo(key) {
                        let context = "a style definition; complex pseudos belong under `selectors`";
                        return Err(UnsupportedKeyError::new(key, context).into());
                    }
                    let block = self.parse_block(as_object(value, &here)?, &here)?;
                    definition.simple_pseudos.insert(key.clone(), block);
                }
                _ if key.starts_with('@') => {
                    return Err(UnsupportedKeyError::new(key, "a style definition").into());
                }
                _ => {
                    let property = parse_property(key, value, &here)?;
                    definition.properties.insert(key.clone(), property);
                }
            }
        }
        Ok(definition)
    }

    fn parse_block(&self, object: &Map<String, Json>, path: &str) -> Result<StyleBlock, StyleError> {
        let mut block = StyleBlock::new();

        for (key, value) in object {
            let here = format!("{path}.{key}");
            match key.as_str() {
                "vars" => block.vars.extend(parse_vars(value, &here)?),
                _ if key == "selectors" || key.starts_with(':') || key.starts_with('@') => {
                    return Err(UnsupportedKeyError::new(key, format!("nested block {path}")).into());
                }
                _ => {
                    let property = parse_property(key, value, &here)?;
                    block.properties.insert(key.clone(), property);
                }
            }
        }
        Ok(block)
    }

    fn parse_conditions(
        &self,
        value: &Json,
        path: &str,
    ) -> Result<IndexMap<String, StyleDefinition>, StyleError> {
        let mut conditions = IndexMap::new();
        for (query, body) in as_object(value, path)? {
            let body_path = format!("{path}[{query:?}]");
            let nested = self.parse_definition(as_object(body, &body_path)?, &body_path)?;
            conditions.insert(query.clone(), nested);
        }
        Ok(conditions)
    }
}

impl Default for DefinitionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TryFrom<Json> for StyleDefinition {
    type Error = StyleError;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        DefinitionParser::new().parse_value(&value)
    }
}

fn as_object<'j>(value: &'j Json, path: &str) -> Result<&'j Map<String, Json>, StyleError> {
    value.as_object().ok_or_else(|| StyleError::InvalidDefinition {
        path: path.to_string(),
        message: format!("expected an object, found {}", kind(value)),
    })
}

fn parse_property(key: &str, value: &Json, path: &str) -> Result<PropertyValue, StyleError> {
    match value {
        Json::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| parse_scalar(item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(PropertyValue::Fallbacks),
        Json::Object(_) => Err(UnsupportedKeyError::new(
            key,
            "a style definition; nested selectors belong under `selectors`",
        )
        .into()),
        _ => parse_scalar(value, path).map(PropertyValue::Single),
    }
}

fn parse_scalar(value: &Json, path: &str) -> Result<Value, StyleError> {
    match value {
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Number(n) => n.as_f64().map(Value::Number).ok_or_else(|| StyleError::InvalidDefinition {
            path: path.to_string(),
            message: format!("number {n} is out of range"),
        }),
        other => Err(StyleError::InvalidDefinition {
            path: path.to_string(),
            message: format!("expected a string or number, found {}", kind(other)),
        }),
    }
}

fn parse_vars(value: &Json, path: &str) -> Result<IndexMap<String, String>, StyleError> {
    let mut vars = IndexMap::new();
    for (name, value) in as_object(value, path)? {
        let here = format!("{path}[{name:?}]");
        let value = match parse_scalar(value, &here)? {
            Value::Str(s) => s,
            number => number.to_string(),
        };
        vars.insert(name.clone(), value);
    }
    Ok(vars)
}

fn kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<StyleDefinition, StyleError> {
        DefinitionParser::new().parse_str(json)
    }

    #[test]
    fn test_parse_classification() {
        let def = parse(
            r#"{
                "display": "flex",
                ":hover": { "color": "red" },
                "vars": { "--gap": 4 },
                "selectors": { "&:not(:first-child)": { "display": "block" } },
                "@media": { "print": { "display": "none" } },
                "@supports": { "(display: grid)": { "display": "grid" } }
            }"#,
        )
        .unwrap();

        assert_eq!(def.properties.len(), 1);
        assert_eq!(def.vars.get("--gap").map(String::as_str), Some("4"));
        assert!(def.simple_pseudos.contains_key(":hover"));
        assert!(def.selectors.contains_key("&:not(:first-child)"));
        assert!(def.media.contains_key("print"));
        assert!(def.supports.contains_key("(display: grid)"));
    }

    #[test]
    fn test_parse_keeps_order() {
        let def = parse(r#"{ "zIndex": 1, "color": "red", "alignItems": "center" }"#).unwrap();
        let keys: Vec<&str> = def.properties.keys().map(String::as_str).collect();
        assert_eq!(keys, ["zIndex", "color", "alignItems"]);
    }

    #[test]
    fn test_parse_fallbacks() {
        let def = parse(r#"{ "overflow": ["auto", "overlay"] }"#).unwrap();
        assert_eq!(
            def.properties["overflow"],
            PropertyValue::Fallbacks(vec!["auto".into(), "overlay".into()])
        );
    }

    #[test]
    fn test_complex_pseudo_rejected() {
        let err = parse(r#"{ ":not(.b)": { "color": "red" } }"#).unwrap_err();
        assert!(matches!(err, StyleError::UnsupportedKey(e) if e.key == ":not(.b)"));
    }

    #[test]
    fn test_nested_block_restricted() {
        let err = parse(r#"{ ":hover": { ":focus": { "color": "red" } } }"#).unwrap_err();
        assert!(matches!(err, StyleError::UnsupportedKey(_)));

        let err = parse(r#"{ "selectors": { "&:focus": { "@media": {} } } }"#).unwrap_err();
        assert!(matches!(err, StyleError::UnsupportedKey(_)));
    }

    #[test]
    fn test_unknown_at_rule() {
        let err = parse(r#"{ "@container": {} }"#).unwrap_err();
        assert!(matches!(err, StyleError::UnsupportedKey(_)));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse(r#"{ "display": true }"#),
            Err(StyleError::InvalidDefinition { .. })
        ));
        assert!(matches!(parse("[]"), Err(StyleError::InvalidDefinition { .. })));
        assert!(matches!(parse("{"), Err(StyleError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_deserialize() {
        let def: StyleDefinition = serde_json::from_str(r#"{ "color": "red" }"#).unwrap();
        assert_eq!(def.properties.len(), 1);

        let bad: Result<StyleDefinition, _> = serde_json::from_str(r#"{ "@layer": {} }"#);
        assert!(bad.is_err());
    }
}
