//! Style Definitions
//!
//! Typed input tree handed to the normalizer, one per styled element.
//! Key order in every map is preserved and becomes output order.

use indexmap::IndexMap;
use std::fmt;

/// A single declaration value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Passed through verbatim
    Str(String),
    /// Rendered with a unit where the property takes one
    Number(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Number(n) => f.write_str(&crate::properties::format_number(*n)),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(value as f64)
    }
}

/// Property value: one value, or an ordered fallback list
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Single(Value),
    /// Emitted as repeated declarations, lowest priority first
    Fallbacks(Vec<Value>),
}

impl PropertyValue {
    /// Values in emission order
    pub fn values(&self) -> &[Value] {
        match self {
            PropertyValue::Single(value) => std::slice::from_ref(value),
            PropertyValue::Fallbacks(values) => values,
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        PropertyValue::Single(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Single(value.into())
    }
}

impl From<Vec<Value>> for PropertyValue {
    fn from(values: Vec<Value>) -> Self {
        PropertyValue::Fallbacks(values)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(values: Vec<&str>) -> Self {
        PropertyValue::Fallbacks(values.into_iter().map(Value::from).collect())
    }
}

/// Properties and variables only.
///
/// Pseudo and selector bodies use this restricted schema, so nesting
/// further blocks inside them cannot be expressed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleBlock {
    pub properties: IndexMap<String, PropertyValue>,
    pub vars: IndexMap<String, String>,
}

impl StyleBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.vars.is_empty()
    }
}

/// Style definition for one element
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct StyleDefinition {
    pub properties: IndexMap<String, PropertyValue>,
    pub vars: IndexMap<String, String>,
    /// Pseudo token (`:hover`, `::before`) -> body
    pub simple_pseudos: IndexMap<String, StyleBlock>,
    /// Selector containing `&` -> body
    pub selectors: IndexMap<String, StyleBlock>,
    /// `@media` condition -> nested definition
    pub media: IndexMap<String, StyleDefinition>,
    /// `@supports` condition -> nested definition
    pub supports: IndexMap<String, StyleDefinition>,
}

impl StyleDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn pseudo(mut self, token: impl Into<String>, block: StyleBlock) -> Self {
        self.simple_pseudos.insert(token.into(), block);
        self
    }

    pub fn selector(mut self, selector: impl Into<String>, block: StyleBlock) -> Self {
        self.selectors.insert(selector.into(), block);
        self
    }

    pub fn media(mut self, condition: impl Into<String>, definition: StyleDefinition) -> Self {
        self.media.insert(condition.into(), definition);
        self
    }

    pub fn supports(mut self, condition: impl Into<String>, definition: StyleDefinition) -> Self {
        self.supports.insert(condition.into(), definition);
        self
    }

    /// Sections in traversal order: base, pseudos, selectors, media, supports.
    pub fn sections(&self) -> impl Iterator<Item = Section<'_>> {
        let base = std::iter::once(Section::Base {
            properties: &self.properties,
            vars: &self.vars,
        });
        let pseudos = self
            .simple_pseudos
            .iter()
            .map(|(token, block)| Section::SimplePseudo { token, block });
        let selectors = self
            .selectors
            .iter()
            .map(|(selector, block)| Section::Selector { selector, block });
        let media = self
            .media
            .iter()
            .map(|(condition, definition)| Section::Media { condition, definition });
        let supports = self
            .supports
            .iter()
            .map(|(condition, definition)| Section::Supports { condition, definition });

        base.chain(pseudos).chain(selectors).chain(media).chain(supports)
    }
}

/// One part of a style definition, borrowed
#[derive(Debug, Clone, Copy)]
pub enum Section<'a> {
    Base {
        properties: &'a IndexMap<String, PropertyValue>,
        vars: &'a IndexMap<String, String>,
    },
    SimplePseudo {
        token: &'a str,
        block: &'a StyleBlock,
    },
    Selector {
        selector: &'a str,
        block: &'a StyleBlock,
    },
    Media {
        condition: &'a str,
        definition: &'a StyleDefinition,
    },
    Supports {
        condition: &'a str,
        definition: &'a StyleDefinition,
    },
}

/// The element a definition styles.
///
/// Allocated by the caller; the compiler only substitutes it into
/// selectors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopeToken(String);

impl ScopeToken {
    /// Accepts `a` or `.a`
    pub fn new(ident: impl Into<String>) -> Self {
        let ident = ident.into();
        match ident.strip_prefix('.') {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(ident),
        }
    }

    /// Class name without the leading dot
    pub fn ident(&self) -> &str {
        &self.0
    }

    pub fn class_selector(&self) -> String {
        format!(".{}", self.0)
    }
}

impl fmt::Display for ScopeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.0)
    }
}

/// Definition applied to a raw selector instead of a scope token
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalStyle {
    pub selector: String,
    pub definition: StyleDefinition,
}

impl GlobalStyle {
    pub fn new(selector: impl Into<String>, definition: StyleDefinition) -> Self {
        Self {
            selector: selector.into(),
            definition,
        }
    }
}

/// `@keyframes` block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyframes {
    pub name: String,
    /// Stop (`from`, `50%`, `to`) -> declarations
    pub frames: IndexMap<String, StyleBlock>,
}

impl Keyframes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: IndexMap::new(),
        }
    }

    pub fn frame(mut self, stop: impl Into<String>, block: StyleBlock) -> Self {
        self.frames.insert(stop.into(), block);
        self
    }
}

/// `@font-face` block
#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    pub family: String,
    pub block: StyleBlock,
}

impl FontFace {
    pub fn new(family: impl Into<String>, block: StyleBlock) -> Self {
        Self {
            family: family.into(),
            block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_token_strips_dot() {
        assert_eq!(ScopeToken::new(".a").ident(), "a");
        assert_eq!(ScopeToken::new("a").class_selector(), ".a");
        assert_eq!(ScopeToken::new("btn_1x2").to_string(), ".btn_1x2");
    }

    #[test]
    fn test_sections_order() {
        let def = StyleDefinition::new()
            .media("print", StyleDefinition::new().property("color", "black"))
            .selector("&:focus", StyleBlock::new().property("outline", "none"))
            .pseudo(":hover", StyleBlock::new().property("color", "red"))
            .property("display", "flex");

        let kinds: Vec<&str> = def
            .sections()
            .map(|section| match section {
                Section::Base { .. } => "base",
                Section::SimplePseudo { .. } => "pseudo",
                Section::Selector { .. } => "selector",
                Section::Media { .. } => "media",
                Section::Supports { .. } => "supports",
            })
            .collect();

        assert_eq!(kinds, ["base", "pseudo", "selector", "media"]);
    }

    #[test]
    fn test_fallback_values_keep_duplicates() {
        let value = PropertyValue::from(vec!["auto", "auto", "overlay"]);
        assert_eq!(value.values().len(), 3);
    }
}
