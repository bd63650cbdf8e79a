//! Property Serializer
//!
//! Turns authored declarations into CSS declarations: camelCase names
//! become kebab-case, capitalized vendor prefixes regain their leading
//! hyphen, and numbers pick up a `px` unit where the property takes one.

use crate::definition::{PropertyValue, Value};
use crate::{Declaration, DeclarationKind};
use std::fmt;

/// A serialized `name: value` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssDeclaration {
    pub name: String,
    pub value: String,
}

impl fmt::Display for CssDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Serialize one property into one declaration per value, in order
pub fn serialize(property: &str, value: &PropertyValue) -> Vec<CssDeclaration> {
    let name = property_name(property);
    value
        .values()
        .iter()
        .map(|value| CssDeclaration {
            name: name.clone(),
            value: format_value(property, value),
        })
        .collect()
}

/// Serialize an IR declaration
pub fn render(declaration: &Declaration) -> CssDeclaration {
    match declaration.kind {
        DeclarationKind::Property => CssDeclaration {
            name: property_name(&declaration.name),
            value: format_value(&declaration.name, &declaration.value),
        },
        DeclarationKind::Variable => CssDeclaration {
            name: variable_name(&declaration.name).to_string(),
            value: declaration.value.to_string(),
        },
    }
}

/// CSS property name for an authored name.
///
/// `backgroundColor` -> `background-color`, `WebkitTapHighlightColor` ->
/// `-webkit-tap-highlight-color`, `msFlex` -> `-ms-flex`. Custom
/// properties and names already in kebab-case pass through.
pub fn property_name(name: &str) -> String {
    if name.starts_with("--") {
        return name.to_string();
    }

    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }

    // `ms` is the one vendor prefix written lowercase
    if out.starts_with("ms-") {
        out.insert(0, '-');
    }
    out
}

/// Custom property name for a `vars` key.
///
/// Keys may be written as a reference (`var(--x)` or `var(--x, 0)`);
/// anything else is used verbatim.
pub fn variable_name(name: &str) -> &str {
    let trimmed = name.trim();
    match trimmed
        .strip_prefix("var(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        Some(inner) => inner.split(',').next().unwrap_or(inner).trim(),
        None => trimmed,
    }
}

/// Render a value for the given (authored) property name
pub fn format_value(property: &str, value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        Value::Number(n) => {
            if *n == 0.0 || property.starts_with("--") || is_unitless(property) {
                format_number(*n)
            } else {
                format!("{}px", format_number(*n))
            }
        }
    }
}

/// Integers print without a fractional part.
///
/// Expects a finite number; the normalizer rejects NaN and infinities.
/// Magnitudes past `1e15` print as plain decimal digits, which is still
/// a valid CSS number.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Whether a numeric value for this property stays unitless
pub fn is_unitless(property: &str) -> bool {
    let camel = camel_case(property);
    UNITLESS_PROPERTIES.contains(&camel.as_str())
}

/// `line-height` -> `lineHeight`, `-webkit-line-clamp` -> `WebkitLineClamp`
fn camel_case(name: &str) -> String {
    if !name.contains('-') {
        return name.to_string();
    }

    let (vendor, rest) = match name.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, name),
    };

    let mut out = String::with_capacity(rest.len());
    for (i, part) in rest.split('-').filter(|p| !p.is_empty()).enumerate() {
        let capitalize = i > 0 || (vendor && part != "ms");
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            if capitalize {
                out.push(first.to_ascii_uppercase());
            } else {
                out.push(first);
            }
            out.push_str(chars.as_str());
        }
    }
    out
}

const UNITLESS_PROPERTIES: &[&str] = &[
    "animationIterationCount",
    "aspectRatio",
    "borderImageOutset",
    "borderImageSlice",
    "borderImageWidth",
    "boxFlex",
    "boxFlexGroup",
    "boxOrdinalGroup",
    "columnCount",
    "columns",
    "fillOpacity",
    "flex",
    "flexGrow",
    "flexNegative",
    "flexOrder",
    "flexPositive",
    "flexShrink",
    "floodOpacity",
    "fontWeight",
    "gridArea",
    "gridColumn",
    "gridColumnEnd",
    "gridColumnSpan",
    "gridColumnStart",
    "gridRow",
    "gridRowEnd",
    "gridRowSpan",
    "gridRowStart",
    "lineClamp",
    "lineHeight",
    "msFlex",
    "msFlexGrow",
    "msFlexShrink",
    "opacity",
    "order",
    "orphans",
    "scale",
    "stopOpacity",
    "strokeDashoffset",
    "strokeMiterlimit",
    "strokeOpacity",
    "strokeWidth",
    "tabSize",
    "WebkitBoxFlex",
    "WebkitFlex",
    "WebkitFlexGrow",
    "WebkitFlexShrink",
    "WebkitLineClamp",
    "widows",
    "zIndex",
    "zoom",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_name_kebab() {
        assert_eq!(property_name("backgroundColor"), "background-color");
        assert_eq!(property_name("display"), "display");
        assert_eq!(property_name("border-top-width"), "border-top-width");
    }

    #[test]
    fn test_property_name_vendor() {
        assert_eq!(
            property_name("WebkitTapHighlightColor"),
            "-webkit-tap-highlight-color"
        );
        assert_eq!(property_name("MozAppearance"), "-moz-appearance");
        assert_eq!(property_name("msFlexAlign"), "-ms-flex-align");
        assert_eq!(property_name("--brand"), "--brand");
    }

    #[test]
    fn test_variable_name() {
        assert_eq!(variable_name("--x"), "--x");
        assert_eq!(variable_name("var(--x)"), "--x");
        assert_eq!(variable_name("var(--space, 4px)"), "--space");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(format_value("padding", &Value::Number(10.0)), "10px");
        assert_eq!(format_value("margin", &Value::Number(0.0)), "0");
        assert_eq!(format_value("width", &Value::Number(1.5)), "1.5px");
        assert_eq!(format_value("opacity", &Value::Number(0.5)), "0.5");
        assert_eq!(format_value("zIndex", &Value::Number(3.0)), "3");
        assert_eq!(format_value("line-height", &Value::Number(1.2)), "1.2");
        assert_eq!(format_value("WebkitLineClamp", &Value::Number(2.0)), "2");
        assert_eq!(format_value("-webkit-line-clamp", &Value::Number(2.0)), "2");
        assert_eq!(format_value("zIndex", &Value::Number(1e20)), "100000000000000000000");
    }

    #[test]
    fn test_serialize_fallbacks() {
        let decls = serialize("overflow", &PropertyValue::from(vec!["auto", "overlay"]));
        let lines: Vec<String> = decls.iter().map(ToString::to_string).collect();
        assert_eq!(lines, ["overflow: auto", "overflow: overlay"]);
    }

    #[test]
    fn test_serialize_keeps_equal_fallbacks() {
        let decls = serialize("color", &PropertyValue::from(vec!["red", "red"]));
        assert_eq!(decls.len(), 2);
    }
}
