//! Style Definition Normalizer
//!
//! Walks one definition and flattens it into rules. Base declarations,
//! pseudos and selectors become rules under the current condition path;
//! `@media` / `@supports` entries recurse with the same selector and a
//! longer path. Nothing reaches the compilation unit until the whole
//! definition has been accepted.

use crate::condition_tree::Condition;
use crate::definition::{PropertyValue, ScopeToken, Section, StyleBlock, StyleDefinition, Value};
use crate::properties::variable_name;
use crate::selectors;
use crate::{
    Declaration, DeclarationKind, DuplicateVariableError, Rule, StyleError, UnsupportedKeyError,
};
use indexmap::IndexMap;
use std::collections::HashMap;

/// What a definition's rules are anchored to
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    /// A scoped element, `&` resolves to its class
    Scoped(&'a ScopeToken),
    /// A raw selector; pseudos and selectors are not allowed
    Global(&'a str),
}

/// Rules produced by one definition
#[derive(Debug, Default)]
pub struct Normalized {
    /// Unconditional rules in traversal order
    pub rules: Vec<Rule>,
    /// Condition path -> rules, in registration order
    pub conditional: Vec<(Vec<Condition>, Vec<Rule>)>,
}

/// Style definition normalizer
pub struct Normalizer<'a> {
    target: Target<'a>,
    reject_conflicting_vars: bool,
}

impl<'a> Normalizer<'a> {
    pub fn new(target: Target<'a>) -> Self {
        Self {
            target,
            reject_conflicting_vars: true,
        }
    }

    pub fn reject_conflicting_vars(mut self, reject: bool) -> Self {
        self.reject_conflicting_vars = reject;
        self
    }

    /// Normalize a definition
    pub fn normalize(&self, definition: &StyleDefinition) -> Result<Normalized, StyleError> {
        let selector = match self.target {
            Target::Scoped(scope) => scope.class_selector(),
            Target::Global(selector) => {
                check_global_schema(definition, selector)?;
                selector.to_string()
            }
        };

        let mut normalized = Normalized::default();
        let mut path = Vec::new();
        self.walk(&selector, definition, &mut path, &mut normalized)?;

        tracing::debug!(
            "Normalized {}: {} rules, {} conditional contributions",
            selector,
            normalized.rules.len(),
            normalized.conditional.len()
        );
        Ok(normalized)
    }

    fn walk<'d>(
        &self,
        selector: &str,
        definition: &'d StyleDefinition,
        path: &mut Vec<Condition>,
        out: &mut Normalized,
    ) -> Result<(), StyleError> {
        let mut rules = Vec::new();
        let mut nested: Vec<(Condition, &'d StyleDefinition)> = Vec::new();

        for section in definition.sections() {
            match section {
                Section::Base { properties, vars } => {
                    push_rule(&mut rules, selector.to_string(), properties, vars)?;
                }
                Section::SimplePseudo { token, block } => {
                    push_block(&mut rules, format!("{selector}{token}"), block)?;
                }
                Section::Selector { selector: raw, block } => {
                    let Target::Scoped(scope) = self.target else {
                        return Err(UnsupportedKeyError::new(raw, "a global style").into());
                    };
                    selectors::validate(raw, scope)?;
                    push_block(&mut rules, selectors::resolve(raw, scope), block)?;
                }
                Section::Media { condition, definition } => {
                    nested.push((Condition::media(condition), definition));
                }
                Section::Supports { condition, definition } => {
                    nested.push((Condition::supports(condition), definition));
                }
            }
        }

        if self.reject_conflicting_vars {
            check_conflicting_vars(&rules)?;
        }

        if path.is_empty() {
            out.rules.extend(rules);
        } else {
            out.conditional.push((path.clone(), rules));
        }

        for (condition, definition) in nested {
            path.push(condition);
            self.walk(selector, definition, path, out)?;
            path.pop();
        }
        Ok(())
    }
}

fn push_block(rules: &mut Vec<Rule>, selector: String, block: &StyleBlock) -> Result<(), StyleError> {
    push_rule(rules, selector, &block.properties, &block.vars)
}

/// Variables first, then properties with fallbacks expanded in order.
/// Rules without declarations are dropped.
fn push_rule(
    rules: &mut Vec<Rule>,
    selector: String,
    properties: &IndexMap<String, PropertyValue>,
    vars: &IndexMap<String, String>,
) -> Result<(), StyleError> {
    let mut declarations = Vec::with_capacity(vars.len() + properties.len());
    for (name, value) in vars {
        declarations.push(Declaration::variable(name, value.as_str()));
    }
    for (name, value) in properties {
        for value in value.values() {
            if let Value::Number(n) = value
                && !n.is_finite()
            {
                return Err(StyleError::InvalidDefinition {
                    path: format!("{selector} {name}"),
                    message: format!("{n} is not a finite number"),
                });
            }
            declarations.push(Declaration::property(name, value.clone()));
        }
    }

    if !declarations.is_empty() {
        rules.push(Rule { selector, declarations });
    }
    Ok(())
}

/// Same selector, same condition path, same variable, different value
fn check_conflicting_vars(rules: &[Rule]) -> Result<(), DuplicateVariableError> {
    // Compared as rendered text: `1` and `"1"` are the same value
    let mut seen: HashMap<(&str, &str), String> = HashMap::new();

    for rule in rules {
        for declaration in &rule.declarations {
            let name = match declaration.kind {
                DeclarationKind::Variable => variable_name(&declaration.name),
                DeclarationKind::Property if declaration.name.starts_with("--") => {
                    declaration.name.as_str()
                }
                DeclarationKind::Property => continue,
            };

            let value = declaration.value.to_string();
            match seen.get(&(rule.selector.as_str(), name)) {
                Some(first) if *first != value => {
                    return Err(DuplicateVariableError {
                        name: name.to_string(),
                        selector: rule.selector.clone(),
                        first: first.clone(),
                        second: value,
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert((rule.selector.as_str(), name), value);
                }
            }
        }
    }
    Ok(())
}

/// Global styles accept no pseudos or selectors, at any depth
fn check_global_schema(definition: &StyleDefinition, selector: &str) -> Result<(), UnsupportedKeyError> {
    let context = format!("global style `{selector}`");
    if let Some(token) = definition.simple_pseudos.keys().next() {
        return Err(UnsupportedKeyError::new(token, context));
    }
    if let Some(raw) = definition.selectors.keys().next() {
        return Err(UnsupportedKeyError::new(raw, context));
    }
    for nested in definition.media.values().chain(definition.supports.values()) {
        check_global_schema(nested, selector)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectors::SelectorTargetReason;

    fn scoped(definition: &StyleDefinition) -> Result<Normalized, StyleError> {
        let scope = ScopeToken::new("a");
        Normalizer::new(Target::Scoped(&scope)).normalize(definition)
    }

    fn selectors_of(rules: &[Rule]) -> Vec<&str> {
        rules.iter().map(|r| r.selector.as_str()).collect()
    }

    #[test]
    fn test_traversal_order() {
        let def = StyleDefinition::new()
            .selector("&:focus", StyleBlock::new().property("outline", "none"))
            .pseudo(":hover", StyleBlock::new().property("color", "red"))
            .media("print", StyleDefinition::new().property("color", "black"))
            .property("display", "flex");

        let normalized = scoped(&def).unwrap();
        assert_eq!(selectors_of(&normalized.rules), [".a", ".a:hover", ".a:focus"]);
        assert_eq!(normalized.conditional.len(), 1);
    }

    #[test]
    fn test_fallbacks_expand_in_order() {
        let def = StyleDefinition::new().property("overflow", vec!["auto", "overlay"]);
        let normalized = scoped(&def).unwrap();
        let values: Vec<String> = normalized.rules[0]
            .declarations
            .iter()
            .map(|d| d.value.to_string())
            .collect();
        assert_eq!(values, ["auto", "overlay"]);
    }

    #[test]
    fn test_conditions_keep_selector() {
        let def = StyleDefinition::new().media(
            "screen",
            StyleDefinition::new()
                .pseudo(":hover", StyleBlock::new().property("color", "red"))
                .supports("(display: grid)", StyleDefinition::new().property("display", "grid")),
        );

        let normalized = scoped(&def).unwrap();
        assert!(normalized.rules.is_empty());
        let (path, rules) = &normalized.conditional[0];
        assert_eq!(path, &[Condition::media("screen")]);
        assert_eq!(selectors_of(rules), [".a:hover"]);

        let (path, rules) = &normalized.conditional[1];
        assert_eq!(
            path,
            &[Condition::media("screen"), Condition::supports("(display: grid)")]
        );
        assert_eq!(selectors_of(rules), [".a"]);
    }

    #[test]
    fn test_invalid_selector_surfaces() {
        let def = StyleDefinition::new()
            .property("color", "red")
            .selector("& a[href]", StyleBlock::new().property("color", "blue"));

        match scoped(&def) {
            Err(StyleError::SelectorTarget(err)) => {
                assert_eq!(err.selector, "& a[href]");
                assert_eq!(err.reason, SelectorTargetReason::TargetsDescendant);
            }
            other => panic!("expected selector error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_selector_inside_media() {
        let def = StyleDefinition::new().media(
            "print",
            StyleDefinition::new().selector(".b", StyleBlock::new().property("color", "red")),
        );
        assert!(matches!(scoped(&def), Err(StyleError::SelectorTarget(_))));
    }

    #[test]
    fn test_conflicting_vars() {
        let def = StyleDefinition::new()
            .var("--x", "1px")
            .selector("&", StyleBlock::new().var("var(--x)", "2px"));
        assert!(matches!(scoped(&def), Err(StyleError::DuplicateVariable(_))));

        let scope = ScopeToken::new("a");
        let relaxed = Normalizer::new(Target::Scoped(&scope))
            .reject_conflicting_vars(false)
            .normalize(&def);
        assert!(relaxed.is_ok());
    }

    #[test]
    fn test_same_var_value_twice_is_fine() {
        let def = StyleDefinition::new()
            .var("--x", "1px")
            .selector("&", StyleBlock::new().var("--x", "1px"));
        assert!(scoped(&def).is_ok());
    }

    #[test]
    fn test_var_compared_as_rendered() {
        let def = StyleDefinition::new()
            .var("--x", "1")
            .selector("&", StyleBlock::new().property("--x", 1));
        assert!(scoped(&def).is_ok());
    }

    #[test]
    fn test_non_finite_number_rejected() {
        let def = StyleDefinition::new().property("width", f64::NAN);
        match scoped(&def) {
            Err(StyleError::InvalidDefinition { path, .. }) => assert_eq!(path, ".a width"),
            other => panic!("expected invalid definition, got {:?}", other),
        }

        let def = StyleDefinition::new().media(
            "print",
            StyleDefinition::new()
                .property("margin", vec![Value::from(1), Value::from(f64::INFINITY)]),
        );
        assert!(matches!(scoped(&def), Err(StyleError::InvalidDefinition { .. })));
    }

    #[test]
    fn test_global_rejects_pseudos() {
        let def = StyleDefinition::new().media(
            "print",
            StyleDefinition::new().pseudo(":hover", StyleBlock::new().property("color", "red")),
        );
        let result = Normalizer::new(Target::Global("html, body")).normalize(&def);
        match result {
            Err(StyleError::UnsupportedKey(err)) => assert_eq!(err.key, ":hover"),
            other => panic!("expected unsupported key, got {:?}", other),
        }
    }

    #[test]
    fn test_global_rules() {
        let def = StyleDefinition::new().property("margin", 0);
        let normalized = Normalizer::new(Target::Global("html, body")).normalize(&def).unwrap();
        assert_eq!(selectors_of(&normalized.rules), ["html, body"]);
    }

    #[test]
    fn test_empty_rules_dropped() {
        let def = StyleDefinition::new().pseudo(":hover", StyleBlock::new());
        assert!(scoped(&def).unwrap().rules.is_empty());
    }
}
