//! fOS Style Compiler
//!
//! Compiles typed style definitions into deterministic, deduplicated CSS.
//!
//! A [`CompilationUnit`] collects every definition of one build pass.
//! Unconditional rules are emitted in traversal order, followed by the
//! merged `@media` / `@supports` tree, where identical conditions from
//! different definitions share a single block.
//!
//! # Example
//! ```rust,ignore
//! use fos_style::{CompilationUnit, ScopeToken, StyleBlock, StyleDefinition};
//!
//! let mut unit = CompilationUnit::new();
//! let button = StyleDefinition::new()
//!     .property("display", "flex")
//!     .pseudo(":hover", StyleBlock::new().property("color", "red"));
//! unit.normalize(&ScopeToken::new("a"), &button)?;
//! let css = unit.emit();
//! ```

pub mod condition_tree;
pub mod config;
pub mod definition;
pub mod emitter;
pub mod normalizer;
pub mod parser;
pub mod properties;
pub mod selectors;

pub use condition_tree::{Condition, ConditionKind, ConditionNode, ConditionTree};
pub use config::{CompilerConfig, OutputStyle};
pub use definition::{
    FontFace, GlobalStyle, Keyframes, PropertyValue, ScopeToken, Section, StyleBlock,
    StyleDefinition, Value,
};
pub use emitter::CssEmitter;
pub use normalizer::{Normalized, Normalizer, Target};
pub use parser::DefinitionParser;
pub use selectors::{SelectorTargetError, SelectorTargetReason};

/// Flattened rule: one selector, ordered declarations
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Fully resolved, e.g. `.a:hover` or `.b:focus .a`
    pub selector: String,
    pub declarations: Vec<Declaration>,
}

/// Declaration kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// Authored property name, normalized at emission
    Property,
    /// Custom property from `vars`, emitted verbatim
    Variable,
}

/// Single declaration, as authored
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub value: Value,
}

impl Declaration {
    pub fn property(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            kind: DeclarationKind::Property,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn variable(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            kind: DeclarationKind::Variable,
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Key not allowed where it was written
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{key}` is not supported in {context}")]
pub struct UnsupportedKeyError {
    pub key: String,
    pub context: String,
}

impl UnsupportedKeyError {
    pub fn new(key: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            context: context.into(),
        }
    }
}

/// Same custom property set twice on one selector with different values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Variable `{name}` on `{selector}` set to both `{first}` and `{second}`")]
pub struct DuplicateVariableError {
    pub name: String,
    pub selector: String,
    pub first: String,
    pub second: String,
}

/// Style compilation error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    #[error(transparent)]
    SelectorTarget(#[from] SelectorTargetError),

    #[error(transparent)]
    UnsupportedKey(#[from] UnsupportedKeyError),

    #[error(transparent)]
    DuplicateVariable(#[from] DuplicateVariableError),

    #[error("Invalid style definition at {path}: {message}")]
    InvalidDefinition { path: String, message: String },
}

/// Everything compiled in one build pass.
///
/// Owns the unconditional rule list and the condition tree; dropped
/// after [`CompilationUnit::emit`].
#[derive(Debug, Default)]
pub struct CompilationUnit {
    config: CompilerConfig,
    rules: Vec<Rule>,
    conditions: ConditionTree,
    keyframes: Vec<Keyframes>,
    font_faces: Vec<FontFace>,
}

impl CompilationUnit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Normalize a scoped definition.
    ///
    /// Returns the unconditional rules it contributed. On error the unit
    /// is left untouched.
    pub fn normalize(
        &mut self,
        scope: &ScopeToken,
        definition: &StyleDefinition,
    ) -> Result<&[Rule], StyleError> {
        let normalized = self.normalizer(Target::Scoped(scope)).normalize(definition);
        self.commit(normalized)
    }

    /// Normalize a definition against a raw selector
    pub fn normalize_global(
        &mut self,
        selector: &str,
        definition: &StyleDefinition,
    ) -> Result<&[Rule], StyleError> {
        let normalized = self.normalizer(Target::Global(selector)).normalize(definition);
        self.commit(normalized)
    }

    pub fn add_global(&mut self, style: &GlobalStyle) -> Result<&[Rule], StyleError> {
        self.normalize_global(&style.selector, &style.definition)
    }

    pub fn add_keyframes(&mut self, keyframes: Keyframes) {
        self.keyframes.push(keyframes);
    }

    pub fn add_font_face(&mut self, font_face: FontFace) {
        self.font_faces.push(font_face);
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Unconditional rules so far
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn conditions(&self) -> &ConditionTree {
        &self.conditions
    }

    pub fn keyframes(&self) -> &[Keyframes] {
        &self.keyframes
    }

    pub fn font_faces(&self) -> &[FontFace] {
        &self.font_faces
    }

    /// Serialize the unit to CSS text
    pub fn emit(self) -> String {
        CssEmitter::new(&self.config).emit_unit(&self)
    }

    fn normalizer<'a>(&self, target: Target<'a>) -> Normalizer<'a> {
        Normalizer::new(target).reject_conflicting_vars(self.config.reject_conflicting_vars)
    }

    fn commit(&mut self, normalized: Result<Normalized, StyleError>) -> Result<&[Rule], StyleError> {
        let normalized = normalized.inspect_err(|err| {
            tracing::debug!("Rejected style definition: {}", err);
        })?;

        let start = self.rules.len();
        self.rules.extend(normalized.rules);
        for (path, rules) in normalized.conditional {
            self.conditions.register(&path, rules);
        }
        Ok(&self.rules[start..])
    }
}

/// Compile scoped definitions into CSS with the default configuration
pub fn compile<'a, I>(definitions: I) -> Result<String, StyleError>
where
    I: IntoIterator<Item = (&'a ScopeToken, &'a StyleDefinition)>,
{
    let mut unit = CompilationUnit::new();
    for (scope, definition) in definitions {
        unit.normalize(scope, definition)?;
    }
    Ok(unit.emit())
}
