//! CSS Emitter
//!
//! Serializes a compilation unit. Order is fixed: font faces, keyframes,
//! unconditional rules in traversal order, then the condition tree depth
//! first with siblings in first-registration order.

use crate::condition_tree::{ConditionNode, ConditionTree};
use crate::config::{CompilerConfig, OutputStyle};
use crate::definition::{FontFace, Keyframes, StyleBlock};
use crate::properties::{self, CssDeclaration};
use crate::{CompilationUnit, Declaration, Rule};

/// Output block: prelude, declarations, nested blocks
#[derive(Debug, Clone, PartialEq)]
struct CssBlock {
    prelude: String,
    declarations: Vec<CssDeclaration>,
    children: Vec<CssBlock>,
}

/// CSS text emitter
#[derive(Debug, Clone)]
pub struct CssEmitter {
    style: OutputStyle,
    indent_width: usize,
}

impl CssEmitter {
    pub fn new(config: &CompilerConfig) -> Self {
        Self {
            style: config.output,
            indent_width: config.indent_width,
        }
    }

    /// Unconditional rules followed by the condition tree
    pub fn emit(&self, rules: &[Rule], conditions: &ConditionTree) -> String {
        tracing::debug!(
            "Emitting {} rules and {} condition blocks",
            rules.len(),
            conditions.len()
        );

        let mut blocks: Vec<CssBlock> = rules.iter().filter_map(rule_block).collect();
        blocks.extend(conditions.roots().filter_map(condition_block));
        self.render(&blocks)
    }

    /// Whole unit, including font faces and keyframes
    pub fn emit_unit(&self, unit: &CompilationUnit) -> String {
        tracing::debug!(
            "Emitting unit: {} font faces, {} keyframes, {} rules, {} condition blocks",
            unit.font_faces().len(),
            unit.keyframes().len(),
            unit.rules().len(),
            unit.conditions().len()
        );

        let mut blocks: Vec<CssBlock> = unit.font_faces().iter().map(font_face_block).collect();
        blocks.extend(unit.keyframes().iter().map(keyframes_block));
        blocks.extend(unit.rules().iter().filter_map(rule_block));
        blocks.extend(unit.conditions().roots().filter_map(condition_block));
        self.render(&blocks)
    }

    fn render(&self, blocks: &[CssBlock]) -> String {
        let mut output = String::new();
        match self.style {
            OutputStyle::Pretty => {
                for block in blocks {
                    self.render_pretty(block, 0, &mut output);
                }
            }
            OutputStyle::Compact => {
                for block in blocks {
                    render_compact(block, &mut output);
                    output.push('\n');
                }
            }
            OutputStyle::Minified => {
                for block in blocks {
                    render_minified(block, &mut output);
                }
            }
        }
        output
    }

    fn render_pretty(&self, block: &CssBlock, level: usize, output: &mut String) {
        let indent = " ".repeat(level * self.indent_width);
        let inner = " ".repeat((level + 1) * self.indent_width);

        output.push_str(&indent);
        output.push_str(&block.prelude);
        output.push_str(" {\n");
        for declaration in &block.declarations {
            output.push_str(&inner);
            output.push_str(&declaration.to_string());
            output.push_str(";\n");
        }
        for child in &block.children {
            self.render_pretty(child, level + 1, output);
        }
        output.push_str(&indent);
        output.push_str("}\n");
    }
}

fn render_compact(block: &CssBlock, output: &mut String) {
    output.push_str(&block.prelude);
    output.push_str(" {");
    for declaration in &block.declarations {
        output.push(' ');
        output.push_str(&declaration.to_string());
        output.push(';');
    }
    for child in &block.children {
        output.push(' ');
        render_compact(child, output);
    }
    output.push_str(" }");
}

fn render_minified(block: &CssBlock, output: &mut String) {
    output.push_str(&block.prelude);
    output.push('{');
    for (idx, declaration) in block.declarations.iter().enumerate() {
        if idx > 0 {
            output.push(';');
        }
        output.push_str(&declaration.name);
        output.push(':');
        output.push_str(&declaration.value);
    }
    if !block.declarations.is_empty() && !block.children.is_empty() {
        output.push(';');
    }
    for child in &block.children {
        render_minified(child, output);
    }
    output.push('}');
}

fn rule_block(rule: &Rule) -> Option<CssBlock> {
    if rule.declarations.is_empty() {
        return None;
    }
    Some(CssBlock {
        prelude: rule.selector.clone(),
        declarations: rule.declarations.iter().map(properties::render).collect(),
        children: Vec::new(),
    })
}

fn condition_block(node: &ConditionNode) -> Option<CssBlock> {
    if node.is_empty() {
        return None;
    }

    let mut children: Vec<CssBlock> = node.rules.iter().filter_map(rule_block).collect();
    children.extend(node.children.values().filter_map(condition_block));

    Some(CssBlock {
        prelude: node.condition.to_string(),
        declarations: Vec::new(),
        children,
    })
}

fn keyframes_block(keyframes: &Keyframes) -> CssBlock {
    CssBlock {
        prelude: format!("@keyframes {}", keyframes.name),
        declarations: Vec::new(),
        children: keyframes
            .frames
            .iter()
            .map(|(stop, block)| CssBlock {
                prelude: stop.clone(),
                declarations: block_declarations(block),
                children: Vec::new(),
            })
            .collect(),
    }
}

fn font_face_block(font_face: &FontFace) -> CssBlock {
    let family = if font_face.family.starts_with('"') || font_face.family.starts_with('\'') {
        font_face.family.clone()
    } else {
        format!("\"{}\"", font_face.family)
    };

    let mut declarations = vec![CssDeclaration {
        name: "font-family".to_string(),
        value: family,
    }];
    declarations.extend(block_declarations(&font_face.block));

    CssBlock {
        prelude: "@font-face".to_string(),
        declarations,
        children: Vec::new(),
    }
}

/// Same ordering as normalized rules: variables, then properties
fn block_declarations(block: &StyleBlock) -> Vec<CssDeclaration> {
    let mut declarations: Vec<CssDeclaration> = block
        .vars
        .iter()
        .map(|(name, value)| properties::render(&Declaration::variable(name, value.as_str())))
        .collect();
    for (name, value) in &block.properties {
        declarations.extend(properties::serialize(name, value));
    }
    declarations
}
