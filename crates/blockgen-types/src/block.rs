//! Block model consumed by the code generator.
//!
//! The generator only ever reads blocks. [`Block`] is the capability set it
//! needs from an editor's graph; [`BlockNode`] is an owned tree implementing
//! it, used by hosts that ship the graph as JSON and by the test suites.
//!
//! A graph handed to the generator must be acyclic along its input and
//! `next` links. [`BlockNode`] guarantees this by ownership; foreign
//! implementations are protected only by the generator's nesting and chain
//! length limits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::CodeContext;

/// Field sentinels the editor leaves behind when the user never filled a slot.
pub const PLACEHOLDER_SENTINELS: [&str; 3] = ["<default>", "???", "<name>"];

/// Field sentinel for a pin that cannot be used as an analog input.
pub const ILLEGAL_ANALOG_PIN: &str = "<illegalanalogpin>";

// ══════════════════════════════════════════════════════════════════════════════
// Capability traits
// ══════════════════════════════════════════════════════════════════════════════

/// Whether an input takes a single value producer or a statement chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Value,
    Statement,
}

/// A named input as seen from the generator.
///
/// For value inputs `target` is the connected producer; for statement inputs
/// it is the head of the chain (follow [`Block::next_block`] from there).
#[derive(Clone, Copy)]
pub struct Input<'a> {
    pub kind: InputKind,
    pub target: Option<&'a dyn Block>,
}

/// Read-only view of one node in the editor's program graph.
pub trait Block {
    /// Stable identifier, used to attribute recorded errors.
    fn id(&self) -> &str;

    /// Type discriminant, e.g. `"func_decl"` or `"main_loop"`.
    fn block_type(&self) -> &str;

    /// Literal value of a field, `None` when the field does not exist.
    fn field_value(&self, name: &str) -> Option<&str>;

    /// Named input, `None` when the block has no input of that name.
    fn input(&self, name: &str) -> Option<Input<'_>>;

    /// Next block in a statement chain.
    fn next_block(&self) -> Option<&dyn Block>;

    /// Output type tags when the block is used as a value producer.
    fn output_types(&self) -> &[String];

    /// Free-text comment attached in the editor.
    fn comment_text(&self) -> Option<&str>;

    /// C-style signature of a function or ISR block (without `;`).
    fn signature(&self) -> Option<String> {
        None
    }

    /// Custom code generation. Returning `Some` bypasses the code registry.
    fn generate_code(&self, _ctx: &mut dyn CodeContext) -> Option<String> {
        None
    }
}

/// Source of top-level blocks for a generation pass.
pub trait Workspace {
    /// Top-level blocks in editor order.
    fn top_blocks(&self) -> Vec<&dyn Block>;
}

// ══════════════════════════════════════════════════════════════════════════════
// Owned tree
// ══════════════════════════════════════════════════════════════════════════════

/// An input slot of a [`BlockNode`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputNode {
    pub name: String,
    pub kind: InputKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Box<BlockNode>>,
}

/// Owned block node. Children are owned through inputs and `next`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockNode {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub inputs: Vec<InputNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<BlockNode>>,
    #[serde(default)]
    pub output: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl BlockNode {
    pub fn new(id: impl Into<String>, block_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block_type: block_type.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Add a value input connected to `producer`.
    pub fn with_value(mut self, name: impl Into<String>, producer: BlockNode) -> Self {
        self.push_input(name.into(), InputKind::Value, Some(producer));
        self
    }

    /// Add a value input with nothing plugged in.
    pub fn with_empty_value(mut self, name: impl Into<String>) -> Self {
        self.push_input(name.into(), InputKind::Value, None);
        self
    }

    /// Add a statement input whose chain starts at `head`.
    pub fn with_statements(mut self, name: impl Into<String>, head: Option<BlockNode>) -> Self {
        self.push_input(name.into(), InputKind::Statement, head);
        self
    }

    pub fn with_next(mut self, next: BlockNode) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    pub fn with_output<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    fn push_input(&mut self, name: String, kind: InputKind, target: Option<BlockNode>) {
        self.inputs.push(InputNode {
            name,
            kind,
            target: target.map(Box::new),
        });
    }
}

/// Link `blocks` into a statement chain and return its head.
pub fn chain(blocks: Vec<BlockNode>) -> Option<BlockNode> {
    blocks.into_iter().rev().fold(None, |next, mut block| {
        if let Some(next) = next {
            block.next = Some(Box::new(next));
        }
        Some(block)
    })
}

impl Block for BlockNode {
    fn id(&self) -> &str {
        &self.id
    }

    fn block_type(&self) -> &str {
        &self.block_type
    }

    fn field_value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn input(&self, name: &str) -> Option<Input<'_>> {
        self.inputs.iter().find(|i| i.name == name).map(|i| Input {
            kind: i.kind,
            target: i.target.as_deref().map(|b| b as &dyn Block),
        })
    }

    fn next_block(&self) -> Option<&dyn Block> {
        self.next.as_deref().map(|b| b as &dyn Block)
    }

    fn output_types(&self) -> &[String] {
        &self.output
    }

    fn comment_text(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    fn signature(&self) -> Option<String> {
        self.signature.clone()
    }
}

/// The top-level blocks of an editor workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockTree {
    pub blocks: Vec<BlockNode>,
}

impl BlockTree {
    pub fn new(blocks: Vec<BlockNode>) -> Self {
        Self { blocks }
    }

    /// Parse a workspace exported as JSON (`{ "blocks": [...] }`).
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Workspace for BlockTree {
    fn top_blocks(&self) -> Vec<&dyn Block> {
        self.blocks.iter().map(|b| b as &dyn Block).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_links_in_order() {
        let head = chain(vec![
            BlockNode::new("a", "stmt"),
            BlockNode::new("b", "stmt"),
            BlockNode::new("c", "stmt"),
        ])
        .unwrap();
        let mut ids = Vec::new();
        let mut current: Option<&dyn Block> = Some(&head);
        while let Some(block) = current {
            ids.push(block.id().to_string());
            current = block.next_block();
        }
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_chain_empty() {
        assert!(chain(Vec::new()).is_none());
    }

    #[test]
    fn test_field_lookup() {
        let block = BlockNode::new("a", "var").with_field("NAME", "");
        assert_eq!(block.field_value("NAME"), Some(""));
        assert_eq!(block.field_value("OTHER"), None);
    }

    #[test]
    fn test_input_lookup() {
        let block = BlockNode::new("a", "add")
            .with_value("LEFT", BlockNode::new("b", "number"))
            .with_empty_value("RIGHT");
        let left = block.input("LEFT").unwrap();
        assert_eq!(left.kind, InputKind::Value);
        assert_eq!(left.target.unwrap().id(), "b");
        assert!(block.input("RIGHT").unwrap().target.is_none());
        assert!(block.input("MISSING").is_none());
    }

    #[test]
    fn test_tree_from_json() {
        let json = r#"{
            "blocks": [
                {
                    "id": "m",
                    "type": "main_loop",
                    "comment": "entry",
                    "inputs": [
                        {
                            "name": "STATEMENTS",
                            "kind": "statement",
                            "target": { "id": "s1", "type": "raw", "fields": { "CODE": "foo();" } }
                        }
                    ]
                }
            ]
        }"#;
        let tree = BlockTree::from_json(json).unwrap();
        let tops = tree.top_blocks();
        assert_eq!(tops.len(), 1);
        assert_eq!(tops[0].block_type(), "main_loop");
        assert_eq!(tops[0].comment_text(), Some("entry"));
        let stmts = tops[0].input("STATEMENTS").unwrap();
        assert_eq!(stmts.kind, InputKind::Statement);
        assert_eq!(stmts.target.unwrap().field_value("CODE"), Some("foo();"));
    }
}
