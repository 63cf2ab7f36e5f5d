//! Registry of per-block-type code generation entries.
//!
//! Target system modules register an entry for every block type they
//! define. An entry is either a function producing the code directly or a
//! [`TemplateDescriptor`]: a [`Template`] plus one [`Placeholder`] per slot.
//!
//! Placeholders are usually written in their short string form:
//!
//! | form            | replacement                                         |
//! |-----------------|-----------------------------------------------------|
//! | `F_NAME`        | field `NAME`, through the keyword table             |
//! | `V_NAME`        | code of the producer plugged into value input `NAME` |
//! | `V_NAME_TYPE`   | same, cast to `TYPE` when the producer differs      |
//! | `S_NAME`        | statement chain at `NAME`, indented                 |
//! | `K_TAG`         | keyword `TAG`                                       |

use std::collections::HashMap;
use std::fmt;

use blockgen_types::Block;
use serde::Serialize;
use tracing::warn;

use crate::generation::Generation;
use crate::template::Template;

/// Produces the complete code of a block.
pub type GenerateFn = Box<dyn Fn(&dyn Block, &mut Generation<'_>) -> String + Send + Sync>;

/// Runs before a template's placeholders are resolved, for side effects
/// such as requiring a library.
pub type PrepareFn = Box<dyn Fn(&dyn Block, &mut Generation<'_>) + Send + Sync>;

/// How to compute the replacement of one template slot.
pub enum Placeholder {
    Field(String),
    Value {
        name: String,
        enforced_type: Option<String>,
    },
    Statement(String),
    Keyword(String),
    Func(GenerateFn),
    /// Unrecognized short form; renders as an empty string.
    Empty,
}

impl Placeholder {
    /// Parse the short string form (`F_`, `V_`, `S_`, `K_`).
    ///
    /// A `V_` form splits on `_`: the first part is the input name and the
    /// second the enforced type, so typed inputs cannot contain `_`.
    pub fn parse(form: &str) -> Self {
        let (Some(prefix), Some(name)) = (form.get(..2), form.get(2..)) else {
            return Self::Empty;
        };
        match prefix {
            "F_" => Self::Field(name.to_string()),
            "V_" => {
                let mut parts = name.split('_');
                let input = parts.next().unwrap_or_default().to_string();
                Self::Value {
                    name: input,
                    enforced_type: parts.next().map(str::to_string),
                }
            }
            "S_" => Self::Statement(name.to_string()),
            "K_" => Self::Keyword(name.to_string()),
            _ => Self::Empty,
        }
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&dyn Block, &mut Generation<'_>) -> String + Send + Sync + 'static,
    {
        Self::Func(Box::new(f))
    }
}

impl From<&str> for Placeholder {
    fn from(form: &str) -> Self {
        Self::parse(form)
    }
}

impl fmt::Debug for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "F_{name}"),
            Self::Value {
                name,
                enforced_type: Some(ty),
            } => write!(f, "V_{name}_{ty}"),
            Self::Value { name, .. } => write!(f, "V_{name}"),
            Self::Statement(name) => write!(f, "S_{name}"),
            Self::Keyword(tag) => write!(f, "K_{tag}"),
            Self::Func(_) => f.write_str("Func(..)"),
            Self::Empty => f.write_str("Empty"),
        }
    }
}

/// Template, slot placeholders and optional pre-generation hook of a block type.
pub struct TemplateDescriptor {
    pub template: Template,
    pub placeholders: Vec<Placeholder>,
    pub prepare: Option<PrepareFn>,
}

impl TemplateDescriptor {
    pub fn new<I, P>(template: &str, placeholders: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Placeholder>,
    {
        Self {
            template: Template::parse(template),
            placeholders: placeholders.into_iter().map(Into::into).collect(),
            prepare: None,
        }
    }

    pub fn with_prepare<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&dyn Block, &mut Generation<'_>) + Send + Sync + 'static,
    {
        self.prepare = Some(Box::new(prepare));
        self
    }

    /// Whether every slot gets exactly one placeholder.
    pub fn is_aligned(&self) -> bool {
        self.template.slot_count() == self.placeholders.len()
    }
}

impl fmt::Debug for TemplateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateDescriptor")
            .field("template", &self.template.source())
            .field("placeholders", &self.placeholders)
            .field("prepare", &self.prepare.is_some())
            .finish()
    }
}

/// Registered generation strategy of one block type.
pub enum CodeEntry {
    Function(GenerateFn),
    Template(TemplateDescriptor),
}

/// A descriptor whose slot and placeholder counts disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateMismatch {
    pub block_type: String,
    pub slots: usize,
    pub placeholders: usize,
}

/// Block type → [`CodeEntry`]. Open for registration by target systems.
#[derive(Default)]
pub struct CodeRegistry {
    entries: HashMap<String, CodeEntry>,
}

impl CodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entry` for `block_type`, replacing any previous entry.
    pub fn register(&mut self, block_type: impl Into<String>, entry: CodeEntry) -> &mut Self {
        let block_type = block_type.into();
        if let CodeEntry::Template(descriptor) = &entry {
            if !descriptor.is_aligned() {
                warn!(
                    block_type = %block_type,
                    slots = descriptor.template.slot_count(),
                    placeholders = descriptor.placeholders.len(),
                    "template slot count does not match its placeholders"
                );
            }
        }
        self.entries.insert(block_type, entry);
        self
    }

    pub fn register_function<F>(&mut self, block_type: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&dyn Block, &mut Generation<'_>) -> String + Send + Sync + 'static,
    {
        self.register(block_type, CodeEntry::Function(Box::new(f)))
    }

    pub fn register_template<I, P>(
        &mut self,
        block_type: impl Into<String>,
        template: &str,
        placeholders: I,
    ) -> &mut Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Placeholder>,
    {
        self.register(
            block_type,
            CodeEntry::Template(TemplateDescriptor::new(template, placeholders)),
        )
    }

    pub fn register_descriptor(
        &mut self,
        block_type: impl Into<String>,
        descriptor: TemplateDescriptor,
    ) -> &mut Self {
        self.register(block_type, CodeEntry::Template(descriptor))
    }

    pub fn get(&self, block_type: &str) -> Option<&CodeEntry> {
        self.entries.get(block_type)
    }

    pub fn contains(&self, block_type: &str) -> bool {
        self.entries.contains_key(block_type)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every template whose slot count differs from its placeholder count,
    /// sorted by block type.
    pub fn check_templates(&self) -> Vec<TemplateMismatch> {
        let mut mismatches: Vec<_> = self
            .entries
            .iter()
            .filter_map(|(block_type, entry)| match entry {
                CodeEntry::Template(d) if !d.is_aligned() => Some(TemplateMismatch {
                    block_type: block_type.clone(),
                    slots: d.template.slot_count(),
                    placeholders: d.placeholders.len(),
                }),
                _ => None,
            })
            .collect();
        mismatches.sort_by(|a, b| a.block_type.cmp(&b.block_type));
        mismatches
    }
}
