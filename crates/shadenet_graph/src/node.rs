// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node and input definitions for shading-network documents.

use crate::types::ValueType;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Stable handle of a node within its document's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Get the arena index of this handle
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A named input on a node
///
/// An input carries a declared type and either a literal value, a
/// connection to a producer node (by name), or neither. When both are
/// present the connection wins. The resolved handle of the producer is
/// cached by [`crate::Document::validate`] and is not serialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Input {
    name: String,
    value_type: ValueType,
    value: Option<Value>,
    node_name: Option<String>,
    #[serde(skip)]
    link: Option<NodeId>,
}

impl Input {
    /// Create a new input with the default `float` type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: ValueType::Float,
            value: None,
            node_name: None,
            link: None,
        }
    }

    /// Get the input name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the declared type
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Set the declared type
    pub fn set_value_type(&mut self, value_type: ValueType) -> &mut Self {
        self.value_type = value_type;
        self
    }

    /// Get the literal value, if any
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Assign a literal value
    pub fn set_value(&mut self, value: Value) -> &mut Self {
        self.value = Some(value);
        self
    }

    /// Get the name of the connected producer node, if any
    pub fn node_name(&self) -> Option<&str> {
        self.node_name.as_deref()
    }

    /// Connect this input to the named producer node
    pub fn set_node_name(&mut self, node_name: impl Into<String>) -> &mut Self {
        self.node_name = Some(node_name.into());
        self.link = None;
        self
    }

    /// Get the resolved producer handle, available after validation
    pub fn connection(&self) -> Option<NodeId> {
        self.link
    }

    /// Check if this input has neither a value nor a connection
    pub fn is_unset(&self) -> bool {
        self.value.is_none() && self.node_name.is_none()
    }

    pub(crate) fn set_link(&mut self, link: Option<NodeId>) {
        self.link = link;
    }
}

/// A node instance in a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    name: String,
    category: String,
    node_type: ValueType,
    inputs: Vec<Input>,
}

impl Node {
    pub(crate) fn new(id: NodeId, category: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            node_type: ValueType::Float,
            inputs: Vec::new(),
        }
    }

    /// Get the node handle
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the semantic category, e.g. `standard_surface`
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Get the declared output type
    pub fn node_type(&self) -> ValueType {
        self.node_type
    }

    /// Set the declared output type
    pub fn set_node_type(&mut self, node_type: ValueType) -> &mut Self {
        self.node_type = node_type;
        self
    }

    /// Get an input by name
    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.iter().find(|i| i.name == name)
    }

    /// Get a mutable input by name
    pub fn input_mut(&mut self, name: &str) -> Option<&mut Input> {
        self.inputs.iter_mut().find(|i| i.name == name)
    }

    /// Get all inputs in declaration order
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut Vec<Input> {
        &mut self.inputs
    }
}
