// SPDX-License-Identifier: MIT OR Apache-2.0
//! Document container and validation.

use crate::node::{Input, Node, NodeId};
use crate::types::ValueType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root container of a shading network
///
/// Nodes live in an arena and are addressed by [`NodeId`] handles.
/// A document must be validated before it can drive code generation;
/// any mutation clears the validated flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    name: String,
    nodes: Vec<Node>,
    #[serde(skip)]
    validated: bool,
}

impl Document {
    /// Create a new empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            validated: false,
        }
    }

    /// Get the document name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a node of the given category and return its handle
    pub fn add_node(
        &mut self,
        category: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<NodeId, DocumentError> {
        let name = name.into();
        if self.node_by_name(&name).is_some() {
            return Err(DocumentError::DuplicateNode(name));
        }
        self.validated = false;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, category, name));
        Ok(id)
    }

    /// Get a node by handle
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by handle
    ///
    /// Clears the validated flag, since the caller may change types or
    /// connections.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.validated = false;
        self.nodes.get_mut(id.index())
    }

    /// Look up a node handle by name
    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name() == name).map(Node::id)
    }

    /// Get all nodes in arena order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Add a named input to a node and return it for configuration
    pub fn add_input(&mut self, node: NodeId, name: &str) -> Result<&mut Input, DocumentError> {
        self.validated = false;
        let node = self
            .nodes
            .get_mut(node.index())
            .ok_or(DocumentError::NodeNotFound(node))?;
        if node.input(name).is_some() {
            return Err(DocumentError::DuplicateInput {
                node: node.name().to_string(),
                input: name.to_string(),
            });
        }
        node.inputs_mut().push(Input::new(name));
        let index = node.inputs().len() - 1;
        Ok(&mut node.inputs_mut()[index])
    }

    /// Check whether the document has passed validation unchanged
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Validate the document
    ///
    /// Checks that every referenced producer exists, that connection and
    /// literal types agree under the coercion rules, that no closure
    /// input is left unset, and that the graph is acyclic. On success the
    /// producer handles are cached on each input and the document is
    /// flagged validated; on failure the structure is unchanged and the
    /// flag stays off.
    pub fn validate(&mut self) -> Result<(), ValidateError> {
        self.validated = false;

        // Name-to-handle lookup happens once, here. Serialized documents
        // may contain duplicates that `add_node` would have rejected.
        let mut by_name: HashMap<&str, NodeId> = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if by_name.insert(node.name(), node.id()).is_some() {
                return Err(ValidateError::DuplicateNodeName {
                    node: node.name().to_string(),
                });
            }
        }

        let mut links: Vec<(usize, usize, NodeId)> = Vec::new();
        for (node_index, node) in self.nodes.iter().enumerate() {
            for (input_index, input) in node.inputs().iter().enumerate() {
                if let Some(value) = input.value() {
                    if !value.value_type().can_coerce_to(&input.value_type()) {
                        return Err(ValidateError::ValueTypeMismatch {
                            node: node.name().to_string(),
                            input: input.name().to_string(),
                            declared: input.value_type(),
                            found: value.value_type(),
                        });
                    }
                }
                if let Some(producer_name) = input.node_name() {
                    let producer = *by_name.get(producer_name).ok_or_else(|| {
                        ValidateError::UnknownReference {
                            node: node.name().to_string(),
                            input: input.name().to_string(),
                            reference: producer_name.to_string(),
                        }
                    })?;
                    let produced = self.nodes[producer.index()].node_type();
                    if !produced.can_coerce_to(&input.value_type()) {
                        return Err(ValidateError::TypeMismatch {
                            node: node.name().to_string(),
                            input: input.name().to_string(),
                            declared: input.value_type(),
                            found: produced,
                        });
                    }
                    links.push((node_index, input_index, producer));
                } else if input.is_unset() && input.value_type().is_closure() {
                    return Err(ValidateError::UnconnectedClosureInput {
                        node: node.name().to_string(),
                        input: input.name().to_string(),
                    });
                }
            }
        }

        self.check_cycles(&links)?;

        // All checks passed; cache the resolved handles.
        for node in &mut self.nodes {
            for input in node.inputs_mut() {
                input.set_link(None);
            }
        }
        for &(node_index, input_index, producer) in &links {
            self.nodes[node_index].inputs_mut()[input_index].set_link(Some(producer));
        }

        self.validated = true;
        tracing::debug!(
            document = self.name.as_str(),
            nodes = self.nodes.len(),
            connections = links.len(),
            "document validated"
        );
        Ok(())
    }

    /// Depth-first cycle check over the resolved connection set
    fn check_cycles(&self, links: &[(usize, usize, NodeId)]) -> Result<(), ValidateError> {
        let mut upstream: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for &(node_index, _, producer) in links {
            upstream[node_index].push(producer.index());
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Grey,
            Black,
        }

        fn visit(
            index: usize,
            upstream: &[Vec<usize>],
            marks: &mut [Mark],
            nodes: &[Node],
        ) -> Result<(), ValidateError> {
            match marks[index] {
                Mark::Black => return Ok(()),
                Mark::Grey => {
                    return Err(ValidateError::Cycle {
                        node: nodes[index].name().to_string(),
                    })
                }
                Mark::White => {}
            }
            marks[index] = Mark::Grey;
            for &dep in &upstream[index] {
                visit(dep, upstream, marks, nodes)?;
            }
            marks[index] = Mark::Black;
            Ok(())
        }

        let mut marks = vec![Mark::White; self.nodes.len()];
        for index in 0..self.nodes.len() {
            visit(index, &upstream, &mut marks, &self.nodes)?;
        }
        Ok(())
    }

    /// Nodes reachable from `root`, dependencies before dependents
    ///
    /// Inputs are visited in declaration order, so the result is
    /// deterministic for a given document. Requires a validated
    /// document, since traversal follows the cached handles.
    pub fn dependencies_first(&self, root: NodeId) -> Result<Vec<NodeId>, DocumentError> {
        if !self.validated {
            return Err(DocumentError::NotValidated);
        }
        if self.node(root).is_none() {
            return Err(DocumentError::NodeNotFound(root));
        }

        fn visit(id: NodeId, doc: &Document, seen: &mut Vec<bool>, order: &mut Vec<NodeId>) {
            if seen[id.index()] {
                return;
            }
            seen[id.index()] = true;
            if let Some(node) = doc.node(id) {
                for input in node.inputs() {
                    if let Some(producer) = input.connection() {
                        visit(producer, doc, seen, order);
                    }
                }
            }
            order.push(id);
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        visit(root, self, &mut seen, &mut order);
        Ok(order)
    }

    /// Find the entry-point element for generation
    ///
    /// Prefers the first material node in arena order, falling back to
    /// the first surface shader node.
    pub fn find_renderable_element(&self) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|n| n.node_type() == ValueType::Material)
            .or_else(|| {
                self.nodes
                    .iter()
                    .find(|n| n.node_type() == ValueType::Surfaceshader)
            })
            .map(Node::id)
    }
}

/// Error when authoring a document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A node with this name already exists
    #[error("A node named '{0}' already exists in the document")]
    DuplicateNode(String),

    /// The node already has an input with this name
    #[error("Node '{node}' already has an input named '{input}'")]
    DuplicateInput {
        /// Node name
        node: String,
        /// Input name
        input: String,
    },

    /// No node with this handle
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// The operation requires a validated document
    #[error("Document has not been validated")]
    NotValidated,
}

/// Error found during document validation
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    /// Two nodes share a name
    #[error("Duplicate node name '{node}'")]
    DuplicateNodeName {
        /// Node name
        node: String,
    },

    /// An input references a node that does not exist
    #[error("Input '{input}' on node '{node}' references unknown node '{reference}'")]
    UnknownReference {
        /// Consumer node name
        node: String,
        /// Input name
        input: String,
        /// The dangling producer name
        reference: String,
    },

    /// A connection's producer type cannot feed the input type
    #[error(
        "Input '{input}' on node '{node}' is declared {declared} but is fed {found}"
    )]
    TypeMismatch {
        /// Consumer node name
        node: String,
        /// Input name
        input: String,
        /// Declared input type
        declared: ValueType,
        /// Producer output type
        found: ValueType,
    },

    /// A literal value does not match its input's declared type
    #[error(
        "Input '{input}' on node '{node}' is declared {declared} but holds a {found} value"
    )]
    ValueTypeMismatch {
        /// Node name
        node: String,
        /// Input name
        input: String,
        /// Declared input type
        declared: ValueType,
        /// Literal value type
        found: ValueType,
    },

    /// A shader/material input has neither a value nor a connection
    #[error("Closure input '{input}' on node '{node}' is not connected")]
    UnconnectedClosureInput {
        /// Node name
        node: String,
        /// Input name
        input: String,
    },

    /// The graph contains a cycle
    #[error("Graph contains a cycle through node '{node}'")]
    Cycle {
        /// A node on the cycle
        node: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn surface_material_doc() -> Document {
        let mut doc = Document::new("test");
        let ss = doc.add_node("standard_surface", "SR_default").unwrap();
        doc.node_mut(ss)
            .unwrap()
            .set_node_type(ValueType::Surfaceshader);
        let sm = doc.add_node("surfacematerial", "Default").unwrap();
        doc.node_mut(sm).unwrap().set_node_type(ValueType::Material);
        let input = doc.add_input(sm, "surfaceshader").unwrap();
        input.set_value_type(ValueType::Surfaceshader);
        input.set_node_name("SR_default");
        doc
    }

    #[test]
    fn minimal_material_validates() {
        let mut doc = surface_material_doc();
        assert!(doc.validate().is_ok());
        assert!(doc.is_validated());

        let sm = doc.node_by_name("Default").unwrap();
        let link = doc.node(sm).unwrap().input("surfaceshader").unwrap().connection();
        assert_eq!(link, doc.node_by_name("SR_default"));
    }

    #[test]
    fn mutation_clears_validated_flag() {
        let mut doc = surface_material_doc();
        doc.validate().unwrap();
        let ss = doc.node_by_name("SR_default").unwrap();
        let _ = doc.node_mut(ss);
        assert!(!doc.is_validated());
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut doc = Document::new("test");
        doc.add_node("constant", "c1").unwrap();
        assert!(matches!(
            doc.add_node("constant", "c1"),
            Err(DocumentError::DuplicateNode(_))
        ));
    }

    #[test]
    fn unknown_reference_fails_validation() {
        let mut doc = Document::new("test");
        let sm = doc.add_node("surfacematerial", "Default").unwrap();
        doc.node_mut(sm).unwrap().set_node_type(ValueType::Material);
        let input = doc.add_input(sm, "surfaceshader").unwrap();
        input.set_value_type(ValueType::Surfaceshader);
        input.set_node_name("nope");
        assert!(matches!(
            doc.validate(),
            Err(ValidateError::UnknownReference { .. })
        ));
        assert!(!doc.is_validated());
    }

    #[test]
    fn connection_type_mismatch_fails_validation() {
        let mut doc = Document::new("test");
        let c = doc.add_node("constant", "c1").unwrap();
        doc.node_mut(c).unwrap().set_node_type(ValueType::Vector2);
        let add = doc.add_node("add", "a1").unwrap();
        doc.node_mut(add).unwrap().set_node_type(ValueType::Color3);
        let input = doc.add_input(add, "in1").unwrap();
        input.set_value_type(ValueType::Color3);
        input.set_node_name("c1");
        assert!(matches!(
            doc.validate(),
            Err(ValidateError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn scalar_broadcast_coercion_accepted() {
        let mut doc = Document::new("test");
        let c = doc.add_node("constant", "c1").unwrap();
        doc.node_mut(c).unwrap().set_node_type(ValueType::Float);
        let add = doc.add_node("add", "a1").unwrap();
        doc.node_mut(add).unwrap().set_node_type(ValueType::Color3);
        let input = doc.add_input(add, "in1").unwrap();
        input.set_value_type(ValueType::Color3);
        input.set_node_name("c1");
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn literal_type_mismatch_fails_validation() {
        let mut doc = Document::new("test");
        let c = doc.add_node("constant", "c1").unwrap();
        doc.node_mut(c).unwrap().set_node_type(ValueType::Color3);
        let input = doc.add_input(c, "value").unwrap();
        input.set_value_type(ValueType::Color3);
        input.set_value(Value::String("red".into()));
        assert!(matches!(
            doc.validate(),
            Err(ValidateError::ValueTypeMismatch { .. })
        ));
    }

    #[test]
    fn unconnected_closure_input_fails_validation() {
        let mut doc = Document::new("test");
        let sm = doc.add_node("surfacematerial", "Default").unwrap();
        doc.node_mut(sm).unwrap().set_node_type(ValueType::Material);
        doc.add_input(sm, "surfaceshader")
            .unwrap()
            .set_value_type(ValueType::Surfaceshader);
        assert!(matches!(
            doc.validate(),
            Err(ValidateError::UnconnectedClosureInput { .. })
        ));
    }

    #[test]
    fn cycle_fails_validation() {
        let mut doc = Document::new("test");
        let a = doc.add_node("add", "a").unwrap();
        let b = doc.add_node("add", "b").unwrap();
        doc.node_mut(a).unwrap().set_node_type(ValueType::Float);
        doc.node_mut(b).unwrap().set_node_type(ValueType::Float);
        doc.add_input(a, "in1").unwrap().set_node_name("b");
        doc.add_input(b, "in1").unwrap().set_node_name("a");
        assert!(matches!(doc.validate(), Err(ValidateError::Cycle { .. })));
    }

    #[test]
    fn dependencies_first_orders_producers_before_consumers() {
        let mut doc = surface_material_doc();
        doc.validate().unwrap();
        let sm = doc.node_by_name("Default").unwrap();
        let ss = doc.node_by_name("SR_default").unwrap();
        let order = doc.dependencies_first(sm).unwrap();
        assert_eq!(order, vec![ss, sm]);
    }

    #[test]
    fn dependencies_first_requires_validation() {
        let doc = surface_material_doc();
        let sm = doc.node_by_name("Default").unwrap();
        assert!(matches!(
            doc.dependencies_first(sm),
            Err(DocumentError::NotValidated)
        ));
    }

    #[test]
    fn find_renderable_prefers_material() {
        let doc = surface_material_doc();
        assert_eq!(doc.find_renderable_element(), doc.node_by_name("Default"));
    }

    #[test]
    fn serde_round_trip_requires_revalidation() {
        let mut doc = surface_material_doc();
        doc.validate().unwrap();
        let text = ron::to_string(&doc).unwrap();
        let mut loaded: Document = ron::from_str(&text).unwrap();
        assert!(!loaded.is_validated());
        assert!(loaded.validate().is_ok());
        assert_eq!(loaded.node_count(), doc.node_count());
    }
}
