// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph evaluation and execution.
//!
//! Execution follows exec links from an entry pin, evaluating each node it
//! reaches and continuing from that node's `Then` pin.

use crate::connection::PortRef;
use crate::graph::Graph;
use crate::graphs::gameplay::{pins, reflection_read_shape};
use crate::node::{Node, NodeId};
use crate::port::{PortId, PortValue};
use ordoplay_reflect::{ComponentReader, ComponentTypeId, EntityId};
use std::collections::{HashMap, HashSet};

/// Result of evaluating a node
#[derive(Debug, Clone, Default)]
pub struct NodeOutput {
    /// Output values by port ID
    pub values: HashMap<PortId, PortValue>,
}

impl NodeOutput {
    /// Create a new empty output
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an output value
    pub fn set(&mut self, port_id: PortId, value: PortValue) {
        self.values.insert(port_id, value);
    }

    /// Get an output value
    pub fn get(&self, port_id: &PortId) -> Option<&PortValue> {
        self.values.get(port_id)
    }
}

/// Context for graph evaluation
pub struct EvaluationContext<'a> {
    /// The graph being evaluated
    pub graph: &'a Graph,
    /// Cached node outputs
    outputs: HashMap<NodeId, NodeOutput>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            outputs: HashMap::new(),
        }
    }

    /// Value arriving at an input port through its connection
    pub fn get_input(&self, port: PortRef) -> Option<&PortValue> {
        let connection = self.graph.connections_to(port).next()?;
        self.outputs.get(&connection.from.node)?.get(&connection.from.port)
    }

    /// Get the default value for an input port
    pub fn get_default(&self, port: PortRef) -> Option<&PortValue> {
        self.graph.port(port)?.default_value.as_ref()
    }

    /// Get input value or default
    pub fn get_input_or_default(&self, port: PortRef) -> Option<&PortValue> {
        self.get_input(port).or_else(|| self.get_default(port))
    }

    /// Set the output for a node
    pub fn set_output(&mut self, node_id: NodeId, output: NodeOutput) {
        self.outputs.insert(node_id, output);
    }

    /// Output of a node, if it has been evaluated
    pub fn output(&self, node_id: NodeId) -> Option<&NodeOutput> {
        self.outputs.get(&node_id)
    }

    /// Get all outputs
    pub fn outputs(&self) -> &HashMap<NodeId, NodeOutput> {
        &self.outputs
    }
}

/// Trait for evaluating nodes
pub trait NodeEvaluator {
    /// Evaluate a node and produce outputs
    fn evaluate(&self, node: &Node, ctx: &EvaluationContext) -> Result<NodeOutput, EvaluationError>;
}

/// Evaluates reflection read calls against a live component reader
pub struct ReflectionEvaluator<'r, R: ?Sized> {
    reader: &'r R,
}

impl<'r, R: ComponentReader + ?Sized> ReflectionEvaluator<'r, R> {
    /// Create an evaluator reading through `reader`
    pub fn new(reader: &'r R) -> Self {
        Self { reader }
    }
}

fn input_value<'c>(node: &Node, ctx: &'c EvaluationContext, name: &str) -> Result<&'c PortValue, EvaluationError> {
    let port = node
        .input_named(name)
        .ok_or_else(|| EvaluationError::MissingPort(name.to_string()))?;
    ctx.get_input_or_default(PortRef::new(node.id, port.id))
        .ok_or(EvaluationError::MissingInput(port.id))
}

impl<'r, R: ComponentReader + ?Sized> NodeEvaluator for ReflectionEvaluator<'r, R> {
    fn evaluate(&self, node: &Node, ctx: &EvaluationContext) -> Result<NodeOutput, EvaluationError> {
        let shape = reflection_read_shape(&node.node_type)
            .ok_or_else(|| EvaluationError::UnsupportedNode(node.node_type.clone()))?;

        let type_id: ComponentTypeId = match input_value(node, ctx, pins::ID)? {
            PortValue::ComponentType(id) => *id,
            _ => return Err(EvaluationError::TypeMismatch(pins::ID.to_string())),
        };
        let entity: EntityId = match input_value(node, ctx, pins::ENTITY_ID)? {
            PortValue::Entity(entity) => *entity,
            _ => return Err(EvaluationError::TypeMismatch(pins::ENTITY_ID.to_string())),
        };
        let index = match input_value(node, ctx, pins::INDEX)? {
            PortValue::Int(index) => u32::try_from(*index)
                .map_err(|_| EvaluationError::TypeMismatch(pins::INDEX.to_string()))?,
            _ => return Err(EvaluationError::TypeMismatch(pins::INDEX.to_string())),
        };
        let out = node
            .output_named(pins::OUT)
            .ok_or_else(|| EvaluationError::MissingPort(pins::OUT.to_string()))?;

        let mut output = NodeOutput::new();
        match self.reader.read(shape, type_id, entity, index) {
            Ok(value) => output.set(out.id, value.into()),
            // The output stays empty; downstream nodes fall back to defaults
            Err(e) => tracing::warn!("{} on {} failed: {}", node.node_type, entity, e),
        }
        Ok(output)
    }
}

/// Follow exec links from `entry`, evaluating every node reached.
///
/// Returns the evaluated nodes in execution order. Execution stops at the
/// first node without an outgoing `Then` link.
pub fn run_exec_chain<E: NodeEvaluator + ?Sized>(
    ctx: &mut EvaluationContext,
    entry: PortRef,
    evaluator: &E,
) -> Result<Vec<NodeId>, EvaluationError> {
    let graph = ctx.graph;
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut current = entry;

    while let Some(connection) = graph.connections_from(current).next() {
        let node_id = connection.to.node;
        if !visited.insert(node_id) {
            return Err(EvaluationError::CycleDetected);
        }
        let node = graph.node(node_id).ok_or(EvaluationError::NodeNotFound(node_id))?;

        let output = evaluator.evaluate(node, ctx)?;
        ctx.set_output(node_id, output);
        order.push(node_id);

        let Some(then) = node.output_named(pins::THEN) else {
            break;
        };
        current = PortRef::new(node_id, then.id);
    }

    Ok(order)
}

/// Error during evaluation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    /// Exec links loop back on themselves
    #[error("Exec chain contains a cycle")]
    CycleDetected,

    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// No evaluator for this node type
    #[error("Unsupported node type: {0}")]
    UnsupportedNode(String),

    /// Node lacks an expected pin
    #[error("Missing pin: {0}")]
    MissingPort(String),

    /// Missing required input
    #[error("Missing required input: {0:?}")]
    MissingInput(PortId),

    /// Input holds a value of the wrong type
    #[error("Type mismatch on pin {0}")]
    TypeMismatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphs::gameplay::create_gameplay_registry;
    use ordoplay_reflect::{FieldValue, MemoryStore};
    use uuid::Uuid;

    const UNIT: ComponentTypeId = ComponentTypeId(Uuid::from_u128(0x71));

    fn read_node(node_type: &str, index: i64, entity: EntityId) -> Node {
        let mut node = create_gameplay_registry().create_node(node_type).unwrap();
        for port in node.inputs.iter_mut() {
            port.default_value = match port.name.as_str() {
                pins::ID => Some(PortValue::ComponentType(UNIT)),
                pins::ENTITY_ID => Some(PortValue::Entity(entity)),
                pins::INDEX => Some(PortValue::Int(index)),
                _ => None,
            };
        }
        node
    }

    #[test]
    fn test_reflection_evaluator_reads_defaults() {
        let mut store = MemoryStore::new();
        store.set_field(EntityId(3), UNIT, 1, FieldValue::Bool(true));

        let node = read_node("get_reflection_bool", 1, EntityId(3));
        let mut graph = Graph::default();
        graph.add_node(node.clone());
        let ctx = EvaluationContext::new(&graph);

        let output = ReflectionEvaluator::new(&store).evaluate(&node, &ctx).unwrap();
        let out = node.output_named(pins::OUT).unwrap();
        assert_eq!(output.get(&out.id), Some(&PortValue::Bool(true)));
    }

    #[test]
    fn test_failed_read_leaves_output_empty() {
        let store = MemoryStore::new();
        let node = read_node("get_reflection_float", 0, EntityId(3));
        let mut graph = Graph::default();
        graph.add_node(node.clone());
        let ctx = EvaluationContext::new(&graph);

        let output = ReflectionEvaluator::new(&store).evaluate(&node, &ctx).unwrap();
        assert!(output.values.is_empty());
    }

    #[test]
    fn test_unsupported_node() {
        let store = MemoryStore::new();
        let node = create_gameplay_registry().create_node("event_begin_play").unwrap();
        let graph = Graph::default();
        let ctx = EvaluationContext::new(&graph);
        let err = ReflectionEvaluator::new(&store).evaluate(&node, &ctx).unwrap_err();
        assert_eq!(err, EvaluationError::UnsupportedNode("event_begin_play".to_string()));
    }

    #[test]
    fn test_negative_index_is_rejected() {
        let store = MemoryStore::new();
        let node = read_node("get_reflection_float", -1, EntityId(3));
        let mut graph = Graph::default();
        graph.add_node(node.clone());
        let ctx = EvaluationContext::new(&graph);
        let err = ReflectionEvaluator::new(&store).evaluate(&node, &ctx).unwrap_err();
        assert_eq!(err, EvaluationError::TypeMismatch(pins::INDEX.to_string()));
    }

    #[test]
    fn test_exec_chain_detects_cycles() {
        let registry = create_gameplay_registry();
        let mut graph = Graph::default();
        let begin = registry.create_node("event_begin_play").unwrap();
        let a = read_node("get_reflection_float", 0, EntityId(1));
        let b = read_node("get_reflection_float", 1, EntityId(1));
        for node in [&begin, &a, &b] {
            graph.add_node(node.clone());
        }
        let exec = |n: &Node| PortRef::new(n.id, n.input_named(pins::EXECUTE).unwrap().id);
        let then = |n: &Node| PortRef::new(n.id, n.output_named(pins::THEN).unwrap().id);
        graph.connect(then(&begin), exec(&a)).unwrap();
        graph.connect(then(&a), exec(&b)).unwrap();
        graph.connect(then(&b), exec(&a)).unwrap();

        let store = MemoryStore::new();
        let mut ctx = EvaluationContext::new(&graph);
        let err = run_exec_chain(&mut ctx, then(&begin), &ReflectionEvaluator::new(&store)).unwrap_err();
        assert_eq!(err, EvaluationError::CycleDetected);
    }
}
