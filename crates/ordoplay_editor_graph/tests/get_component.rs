// SPDX-License-Identifier: MIT OR Apache-2.0
//! Select, compile and run a Get Component node end to end.

use ordoplay_editor_graph::evaluation::NodeOutput;
use ordoplay_editor_graph::graphs::gameplay::reflection_read_shape;
use ordoplay_editor_graph::graphs::gameplay::{create_gameplay_registry, pins};
use ordoplay_editor_graph::{
    run_exec_chain, EvaluationContext, EvaluationError, GetComponentNode, Graph, Node, NodeEvaluator, NodeType,
    Port, PortRef, PortType, PortValue, ReflectionEvaluator,
};
use ordoplay_editor_graph::node::NodeCategory;
use ordoplay_reflect::{
    execute, ComponentSchema, ComponentTypeId, EntityId, ExecSignal, ExecutionContext, FieldType, FieldValue,
    MemoryStore, SchemaCatalog, SlotId,
};
use uuid::Uuid;

const T1: ComponentTypeId = ComponentTypeId(Uuid::from_u128(0x71));
const T2: ComponentTypeId = ComponentTypeId(Uuid::from_u128(0x72));
const E7: EntityId = EntityId(7);

fn catalog() -> SchemaCatalog {
    SchemaCatalog::new().with_component(
        ComponentSchema::new(T1, "Unit")
            .with_field("hp", FieldType::Float)
            .with_field("tag", FieldType::Composite)
            .with_field("pos", FieldType::Vector3),
    )
}

fn store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert_component(
        E7,
        T1,
        [(0, FieldValue::Float(42.0)), (2, FieldValue::Vector3([1.0, 2.0, 3.0]))],
    );
    store
}

fn sink() -> Node {
    Node::new(&NodeType {
        id: "sink".to_string(),
        name: "Sink".to_string(),
        category: NodeCategory::Utility,
        description: String::new(),
        inputs: vec![
            Port::input(pins::EXECUTE, PortType::Exec),
            Port::input("Health", PortType::Float),
            Port::input("Position", PortType::Vector3),
        ],
        outputs: vec![],
    })
}

/// Runs reflection reads and treats every other node as a no-op
struct ScriptEvaluator<'r> {
    reflection: ReflectionEvaluator<'r, MemoryStore>,
}

impl NodeEvaluator for ScriptEvaluator<'_> {
    fn evaluate(&self, node: &Node, ctx: &EvaluationContext) -> Result<NodeOutput, EvaluationError> {
        if reflection_read_shape(&node.node_type).is_some() {
            self.reflection.evaluate(node, ctx)
        } else {
            Ok(NodeOutput::new())
        }
    }
}

fn port(node: &Node, name: &str) -> PortRef {
    let port = node
        .input_named(name)
        .or_else(|| node.output_named(name))
        .unwrap();
    PortRef::new(node.id, port.id)
}

#[test]
fn test_compiled_graph_reads_same_values_as_executor() {
    let catalog = catalog();
    let registry = create_gameplay_registry();
    let mut graph = Graph::new("Unit Logic");

    let begin = registry.create_node("event_begin_play").unwrap();
    let sink = sink();
    graph.add_node(begin.clone());
    graph.add_node(sink.clone());

    let mut get = GetComponentNode::spawn(&mut graph, &registry).unwrap();
    get.select_component(&mut graph, &catalog, T1).unwrap();
    assert_eq!(get.report().unsupported, vec![1]);

    graph.connect(port(&begin, pins::THEN), get.execute_pin()).unwrap();
    graph.connect(port(&begin, pins::SELF), get.entity_pin()).unwrap();
    graph.connect(get.then_pin(), port(&sink, pins::EXECUTE)).unwrap();
    graph.connect(get.field_pin("hp").unwrap(), port(&sink, "Health")).unwrap();
    graph.connect(get.field_pin("pos").unwrap(), port(&sink, "Position")).unwrap();

    // Direct execution of the node's plan
    let store = store();
    let direct = execute(get.plan(), &ExecutionContext::new(T1, E7), ExecSignal(0), &store);
    assert_eq!(direct.exit, ExecSignal(2));
    assert_eq!(direct.values.get(SlotId::for_field(T1, "hp")), Some(&FieldValue::Float(42.0)));
    assert_eq!(
        direct.values.get(SlotId::for_field(T1, "pos")),
        Some(&FieldValue::Vector3([1.0, 2.0, 3.0]))
    );

    // Compile a copy and run it
    let mut compiled = graph.clone();
    let calls = get.expand(&mut compiled, &registry).unwrap();
    assert_eq!(calls.len(), 2);

    let mut ctx = EvaluationContext::new(&compiled);
    let mut self_entity = NodeOutput::new();
    self_entity.set(port(&begin, pins::SELF).port, PortValue::Entity(E7));
    ctx.set_output(begin.id, self_entity);

    let evaluator = ScriptEvaluator {
        reflection: ReflectionEvaluator::new(&store),
    };
    let order = run_exec_chain(&mut ctx, port(&begin, pins::THEN), &evaluator).unwrap();
    // Both reads in field order, then the sink, which has no Then pin
    assert_eq!(order, [calls[0], calls[1], sink.id]);
    assert_eq!(ctx.get_input(port(&sink, "Health")), Some(&PortValue::Float(42.0)));
    assert_eq!(ctx.get_input(port(&sink, "Position")), Some(&PortValue::Vector3([1.0, 2.0, 3.0])));
}

#[test]
fn test_unknown_component_compiles_to_passthrough() {
    let catalog = catalog();
    let registry = create_gameplay_registry();
    let mut graph = Graph::default();

    let begin = registry.create_node("event_begin_play").unwrap();
    let sink = sink();
    graph.add_node(begin.clone());
    graph.add_node(sink.clone());

    let mut get = GetComponentNode::spawn(&mut graph, &registry).unwrap();
    get.select_component(&mut graph, &catalog, T2).unwrap();
    assert!(get.plan().is_empty());
    assert!(get.report().unsupported.is_empty());

    graph.connect(port(&begin, pins::THEN), get.execute_pin()).unwrap();
    graph.connect(get.then_pin(), port(&sink, pins::EXECUTE)).unwrap();

    let direct = execute(get.plan(), &ExecutionContext::new(T2, E7), ExecSignal(9), &store());
    assert_eq!(direct.exit, ExecSignal(9));
    assert!(direct.values.is_empty());

    get.expand(&mut graph, &registry).unwrap();
    let link = graph.connections_to(port(&sink, pins::EXECUTE)).next().unwrap();
    assert_eq!(link.from, port(&begin, pins::THEN));
}
