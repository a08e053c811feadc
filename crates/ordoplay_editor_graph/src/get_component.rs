// SPDX-License-Identifier: MIT OR Apache-2.0
//! The Get Component node.
//!
//! Once a component type is picked, the node grows one output pin per
//! readable field of that component, as described by the reflection catalog.
//! At compile time the node expands into a chain of reflection read calls,
//! one per field, executed in field order.

use crate::connection::{Connection, PortRef};
use crate::graph::{ConnectionError, Graph};
use crate::graphs::gameplay::{pins, reflection_read_node, GET_COMPONENT};
use crate::node::{Node, NodeId, NodeRegistry};
use crate::port::{Port, PortDirection, PortId, PortType, PortValue};
use ordoplay_reflect::{
    build_plan, run_chain, AccessPlan, AccessStep, ComponentTypeId, PlanReport, ReadChain, ReflectionCatalog,
};
use std::collections::HashSet;
use uuid::Uuid;

/// Horizontal spacing between expanded read calls
const CALL_SPACING: f32 = 220.0;

/// Editor-side state of a Get Component node placed in a graph
#[derive(Debug, Clone)]
pub struct GetComponentNode {
    node_id: NodeId,
    execute: PortId,
    then: PortId,
    entity: PortId,
    selected: Option<ComponentTypeId>,
    plan: AccessPlan,
    report: PlanReport,
}

impl GetComponentNode {
    /// Place a new node with its default pins and no component selected
    pub fn spawn(graph: &mut Graph, registry: &NodeRegistry) -> Result<Self, ExpansionError> {
        let node = registry
            .create_node(GET_COMPONENT)
            .ok_or_else(|| ExpansionError::UnknownNodeType(GET_COMPONENT.to_string()))?;

        let execute = pin(&node, PortDirection::Input, pins::EXECUTE)?.port;
        let entity = pin(&node, PortDirection::Input, pins::ENTITY_ID)?.port;
        let then = pin(&node, PortDirection::Output, pins::THEN)?.port;
        let node_id = graph.add_node(node);

        Ok(Self {
            node_id,
            execute,
            then,
            entity,
            selected: None,
            plan: AccessPlan::empty(ComponentTypeId::NIL),
            report: PlanReport::default(),
        })
    }

    /// Node in the graph
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Exec input pin
    pub fn execute_pin(&self) -> PortRef {
        PortRef::new(self.node_id, self.execute)
    }

    /// Exec output pin
    pub fn then_pin(&self) -> PortRef {
        PortRef::new(self.node_id, self.then)
    }

    /// Entity input pin
    pub fn entity_pin(&self) -> PortRef {
        PortRef::new(self.node_id, self.entity)
    }

    /// Output pin carrying a field, by field name
    pub fn field_pin(&self, name: &str) -> Option<PortRef> {
        let step = self.plan.step_named(name)?;
        Some(PortRef::new(self.node_id, step.slot.into()))
    }

    /// Currently selected component type
    pub fn selected(&self) -> Option<ComponentTypeId> {
        self.selected
    }

    /// Access plan for the selected component
    pub fn plan(&self) -> &AccessPlan {
        &self.plan
    }

    /// Fields of the selected component that have no pin
    pub fn report(&self) -> &PlanReport {
        &self.report
    }

    /// Pick a component type.
    ///
    /// Breaks every link on the node's output pins, then rebuilds the pins
    /// for the new component. Returns the links that were broken.
    pub fn select_component<C>(
        &mut self,
        graph: &mut Graph,
        catalog: &C,
        type_id: ComponentTypeId,
    ) -> Result<Vec<Connection>, ExpansionError>
    where
        C: ReflectionCatalog + ?Sized,
    {
        let node = graph
            .node(self.node_id)
            .ok_or(ExpansionError::NodeNotFound(self.node_id))?;
        let outputs: Vec<PortRef> = node
            .outputs
            .iter()
            .map(|p| PortRef::new(self.node_id, p.id))
            .collect();

        let mut broken = Vec::new();
        for port in outputs {
            broken.extend(graph.break_port_links(port));
        }

        self.selected = Some(type_id);
        self.reconstruct(graph, catalog)?;
        tracing::debug!(
            "Selected component {} on node {:?}: {} field pins, {} links broken",
            type_id,
            self.node_id,
            self.plan.len(),
            broken.len()
        );
        Ok(broken)
    }

    /// Rebuild the plan and field pins from the catalog.
    ///
    /// Pins whose slot is unchanged keep their links.
    pub fn reconstruct<C>(&mut self, graph: &mut Graph, catalog: &C) -> Result<(), ExpansionError>
    where
        C: ReflectionCatalog + ?Sized,
    {
        let type_id = self.selected.unwrap_or(ComponentTypeId::NIL);
        let (plan, report) = build_plan(catalog, type_id);
        let title = match self.selected.and_then(|id| catalog.component_name(id)) {
            Some(name) => format!("Get {name}"),
            None => "Get Component".to_string(),
        };

        let node = graph
            .node_mut(self.node_id)
            .ok_or(ExpansionError::NodeNotFound(self.node_id))?;
        node.name = title;
        node.inputs.retain(|p| p.id == self.execute || p.id == self.entity);
        node.outputs.retain(|p| p.id == self.then);
        for step in plan.steps() {
            node.inputs.push(
                Port::input(step.field_index.to_string(), PortType::Int)
                    .with_id(index_pin_id(step))
                    .with_default(PortValue::Int(i64::from(step.field_index)))
                    .hidden(),
            );
            node.outputs.push(
                Port::output(step.field_name.clone(), PortType::for_shape(step.shape)).with_id(step.slot.into()),
            );
        }

        let live: HashSet<PortId> = node.ports().map(|p| p.id).collect();
        let stale: Vec<PortRef> = graph
            .connections_for_node(self.node_id)
            .flat_map(|c| [c.from, c.to])
            .filter(|p| p.node == self.node_id && !live.contains(&p.port))
            .collect();
        for port in stale {
            graph.break_port_links(port);
        }

        if !report.unsupported.is_empty() {
            tracing::debug!("Component {} has {} composite fields without pins", type_id, report.unsupported.len());
        }
        self.plan = plan;
        self.report = report;
        Ok(())
    }

    /// Expand the node into a chain of reflection read calls.
    ///
    /// Meant for the compile-time copy of a graph: the node is removed and
    /// its links are handed to the spawned calls. Returns the spawned call
    /// nodes in execution order. On error the graph is left untouched.
    pub fn expand(self, graph: &mut Graph, registry: &NodeRegistry) -> Result<Vec<NodeId>, ExpansionError> {
        let source = graph
            .node(self.node_id)
            .cloned()
            .ok_or(ExpansionError::NodeNotFound(self.node_id))?;
        let entry = self.execute_pin();
        let then = self.then_pin();

        // Wire into a scratch copy and only publish it once every step succeeded
        let mut scratch = graph.clone();
        let mut chain = GraphChain {
            graph: &mut scratch,
            registry,
            source: &source,
            type_id: self.plan.type_id(),
            entity: self.entity_pin(),
            spawned: Vec::new(),
        };
        let exit = run_chain(&self.plan, ExecPin::Entry(entry), &mut chain)?;
        let spawned = chain.spawned;

        match exit {
            ExecPin::Then(last) => {
                scratch.relink_port(then, last);
                scratch.remove_node(self.node_id);
            }
            ExecPin::Entry(entry) => {
                // Nothing to read: join whatever fed the node to whatever followed it
                let sources: Vec<PortRef> = scratch.connections_to(entry).map(|c| c.from).collect();
                let targets: Vec<PortRef> = scratch.connections_from(then).map(|c| c.to).collect();
                scratch.remove_node(self.node_id);
                for from in &sources {
                    for to in &targets {
                        scratch.connect(*from, *to)?;
                    }
                }
            }
        }

        *graph = scratch;
        tracing::debug!("Expanded node {:?} into {} reflection reads", self.node_id, spawned.len());
        Ok(spawned)
    }
}

/// Hidden index pin of a step, stable across rebuilds
fn index_pin_id(step: &AccessStep) -> PortId {
    PortId(Uuid::new_v5(&step.slot.0, pins::INDEX.as_bytes()))
}

fn pin(node: &Node, direction: PortDirection, name: &str) -> Result<PortRef, ExpansionError> {
    let port = match direction {
        PortDirection::Input => node.input_named(name),
        PortDirection::Output => node.output_named(name),
    };
    port.map(|p| PortRef::new(node.id, p.id))
        .ok_or_else(|| ExpansionError::PortNotFound {
            node_type: node.node_type.clone(),
            pin: name.to_string(),
        })
}

fn set_default(node: &mut Node, port: PortRef, value: Option<PortValue>) {
    if let Some(p) = node.port_mut(&port.port) {
        p.default_value = value;
    }
}

/// Exec pin that fires the next read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecPin {
    /// Exec input of the node being expanded
    Entry(PortRef),
    /// Then pin of the previous read call
    Then(PortRef),
}

/// Emits read call nodes into a graph
struct GraphChain<'a> {
    graph: &'a mut Graph,
    registry: &'a NodeRegistry,
    source: &'a Node,
    type_id: ComponentTypeId,
    entity: PortRef,
    spawned: Vec<NodeId>,
}

impl ReadChain for GraphChain<'_> {
    type Signal = ExecPin;
    type Error = ExpansionError;

    fn read(&mut self, trigger: ExecPin, step: &AccessStep) -> Result<ExecPin, ExpansionError> {
        let node_type = reflection_read_node(step.shape);
        let mut call = self
            .registry
            .create_node(node_type)
            .ok_or_else(|| ExpansionError::UnknownNodeType(node_type.to_string()))?;
        let offset = CALL_SPACING * (self.spawned.len() + 1) as f32;
        call.position = [self.source.position[0] + offset, self.source.position[1]];

        let call_execute = pin(&call, PortDirection::Input, pins::EXECUTE)?;
        let call_id = pin(&call, PortDirection::Input, pins::ID)?;
        let call_entity = pin(&call, PortDirection::Input, pins::ENTITY_ID)?;
        let call_index = pin(&call, PortDirection::Input, pins::INDEX)?;
        let call_then = pin(&call, PortDirection::Output, pins::THEN)?;
        let call_out = pin(&call, PortDirection::Output, pins::OUT)?;

        let index_pin = PortRef::new(self.source.id, index_pin_id(step));
        let index = self
            .source
            .port(&index_pin.port)
            .and_then(|p| p.default_value.clone())
            .unwrap_or(PortValue::Int(i64::from(step.field_index)));
        let entity_default = self
            .source
            .port(&self.entity.port)
            .and_then(|p| p.default_value.clone());

        set_default(&mut call, call_id, Some(PortValue::ComponentType(self.type_id)));
        set_default(&mut call, call_index, Some(index));
        set_default(&mut call, call_entity, entity_default);
        let call_node = self.graph.add_node(call);

        match trigger {
            ExecPin::Entry(entry) => {
                self.graph.relink_port(entry, call_execute);
            }
            ExecPin::Then(previous) => {
                self.graph.connect(previous, call_execute)?;
            }
        }
        self.graph.copy_port_links(self.entity, call_entity);
        self.graph.relink_port(index_pin, call_index);
        self.graph
            .relink_port(PortRef::new(self.source.id, step.slot.into()), call_out);

        tracing::trace!(
            "Field {} ({}) read by {} node {:?}",
            step.field_index,
            step.field_name,
            node_type,
            call_node
        );
        self.spawned.push(call_node);
        Ok(ExecPin::Then(call_then))
    }
}

/// Error expanding or rebuilding a Get Component node
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpansionError {
    /// Node is not in the graph
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Node type is missing from the registry
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Node type lacks an expected pin
    #[error("Node type {node_type} has no pin {pin}")]
    PortNotFound {
        /// Node type searched
        node_type: String,
        /// Missing pin name
        pin: String,
    },

    /// Wiring the expansion failed
    #[error(transparent)]
    Connection(#[from] ConnectionError),
}
