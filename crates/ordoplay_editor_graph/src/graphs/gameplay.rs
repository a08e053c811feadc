// SPDX-License-Identifier: MIT OR Apache-2.0
//! Gameplay graph for visual scripting (Blueprint-like).
//!
//! Supports execution flow and data flow, plus reflection access to
//! components living in the runtime ECS.

use crate::node::{NodeCategory, NodeRegistry, NodeType};
use crate::port::{Port, PortType};
use ordoplay_reflect::ValueShape;

/// Node type of the Get Component node
pub const GET_COMPONENT: &str = "get_component";

/// Pin names shared by gameplay nodes
pub mod pins {
    /// Exec input
    pub const EXECUTE: &str = "Execute";
    /// Exec output
    pub const THEN: &str = "Then";
    /// Entity input of component access nodes
    pub const ENTITY_ID: &str = "EntityId";
    /// Component type input of reflection reads
    pub const ID: &str = "Id";
    /// Field index input of reflection reads
    pub const INDEX: &str = "Index";
    /// Value output of reflection reads
    pub const OUT: &str = "Out";
    /// Entity output of event nodes
    pub const SELF: &str = "Self";
}

/// Node type performing the typed reflection read for a value shape
pub fn reflection_read_node(shape: ValueShape) -> &'static str {
    match shape {
        ValueShape::Bool => "get_reflection_bool",
        ValueShape::Float => "get_reflection_float",
        ValueShape::Vector3 => "get_reflection_vector3",
        ValueShape::Quaternion => "get_reflection_quat",
    }
}

/// Value shape read by a reflection read node type
pub fn reflection_read_shape(node_type: &str) -> Option<ValueShape> {
    ValueShape::ALL
        .into_iter()
        .find(|shape| reflection_read_node(*shape) == node_type)
}

fn reflection_read_type(shape: ValueShape) -> NodeType {
    let label = match shape {
        ValueShape::Bool => "Bool",
        ValueShape::Float => "Float",
        ValueShape::Vector3 => "Vector3",
        ValueShape::Quaternion => "Quat",
    };

    NodeType {
        id: reflection_read_node(shape).to_string(),
        name: format!("Get Reflection {label}"),
        category: NodeCategory::Reflection,
        description: format!("Read a {shape} field of a component by index"),
        inputs: vec![
            Port::input(pins::EXECUTE, PortType::Exec),
            Port::input(pins::ID, PortType::ComponentType),
            Port::input(pins::ENTITY_ID, PortType::Entity),
            Port::input(pins::INDEX, PortType::Int),
        ],
        outputs: vec![
            Port::output(pins::THEN, PortType::Exec),
            Port::output(pins::OUT, PortType::for_shape(shape)),
        ],
    }
}

/// Create the gameplay graph node registry
pub fn create_gameplay_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // Event nodes
    registry.register(NodeType {
        id: "event_begin_play".to_string(),
        name: "Event Begin Play".to_string(),
        category: NodeCategory::Event,
        description: "Triggered when gameplay starts".to_string(),
        inputs: vec![],
        outputs: vec![
            Port::output(pins::THEN, PortType::Exec),
            Port::output(pins::SELF, PortType::Entity),
        ],
    });

    // Component access
    registry.register(NodeType {
        id: GET_COMPONENT.to_string(),
        name: "Get Component".to_string(),
        category: NodeCategory::Reflection,
        description: "Read every field of an entity's component".to_string(),
        inputs: vec![
            Port::input(pins::EXECUTE, PortType::Exec),
            Port::input(pins::ENTITY_ID, PortType::Entity),
        ],
        outputs: vec![Port::output(pins::THEN, PortType::Exec)],
    });

    for shape in ValueShape::ALL {
        registry.register(reflection_read_type(shape));
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_node_names_round_trip() {
        for shape in ValueShape::ALL {
            assert_eq!(reflection_read_shape(reflection_read_node(shape)), Some(shape));
        }
        assert_eq!(reflection_read_shape(GET_COMPONENT), None);
    }

    #[test]
    fn test_registry_has_reflection_nodes() {
        let registry = create_gameplay_registry();
        assert!(registry.get(GET_COMPONENT).is_some());

        let quat = registry.get("get_reflection_quat").unwrap();
        assert_eq!(quat.name, "Get Reflection Quat");
        let out = quat.outputs.iter().find(|p| p.name == pins::OUT).unwrap();
        assert_eq!(out.port_type, PortType::Quaternion);

        assert_eq!(registry.types_in_category(NodeCategory::Reflection).count(), 5);
    }
}
