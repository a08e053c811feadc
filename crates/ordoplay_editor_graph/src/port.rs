// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use ordoplay_reflect::{ComponentTypeId, EntityId, FieldValue, SlotId, ValueShape};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortId(pub Uuid);

impl PortId {
    /// Create a new random port ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PortId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<SlotId> for PortId {
    fn from(slot: SlotId) -> Self {
        Self(slot.0)
    }
}

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

/// Data type that can flow through ports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortType {
    /// Execution flow
    Exec,
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// 3D vector
    Vector3,
    /// Rotation quaternion
    Quaternion,
    /// Entity reference
    Entity,
    /// Component type id
    ComponentType,
    /// String value
    String,
    /// Any type (for generic nodes)
    Any,
}

impl PortType {
    /// Port type carrying values of a read shape
    pub fn for_shape(shape: ValueShape) -> Self {
        match shape {
            ValueShape::Bool => Self::Bool,
            ValueShape::Float => Self::Float,
            ValueShape::Vector3 => Self::Vector3,
            ValueShape::Quaternion => Self::Quaternion,
        }
    }

    /// Check if this type can connect to another type
    pub fn can_connect_to(&self, other: &PortType) -> bool {
        // Exec only ever connects to exec
        if matches!(self, Self::Exec) != matches!(other, Self::Exec) {
            return false;
        }

        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }

        if self == other {
            return true;
        }

        matches!(
            (self, other),
            (Self::Int, Self::Float) | (Self::Float, Self::Int) | (Self::Float, Self::Vector3)
        )
    }
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Unique port ID
    pub id: PortId,
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// Data type
    pub port_type: PortType,
    /// Default value (for inputs)
    pub default_value: Option<PortValue>,
    /// Whether multiple connections are allowed
    pub multi_connect: bool,
    /// Hidden from the node widget
    pub hidden: bool,
}

impl Port {
    /// Create a new input port
    pub fn input(name: impl Into<String>, port_type: PortType) -> Self {
        // Exec inputs may be reached from several places
        let multi_connect = port_type == PortType::Exec;
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Input,
            port_type,
            default_value: None,
            multi_connect,
            hidden: false,
        }
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>, port_type: PortType) -> Self {
        // Exec outputs fire a single continuation
        let multi_connect = port_type != PortType::Exec;
        Self {
            id: PortId::new(),
            name: name.into(),
            direction: PortDirection::Output,
            port_type,
            default_value: None,
            multi_connect,
            hidden: false,
        }
    }

    /// Use a fixed ID instead of a random one
    pub fn with_id(mut self, id: PortId) -> Self {
        self.id = id;
        self
    }

    /// Set the default value
    pub fn with_default(mut self, value: PortValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Hide the port from the node widget
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Check if a connection to another port is valid
    pub fn can_connect(&self, other: &Port) -> bool {
        if self.direction == other.direction {
            return false;
        }
        self.port_type.can_connect_to(&other.port_type)
    }
}

/// Value that can be stored in a port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PortValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f32),
    /// 3D vector
    Vector3([f32; 3]),
    /// Quaternion
    Quaternion([f32; 4]),
    /// Entity
    Entity(EntityId),
    /// Component type id
    ComponentType(ComponentTypeId),
    /// String
    String(String),
}

impl PortValue {
    /// Get the port type for this value
    pub fn port_type(&self) -> PortType {
        match self {
            Self::Bool(_) => PortType::Bool,
            Self::Int(_) => PortType::Int,
            Self::Float(_) => PortType::Float,
            Self::Vector3(_) => PortType::Vector3,
            Self::Quaternion(_) => PortType::Quaternion,
            Self::Entity(_) => PortType::Entity,
            Self::ComponentType(_) => PortType::ComponentType,
            Self::String(_) => PortType::String,
        }
    }
}

impl From<FieldValue> for PortValue {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Bool(v) => Self::Bool(v),
            FieldValue::Float(v) => Self::Float(v),
            FieldValue::Vector3(v) => Self::Vector3(v),
            FieldValue::Quaternion(v) => Self::Quaternion(v),
        }
    }
}
