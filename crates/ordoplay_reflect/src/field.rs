// SPDX-License-Identifier: MIT OR Apache-2.0
//! Field types, value shapes and field values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared type of a reflected component field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    /// Boolean
    Bool,
    /// 32-bit float
    Float,
    /// 3D vector
    Vector3,
    /// Rotation quaternion
    Quaternion,
    /// Nested struct. Enumerated but not readable.
    Composite,
}

impl FieldType {
    /// Output shape for values of this type, `None` for composite fields
    pub fn shape(self) -> Option<ValueShape> {
        match self {
            Self::Bool => Some(ValueShape::Bool),
            Self::Float => Some(ValueShape::Float),
            Self::Vector3 => Some(ValueShape::Vector3),
            Self::Quaternion => Some(ValueShape::Quaternion),
            Self::Composite => None,
        }
    }
}

/// Shape of a value produced by a typed read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueShape {
    /// Boolean scalar
    Bool,
    /// Single-precision scalar
    Float,
    /// Three float components
    Vector3,
    /// Four float components (x, y, z, w)
    Quaternion,
}

impl ValueShape {
    /// All readable shapes
    pub const ALL: [ValueShape; 4] = [Self::Bool, Self::Float, Self::Vector3, Self::Quaternion];

    /// The field type this shape is read from
    pub fn field_type(self) -> FieldType {
        match self {
            Self::Bool => FieldType::Bool,
            Self::Float => FieldType::Float,
            Self::Vector3 => FieldType::Vector3,
            Self::Quaternion => FieldType::Quaternion,
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Vector3 => "vector3",
            Self::Quaternion => "quaternion",
        };
        f.write_str(name)
    }
}

/// A field as described by a reflection catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Position of the field within its component
    pub index: u32,
    /// Field name
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
}

/// Value read from a component field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Boolean
    Bool(bool),
    /// Float
    Float(f32),
    /// 3D vector
    Vector3([f32; 3]),
    /// Quaternion as `[x, y, z, w]`
    Quaternion([f32; 4]),
}

impl FieldValue {
    /// Get the shape of this value
    pub fn shape(&self) -> ValueShape {
        match self {
            Self::Bool(_) => ValueShape::Bool,
            Self::Float(_) => ValueShape::Float,
            Self::Vector3(_) => ValueShape::Vector3,
            Self::Quaternion(_) => ValueShape::Quaternion,
        }
    }

    /// Boolean payload, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// Float payload, if this is a float
    pub fn as_float(&self) -> Option<f32> {
        match *self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Vector payload, if this is a 3D vector
    pub fn as_vector3(&self) -> Option<[f32; 3]> {
        match *self {
            Self::Vector3(v) => Some(v),
            _ => None,
        }
    }

    /// Quaternion payload, if this is a quaternion
    pub fn as_quaternion(&self) -> Option<[f32; 4]> {
        match *self {
            Self::Quaternion(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mapping() {
        assert_eq!(FieldType::Bool.shape(), Some(ValueShape::Bool));
        assert_eq!(FieldType::Float.shape(), Some(ValueShape::Float));
        assert_eq!(FieldType::Vector3.shape(), Some(ValueShape::Vector3));
        assert_eq!(FieldType::Quaternion.shape(), Some(ValueShape::Quaternion));
        assert_eq!(FieldType::Composite.shape(), None);
    }

    #[test]
    fn test_shape_maps_back_to_field_type() {
        for shape in ValueShape::ALL {
            assert_eq!(shape.field_type().shape(), Some(shape));
        }
    }

    #[test]
    fn test_value_accessors() {
        let value = FieldValue::Vector3([1.0, 2.0, 3.0]);
        assert_eq!(value.shape(), ValueShape::Vector3);
        assert_eq!(value.as_vector3(), Some([1.0, 2.0, 3.0]));
        assert_eq!(value.as_float(), None);
        assert_eq!(FieldValue::Bool(true).as_bool(), Some(true));
    }
}
