// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed field reads against live entities.

use crate::field::{FieldValue, ValueShape};
use crate::id::{ComponentTypeId, EntityId};
use std::collections::HashMap;

/// Typed read interface implemented by the host ECS.
///
/// One operation per readable shape. A failing read returns a [`ReadError`];
/// callers deposit it and carry on.
pub trait ComponentReader {
    /// Read a boolean field
    fn read_bool(&self, type_id: ComponentTypeId, entity: EntityId, index: u32) -> Result<bool, ReadError>;

    /// Read a float field
    fn read_float(&self, type_id: ComponentTypeId, entity: EntityId, index: u32) -> Result<f32, ReadError>;

    /// Read a 3D vector field
    fn read_vector3(&self, type_id: ComponentTypeId, entity: EntityId, index: u32) -> Result<[f32; 3], ReadError>;

    /// Read a quaternion field as `[x, y, z, w]`
    fn read_quaternion(&self, type_id: ComponentTypeId, entity: EntityId, index: u32) -> Result<[f32; 4], ReadError>;

    /// Dispatch to the typed read matching `shape`
    fn read(
        &self,
        shape: ValueShape,
        type_id: ComponentTypeId,
        entity: EntityId,
        index: u32,
    ) -> Result<FieldValue, ReadError> {
        match shape {
            ValueShape::Bool => self.read_bool(type_id, entity, index).map(FieldValue::Bool),
            ValueShape::Float => self.read_float(type_id, entity, index).map(FieldValue::Float),
            ValueShape::Vector3 => self.read_vector3(type_id, entity, index).map(FieldValue::Vector3),
            ValueShape::Quaternion => self
                .read_quaternion(type_id, entity, index)
                .map(FieldValue::Quaternion),
        }
    }
}

/// Error returned by a typed read
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReadError {
    /// Entity does not exist
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Entity has no component of this type
    #[error("{entity} has no component {type_id}")]
    ComponentNotFound {
        /// Entity that was read
        entity: EntityId,
        /// Requested component type
        type_id: ComponentTypeId,
    },

    /// Field index does not exist on the component
    #[error("Field {index} not found on component {type_id}")]
    FieldNotFound {
        /// Requested component type
        type_id: ComponentTypeId,
        /// Requested field index
        index: u32,
    },

    /// Field holds a value of another shape
    #[error("Field {index} holds a {found} value, expected {expected}")]
    ShapeMismatch {
        /// Requested field index
        index: u32,
        /// Shape the caller asked for
        expected: ValueShape,
        /// Shape actually stored
        found: ValueShape,
    },

    /// Host specific failure
    #[error("{0}")]
    Host(String),
}

/// Component data of a single entity, keyed by field index
type ComponentFields = HashMap<u32, FieldValue>;

/// Simple in-memory component storage implementing [`ComponentReader`]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entities: HashMap<EntityId, HashMap<ComponentTypeId, ComponentFields>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an entity with no components. Returns `false` if it already existed.
    pub fn spawn(&mut self, entity: EntityId) -> bool {
        if self.entities.contains_key(&entity) {
            return false;
        }
        self.entities.insert(entity, HashMap::new());
        true
    }

    /// Despawn an entity and all its components
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        self.entities.remove(&entity).is_some()
    }

    /// Attach a component, replacing any existing one of the same type
    pub fn insert_component(
        &mut self,
        entity: EntityId,
        type_id: ComponentTypeId,
        fields: impl IntoIterator<Item = (u32, FieldValue)>,
    ) {
        self.entities
            .entry(entity)
            .or_default()
            .insert(type_id, fields.into_iter().collect());
    }

    /// Set a single field, attaching the component if needed
    pub fn set_field(&mut self, entity: EntityId, type_id: ComponentTypeId, index: u32, value: FieldValue) {
        self.entities
            .entry(entity)
            .or_default()
            .entry(type_id)
            .or_default()
            .insert(index, value);
    }

    /// Get a stored field value
    pub fn field(&self, entity: EntityId, type_id: ComponentTypeId, index: u32) -> Option<&FieldValue> {
        self.entities.get(&entity)?.get(&type_id)?.get(&index)
    }

    /// Number of entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    fn lookup(
        &self,
        expected: ValueShape,
        type_id: ComponentTypeId,
        entity: EntityId,
        index: u32,
    ) -> Result<FieldValue, ReadError> {
        let components = self
            .entities
            .get(&entity)
            .ok_or(ReadError::EntityNotFound(entity))?;
        let fields = components
            .get(&type_id)
            .ok_or(ReadError::ComponentNotFound { entity, type_id })?;
        let value = *fields
            .get(&index)
            .ok_or(ReadError::FieldNotFound { type_id, index })?;

        if value.shape() != expected {
            return Err(ReadError::ShapeMismatch {
                index,
                expected,
                found: value.shape(),
            });
        }
        Ok(value)
    }
}

impl ComponentReader for MemoryStore {
    fn read_bool(&self, type_id: ComponentTypeId, entity: EntityId, index: u32) -> Result<bool, ReadError> {
        match self.lookup(ValueShape::Bool, type_id, entity, index)? {
            FieldValue::Bool(v) => Ok(v),
            other => Err(mismatch(index, ValueShape::Bool, other)),
        }
    }

    fn read_float(&self, type_id: ComponentTypeId, entity: EntityId, index: u32) -> Result<f32, ReadError> {
        match self.lookup(ValueShape::Float, type_id, entity, index)? {
            FieldValue::Float(v) => Ok(v),
            other => Err(mismatch(index, ValueShape::Float, other)),
        }
    }

    fn read_vector3(&self, type_id: ComponentTypeId, entity: EntityId, index: u32) -> Result<[f32; 3], ReadError> {
        match self.lookup(ValueShape::Vector3, type_id, entity, index)? {
            FieldValue::Vector3(v) => Ok(v),
            other => Err(mismatch(index, ValueShape::Vector3, other)),
        }
    }

    fn read_quaternion(&self, type_id: ComponentTypeId, entity: EntityId, index: u32) -> Result<[f32; 4], ReadError> {
        match self.lookup(ValueShape::Quaternion, type_id, entity, index)? {
            FieldValue::Quaternion(v) => Ok(v),
            other => Err(mismatch(index, ValueShape::Quaternion, other)),
        }
    }
}

fn mismatch(index: u32, expected: ValueShape, value: FieldValue) -> ReadError {
    ReadError::ShapeMismatch {
        index,
        expected,
        found: value.shape(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const HEALTH: ComponentTypeId = ComponentTypeId(Uuid::from_u128(0xbeef));
    const PLAYER: EntityId = EntityId(7);

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_component(
            PLAYER,
            HEALTH,
            [
                (0, FieldValue::Float(42.0)),
                (1, FieldValue::Bool(true)),
                (2, FieldValue::Vector3([1.0, 2.0, 3.0])),
            ],
        );
        store
    }

    #[test]
    fn test_typed_reads() {
        let store = store();
        assert_eq!(store.read_float(HEALTH, PLAYER, 0), Ok(42.0));
        assert_eq!(store.read_bool(HEALTH, PLAYER, 1), Ok(true));
        assert_eq!(store.read_vector3(HEALTH, PLAYER, 2), Ok([1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_dispatch_by_shape() {
        let store = store();
        assert_eq!(
            store.read(ValueShape::Vector3, HEALTH, PLAYER, 2),
            Ok(FieldValue::Vector3([1.0, 2.0, 3.0]))
        );
    }

    #[test]
    fn test_read_failures() {
        let store = store();
        assert_eq!(
            store.read_float(HEALTH, EntityId(8), 0),
            Err(ReadError::EntityNotFound(EntityId(8)))
        );

        let other = ComponentTypeId(Uuid::from_u128(1));
        assert_eq!(
            store.read_float(other, PLAYER, 0),
            Err(ReadError::ComponentNotFound { entity: PLAYER, type_id: other })
        );
        assert_eq!(
            store.read_float(HEALTH, PLAYER, 9),
            Err(ReadError::FieldNotFound { type_id: HEALTH, index: 9 })
        );
        assert_eq!(
            store.read_quaternion(HEALTH, PLAYER, 0),
            Err(ReadError::ShapeMismatch {
                index: 0,
                expected: ValueShape::Quaternion,
                found: ValueShape::Float,
            })
        );
    }

    #[test]
    fn test_spawn_and_despawn() {
        let mut store = MemoryStore::new();
        assert!(store.spawn(EntityId(1)));
        assert!(!store.spawn(EntityId(1)));
        store.set_field(EntityId(1), HEALTH, 0, FieldValue::Float(1.0));
        assert_eq!(store.field(EntityId(1), HEALTH, 0), Some(&FieldValue::Float(1.0)));
        assert!(store.despawn(EntityId(1)));
        assert_eq!(store.entity_count(), 0);
    }
}
