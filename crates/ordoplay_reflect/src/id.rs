// SPDX-License-Identifier: MIT OR Apache-2.0
//! Opaque identifiers shared between the catalog, plans and hosts.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a component schema, supplied by the reflection provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentTypeId(pub Uuid);

impl ComponentTypeId {
    /// The nil id, used by hosts before a component has been picked
    pub const NIL: Self = Self(Uuid::nil());

    /// Whether this is the nil id
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Entity handle owned by the host ECS. Never interpreted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Destination of one field value produced by an access plan.
///
/// Slot ids are name-based UUIDs namespaced by the component type, so the same
/// schema always yields the same slots and two component types never share one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(pub Uuid);

impl SlotId {
    /// Derive the slot for a field name of the given component type
    pub fn for_field(type_id: ComponentTypeId, name: &str) -> Self {
        Self(Uuid::new_v5(&type_id.0, name.as_bytes()))
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
