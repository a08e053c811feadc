// SPDX-License-Identifier: MIT OR Apache-2.0
//! Access plans: the ordered list of typed reads for one component type.
//!
//! A plan is built once per component selection by walking the catalog in
//! ascending field order. Fields that cannot be read (composite fields, or
//! fields the catalog cannot fully describe) are reported, never fatal.

use crate::catalog::ReflectionCatalog;
use crate::field::{FieldType, ValueShape};
use crate::id::{ComponentTypeId, SlotId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One typed read in an access plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessStep {
    /// Field index within the component
    pub field_index: u32,
    /// Field name as reported by the catalog
    pub field_name: String,
    /// Declared field type
    pub field_type: FieldType,
    /// Shape of the value the read produces
    pub shape: ValueShape,
    /// Slot receiving the value
    pub slot: SlotId,
}

/// Ordered typed reads for one component type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPlan {
    type_id: ComponentTypeId,
    steps: Vec<AccessStep>,
}

impl AccessPlan {
    /// A plan with no steps
    pub fn empty(type_id: ComponentTypeId) -> Self {
        Self {
            type_id,
            steps: Vec::new(),
        }
    }

    /// Component type this plan reads from
    pub fn type_id(&self) -> ComponentTypeId {
        self.type_id
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[AccessStep] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Slots in step order
    pub fn slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.steps.iter().map(|s| s.slot)
    }

    /// Find the step writing to a slot
    pub fn step_for_slot(&self, slot: SlotId) -> Option<&AccessStep> {
        self.steps.iter().find(|s| s.slot == slot)
    }

    /// Find the step for a field name
    pub fn step_named(&self, name: &str) -> Option<&AccessStep> {
        self.steps.iter().find(|s| s.field_name == name)
    }
}

/// Why a field was left out of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Catalog had no name for the field
    NameUnavailable,
    /// Catalog had no type for the field
    TypeUnavailable,
}

/// A field left out of a plan because the catalog could not describe it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedField {
    /// Field index
    pub index: u32,
    /// Reason it was skipped
    pub reason: SkipReason,
}

/// Fields that did not make it into a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    /// Composite fields, in ascending index order
    pub unsupported: Vec<u32>,
    /// Fields the catalog could not describe
    pub skipped: Vec<SkippedField>,
}

impl PlanReport {
    /// Whether every field made it into the plan
    pub fn is_clean(&self) -> bool {
        self.unsupported.is_empty() && self.skipped.is_empty()
    }
}

/// Build the access plan for a component type.
///
/// Unknown types produce an empty plan and an empty report.
pub fn build_plan<C>(catalog: &C, type_id: ComponentTypeId) -> (AccessPlan, PlanReport)
where
    C: ReflectionCatalog + ?Sized,
{
    let count = catalog.field_count(type_id);
    let mut steps = Vec::new();
    let mut report = PlanReport::default();
    let mut used_slots = HashSet::new();

    for index in 0..count {
        let Some(name) = catalog.field_name(type_id, index) else {
            tracing::warn!("Component {} field {}: name unavailable, skipping", type_id, index);
            report.skipped.push(SkippedField {
                index,
                reason: SkipReason::NameUnavailable,
            });
            continue;
        };
        let name = String::from_utf8_lossy(name).into_owned();

        let Some(field_type) = catalog.field_type(type_id, index) else {
            tracing::warn!("Component {} field {} ({}): type unavailable, skipping", type_id, index, name);
            report.skipped.push(SkippedField {
                index,
                reason: SkipReason::TypeUnavailable,
            });
            continue;
        };

        let Some(shape) = field_type.shape() else {
            tracing::debug!("Component {} field {} ({}): composite fields are not supported", type_id, index, name);
            report.unsupported.push(index);
            continue;
        };

        let slot = allocate_slot(&mut used_slots, type_id, &name, index);

        tracing::debug!("Component {} field {} ({}): {} read", type_id, index, name, shape);
        steps.push(AccessStep {
            field_index: index,
            field_name: name,
            field_type,
            shape,
            slot,
        });
    }

    (AccessPlan { type_id, steps }, report)
}

/// Slot for a field name, unique among `used`.
///
/// A name already taken falls back to `name#index`, then `name#index#1`,
/// `name#index#2`, ... until a free slot is found.
fn allocate_slot(used: &mut HashSet<SlotId>, type_id: ComponentTypeId, name: &str, index: u32) -> SlotId {
    let slot = SlotId::for_field(type_id, name);
    if used.insert(slot) {
        return slot;
    }

    let base = format!("{name}#{index}");
    let mut candidate = SlotId::for_field(type_id, &base);
    let mut attempt = 0u32;
    while !used.insert(candidate) {
        attempt += 1;
        candidate = SlotId::for_field(type_id, &format!("{base}#{attempt}"));
    }
    candidate
}
