// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reflection-driven component field access for `OrdoPlay`.
//!
//! Components living in the host ECS are described at runtime by a
//! [`ReflectionCatalog`] keyed by [`ComponentTypeId`]. From that description
//! this crate builds an [`AccessPlan`]: one typed read per readable field, in
//! field order, each writing to a stable [`SlotId`]. Plans are executed as a
//! strictly sequential chain against a single entity.
//!
//! ## Flow
//!
//! catalog → [`build_plan`] → [`execute`] (or any other [`ReadChain`])

pub mod id;
pub mod field;
pub mod catalog;
pub mod read;
pub mod plan;
pub mod execute;

pub use catalog::{CatalogError, ComponentSchema, FieldSchema, ReflectionCatalog, SchemaCatalog};
pub use execute::{execute, run_chain, ExecSignal, Execution, ExecutionContext, ReadChain, ReaderChain, SlotValues};
pub use field::{FieldDescriptor, FieldType, FieldValue, ValueShape};
pub use id::{ComponentTypeId, EntityId, SlotId};
pub use plan::{build_plan, AccessPlan, AccessStep, PlanReport, SkipReason, SkippedField};
pub use read::{ComponentReader, MemoryStore, ReadError};
