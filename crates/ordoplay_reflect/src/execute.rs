// SPDX-License-Identifier: MIT OR Apache-2.0
//! Plan execution.
//!
//! Executing a plan is a fold over its steps: each step is triggered by the
//! signal produced by the previous one, and the last signal is the single
//! exit of the chain. [`ReadChain`] abstracts what a step does with its
//! trigger, so the same fold drives runtime reads ([`ReaderChain`]) and
//! compile-time expansion into graph nodes.

use crate::field::FieldValue;
use crate::id::{ComponentTypeId, EntityId, SlotId};
use crate::plan::{AccessPlan, AccessStep};
use crate::read::{ComponentReader, ReadError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

/// Target of one plan execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    /// Component type to read from
    pub type_id: ComponentTypeId,
    /// Entity to read from
    pub entity: EntityId,
}

impl ExecutionContext {
    /// Create a context
    pub fn new(type_id: ComponentTypeId, entity: EntityId) -> Self {
        Self { type_id, entity }
    }

    /// Create a context reading the plan's component from `entity`
    pub fn for_plan(plan: &AccessPlan, entity: EntityId) -> Self {
        Self::new(plan.type_id(), entity)
    }
}

/// Sequencing token passed along a runtime read chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExecSignal(pub u64);

impl ExecSignal {
    /// Signal fired once the read triggered by `self` has completed
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// One link type of a sequential read chain
pub trait ReadChain {
    /// Signal that triggers a read and is produced when it completes
    type Signal;
    /// Error aborting the chain
    type Error;

    /// Perform (or emit) the read for `step` once `trigger` fires and
    /// return the read's completion signal
    fn read(&mut self, trigger: Self::Signal, step: &AccessStep) -> Result<Self::Signal, Self::Error>;
}

/// Thread `entry` through every step of `plan` in order and return the exit signal.
///
/// An empty plan returns `entry` unchanged.
pub fn run_chain<C: ReadChain>(
    plan: &AccessPlan,
    entry: C::Signal,
    chain: &mut C,
) -> Result<C::Signal, C::Error> {
    plan.steps()
        .iter()
        .try_fold(entry, |trigger, step| chain.read(trigger, step))
}

/// Values produced by an execution, keyed by slot in step order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotValues {
    values: IndexMap<SlotId, Result<FieldValue, ReadError>>,
}

impl SlotValues {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit a read result
    pub fn set(&mut self, slot: SlotId, value: Result<FieldValue, ReadError>) {
        self.values.insert(slot, value);
    }

    /// Successfully read value of a slot
    pub fn get(&self, slot: SlotId) -> Option<&FieldValue> {
        self.values.get(&slot)?.as_ref().ok()
    }

    /// Read error deposited in a slot
    pub fn error(&self, slot: SlotId) -> Option<&ReadError> {
        self.values.get(&slot)?.as_ref().err()
    }

    /// Raw result of a slot
    pub fn result(&self, slot: SlotId) -> Option<&Result<FieldValue, ReadError>> {
        self.values.get(&slot)
    }

    /// All slots with their results
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Result<FieldValue, ReadError>)> {
        self.values.iter().map(|(slot, value)| (*slot, value))
    }

    /// Slots whose read failed
    pub fn failures(&self) -> impl Iterator<Item = (SlotId, &ReadError)> {
        self.values
            .iter()
            .filter_map(|(slot, value)| value.as_ref().err().map(|e| (*slot, e)))
    }

    /// Number of filled slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no slot was filled
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Runtime chain performing typed reads through a [`ComponentReader`]
pub struct ReaderChain<'r, R: ?Sized> {
    reader: &'r R,
    context: ExecutionContext,
    values: SlotValues,
}

impl<'r, R: ComponentReader + ?Sized> ReaderChain<'r, R> {
    /// Create a chain reading `context` through `reader`
    pub fn new(reader: &'r R, context: ExecutionContext) -> Self {
        Self {
            reader,
            context,
            values: SlotValues::new(),
        }
    }

    /// Consume the chain and return the deposited values
    pub fn into_values(self) -> SlotValues {
        self.values
    }
}

impl<'r, R: ComponentReader + ?Sized> ReadChain for ReaderChain<'r, R> {
    type Signal = ExecSignal;
    type Error = Infallible;

    fn read(&mut self, trigger: ExecSignal, step: &AccessStep) -> Result<ExecSignal, Infallible> {
        let context = &self.context;
        tracing::trace!(
            "Reading {} field {} ({}) of {}",
            step.shape,
            step.field_index,
            step.field_name,
            context.entity
        );
        let result = self
            .reader
            .read(step.shape, context.type_id, context.entity, step.field_index);
        if let Err(e) = &result {
            tracing::warn!("Read of field {} ({}) failed: {}", step.field_index, step.field_name, e);
        }
        self.values.set(step.slot, result);
        Ok(trigger.next())
    }
}

/// Outcome of executing a plan
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Signal fired after the last read
    pub exit: ExecSignal,
    /// Values read, by slot
    pub values: SlotValues,
}

/// Execute `plan` against `context`, reading through `reader`.
///
/// Read failures are deposited in their slot and do not stop the chain.
pub fn execute<R: ComponentReader + ?Sized>(
    plan: &AccessPlan,
    context: &ExecutionContext,
    entry: ExecSignal,
    reader: &R,
) -> Execution {
    if context.type_id != plan.type_id() {
        tracing::warn!(
            "Executing plan for component {} against component {}",
            plan.type_id(),
            context.type_id
        );
    }

    let mut chain = ReaderChain::new(reader, *context);
    let exit = match run_chain(plan, entry, &mut chain) {
        Ok(exit) => exit,
        Err(never) => match never {},
    };
    Execution {
        exit,
        values: chain.into_values(),
    }
}
