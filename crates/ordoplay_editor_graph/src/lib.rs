// SPDX-License-Identifier: MIT OR Apache-2.0
//! Gameplay node graph for `OrdoPlay` Editor.
//!
//! This crate provides the visual scripting graph and its component access
//! nodes:
//! - Typed input/output ports with exec flow
//! - Connection validation and link surgery used during compilation
//! - The Get Component node, driven by a runtime reflection catalog
//! - Exec chain evaluation against a live component reader
//!
//! ## Compiling a Get Component node
//!
//! Picking a component rebuilds the node's pins from an
//! [`AccessPlan`](ordoplay_reflect::AccessPlan). Expanding the node replaces
//! it with one reflection read call per field, chained through exec pins.

pub mod node;
pub mod port;
pub mod connection;
pub mod graph;
pub mod evaluation;
pub mod get_component;
pub mod graphs;

pub use connection::{Connection, ConnectionId, PortRef};
pub use evaluation::{run_exec_chain, EvaluationContext, EvaluationError, NodeEvaluator, ReflectionEvaluator};
pub use get_component::{ExpansionError, GetComponentNode};
pub use graph::{ConnectionError, Graph};
pub use node::{Node, NodeId, NodeRegistry, NodeType};
pub use port::{Port, PortDirection, PortId, PortType, PortValue};
