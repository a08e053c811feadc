// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::{Connection, ConnectionId, PortRef};
use crate::node::{Node, NodeId};
use crate::port::{Port, PortDirection};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes in the graph
    nodes: IndexMap<NodeId, Node>,
    /// Connections between nodes
    connections: IndexMap<ConnectionId, Connection>,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: IndexMap::new(),
            connections: IndexMap::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and its connections
    pub fn remove_node(&mut self, node_id: NodeId) -> Option<Node> {
        self.connections.retain(|_, c| !c.involves_node(node_id));
        self.nodes.shift_remove(&node_id)
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Resolve a port reference
    pub fn port(&self, port: PortRef) -> Option<&Port> {
        self.nodes.get(&port.node)?.port(&port.port)
    }

    /// Add a connection from an output port to an input port
    pub fn connect(&mut self, from: PortRef, to: PortRef) -> Result<ConnectionId, ConnectionError> {
        let source_port = self.resolve(from)?;
        let target_port = self.resolve(to)?;

        if source_port.direction != PortDirection::Output || !source_port.can_connect(target_port) {
            return Err(ConnectionError::IncompatiblePorts);
        }
        if !target_port.multi_connect && self.connections_to(to).next().is_some() {
            return Err(ConnectionError::PortAlreadyConnected(to));
        }
        if !source_port.multi_connect && self.connections_from(from).next().is_some() {
            return Err(ConnectionError::PortAlreadyConnected(from));
        }
        if from.node == to.node {
            return Err(ConnectionError::SelfLoop);
        }

        let connection = Connection::new(from, to);
        let id = connection.id;
        self.connections.insert(id, connection);
        Ok(id)
    }

    fn resolve(&self, port: PortRef) -> Result<&Port, ConnectionError> {
        let node = self
            .nodes
            .get(&port.node)
            .ok_or(ConnectionError::NodeNotFound(port.node))?;
        node.port(&port.port).ok_or(ConnectionError::PortNotFound(port))
    }

    /// Remove a connection
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        self.connections.shift_remove(&connection_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections leaving an output port
    pub fn connections_from(&self, port: PortRef) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.from == port)
    }

    /// Get connections arriving at an input port
    pub fn connections_to(&self, port: PortRef) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.to == port)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node_id: NodeId) -> impl Iterator<Item = &Connection> {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Remove every connection touching a port and return them
    pub fn break_port_links(&mut self, port: PortRef) -> Vec<Connection> {
        let ids: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.involves_port(port))
            .map(|c| c.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.connections.shift_remove(&id))
            .collect()
    }

    /// Move every connection of `old` onto `new`. Returns the number moved.
    ///
    /// Port types are not revalidated; this is used to hand links over to
    /// intermediate nodes during expansion.
    pub fn relink_port(&mut self, old: PortRef, new: PortRef) -> usize {
        let mut moved = 0;
        for connection in self.connections.values_mut() {
            if connection.involves_port(old) {
                connection.reattach(old, new);
                moved += 1;
            }
        }
        moved
    }

    /// Duplicate every connection of `old` onto `new`, keeping the originals.
    pub fn copy_port_links(&mut self, old: PortRef, new: PortRef) -> usize {
        let copies: Vec<Connection> = self
            .connections
            .values()
            .filter(|c| c.involves_port(old))
            .map(|c| {
                let mut copy = Connection::new(c.from, c.to);
                copy.reattach(old, new);
                copy
            })
            .collect();

        let count = copies.len();
        for copy in copies {
            self.connections.insert(copy.id, copy);
        }
        count
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Error when creating a connection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Port not found
    #[error("Port not found: {0:?}")]
    PortNotFound(PortRef),

    /// Incompatible port types
    #[error("Incompatible port types")]
    IncompatiblePorts,

    /// Port is already connected
    #[error("Port already connected: {0:?}")]
    PortAlreadyConnected(PortRef),

    /// Self-loop not allowed
    #[error("Self-loop not allowed")]
    SelfLoop,
}
