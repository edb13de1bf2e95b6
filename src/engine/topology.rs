//! The six stationary nodes a packet crosses on its way to the server.

use serde::Serialize;

/// 2D coordinate in diagram space. Only the graph view and the in-transit
/// marker use it; the box view lays nodes out by index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linear interpolation towards `to`. `t` is clamped to `[0, 1]`.
    pub fn lerp(self, to: Position, t: f64) -> Position {
        let t = t.clamp(0.0, 1.0);
        Position {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub position: Position,
}

pub const NODE_COUNT: usize = 6;

/// Client first, server last. Step node indices point into this table.
pub static NODES: [Node; NODE_COUNT] = [
    Node {
        id: "pc",
        icon: "💻",
        label: "Your PC",
        position: Position::new(0.0, 0.0),
    },
    Node {
        id: "firewall1",
        icon: "🛡️",
        label: "Local Firewall",
        position: Position::new(2.0, 0.0),
    },
    Node {
        id: "router",
        icon: "📡",
        label: "Router/ISP",
        position: Position::new(4.0, 0.0),
    },
    Node {
        id: "internet",
        icon: "☁️",
        label: "Internet",
        position: Position::new(6.0, 1.0),
    },
    Node {
        id: "firewall2",
        icon: "🛡️",
        label: "Server Firewall",
        position: Position::new(8.0, 0.0),
    },
    Node {
        id: "server",
        icon: "🖥️",
        label: "Server",
        position: Position::new(10.0, 0.0),
    },
];

/// Position of node `index`, clamped to the last node.
pub fn node_position(index: usize) -> Position {
    NODES[index.min(NODE_COUNT - 1)].position
}

/// Where the packet sits at fraction `t` of the hop `from -> to`.
/// A hop onto the same node always yields that node's position.
pub fn interpolated_position(from: usize, to: usize, t: f64) -> Position {
    let dest = node_position(to);
    if from == to {
        return dest;
    }
    node_position(from).lerp(dest, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_node_ids_unique() {
        let ids: HashSet<_> = NODES.iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), NODE_COUNT);
    }

    #[test]
    fn test_path_starts_at_client_and_ends_at_server() {
        assert_eq!(NODES[0].id, "pc");
        assert_eq!(NODES[NODE_COUNT - 1].id, "server");
    }

    #[test]
    fn test_interpolation_endpoints() {
        assert_eq!(interpolated_position(0, 1, 0.0), NODES[0].position);
        assert_eq!(interpolated_position(0, 1, 1.0), NODES[1].position);
    }

    #[test]
    fn test_interpolation_midpoint() {
        let mid = interpolated_position(2, 3, 0.5);
        assert!((mid.x - 5.0).abs() < 1e-9);
        assert!((mid.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_same_node_returns_destination() {
        assert_eq!(interpolated_position(5, 5, 0.3), NODES[5].position);
    }

    #[test]
    fn test_t_is_clamped() {
        assert_eq!(interpolated_position(0, 1, -2.0), NODES[0].position);
        assert_eq!(interpolated_position(0, 1, 7.0), NODES[1].position);
    }

    #[test]
    fn test_out_of_range_index_clamps_to_server() {
        assert_eq!(node_position(42), NODES[NODE_COUNT - 1].position);
    }
}
