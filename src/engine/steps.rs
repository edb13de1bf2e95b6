//! The fixed narrative: nine steps mapped onto the six nodes.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// Index into [`super::topology::NODES`].
    pub node_index: usize,
    pub title: &'static str,
    pub description: &'static str,
    pub is_security_relevant: bool,
}

pub const STEP_COUNT: usize = 9;

/// Index of the "TLS Encryption" step. From here on the packet travels
/// encrypted, so the marker switches glyph. This is a property of the table
/// below, not something derived from `is_security_relevant`.
pub const TLS_ENCRYPTION_STEP: usize = 2;

/// Node indices are non-decreasing but repeat; hop counting depends on it.
pub static STEPS: [Step; STEP_COUNT] = [
    Step {
        node_index: 0,
        title: "🔵 Initialization",
        description: "The browser builds an HTTP/HTTPS request",
        is_security_relevant: false,
    },
    Step {
        node_index: 0,
        title: "🔍 DNS Resolution",
        description: "The domain name is converted to an IP address (e.g. google.com → 142.250.185.46)",
        is_security_relevant: false,
    },
    Step {
        node_index: 0,
        title: "🔒 TLS Encryption",
        description: "The packet is encrypted with SSL/TLS to protect your data",
        is_security_relevant: true,
    },
    Step {
        node_index: 1,
        title: "🛡️ Outbound Firewall",
        description: "Checks that the connection is allowed to leave your network",
        is_security_relevant: true,
    },
    Step {
        node_index: 2,
        title: "📡 Routing",
        description: "The router forwards the packet to the Internet through your ISP",
        is_security_relevant: false,
    },
    Step {
        node_index: 3,
        title: "☁️ Internet Transit",
        description: "The packet crosses several intermediate routers (10-15 hops on average)",
        is_security_relevant: false,
    },
    Step {
        node_index: 4,
        title: "🛡️ Inbound Firewall",
        description: "The server checks the packet's legitimacy and blocks threats",
        is_security_relevant: true,
    },
    Step {
        node_index: 5,
        title: "📥 Reception",
        description: "The server decrypts and processes the request",
        is_security_relevant: false,
    },
    Step {
        node_index: 5,
        title: "✅ Response",
        description: "The server sends back the requested data (web page, API, etc.)",
        is_security_relevant: false,
    },
];

/// Number of security-relevant steps in `STEPS[..=index]`.
pub fn security_checks_through(index: usize) -> u32 {
    STEPS
        .iter()
        .take(index.saturating_add(1))
        .filter(|s| s.is_security_relevant)
        .count() as u32
}
