//! Core type definitions for Flowscope

use serde::{Deserialize, Serialize};
use std::fmt;

/// Session ID (the identifier assigned by the routing engine, hex-encoded)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wallet address that initiated a session
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session timestamp (milliseconds since epoch)
pub type TimestampMs = u64;

/// Index field names used by the query builder
pub mod fields {
    /// Field holding the session identifier
    pub const SESSION_ID: &str = "sessionId";

    /// Field holding the initiating address
    pub const ADDRESS: &str = "address";

    /// Field holding the session timestamp (ms since epoch)
    pub const TIMESTAMP: &str = "timestamp";
}

/// One recorded swap/transaction session.
///
/// Sessions are produced by the remote index and are read-only once fetched.
/// Everything beyond the identifying fields is an opaque log payload kept
/// as raw JSON for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: SessionId,
    pub timestamp: TimestampMs,
    pub address: Address,
    /// Remaining log fields, preserved verbatim
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// One batch of sessions returned by a single query execution,
/// sorted by timestamp descending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub sessions: Vec<Session>,
    /// Hits the backend returned for this page, including documents that
    /// failed to parse. Pagination decisions must use this, not the parsed
    /// count: a skipped document is not a shorter backend page.
    pub hit_count: usize,
    /// Total matching documents reported by the backend
    pub total_hits: u64,
}

impl Page {
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Predicates narrowing a session query.
///
/// An empty filter matches all sessions; supplied fields combine
/// conjunctively. No validation is performed here: values are forwarded to
/// the backend as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionFilter {
    /// Exact session identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,

    /// Exact initiating address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// Lower time bound, forwarded verbatim (e.g. "now-7d" or an ISO date)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

impl SessionFilter {
    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.address.is_none() && self.since.is_none()
    }

    pub fn for_session(id: impl Into<String>) -> Self {
        Self {
            session_id: Some(SessionId::new(id)),
            ..Self::default()
        }
    }

    pub fn for_address(addr: impl Into<String>) -> Self {
        Self {
            address: Some(Address::new(addr)),
            ..Self::default()
        }
    }
}
