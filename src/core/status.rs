//! Request status tracking per named resource

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Lifecycle of an asynchronous request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "value", content = "reason", rename_all = "lowercase")]
pub enum RequestStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A request is in flight
    Pending,
    /// The last request succeeded
    Success,
    /// The last request failed
    Error(String),
}

impl RequestStatus {
    /// Whether a request is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }

    /// Failure reason, if any
    pub fn error(&self) -> Option<&str> {
        match self {
            RequestStatus::Error(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Idle => f.write_str("idle"),
            RequestStatus::Pending => f.write_str("pending"),
            RequestStatus::Success => f.write_str("success"),
            RequestStatus::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// Status flags accepted by [`RequestStatusTracker::set_status`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    /// Back to idle
    Idle,
    /// Request issued
    Pending,
    /// Request completed
    Success,
}

impl From<StatusFlag> for RequestStatus {
    fn from(flag: StatusFlag) -> Self {
        match flag {
            StatusFlag::Idle => RequestStatus::Idle,
            StatusFlag::Pending => RequestStatus::Pending,
            StatusFlag::Success => RequestStatus::Success,
        }
    }
}

#[derive(Debug, Clone)]
struct StatusEntry {
    status: RequestStatus,
    since: DateTime<Utc>,
}

/// Independent status state machines keyed by resource name.
///
/// Unknown resources report [`RequestStatus::Idle`].
#[derive(Debug, Clone, Default)]
pub struct RequestStatusTracker {
    entries: HashMap<String, StatusEntry>,
}

impl RequestStatusTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a resource to idle, pending or success.
    ///
    /// Setting `Pending` on a resource that is already pending restarts its clock.
    pub fn set_status(&mut self, resource: &str, flag: StatusFlag) {
        self.put(resource, flag.into());
    }

    /// Move a resource to the error state
    pub fn set_error(&mut self, resource: &str, reason: impl Into<String>) {
        self.put(resource, RequestStatus::Error(reason.into()));
    }

    /// Current status of a resource
    pub fn status(&self, resource: &str) -> RequestStatus {
        self.entries
            .get(resource)
            .map(|entry| entry.status.clone())
            .unwrap_or_default()
    }

    /// When the resource entered its current status
    pub fn since(&self, resource: &str) -> Option<DateTime<Utc>> {
        self.entries.get(resource).map(|entry| entry.since)
    }

    /// Whether the resource has a request in flight
    pub fn is_loading(&self, resource: &str) -> bool {
        self.status(resource).is_loading()
    }

    /// Forget every resource
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn put(&mut self, resource: &str, status: RequestStatus) {
        self.entries.insert(
            resource.to_string(),
            StatusEntry {
                status,
                since: Utc::now(),
            },
        );
    }
}
