//! Notification payloads.

use serde::{Deserialize, Serialize};

use crate::jsonrpc::RequestId;

/// Payload of `notifications/cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelledNotification {
    /// ID of the request the client gave up on.
    pub request_id: RequestId,
    /// Reason given by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
