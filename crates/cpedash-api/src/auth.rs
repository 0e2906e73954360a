use chrono::{DateTime, Utc};

/// Process-wide "the device no longer accepts our session" signal.
///
/// Raised by [`CgiClient`](crate::CgiClient) whenever any call receives a
/// not-authenticated reply (HTTP 401 or a `NO_AUTH` body), regardless of
/// which command triggered it. Subscribers force their logged-out state;
/// the event carries no secret material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthLost {
    /// The `cmd` number of the call that was rejected.
    pub cmd: u16,
    /// When the rejection was observed.
    pub at: DateTime<Utc>,
}

impl AuthLost {
    pub(crate) fn now(cmd: u16) -> Self {
        Self {
            cmd,
            at: Utc::now(),
        }
    }
}
