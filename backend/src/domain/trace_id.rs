//! Correlation identifier carried through a request.
//!
//! The identifier lives in Tokio task-local storage, so it is visible to any
//! code awaited inside [`TraceId::scope`] and to nothing spawned outside it.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use tokio::task_local;
use uuid::Uuid;

/// Response header echoing the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "trace-id";

task_local! {
    static CURRENT: TraceId;
}

/// Per-request trace identifier.
///
/// # Examples
/// ```
/// use postcards::TraceId;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let id: TraceId = "00000000-0000-0000-0000-000000000000".parse().unwrap();
/// let seen = TraceId::scope(id, async { TraceId::current() }).await;
/// assert_eq!(seen, Some(id));
/// # });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Identifier in scope for the current task, if any.
    #[must_use]
    pub fn current() -> Option<Self> {
        CURRENT.try_with(|id| *id).ok()
    }

    /// Run `fut` with `trace_id` in scope.
    pub async fn scope<Fut: Future>(trace_id: Self, fut: Fut) -> Fut::Output {
        CURRENT.scope(trace_id, fut).await
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scope_exposes_identifier() {
        let id = TraceId::generate();
        assert_eq!(TraceId::scope(id, async { TraceId::current() }).await, Some(id));
    }

    #[tokio::test]
    async fn nothing_in_scope_outside_a_request() {
        assert!(TraceId::current().is_none());
    }

    #[test]
    fn parses_hyphenated_uuid() {
        let id: TraceId = "00000000-0000-0000-0000-000000000000"
            .parse()
            .expect("valid uuid");
        assert_eq!(id, TraceId::from_uuid(Uuid::nil()));
    }
}
