use plain_upstream_domain::DomainError;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a single network attempt inside an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    Begin {
        server: Arc<str>,

        protocol: &'static str,

        question: Arc<str>,

        query_id: u16,
    },

    Finish {
        server: Arc<str>,

        protocol: &'static str,

        question: Arc<str>,

        elapsed: Duration,

        /// `None` when the attempt produced a reply.
        error: Option<DomainError>,
    },
}

impl AttemptEvent {
    pub fn server(&self) -> &str {
        match self {
            Self::Begin { server, .. } | Self::Finish { server, .. } => server,
        }
    }

    pub fn protocol(&self) -> &'static str {
        match self {
            Self::Begin { protocol, .. } | Self::Finish { protocol, .. } => protocol,
        }
    }

    pub fn is_begin(&self) -> bool {
        matches!(self, Self::Begin { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Finish { error: None, .. })
    }
}
