//! Usage reporting for key system queries.

use log::debug;

/// A media type query against a key system that has a UMA name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupportQuery<'a> {
    pub key_system: &'a str,
    pub uma_name: &'a str,
    /// `true` when the key system is served by an external CDM.
    pub is_external: bool,
    /// `true` when the query named a container.
    pub with_type: bool,
    pub supported: bool,
}

/// Collects [`SupportQuery`] events.
pub trait UmaReporter: Send + Sync {
    fn report(&self, query: &SupportQuery<'_>);
}

/// Forwards every event to the `log` facade.
pub struct LogReporter;

impl UmaReporter for LogReporter {
    fn report(&self, query: &SupportQuery<'_>) {
        debug!(
            "Media.EME.{}.KeySystemSupport {} (external: {}, with type: {})",
            query.uma_name,
            if query.supported {
                "supported"
            } else {
                "queried"
            },
            query.is_external,
            query.with_type
        );
    }
}
