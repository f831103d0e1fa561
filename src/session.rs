// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trace sessions
//!
//! A [`TraceSession`] owns what device contexts share: the id generator, the host clock and
//! the sink selected in configuration. Contexts themselves are handed out by value and are
//! driven by whoever reads that device's markers.

use devtrace_config::{load_config, validate_config, ConfigError, DevtraceConfig, SinkKind};
use devtrace_context::{
    ClockSource, ContextError, ContextId, ContextIdGenerator, DeviceContext, MonotonicClock,
    NullSink, RecordingSink, TraceSink, TracingSink,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Errors raised while building a session or its contexts
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Device context error: {0}")]
    Context(#[from] ContextError),
}

pub type SessionResult<T> = Result<T, SessionError>;

pub struct TraceSession {
    config: DevtraceConfig,
    ids: Arc<ContextIdGenerator>,
    clock: Arc<dyn ClockSource>,
    sink: Arc<dyn TraceSink>,
    recording: Option<Arc<RecordingSink>>,
}

impl TraceSession {
    /// Validate `config` and build a session on the monotonic host clock
    pub fn from_config(config: DevtraceConfig) -> SessionResult<Self> {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Same as [`from_config`](Self::from_config) with a caller-supplied clock
    pub fn with_clock(config: DevtraceConfig, clock: Arc<dyn ClockSource>) -> SessionResult<Self> {
        validate_config(&config)?;

        let (sink, recording): (Arc<dyn TraceSink>, _) = match config.sink.kind {
            SinkKind::Tracing => (Arc::new(TracingSink), None),
            SinkKind::Null => (Arc::new(NullSink), None),
            SinkKind::Recording => {
                let recording = Arc::new(RecordingSink::new());
                (recording.clone(), Some(recording))
            }
        };

        info!(
            sink = %config.sink.kind,
            announce_names = config.context.announce_names,
            "Trace session ready"
        );

        Ok(Self {
            config,
            ids: Arc::new(ContextIdGenerator::new()),
            clock,
            sink,
            recording,
        })
    }

    /// Load configuration from file, environment and CLI overrides, then build the session
    pub fn load(
        config_path: Option<&Path>,
        cli_args: Option<&HashMap<String, String>>,
    ) -> SessionResult<Self> {
        let config = load_config(config_path, cli_args)?;
        Self::from_config(config)
    }

    /// New context sharing this session's sink and clock
    ///
    /// With `context.announce_names` set, the context is named `"<name_prefix> <id>"`.
    pub fn create_context(&self) -> SessionResult<DeviceContext> {
        let mut context =
            DeviceContext::create(&self.ids, Arc::clone(&self.sink), Arc::clone(&self.clock));
        if self.config.context.announce_names {
            context.set_name(format!("{} {}", self.config.context.name_prefix, context.id().0))?;
        }
        debug!(context = context.id().0, "Session created context");
        Ok(context)
    }

    pub fn config(&self) -> &DevtraceConfig {
        &self.config
    }

    pub fn sink(&self) -> Arc<dyn TraceSink> {
        Arc::clone(&self.sink)
    }

    /// The capture buffer when the sink kind is `recording`
    pub fn recording(&self) -> Option<&Arc<RecordingSink>> {
        self.recording.as_ref()
    }

    pub fn clock(&self) -> &Arc<dyn ClockSource> {
        &self.clock
    }

    /// Id the next context will receive
    pub fn next_context_id(&self) -> ContextId {
        self.ids.peek()
    }
}

impl std::fmt::Debug for TraceSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceSession")
            .field("config", &self.config)
            .field("next_context_id", &self.ids.peek())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devtrace_context::{ManualClock, SinkRecord};

    fn recording_config() -> DevtraceConfig {
        let mut config = DevtraceConfig::default();
        config.sink.kind = SinkKind::Recording;
        config
    }

    #[test]
    fn test_sink_kind_selects_sink() {
        let session = TraceSession::from_config(recording_config()).unwrap();
        assert!(session.recording().is_some());

        let session = TraceSession::from_config(DevtraceConfig::default()).unwrap();
        assert!(session.recording().is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = DevtraceConfig::default();
        config.system.log_level = "chatty".to_string();
        assert!(matches!(
            TraceSession::from_config(config),
            Err(SessionError::Config(ConfigError::ValidationError(_)))
        ));
    }

    #[test]
    fn test_contexts_are_announced_by_name() {
        let mut config = recording_config();
        config.context.name_prefix = "Chip".to_string();
        let session = TraceSession::from_config(config).unwrap();

        let first = session.create_context().unwrap();
        let second = session.create_context().unwrap();
        assert_eq!(first.name(), Some("Chip 0"));
        assert_eq!(second.name(), Some("Chip 1"));
        assert_eq!(session.next_context_id(), ContextId(2));

        let named: Vec<_> = session
            .recording()
            .unwrap()
            .records()
            .into_iter()
            .filter_map(|record| match record {
                SinkRecord::Named { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(named, vec!["Chip 0", "Chip 1"]);
    }

    #[test]
    fn test_unannounced_contexts_stay_anonymous() {
        let mut config = recording_config();
        config.context.announce_names = false;
        let session = TraceSession::from_config(config).unwrap();

        let context = session.create_context().unwrap();
        assert_eq!(context.name(), None);
        assert!(session.recording().unwrap().is_empty());
    }

    #[test]
    fn test_contexts_share_session_clock() {
        let clock = Arc::new(ManualClock::new(500));
        let session = TraceSession::with_clock(recording_config(), clock.clone()).unwrap();
        clock.set_now(900);
        assert_eq!(session.clock().now(), 900);
    }
}
