// Progress events streamed from the git worker to the host.

use serde::{Deserialize, Serialize};

use crate::step::GitStep;

/// Severity of a progress event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Structured metadata attached to a progress event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EventMeta {
    /// The sync step this event belongs to, when known.
    pub step: Option<GitStep>,
    /// Raw subprocess output or other free-form detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One event in a worker's progress stream.
///
/// `message` holds the raw step identifier for step events; the host runs
/// it through the translator before logging or display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressEvent {
    pub message: String,
    pub level: LogLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<EventMeta>,
}

impl ProgressEvent {
    /// An informational event for a sync step.
    pub fn step(step: GitStep) -> Self {
        Self::step_with_level(step, LogLevel::Info)
    }

    pub fn step_with_level(step: GitStep, level: LogLevel) -> Self {
        Self {
            message: step.as_str().to_string(),
            level,
            meta: Some(EventMeta { step: Some(step), detail: None }),
        }
    }

    /// A step event carrying extra detail (e.g. subprocess stderr).
    pub fn step_with_detail(step: GitStep, level: LogLevel, detail: impl Into<String>) -> Self {
        Self {
            message: step.as_str().to_string(),
            level,
            meta: Some(EventMeta { step: Some(step), detail: Some(detail.into()) }),
        }
    }

    /// A free-form informational event with no step attached.
    pub fn info(message: impl Into<String>) -> Self {
        Self { message: message.into(), level: LogLevel::Info, meta: None }
    }

    /// The step attached to this event, if any.
    pub fn step_id(&self) -> Option<GitStep> {
        self.meta.as_ref().and_then(|meta| meta.step)
    }
}
