//! In-memory collaborators
//!
//! Record every request instead of talking to Telegram. Used for dry runs
//! and by the test suites.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use async_trait::async_trait;
use crate::models::{ExecuteRequest, FlowPrompt, Notice, PluginSelectionRequest, UserId};
use crate::utils::errors::{TradePilotError, Result};
use super::{Executor, Renderer};

/// Something the renderer was asked to show
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedEvent {
    Selection(PluginSelectionRequest),
    Prompt(FlowPrompt),
    Notice {
        user_id: UserId,
        message_id: Option<i32>,
        notice: Notice,
    },
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    events: Mutex<Vec<RenderedEvent>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RenderedEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn selections(&self) -> Vec<PluginSelectionRequest> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderedEvent::Selection(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn prompts(&self) -> Vec<FlowPrompt> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderedEvent::Prompt(prompt) => Some(prompt),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderedEvent::Notice { notice, .. } => Some(notice),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: RenderedEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn show_plugin_selection(&self, request: &PluginSelectionRequest) -> Result<()> {
        self.record(RenderedEvent::Selection(request.clone()));
        Ok(())
    }

    async fn show_flow_prompt(&self, prompt: &FlowPrompt) -> Result<()> {
        self.record(RenderedEvent::Prompt(prompt.clone()));
        Ok(())
    }

    async fn show_notice(&self, user_id: UserId, message_id: Option<i32>, notice: &Notice) -> Result<()> {
        self.record(RenderedEvent::Notice {
            user_id,
            message_id,
            notice: notice.clone(),
        });
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingExecutor {
    requests: Mutex<Vec<ExecuteRequest>>,
    fail: AtomicBool,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An executor that records the request and then reports failure
    pub fn failing() -> Self {
        let executor = Self::default();
        executor.fail.store(true, Ordering::SeqCst);
        executor
    }

    pub fn requests(&self) -> Vec<ExecuteRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn execute(&self, request: ExecuteRequest) -> Result<()> {
        let command = request.command_name.clone();
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);

        if self.fail.load(Ordering::SeqCst) {
            return Err(TradePilotError::Executor(format!("'{}' failed", command)));
        }
        Ok(())
    }
}
