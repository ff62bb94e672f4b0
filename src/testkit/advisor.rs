//! Advisors and LLM clients with canned answers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{ActivePosition, Decision, PoolAnalysis, Strategy};
use crate::error::{Error, Result};
use crate::port::outbound::advisor::Advisor;
use crate::port::outbound::llm::Llm;

/// Advisor that replays a script of answers, then errors.
#[derive(Debug, Default)]
pub struct ScriptedAdvisor {
    script: Mutex<VecDeque<std::result::Result<Decision, String>>>,
    calls: AtomicUsize,
}

impl ScriptedAdvisor {
    /// Advisor that answers with `decisions` in order.
    pub fn new(decisions: Vec<Decision>) -> Self {
        Self {
            script: Mutex::new(decisions.into_iter().map(Ok).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Advisor whose every call fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Queue a failure.
    pub fn push_error(&self, reason: &str) {
        self.script.lock().push_back(Err(reason.to_string()));
    }

    /// Queue a decision.
    pub fn push(&self, decision: Decision) {
        self.script.lock().push_back(Ok(decision));
    }

    /// Number of times `analyze` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Advisor for ScriptedAdvisor {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn analyze(
        &self,
        _analysis: &PoolAnalysis,
        _strategy: Strategy,
        _positions: &[ActivePosition],
    ) -> Result<Decision> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().pop_front() {
            Some(Ok(decision)) => Ok(decision),
            Some(Err(reason)) => Err(Error::Connection(reason)),
            None => Err(Error::Connection("script exhausted".to_string())),
        }
    }
}

/// LLM client that returns fixed completions and records prompts.
#[derive(Debug, Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    /// Client that answers with `replies` in order.
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Llm for ScriptedLlm {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        self.replies
            .lock()
            .pop_front()
            .ok_or_else(|| Error::Connection("no scripted reply".to_string()))
    }
}
