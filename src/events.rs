//! Progress reporting for long-running actions.
//! Every action emits `Started`, any number of `Progress`, then exactly one terminal
//! `Succeeded` or `Failed` event.

use std::fmt;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Started,
    Progress,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Started => "started",
            Phase::Progress => "progress",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub detail: String,
}

impl ProgressEvent {
    pub fn new(phase: Phase, detail: impl Into<String>) -> Self {
        Self { phase, detail: detail.into() }
    }
}

/// Receiver of progress events.
pub trait ProgressSink {
    fn emit(&mut self, event: ProgressEvent);

    fn started(&mut self, detail: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(ProgressEvent::new(Phase::Started, detail));
    }

    fn progress(&mut self, detail: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(ProgressEvent::new(Phase::Progress, detail));
    }

    fn succeeded(&mut self, detail: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(ProgressEvent::new(Phase::Succeeded, detail));
    }

    fn failed(&mut self, detail: impl Into<String>)
    where
        Self: Sized,
    {
        self.emit(ProgressEvent::new(Phase::Failed, detail));
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct Recorder {
    pub events: Vec<ProgressEvent>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.events.iter().map(|e| e.phase).collect()
    }

    pub fn last(&self) -> Option<&ProgressEvent> {
        self.events.last()
    }
}

impl ProgressSink for Recorder {
    fn emit(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&mut self, event: ProgressEvent) {
        match event.phase {
            Phase::Failed => error!(phase = %event.phase, "{}", event.detail),
            _ => info!(phase = %event.phase, "{}", event.detail),
        }
    }
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&mut self, _event: ProgressEvent) {}
}
