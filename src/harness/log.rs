//! Bounded, append-only action log.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Starts at 1 and never repeats, even across evictions and `clear`.
    pub seq: u64,
    pub timestamp: DateTime<Local>,
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug)]
struct Inner {
    entries: VecDeque<LogEntry>,
    next_seq: u64,
}

/// Holds at most `capacity` entries; the oldest is evicted first.
#[derive(Debug)]
pub struct ActionLog {
    name: &'static str,
    capacity: usize,
    inner: Mutex<Inner>,
}

impl ActionLog {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                entries: VecDeque::new(),
                next_seq: 1,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends an entry and returns its sequence number.
    pub fn append(&self, severity: Severity, text: impl Into<String>) -> u64 {
        let text = text.into();
        match severity {
            Severity::Info => tracing::info!(log = self.name, "{text}"),
            Severity::Warning => tracing::warn!(log = self.name, "{text}"),
            Severity::Error => tracing::error!(log = self.name, "{text}"),
        }

        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        if inner.entries.len() == self.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(LogEntry {
            seq,
            timestamp: Local::now(),
            severity,
            text,
        });
        seq
    }

    pub fn info(&self, text: impl Into<String>) -> u64 {
        self.append(Severity::Info, text)
    }

    pub fn warn(&self, text: impl Into<String>) -> u64 {
        self.append(Severity::Warning, text)
    }

    pub fn error(&self, text: impl Into<String>) -> u64 {
        self.append(Severity::Error, text)
    }

    /// Retained entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    /// Retained entries with a sequence number greater than `seq`.
    pub fn entries_after(&self, seq: u64) -> Vec<LogEntry> {
        self.lock()
            .entries
            .iter()
            .filter(|entry| entry.seq > seq)
            .cloned()
            .collect()
    }

    pub fn last(&self) -> Option<LogEntry> {
        self.lock().entries.back().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }
}
