//! Per-function deferred-resolution label set, and the generator-internal
//! monotonic label counters plus the break/continue LIFOs.

use std::collections::HashMap;
use subc_lex::Token;
use subc_sem::SemError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum LabelStatus {
    Referenced,
    Defined,
}

struct LabelInfo {
    status: LabelStatus,
    tok: Token,
}

/// Tracks user `goto`/label names within a single function body. A
/// `goto` may reference a label before its definition; the set starts
/// empty, and `goto` only inserts a fresh *referenced* entry if the name
/// is entirely absent — it never overwrites an existing entry, so only
/// the first reference's token is retained pending definition.
#[derive(Default)]
pub struct LabelSet {
    labels: HashMap<String, LabelInfo>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_reference(&mut self, label: &str, tok: &Token) {
        self.labels.entry(label.to_string()).or_insert(LabelInfo {
            status: LabelStatus::Referenced,
            tok: tok.clone(),
        });
    }

    pub fn put_definition(&mut self, label: &str, tok: &Token) -> Result<(), SemError> {
        match self.labels.get_mut(label) {
            Some(info) if info.status == LabelStatus::Defined => {
                return Err(SemError::LabelRedefined {
                    label: label.to_string(),
                    first: info.tok.loc.clone(),
                    then: tok.loc.clone(),
                });
            }
            Some(info) => {
                info.status = LabelStatus::Defined;
                info.tok = tok.clone();
            }
            None => {
                self.labels.insert(
                    label.to_string(),
                    LabelInfo {
                        status: LabelStatus::Defined,
                        tok: tok.clone(),
                    },
                );
            }
        }
        Ok(())
    }

    /// Called once after a function body is fully generated: every entry
    /// must be *defined*.
    pub fn check_all_defined(&self) -> Result<(), SemError> {
        for (label, info) in &self.labels {
            if info.status == LabelStatus::Referenced {
                return Err(SemError::UndefinedLabel {
                    label: label.clone(),
                    loc: info.tok.loc.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Monotonic per-construct-kind label counters, producing labels of the
/// form `_KIND_COUNTER` unique within a translation unit.
#[derive(Default)]
pub struct LabelCounters {
    counters: HashMap<&'static str, u32>,
}

impl LabelCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, kind: &'static str) -> String {
        let counter = self.counters.entry(kind).or_insert(0);
        let n = *counter;
        *counter += 1;
        format!("_{}_{}", kind, n)
    }
}

/// LIFO of targets for `break`/`continue`, pushed on loop entry and
/// popped on exit. An empty peek is a semantic error, not a panic.
#[derive(Default)]
pub struct LabelStack {
    labels: Vec<String>,
}

impl LabelStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: String) {
        self.labels.push(label);
    }

    pub fn pop(&mut self) {
        self.labels.pop();
    }

    pub fn top(&self) -> Option<&str> {
        self.labels.last().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
