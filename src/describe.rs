//! Deferred human-readable descriptions for schemas and fields.
//!
//! A description is either fixed text or a provider closure that runs at
//! most once, on first read. Providers exist so a description can mention
//! schemas that are declared later in startup; the first read memoizes and
//! concurrent readers wait for that one run to finish.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use once_cell::sync::OnceCell;

type Provider = Box<dyn Fn() -> String + Send + Sync>;

thread_local! {
    /// Descriptions (by address) whose provider is running on this thread.
    static EVALUATING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

enum Source {
    None,
    Eager(String),
    Deferred(Provider),
}

pub struct Description {
    source: Source,
    memo: OnceCell<String>,
}

impl Description {
    pub(crate) fn none() -> Self {
        Self::from_source(Source::None)
    }

    pub(crate) fn eager(text: impl Into<String>) -> Self {
        Self::from_source(Source::Eager(text.into()))
    }

    pub(crate) fn deferred(provider: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self::from_source(Source::Deferred(Box::new(provider)))
    }

    fn from_source(source: Source) -> Self {
        Description {
            source,
            memo: OnceCell::new(),
        }
    }

    /// The description text, if any. The first read runs a deferred
    /// provider inside the memo cell, so the provider executes at most
    /// once and concurrent readers wait for its result. A provider that
    /// (transitively) reads the description it is producing sees `None`
    /// for the inner read instead of recursing.
    pub fn get(&self) -> Option<&str> {
        match &self.source {
            Source::None => None,
            Source::Eager(text) => Some(text),
            Source::Deferred(provider) => {
                if let Some(text) = self.memo.get() {
                    return Some(text.as_str());
                }
                let key = self as *const Description as usize;
                if !EVALUATING.with(|set| set.borrow_mut().insert(key)) {
                    return None;
                }
                let _mark = EvaluationMark { key };
                Some(self.memo.get_or_init(|| provider()).as_str())
            }
        }
    }
}

/// Removes a description's address from the thread's evaluation set, also
/// on unwind.
struct EvaluationMark {
    key: usize,
}

impl Drop for EvaluationMark {
    fn drop(&mut self) {
        EVALUATING.with(|set| set.borrow_mut().remove(&self.key));
    }
}

impl Default for Description {
    fn default() -> Self {
        Description::none()
    }
}

impl fmt::Debug for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Source::None => f.write_str("Description::None"),
            Source::Eager(text) => write!(f, "Description::Eager({text:?})"),
            Source::Deferred(_) => match self.memo.get() {
                Some(text) => write!(f, "Description::Deferred({text:?})"),
                None => f.write_str("Description::Deferred(<pending>)"),
            },
        }
    }
}
