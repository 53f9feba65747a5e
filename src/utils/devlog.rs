//! Bench records for segment execution.
//!
//! Each record is one JSON object per line, `{"bench": <component>, "op": <op>, ...}`,
//! logged at TRACE under [`crate::logger::DEV_TARGET`]. A [`Capture`] collects the
//! lines emitted on its own thread so tests can assert on them without a logger.

use serde_json::{Map, Value as Json};
use std::cell::RefCell;
use std::marker::PhantomData;

thread_local! {
    static CAPTURED: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// Collects dev lines emitted on the current thread until dropped.
pub struct Capture {
    _thread_bound: PhantomData<*const ()>,
}

impl Capture {
    #[must_use]
    pub fn start() -> Self {
        CAPTURED.with(|c| *c.borrow_mut() = Some(Vec::new()));
        Self { _thread_bound: PhantomData }
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        CAPTURED.with(|c| c.borrow().as_ref().cloned().unwrap_or_default())
    }

    /// Returns and clears the captured lines.
    pub fn take(&self) -> Vec<String> {
        CAPTURED.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
    }

    /// Captured bench records for `component`, parsed back into objects.
    #[must_use]
    pub fn bench_records(&self, component: &str) -> Vec<Map<String, Json>> {
        self.lines()
            .iter()
            .filter_map(|l| serde_json::from_str::<Map<String, Json>>(l).ok())
            .filter(|m| m.get("bench").and_then(Json::as_str) == Some(component))
            .collect()
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        CAPTURED.with(|c| *c.borrow_mut() = None);
    }
}

/// Logs a dev line and appends it to the thread's capture, if any.
pub fn emit(line: String) {
    log::log!(target: crate::logger::DEV_TARGET, log::Level::Trace, "{line}");
    CAPTURED.with(|c| {
        if let Some(buf) = c.borrow_mut().as_mut() {
            buf.push(line);
        }
    });
}

/// Emits `{"bench": component, "op": op, <fields>}` as one line.
pub fn bench(component: &str, op: &str, fields: &[(&str, u64)]) {
    let mut record = Map::new();
    record.insert("bench".into(), Json::from(component));
    record.insert("op".into(), Json::from(op));
    for (name, value) in fields {
        record.insert((*name).to_owned(), Json::from(*value));
    }
    emit(Json::Object(record).to_string());
}

/// Formats and emits a free-form dev line.
#[macro_export]
macro_rules! devlog {
    ($($arg:tt)*) => {
        $crate::utils::devlog::emit(format!($($arg)*))
    };
}
