use crate::models::MeetingId;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

/// Logs debug information.
pub type InfoLogger = Arc<dyn Fn(&str) + Send + Sync>;

/// Creates a logger which writes to standard output.
pub fn stdout_logger() -> InfoLogger {
    Arc::new(|msg: &str| println!("{msg}"))
}

/// A structured progress record emitted at pipeline milestones.
#[derive(Serialize)]
pub struct SolverLog<'a> {
    pub stage: &'a str,
    pub elapsed_ms: u128,
    pub free: usize,
    pub kept: usize,
    pub unscheduled: usize,
    /// Why each meeting entered the working set, present at the problem stage only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<&'a FxHashMap<MeetingId, String>>,
}

impl SolverLog<'_> {
    /// Serializes and emits the record.
    pub fn emit(&self, logger: &InfoLogger) {
        if let Ok(line) = serde_json::to_string(self) {
            (logger)(line.as_str());
        }
    }
}
