//! Nullable reporting sink — records every report for assertions.

use std::sync::Mutex;

use stakewatch_telemetry::{ReportError, ReportingSink};
use stakewatch_types::Timestamp;

/// Records offline/online reports; can be told to fail for one node name.
#[derive(Default)]
pub struct NullReportingSink {
    offline: Mutex<Vec<(String, Timestamp)>>,
    online: Mutex<Vec<(String, Timestamp)>>,
    fail_for: Option<String>,
}

impl NullReportingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose reports fail (after recording) for the given name.
    pub fn failing_for(name: &str) -> Self {
        Self {
            fail_for: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn offline_reports(&self) -> Vec<(String, Timestamp)> {
        self.offline.lock().unwrap().clone()
    }

    pub fn online_reports(&self) -> Vec<(String, Timestamp)> {
        self.online.lock().unwrap().clone()
    }
}

impl ReportingSink for NullReportingSink {
    fn report_offline(&self, name: &str, since: Timestamp) -> Result<(), ReportError> {
        self.offline.lock().unwrap().push((name.to_string(), since));
        if self.fail_for.as_deref() == Some(name) {
            return Err(ReportError("injected failure".into()));
        }
        Ok(())
    }

    fn report_online(&self, name: &str, seen: Timestamp) -> Result<(), ReportError> {
        self.online.lock().unwrap().push((name.to_string(), seen));
        if self.fail_for.as_deref() == Some(name) {
            return Err(ReportError("injected failure".into()));
        }
        Ok(())
    }
}
