//! Store-backed reporting sink.
//!
//! Records liveness transitions on the candidate documents: an offline
//! report stamps `offline_since`; an online recovery folds the downtime
//! into `offline_accumulated` and clears the stamp. Telemetry nodes are
//! resolved by name — unknown names succeed without writing, since not
//! every node on the feed is a tracked candidate.

use std::sync::Arc;

use prometheus::IntCounter;

use stakewatch_store::CandidateStore;
use stakewatch_telemetry::{ReportError, ReportingSink};
use stakewatch_types::Timestamp;

pub struct StoreOfflineReporter {
    candidates: Arc<dyn CandidateStore>,
    offline_reports: IntCounter,
    online_reports: IntCounter,
}

impl StoreOfflineReporter {
    pub fn new(
        candidates: Arc<dyn CandidateStore>,
        offline_reports: IntCounter,
        online_reports: IntCounter,
    ) -> Self {
        Self {
            candidates,
            offline_reports,
            online_reports,
        }
    }
}

impl ReportingSink for StoreOfflineReporter {
    fn report_offline(&self, name: &str, since: Timestamp) -> Result<(), ReportError> {
        self.candidates
            .mark_offline(name, since)
            .map_err(|e| ReportError(e.to_string()))?;
        self.offline_reports.inc();
        Ok(())
    }

    fn report_online(&self, name: &str, seen: Timestamp) -> Result<(), ReportError> {
        let candidate = self
            .candidates
            .find_by_name(name)
            .map_err(|e| ReportError(e.to_string()))?;

        if let Some(mut candidate) = candidate {
            if candidate.offline_since != Timestamp::EPOCH {
                candidate.offline_accumulated = candidate
                    .offline_accumulated
                    .saturating_add(candidate.offline_since.elapsed_since(seen));
                candidate.offline_since = Timestamp::EPOCH;
                self.candidates
                    .put_candidate(&candidate)
                    .map_err(|e| ReportError(e.to_string()))?;
            }
        }
        self.online_reports.inc();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::IntCounter;
    use stakewatch_nullables::{NullClock, NullStore};
    use stakewatch_types::Candidate;

    fn counter(name: &str) -> IntCounter {
        IntCounter::new(name.to_string(), "test counter".to_string()).unwrap()
    }

    fn reporter() -> (Arc<NullStore>, StoreOfflineReporter) {
        let store = Arc::new(NullStore::new());
        let reporter = StoreOfflineReporter::new(
            Arc::clone(&store) as Arc<dyn CandidateStore>,
            counter("offline_total"),
            counter("online_total"),
        );
        (store, reporter)
    }

    #[test]
    fn offline_report_stamps_candidate() {
        let (store, reporter) = reporter();
        store.put_candidate(&Candidate::new("Val1", "s1")).unwrap();

        reporter.report_offline("Val1", Timestamp::new(100)).unwrap();

        let candidate = store.find_by_stash("s1").unwrap().unwrap();
        assert_eq!(candidate.offline_since, Timestamp::new(100));
        assert_eq!(reporter.offline_reports.get(), 1);
    }

    #[test]
    fn online_report_accumulates_downtime() {
        let (store, reporter) = reporter();
        store.put_candidate(&Candidate::new("Val1", "s1")).unwrap();
        let clock = NullClock::new(100);

        reporter.report_offline("Val1", clock.now()).unwrap();
        clock.advance(300);
        reporter.report_online("Val1", clock.now()).unwrap();

        let candidate = store.find_by_stash("s1").unwrap().unwrap();
        assert_eq!(candidate.offline_since, Timestamp::EPOCH);
        assert_eq!(candidate.offline_accumulated, 300);

        // A second offline/online cycle keeps accumulating.
        clock.advance(100);
        reporter.report_offline("Val1", clock.now()).unwrap();
        clock.advance(50);
        reporter.report_online("Val1", clock.now()).unwrap();
        let candidate = store.find_by_stash("s1").unwrap().unwrap();
        assert_eq!(candidate.offline_accumulated, 350);
    }

    #[test]
    fn unknown_node_name_is_not_an_error() {
        let (_store, reporter) = reporter();
        reporter.report_offline("ghost", Timestamp::new(1)).unwrap();
        reporter.report_online("ghost", Timestamp::new(2)).unwrap();
    }

    #[test]
    fn store_failure_surfaces_as_report_error() {
        let (store, reporter) = reporter();
        store.put_candidate(&Candidate::new("Val1", "s1")).unwrap();

        store.fail_next_writes(1);
        assert!(reporter.report_offline("Val1", Timestamp::new(1)).is_err());
        // Counter untouched on failure.
        assert_eq!(reporter.offline_reports.get(), 0);
    }
}
