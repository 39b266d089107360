//! Node liveness state machine.
//!
//! Nodes are classified from feed events plus a periodic sweep:
//!
//! - a heartbeat makes a node `Connected` from any state;
//! - a feed disconnect makes it `Disconnected`, stamped with the FIRST
//!   disconnect time;
//! - the sweep promotes `Disconnected` entries older than the configured
//!   threshold to `Offline`, keyed by that original disconnect time.
//!
//! The tracker is shared between the feed event handler and the sweep
//! task behind a mutex; it is the only concurrently-shared mutable state
//! in this service.

use std::collections::{HashMap, HashSet};

use stakewatch_types::Timestamp;

use crate::event::FeedEvent;
use crate::sink::ReportingSink;

/// Liveness classification of a single node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeLiveness {
    Connected,
    /// Disconnected since the contained time; not yet past the threshold.
    Disconnected(Timestamp),
    /// Offline; the contained time is the original disconnect time.
    Offline(Timestamp),
}

pub struct NodeLivenessTracker {
    /// Nodes that may be disconnected but aren't necessarily offline,
    /// keyed by first-disconnect time.
    disconnected: HashMap<String, Timestamp>,
    /// Nodes past the offline threshold, keyed by their original
    /// disconnect time (not the sweep time that promoted them).
    offline: HashMap<String, Timestamp>,
    /// Names with a report currently in flight.
    being_reported: HashSet<String>,
    offline_threshold_secs: u64,
}

impl NodeLivenessTracker {
    pub fn new(offline_threshold_secs: u64) -> Self {
        Self {
            disconnected: HashMap::new(),
            offline: HashMap::new(),
            being_reported: HashSet::new(),
            offline_threshold_secs,
        }
    }

    /// Dispatch a feed event into the state machine.
    pub fn apply(&mut self, event: &FeedEvent, now: Timestamp, sink: &dyn ReportingSink) {
        match event {
            FeedEvent::Heartbeat { node } => self.handle_heartbeat(node, now, sink),
            FeedEvent::Disconnected { node } => self.handle_disconnect(node, now),
        }
    }

    /// A heartbeat resets the node to `Connected` from either other
    /// state. A node recovering from `Offline` is reported back online.
    pub fn handle_heartbeat(&mut self, name: &str, now: Timestamp, sink: &dyn ReportingSink) {
        self.disconnected.remove(name);

        if let Some(since) = self.offline.remove(name) {
            tracing::info!(node = name, offline_for = since.elapsed_since(now), "node back online");
            if self.being_reported.insert(name.to_string()) {
                if let Err(e) = sink.report_online(name, now) {
                    tracing::warn!(node = name, "online report failed: {e}");
                }
                self.being_reported.remove(name);
            }
        }
    }

    /// Record a feed disconnect. The first disconnect time wins; repeated
    /// disconnect events for a node already tracked (or already offline)
    /// change nothing.
    pub fn handle_disconnect(&mut self, name: &str, now: Timestamp) {
        if self.offline.contains_key(name) {
            return;
        }
        self.disconnected.entry(name.to_string()).or_insert_with(|| {
            tracing::debug!(node = name, at = %now, "node disconnected");
            now
        });
    }

    /// Threshold sweep. Every disconnected node whose age has reached the
    /// threshold is removed from the disconnected set, reported offline
    /// exactly once, and filed under its original disconnect time. A
    /// failing report is logged and does not block the other promotions.
    ///
    /// Returns the names promoted in this sweep.
    pub fn check_offline(&mut self, now: Timestamp, sink: &dyn ReportingSink) -> Vec<String> {
        let due: Vec<String> = self
            .disconnected
            .iter()
            .filter(|(name, since)| {
                since.has_expired(self.offline_threshold_secs, now)
                    && !self.being_reported.contains(*name)
            })
            .map(|(name, _)| name.clone())
            .collect();

        let mut promoted = Vec::with_capacity(due.len());
        for name in due {
            let Some(since) = self.disconnected.remove(&name) else {
                continue;
            };
            tracing::info!(
                node = %name,
                disconnected_for = since.elapsed_since(now),
                "node has been disconnected past the offline threshold"
            );

            self.being_reported.insert(name.clone());
            if let Err(e) = sink.report_offline(&name, since) {
                tracing::warn!(node = %name, "offline report failed: {e}");
            }
            self.being_reported.remove(&name);

            self.offline.insert(name.clone(), since);
            promoted.push(name);
        }
        promoted
    }

    pub fn state(&self, name: &str) -> NodeLiveness {
        if let Some(since) = self.offline.get(name) {
            NodeLiveness::Offline(*since)
        } else if let Some(since) = self.disconnected.get(name) {
            NodeLiveness::Disconnected(*since)
        } else {
            NodeLiveness::Connected
        }
    }

    pub fn disconnected_count(&self) -> usize {
        self.disconnected.len()
    }

    pub fn offline_count(&self) -> usize {
        self.offline.len()
    }
}
