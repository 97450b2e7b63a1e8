// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Summary statistics over the record store.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::records::ConfidentialRecord;

/// Window for `recent_records`.
const RECENT_WINDOW_HOURS: i64 = 24;

/// Aggregate view of all records.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecordStats {
    pub total_records: usize,
    pub verified_records: usize,
    /// Mean of the cleartext echo field; 0 when there are no records.
    pub average_public_value: f64,
    /// Records created less than 24 hours before `now`.
    pub recent_records: usize,
}

/// Compute statistics from `records` as of `now`.
///
/// Only the public echo field is averaged; hidden values never enter here.
pub fn summarize(records: &[ConfidentialRecord], now: DateTime<Utc>) -> RecordStats {
    let total_records = records.len();
    let verified_records = records
        .iter()
        .filter(|r| r.verification().is_verified())
        .count();

    let average_public_value = if total_records == 0 {
        0.0
    } else {
        let sum: f64 = records.iter().map(|r| r.public_value1 as f64).sum();
        sum / total_records as f64
    };

    let window = Duration::hours(RECENT_WINDOW_HOURS);
    let recent_records = records
        .iter()
        .filter(|r| now.signed_duration_since(r.created_at) < window)
        .count();

    RecordStats {
        total_records,
        verified_records,
        average_public_value,
        recent_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Handle;
    use crate::records::{RecordId, RecordStore, TransitionEvent};

    fn record(id: &str, value: u64, created_at: DateTime<Utc>) -> ConfidentialRecord {
        ConfidentialRecord::new(
            RecordId::from(id),
            id.to_string(),
            String::new(),
            Handle([0u8; 32]),
            value,
            1,
            "0xcreator".into(),
            created_at,
        )
    }

    #[test]
    fn empty_input_is_all_zero() {
        let stats = summarize(&[], Utc::now());
        assert_eq!(
            stats,
            RecordStats {
                total_records: 0,
                verified_records: 0,
                average_public_value: 0.0,
                recent_records: 0,
            }
        );
    }

    #[test]
    fn counts_verified_and_averages_echo_values() {
        let now = Utc::now();
        let store = RecordStore::new();
        for (id, value) in [("a", 10), ("b", 20), ("c", 45)] {
            store.insert(record(id, value, now)).unwrap();
        }
        for id in ["a", "c"] {
            let id = RecordId::from(id);
            store.transition(&id, TransitionEvent::StartDisclosure).unwrap();
            store.transition(&id, TransitionEvent::MarkVerified(1_000)).unwrap();
        }
        // an in-flight record is not verified
        store
            .transition(&RecordId::from("b"), TransitionEvent::StartDisclosure)
            .unwrap();

        let stats = summarize(&store.list_all(), now);

        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.verified_records, 2);
        assert!((stats.average_public_value - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recent_window_uses_supplied_now() {
        let now = Utc::now();
        let records = vec![
            record("fresh", 1, now - Duration::hours(1)),
            record("edge", 1, now - Duration::hours(24)),
            record("old", 1, now - Duration::days(3)),
        ];

        assert_eq!(summarize(&records, now).recent_records, 1);
        // Seen from three days earlier, none of them is older than 24h.
        let earlier = now - Duration::days(3);
        assert_eq!(summarize(&records, earlier).recent_records, 3);
    }
}
