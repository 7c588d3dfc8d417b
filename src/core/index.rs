use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, info, warn};

use super::codec::{canonicalize_retirement_age, field_token, join_key, normalize};
use super::table::ScenarioTable;
use super::types::{BucketField, Profile, ScenarioRecord};

const MISMATCH_SAMPLES: usize = 3;

/// Canonical key to row position in the table it was built from.
#[derive(Debug, Clone, Default)]
pub struct ScenarioIndex {
    positions: HashMap<String, usize>,
    duplicates_dropped: usize,
    stored_key_mismatches: usize,
}

impl ScenarioIndex {
    pub fn build(table: &ScenarioTable) -> Self {
        let mut positions = HashMap::with_capacity(table.len());
        let mut duplicates_dropped = 0;
        let mut stored_key_mismatches = 0;

        for (position, record) in table.records().iter().enumerate() {
            let key = derived_key(record);

            if let Some(stored) = record.sk.as_deref() {
                if normalize(stored) != key {
                    stored_key_mismatches += 1;
                    if stored_key_mismatches <= MISMATCH_SAMPLES {
                        debug!(row = position, stored, derived = %key, "stored sort key mismatch");
                    }
                }
            }

            match positions.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(position);
                }
                Entry::Occupied(_) => duplicates_dropped += 1,
            }
        }

        if stored_key_mismatches > 0 {
            warn!(
                mismatches = stored_key_mismatches,
                "stored sort keys disagree with bucket columns; using bucket columns"
            );
        }
        info!(
            rows = table.len(),
            unique_keys = positions.len(),
            duplicates_dropped,
            "scenario index built"
        );

        Self {
            positions,
            duplicates_dropped,
            stored_key_mismatches,
        }
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn find(&self, table: &ScenarioTable, profile: &Profile) -> Option<usize> {
        let mut segments = BucketField::ALL
            .iter()
            .map(|field| {
                if table.has_column(*field) {
                    field_token(*field, &profile.token(*field))
                } else {
                    String::new()
                }
            })
            .collect::<Vec<_>>();

        let primary = join_key(&segments);
        if let Some(position) = self.position(&primary) {
            return Some(position);
        }
        if !table.has_column(BucketField::RetirementAgeBucket) {
            return None;
        }

        let slot = BucketField::ALL.len() - 1;
        let own = segments[slot].clone();
        for alias in canonicalize_retirement_age(&profile.retirement_age_bucket) {
            if alias == own {
                continue;
            }
            segments[slot] = alias;
            if let Some(position) = self.position(&join_key(&segments)) {
                return Some(position);
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    pub fn stored_key_mismatches(&self) -> usize {
        self.stored_key_mismatches
    }
}

pub fn derived_key(record: &ScenarioRecord) -> String {
    join_key(
        BucketField::ALL
            .iter()
            .map(|field| field_token(*field, record.bucket(*field).unwrap_or_default())),
    )
}
