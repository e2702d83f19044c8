//! Serialized gallery state kept in the session store.
//!
//! Shape on disk: `{ "category", "subgroupId", "visibleCount", "scrollPosition"? }`.
//! Every field is optional when reading; a field that is present but has the
//! wrong type rejects the whole snapshot.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::gallery::{Category, FilterState, RestorePolicy};
use super::records::GenerationId;
use super::storage::{KeyValueStore, StorageError};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("could not encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("snapshot selects generation {0} under the `all` category")]
    SubgroupUnderAll(GenerationId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound(serialize = "C: Serialize", deserialize = "C: DeserializeOwned")
)]
pub struct PersistedSnapshot<C> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<C>,
    /// Outer `None`: field absent.  `Some(None)`: explicitly no generation.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub subgroup_id: Option<Option<GenerationId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_position: Option<u32>,
}

/// Distinguishes `"subgroupId": null` from a missing field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl<C: Category> PersistedSnapshot<C> {
    pub fn capture(state: &FilterState<C>, scroll_position: Option<u32>) -> Self {
        Self {
            category: Some(state.category),
            subgroup_id: Some(state.subgroup_id),
            visible_count: Some(state.visible_count),
            scroll_position,
        }
    }

    pub fn parse(raw: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(SnapshotError::Encode)
    }

    /// Stored fields win over `defaults`; absent fields keep the default.
    ///
    /// `visibleCount` is only taken under [`RestorePolicy::Full`] and is never
    /// allowed below `page_size`.
    pub fn merge_over(
        &self,
        defaults: FilterState<C>,
        policy: RestorePolicy,
        page_size: usize,
    ) -> Result<FilterState<C>, SnapshotError> {
        let category = self.category.unwrap_or(defaults.category);
        let subgroup_id = self.subgroup_id.unwrap_or(defaults.subgroup_id);
        if let (true, Some(id)) = (category.is_all(), subgroup_id) {
            return Err(SnapshotError::SubgroupUnderAll(id));
        }
        let visible_count = match policy {
            RestorePolicy::FilterOnly => defaults.visible_count,
            RestorePolicy::Full => self
                .visible_count
                .unwrap_or(defaults.visible_count)
                .max(page_size),
        };
        Ok(FilterState {
            category,
            subgroup_id,
            visible_count,
        })
    }
}

/// Read and parse the snapshot stored under `key`.
pub fn read_snapshot<C: Category>(
    store: &impl KeyValueStore,
    key: &str,
) -> Result<Option<PersistedSnapshot<C>>, SnapshotError> {
    match store.get(key)? {
        Some(raw) => PersistedSnapshot::parse(&raw).map(Some),
        None => Ok(None),
    }
}

/// Overwrite the snapshot stored under `key`.
pub fn write_snapshot<C: Category>(
    store: &mut impl KeyValueStore,
    key: &str,
    snapshot: &PersistedSnapshot<C>,
) -> Result<(), SnapshotError> {
    let json = snapshot.to_json()?;
    store.set(key, &json)?;
    Ok(())
}

/// The filter state a freshly mounted grid starts from.
///
/// Never fails: an absent, unreadable, or inconsistent snapshot yields
/// `defaults` untouched.
pub fn load_filter_state<C: Category>(
    store: &impl KeyValueStore,
    key: &str,
    defaults: FilterState<C>,
    policy: RestorePolicy,
    page_size: usize,
) -> FilterState<C> {
    let restored = read_snapshot::<C>(store, key)
        .and_then(|snap| snap.map(|s| s.merge_over(defaults, policy, page_size)).transpose());
    match restored {
        Ok(Some(state)) => state,
        Ok(None) => defaults,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring stored gallery snapshot");
            defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::records::ProjectCategory;

    #[test]
    fn null_subgroup_differs_from_missing() {
        let explicit: PersistedSnapshot<ProjectCategory> =
            PersistedSnapshot::parse(r#"{"category":"web","subgroupId":null}"#).unwrap();
        assert_eq!(explicit.subgroup_id, Some(None));

        let missing: PersistedSnapshot<ProjectCategory> =
            PersistedSnapshot::parse(r#"{"category":"web"}"#).unwrap();
        assert_eq!(missing.subgroup_id, None);
    }

    #[test]
    fn capture_writes_camel_case_fields() {
        let state = FilterState {
            category: ProjectCategory::Game,
            subgroup_id: Some(4),
            visible_count: 12,
        };
        let json = PersistedSnapshot::capture(&state, Some(30)).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"category":"game","subgroupId":4,"visibleCount":12,"scrollPosition":30}"#
        );

        let json = PersistedSnapshot::capture(&state, None).to_json().unwrap();
        assert!(!json.contains("scrollPosition"));
    }

    #[test]
    fn full_policy_clamps_visible_count_to_page_size() {
        let snap: PersistedSnapshot<ProjectCategory> =
            PersistedSnapshot::parse(r#"{"visibleCount":2}"#).unwrap();
        let state = snap
            .merge_over(FilterState::initial(6), RestorePolicy::Full, 6)
            .unwrap();
        assert_eq!(state.visible_count, 6);
    }

    #[test]
    fn subgroup_under_all_is_rejected() {
        let snap: PersistedSnapshot<ProjectCategory> =
            PersistedSnapshot::parse(r#"{"category":"all","subgroupId":3}"#).unwrap();
        let err = snap
            .merge_over(FilterState::initial(6), RestorePolicy::FilterOnly, 6)
            .unwrap_err();
        assert!(matches!(err, SnapshotError::SubgroupUnderAll(3)));
    }
}
