use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	geo::GeoPoint,
	item::{ItemScore, ItemType},
};

/// One user's geotagged favorites snapshot. Never updated once written; a later submission from
/// the same submitter supersedes it without replacing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
	pub submission_id: Uuid,
	pub submitter_id: String,
	pub item_type: ItemType,
	pub items: Vec<ItemScore>,
	pub location: GeoPoint,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedItem {
	pub item_id: String,
	pub popularity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
	pub rank: u32,
	pub item_id: String,
	pub popularity: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
	pub history_id: Uuid,
	pub owner_id: String,
	pub item_type: ItemType,
	pub items: Vec<RankedItem>,
	pub location: GeoPoint,
	pub radius_meters: u32,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleState {
	pub client_id: String,
	pub item_type: ItemType,
	pub last_submitted_at: OffsetDateTime,
}
