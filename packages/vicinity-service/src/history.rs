use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use vicinity_domain::{
	TOP_K,
	geo::GeoPoint,
	item::ItemType,
	records::{HistoryRecord, RankedItem},
};

use crate::{Error, Result, VicinityService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryListRequest {
	pub owner_id: String,
	pub item_type: ItemType,
	#[serde(default)]
	pub limit: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryListResponse {
	pub items: Vec<HistoryItem>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryGetRequest {
	pub owner_id: String,
	pub item_type: ItemType,
	pub history_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryDeleteRequest {
	pub owner_id: String,
	pub item_type: ItemType,
	pub history_id: Uuid,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryDeleteResponse {
	pub history_id: Uuid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
	pub history_id: Uuid,
	pub owner_id: String,
	pub item_type: ItemType,
	pub items: Vec<RankedItem>,
	pub location: GeoPoint,
	pub radius_meters: u32,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}
impl From<HistoryRecord> for HistoryItem {
	fn from(record: HistoryRecord) -> Self {
		Self {
			history_id: record.history_id,
			owner_id: record.owner_id,
			item_type: record.item_type,
			items: record.items,
			location: record.location,
			radius_meters: record.radius_meters,
			created_at: record.created_at,
		}
	}
}

impl VicinityService {
	/// Persists the ranked result of one query. Empty results are never recorded.
	pub async fn record_history(
		&self,
		owner_id: &str,
		item_type: ItemType,
		items: Vec<RankedItem>,
		location: GeoPoint,
		radius_meters: u32,
	) -> Result<HistoryRecord> {
		let owner_id = crate::require_id("owner_id", owner_id)?;

		if items.is_empty() {
			return Err(Error::Validation {
				message: "History records need at least one ranked item.".to_string(),
			});
		}

		location.validate()?;

		let record = HistoryRecord {
			history_id: Uuid::new_v4(),
			owner_id: owner_id.to_string(),
			item_type,
			items,
			location,
			radius_meters,
			created_at: self.clock.now(),
		};

		self.stores.history.insert_history(&record).await?;

		tracing::info!(
			owner_id = %record.owner_id,
			item_type = %item_type,
			history_id = %record.history_id,
			items = record.items.len(),
			"History recorded."
		);

		Ok(record)
	}

	/// Newest first. The limit defaults to, and is capped at, [`TOP_K`].
	pub async fn history_list(&self, req: HistoryListRequest) -> Result<HistoryListResponse> {
		let owner_id = crate::require_id("owner_id", &req.owner_id)?;
		let limit = match req.limit {
			Some(0) => {
				return Err(Error::Validation {
					message: "limit must be greater than zero.".to_string(),
				});
			},
			Some(limit) => limit.min(TOP_K as u32),
			None => TOP_K as u32,
		};
		let records = self.stores.history.list_history(owner_id, req.item_type, limit).await?;

		Ok(HistoryListResponse { items: records.into_iter().map(HistoryItem::from).collect() })
	}

	pub async fn history_get(&self, req: HistoryGetRequest) -> Result<HistoryItem> {
		let owner_id = crate::require_id("owner_id", &req.owner_id)?;
		let record = self
			.stores
			.history
			.get_history(owner_id, req.item_type, req.history_id)
			.await?
			.ok_or_else(|| Error::NotFound {
				message: format!("History record {} does not exist.", req.history_id),
			})?;

		Ok(record.into())
	}

	pub async fn history_delete(&self, req: HistoryDeleteRequest) -> Result<HistoryDeleteResponse> {
		let owner_id = crate::require_id("owner_id", &req.owner_id)?;

		self.stores.history.delete_history(owner_id, req.item_type, req.history_id).await?;

		tracing::info!(
			owner_id = %owner_id,
			item_type = %req.item_type,
			history_id = %req.history_id,
			"History record deleted."
		);

		Ok(HistoryDeleteResponse { history_id: req.history_id })
	}
}
