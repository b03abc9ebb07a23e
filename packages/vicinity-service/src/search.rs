//! The nearby query: optionally refresh the caller's own submission, then rank what everyone
//! else near the query point likes.

use std::{fmt, future::Future};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vicinity_domain::{
	TOP_K, aggregate, gate, geo::GeoPoint, item::ItemType, records::RankedItem,
};

use crate::{Error, Result, VicinityService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
	pub owner_id: String,
	pub item_type: ItemType,
	pub location: GeoPoint,
	pub radius_meters: u32,
	/// Favorites provider token. Only needed when the caller is due to submit.
	#[serde(skip)]
	pub access_token: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
	Empty,
	Done,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResponse {
	pub outcome: SearchOutcome,
	/// Whether this query also stored a fresh submission for the caller.
	pub submitted: bool,
	pub items: Vec<RankedItem>,
	pub history_id: Option<Uuid>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
	Idle,
	Throttling,
	Submitting,
	Querying,
	Aggregating,
	Empty,
	Recording,
	Done,
	Failed,
	Cancelled,
}
impl SearchPhase {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Idle => "idle",
			Self::Throttling => "throttling",
			Self::Submitting => "submitting",
			Self::Querying => "querying",
			Self::Aggregating => "aggregating",
			Self::Empty => "empty",
			Self::Recording => "recording",
			Self::Done => "done",
			Self::Failed => "failed",
			Self::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for SearchPhase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl VicinityService {
	pub async fn search_nearby(&self, req: SearchRequest) -> Result<SearchResponse> {
		let result = self.run_search(&req).await;

		if let Err(err) = &result {
			tracing::warn!(
				owner_id = %req.owner_id,
				item_type = %req.item_type,
				phase = %SearchPhase::Failed,
				error = %err,
				"Nearby search failed."
			);
		}

		result
	}

	/// Like [`VicinityService::search_nearby`], but gives up with [`Error::Cancelled`] as soon as
	/// `cancel` resolves. Whatever finished before that stays committed.
	pub async fn search_nearby_until<C>(&self, req: SearchRequest, cancel: C) -> Result<SearchResponse>
	where
		C: Future<Output = ()>,
	{
		let owner_id = req.owner_id.clone();
		let item_type = req.item_type;

		tokio::select! {
			biased;

			_ = cancel => {
				tracing::info!(
					owner_id = %owner_id,
					item_type = %item_type,
					phase = %SearchPhase::Cancelled,
					"Nearby search cancelled."
				);

				Err(Error::Cancelled)
			},
			result = self.search_nearby(req) => result,
		}
	}

	async fn run_search(&self, req: &SearchRequest) -> Result<SearchResponse> {
		let item_type = req.item_type;

		trace_phase(&req.owner_id, item_type, SearchPhase::Idle);

		let owner_id = crate::require_id("owner_id", &req.owner_id)?;

		req.location.validate()?;

		let max_radius = self.cfg.search.max_radius_meters;

		if req.radius_meters > max_radius {
			return Err(Error::Validation {
				message: format!("radius_meters must be at most {max_radius}."),
			});
		}

		let _guard = self.in_flight.acquire(owner_id, item_type).await;

		trace_phase(owner_id, item_type, SearchPhase::Throttling);

		let submitted = if self.should_submit(owner_id, item_type).await? {
			trace_phase(owner_id, item_type, SearchPhase::Submitting);

			self.submit_from_provider(owner_id, item_type, req.location, req.access_token.as_deref())
				.await?
		} else {
			false
		};

		trace_phase(owner_id, item_type, SearchPhase::Querying);

		let submissions = self.query_nearby(item_type, &req.location, req.radius_meters).await?;

		trace_phase(owner_id, item_type, SearchPhase::Aggregating);

		let items = aggregate::aggregate(&submissions, owner_id, TOP_K);

		if items.is_empty() {
			trace_phase(owner_id, item_type, SearchPhase::Empty);

			return Ok(SearchResponse {
				outcome: SearchOutcome::Empty,
				submitted,
				items,
				history_id: None,
			});
		}

		trace_phase(owner_id, item_type, SearchPhase::Recording);

		let record = self
			.record_history(owner_id, item_type, items, req.location, req.radius_meters)
			.await?;

		trace_phase(owner_id, item_type, SearchPhase::Done);

		Ok(SearchResponse {
			outcome: SearchOutcome::Done,
			submitted,
			items: record.items,
			history_id: Some(record.history_id),
		})
	}

	/// Returns whether a submission was written. Provider items with unusable ids are dropped and
	/// the rest is capped at the configured limit. If nothing is left, nothing is written and the
	/// throttle stays untouched.
	async fn submit_from_provider(
		&self,
		owner_id: &str,
		item_type: ItemType,
		location: GeoPoint,
		access_token: Option<&str>,
	) -> Result<bool> {
		let Some(access_token) = access_token.map(str::trim).filter(|token| !token.is_empty())
		else {
			return Err(Error::Unauthenticated {
				message: "An access token is required to submit favorites.".to_string(),
			});
		};
		let fetched = self.favorites.favorites(&self.cfg.favorites, access_token, item_type).await?;
		let fetched_count = fetched.len();
		let items = gate::usable_items(fetched, self.cfg.favorites.limit as usize);

		if items.len() < fetched_count {
			tracing::debug!(
				owner_id = %owner_id,
				item_type = %item_type,
				fetched = fetched_count,
				kept = items.len(),
				"Trimmed favorites to a submittable list."
			);
		}
		if items.is_empty() {
			tracing::debug!(
				owner_id = %owner_id,
				item_type = %item_type,
				"Favorites provider returned no usable items; skipping submission."
			);

			return Ok(false);
		}

		self.write_submission(owner_id, item_type, location, items).await?;

		Ok(true)
	}
}

fn trace_phase(owner_id: &str, item_type: ItemType, phase: SearchPhase) {
	tracing::debug!(owner_id = %owner_id, item_type = %item_type, phase = %phase, "Nearby search phase.");
}
