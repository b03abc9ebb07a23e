use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use vicinity_domain::{
	gate,
	geo::GeoPoint,
	item::{ItemScore, ItemType},
	records::Submission,
};

use crate::{Error, Result, VicinityService};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
	pub owner_id: String,
	pub item_type: ItemType,
	pub location: GeoPoint,
	pub items: Vec<ItemScore>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
	pub submission_id: Uuid,
	#[serde(with = "crate::time_serde")]
	pub submitted_at: OffsetDateTime,
}

impl VicinityService {
	/// Stores a client's own favorites without running a query, and restarts its throttle
	/// period.
	pub async fn submit_favorites(&self, req: SubmitRequest) -> Result<SubmitResponse> {
		let owner_id = crate::require_id("owner_id", &req.owner_id)?;

		req.location.validate()?;
		gate::items_gate(&req.items)
			.map_err(|code| Error::Validation { message: code.as_str().to_string() })?;

		let _guard = self.in_flight.acquire(owner_id, req.item_type).await;
		let submission =
			self.write_submission(owner_id, req.item_type, req.location, req.items).await?;

		Ok(SubmitResponse {
			submission_id: submission.submission_id,
			submitted_at: submission.created_at,
		})
	}

	/// Writes one submission and records its time as the submitter's last submission. Callers
	/// hold the in-flight lock for `(owner_id, item_type)`.
	pub(crate) async fn write_submission(
		&self,
		owner_id: &str,
		item_type: ItemType,
		location: GeoPoint,
		items: Vec<ItemScore>,
	) -> Result<Submission> {
		let submission = Submission {
			submission_id: Uuid::new_v4(),
			submitter_id: owner_id.to_string(),
			item_type,
			items,
			location,
			created_at: self.clock.now(),
		};

		self.stores.submissions.put(&submission).await?;
		self.record_submitted(owner_id, item_type, submission.created_at).await?;

		tracing::info!(
			owner_id = %owner_id,
			item_type = %item_type,
			submission_id = %submission.submission_id,
			items = submission.items.len(),
			"Submission stored."
		);

		Ok(submission)
	}
}
