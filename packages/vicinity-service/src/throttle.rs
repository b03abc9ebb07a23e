use time::OffsetDateTime;

use vicinity_domain::{
	item::ItemType,
	throttle::{self, THROTTLE_PERIOD},
};

use crate::{Result, VicinityService};

impl VicinityService {
	/// Whether `client_id` is due to submit its own favorites for `item_type` again.
	pub async fn should_submit(&self, client_id: &str, item_type: ItemType) -> Result<bool> {
		let state = self.stores.throttle.throttle_state(client_id, item_type).await?;
		let last_submitted_at = state.map(|state| state.last_submitted_at);

		Ok(throttle::should_submit(last_submitted_at, self.clock.now(), THROTTLE_PERIOD))
	}

	/// Marks `submitted_at` as the client's last submission. Earlier times never move it back.
	pub async fn record_submitted(
		&self,
		client_id: &str,
		item_type: ItemType,
		submitted_at: OffsetDateTime,
	) -> Result<()> {
		self.stores.throttle.record_submitted(client_id, item_type, submitted_at).await?;

		Ok(())
	}
}
