use std::collections::HashSet;

use vicinity_domain::{
	geo::{self, GeoPoint},
	item::ItemType,
	records::Submission,
};

use crate::{Result, VicinityService};

impl VicinityService {
	/// Every submission of `item_type` within `radius_meters` of `center`, by great-circle
	/// distance. A radius of zero matches only submissions at exactly `center`.
	pub async fn query_nearby(
		&self,
		item_type: ItemType,
		center: &GeoPoint,
		radius_meters: u32,
	) -> Result<Vec<Submission>> {
		center.validate()?;

		let radius = f64::from(radius_meters);
		let boxes = geo::covering_boxes(center, radius);
		let candidates = self.stores.submissions.candidates(item_type, &boxes).await?;
		let candidate_count = candidates.len();
		let matched = within_radius(candidates, center, radius);

		tracing::debug!(
			item_type = %item_type,
			radius_meters,
			boxes = boxes.len(),
			candidates = candidate_count,
			matched = matched.len(),
			"Radius query filtered candidates."
		);

		Ok(matched)
	}
}

fn within_radius(candidates: Vec<Submission>, center: &GeoPoint, radius: f64) -> Vec<Submission> {
	let mut seen = HashSet::new();

	candidates
		.into_iter()
		.filter(|submission| submission.location.distance_meters(center) <= radius)
		.filter(|submission| seen.insert(submission.submission_id))
		.collect()
}
