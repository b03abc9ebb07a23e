use std::collections::HashMap;

use crate::records::{AggregatedItem, RankedItem, Submission};

/// Sums popularity per item across every submission not made by `exclude_submitter_id`.
///
/// The output order is unspecified; see [`rank`].
pub fn sum_by_item(submissions: &[Submission], exclude_submitter_id: &str) -> Vec<AggregatedItem> {
	let mut totals: HashMap<&str, u64> = HashMap::new();

	for submission in submissions.iter().filter(|s| s.submitter_id != exclude_submitter_id) {
		for item in &submission.items {
			let total = totals.entry(item.item_id.as_str()).or_insert(0);

			*total = total.saturating_add(item.popularity);
		}
	}

	totals
		.into_iter()
		.map(|(item_id, popularity)| AggregatedItem { item_id: item_id.to_string(), popularity })
		.collect()
}

/// Orders by popularity descending, then item id ascending, keeps the first `top_k`, and numbers
/// them from 1.
pub fn rank(mut items: Vec<AggregatedItem>, top_k: usize) -> Vec<RankedItem> {
	items.sort_by(|a, b| b.popularity.cmp(&a.popularity).then_with(|| a.item_id.cmp(&b.item_id)));
	items.truncate(top_k);

	items
		.into_iter()
		.zip(1_u32..)
		.map(|(item, rank)| RankedItem { rank, item_id: item.item_id, popularity: item.popularity })
		.collect()
}

/// Ranked, deduplicated view of what everyone except `exclude_submitter_id` likes.
pub fn aggregate(
	submissions: &[Submission],
	exclude_submitter_id: &str,
	top_k: usize,
) -> Vec<RankedItem> {
	rank(sum_by_item(submissions, exclude_submitter_id), top_k)
}
