use crate::{item::ItemScore, records::Submission};

pub const MAX_ITEMS_PER_SUBMISSION: usize = 200;
pub const MAX_ITEM_ID_CHARS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectEmptySubmitter,
	RejectEmptyItems,
	RejectTooManyItems,
	RejectBlankItemId,
	RejectItemIdTooLong,
	RejectInvalidLocation,
}
impl RejectCode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::RejectEmptySubmitter => "REJECT_EMPTY_SUBMITTER",
			Self::RejectEmptyItems => "REJECT_EMPTY_ITEMS",
			Self::RejectTooManyItems => "REJECT_TOO_MANY_ITEMS",
			Self::RejectBlankItemId => "REJECT_BLANK_ITEM_ID",
			Self::RejectItemIdTooLong => "REJECT_ITEM_ID_TOO_LONG",
			Self::RejectInvalidLocation => "REJECT_INVALID_LOCATION",
		}
	}
}

/// Checks a submission before it is written. Duplicate item ids are allowed; aggregation sums
/// them.
pub fn submission_gate(submission: &Submission) -> Result<(), RejectCode> {
	if submission.submitter_id.trim().is_empty() {
		return Err(RejectCode::RejectEmptySubmitter);
	}
	if submission.location.validate().is_err() {
		return Err(RejectCode::RejectInvalidLocation);
	}

	items_gate(&submission.items)
}

pub fn items_gate(items: &[ItemScore]) -> Result<(), RejectCode> {
	if items.is_empty() {
		return Err(RejectCode::RejectEmptyItems);
	}
	if items.len() > MAX_ITEMS_PER_SUBMISSION {
		return Err(RejectCode::RejectTooManyItems);
	}

	for item in items {
		if item.item_id.trim().is_empty() {
			return Err(RejectCode::RejectBlankItemId);
		}
		if item.item_id.chars().count() > MAX_ITEM_ID_CHARS {
			return Err(RejectCode::RejectItemIdTooLong);
		}
	}

	Ok(())
}

/// Keeps the provider items a submission can hold: drops blank or overlong ids, then keeps at
/// most `limit` items (never more than [`MAX_ITEMS_PER_SUBMISSION`]) in provider order.
pub fn usable_items(items: Vec<ItemScore>, limit: usize) -> Vec<ItemScore> {
	let cap = limit.min(MAX_ITEMS_PER_SUBMISSION);

	items
		.into_iter()
		.filter(|item| {
			!item.item_id.trim().is_empty() && item.item_id.chars().count() <= MAX_ITEM_ID_CHARS
		})
		.take(cap)
		.collect()
}
