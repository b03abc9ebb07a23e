//! Storage seams the service layer is built against.
//!
//! Each backend is picked once when the process starts and handed to the service as a trait
//! object; nothing swaps implementations afterwards.

use std::{future::Future, pin::Pin};

use time::OffsetDateTime;
use uuid::Uuid;

use vicinity_domain::{
	gate,
	geo::BoundingBox,
	item::ItemType,
	records::{HistoryRecord, Submission, ThrottleState},
};

use crate::{Error, Result, db::Db, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait SubmissionStore
where
	Self: Send + Sync,
{
	/// Persists one submission. Submissions are never deduplicated.
	fn put<'a>(&'a self, submission: &'a Submission) -> BoxFuture<'a, Result<()>>;

	/// Coarse index read: every submission of `item_type` inside any of `boxes`.
	fn candidates<'a>(
		&'a self,
		item_type: ItemType,
		boxes: &'a [BoundingBox],
	) -> BoxFuture<'a, Result<Vec<Submission>>>;
}

pub trait HistoryStore
where
	Self: Send + Sync,
{
	fn insert_history<'a>(&'a self, record: &'a HistoryRecord) -> BoxFuture<'a, Result<()>>;

	/// Newest first, at most `limit` records.
	fn list_history<'a>(
		&'a self,
		owner_id: &'a str,
		item_type: ItemType,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<HistoryRecord>>>;

	fn get_history<'a>(
		&'a self,
		owner_id: &'a str,
		item_type: ItemType,
		history_id: Uuid,
	) -> BoxFuture<'a, Result<Option<HistoryRecord>>>;

	/// Fails with [`Error::NotFound`] when no record matched.
	fn delete_history<'a>(
		&'a self,
		owner_id: &'a str,
		item_type: ItemType,
		history_id: Uuid,
	) -> BoxFuture<'a, Result<()>>;
}

pub trait ThrottleStore
where
	Self: Send + Sync,
{
	fn throttle_state<'a>(
		&'a self,
		client_id: &'a str,
		item_type: ItemType,
	) -> BoxFuture<'a, Result<Option<ThrottleState>>>;

	/// Monotonic: an older timestamp never replaces a newer one.
	fn record_submitted<'a>(
		&'a self,
		client_id: &'a str,
		item_type: ItemType,
		submitted_at: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>>;
}

pub(crate) fn check_submission(submission: &Submission) -> Result<()> {
	gate::submission_gate(submission).map_err(|code| Error::InvalidArgument(code.as_str().to_string()))
}

impl SubmissionStore for Db {
	fn put<'a>(&'a self, submission: &'a Submission) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			check_submission(submission)?;

			queries::insert_submission(self, submission).await
		})
	}

	fn candidates<'a>(
		&'a self,
		item_type: ItemType,
		boxes: &'a [BoundingBox],
	) -> BoxFuture<'a, Result<Vec<Submission>>> {
		Box::pin(queries::select_submissions_in_boxes(self, item_type, boxes))
	}
}

impl HistoryStore for Db {
	fn insert_history<'a>(&'a self, record: &'a HistoryRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(queries::insert_history(self, record))
	}

	fn list_history<'a>(
		&'a self,
		owner_id: &'a str,
		item_type: ItemType,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<HistoryRecord>>> {
		Box::pin(queries::list_history(self, owner_id, item_type, limit))
	}

	fn get_history<'a>(
		&'a self,
		owner_id: &'a str,
		item_type: ItemType,
		history_id: Uuid,
	) -> BoxFuture<'a, Result<Option<HistoryRecord>>> {
		Box::pin(queries::get_history(self, owner_id, item_type, history_id))
	}

	fn delete_history<'a>(
		&'a self,
		owner_id: &'a str,
		item_type: ItemType,
		history_id: Uuid,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(queries::delete_history(self, owner_id, item_type, history_id))
	}
}

impl ThrottleStore for Db {
	fn throttle_state<'a>(
		&'a self,
		client_id: &'a str,
		item_type: ItemType,
	) -> BoxFuture<'a, Result<Option<ThrottleState>>> {
		Box::pin(queries::get_throttle(self, client_id, item_type))
	}

	fn record_submitted<'a>(
		&'a self,
		client_id: &'a str,
		item_type: ItemType,
		submitted_at: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(queries::upsert_throttle(self, client_id, item_type, submitted_at))
	}
}
