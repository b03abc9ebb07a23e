use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use vicinity_domain::{
	geo::BoundingBox,
	item::ItemType,
	records::{HistoryRecord, Submission, ThrottleState},
};

use crate::{
	Error, Result,
	db::Db,
	models::{HistoryRow, SubmissionRow, ThrottleRow},
};

pub async fn insert_submission(db: &Db, submission: &Submission) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO geo_submissions (
	submission_id,
	submitter_id,
	item_type,
	items,
	lat,
	lon,
	created_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7)",
	)
	.bind(submission.submission_id)
	.bind(submission.submitter_id.as_str())
	.bind(submission.item_type.as_str())
	.bind(Json(&submission.items))
	.bind(submission.location.lat)
	.bind(submission.location.lon)
	.bind(submission.created_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

/// Submissions of `item_type` located inside any of `boxes`, oldest first.
pub async fn select_submissions_in_boxes(
	db: &Db,
	item_type: ItemType,
	boxes: &[BoundingBox],
) -> Result<Vec<Submission>> {
	let mut out = Vec::new();

	for bounds in boxes {
		let rows: Vec<SubmissionRow> = sqlx::query_as(
			"\
SELECT submission_id, submitter_id, item_type, items, lat, lon, created_at
FROM geo_submissions
WHERE item_type = $1
	AND lat BETWEEN $2 AND $3
	AND lon BETWEEN $4 AND $5
ORDER BY created_at ASC, submission_id ASC",
		)
		.bind(item_type.as_str())
		.bind(bounds.min_lat)
		.bind(bounds.max_lat)
		.bind(bounds.min_lon)
		.bind(bounds.max_lon)
		.fetch_all(&db.pool)
		.await?;

		for row in rows {
			out.push(Submission::try_from(row)?);
		}
	}

	Ok(out)
}

pub async fn insert_history(db: &Db, record: &HistoryRecord) -> Result<()> {
	let radius_meters = i32::try_from(record.radius_meters).map_err(|_| {
		Error::InvalidArgument("radius_meters does not fit the history table.".to_string())
	})?;

	sqlx::query(
		"\
INSERT INTO search_history (
	history_id,
	owner_id,
	item_type,
	items,
	lat,
	lon,
	radius_meters,
	created_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
	)
	.bind(record.history_id)
	.bind(record.owner_id.as_str())
	.bind(record.item_type.as_str())
	.bind(Json(&record.items))
	.bind(record.location.lat)
	.bind(record.location.lon)
	.bind(radius_meters)
	.bind(record.created_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn list_history(
	db: &Db,
	owner_id: &str,
	item_type: ItemType,
	limit: u32,
) -> Result<Vec<HistoryRecord>> {
	let rows: Vec<HistoryRow> = sqlx::query_as(
		"\
SELECT history_id, owner_id, item_type, items, lat, lon, radius_meters, created_at
FROM search_history
WHERE owner_id = $1 AND item_type = $2
ORDER BY created_at DESC, history_id DESC
LIMIT $3",
	)
	.bind(owner_id)
	.bind(item_type.as_str())
	.bind(i64::from(limit))
	.fetch_all(&db.pool)
	.await?;

	rows.into_iter().map(HistoryRecord::try_from).collect()
}

pub async fn get_history(
	db: &Db,
	owner_id: &str,
	item_type: ItemType,
	history_id: Uuid,
) -> Result<Option<HistoryRecord>> {
	let row: Option<HistoryRow> = sqlx::query_as(
		"\
SELECT history_id, owner_id, item_type, items, lat, lon, radius_meters, created_at
FROM search_history
WHERE history_id = $1 AND owner_id = $2 AND item_type = $3",
	)
	.bind(history_id)
	.bind(owner_id)
	.bind(item_type.as_str())
	.fetch_optional(&db.pool)
	.await?;

	row.map(HistoryRecord::try_from).transpose()
}

pub async fn delete_history(
	db: &Db,
	owner_id: &str,
	item_type: ItemType,
	history_id: Uuid,
) -> Result<()> {
	let result = sqlx::query(
		"DELETE FROM search_history WHERE history_id = $1 AND owner_id = $2 AND item_type = $3",
	)
	.bind(history_id)
	.bind(owner_id)
	.bind(item_type.as_str())
	.execute(&db.pool)
	.await?;

	if result.rows_affected() == 0 {
		return Err(Error::NotFound(format!("History record {history_id} does not exist.")));
	}

	Ok(())
}

pub async fn get_throttle(
	db: &Db,
	client_id: &str,
	item_type: ItemType,
) -> Result<Option<ThrottleState>> {
	let row: Option<ThrottleRow> = sqlx::query_as(
		"\
SELECT client_id, item_type, last_submitted_at
FROM submission_throttle
WHERE client_id = $1 AND item_type = $2",
	)
	.bind(client_id)
	.bind(item_type.as_str())
	.fetch_optional(&db.pool)
	.await?;

	row.map(ThrottleState::try_from).transpose()
}

/// Never moves `last_submitted_at` backwards, so a slow writer cannot reopen the throttle window
/// a faster one already closed.
pub async fn upsert_throttle(
	db: &Db,
	client_id: &str,
	item_type: ItemType,
	submitted_at: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO submission_throttle (client_id, item_type, last_submitted_at)
VALUES ($1,$2,$3)
ON CONFLICT (client_id, item_type) DO UPDATE
SET last_submitted_at = GREATEST(submission_throttle.last_submitted_at, EXCLUDED.last_submitted_at)",
	)
	.bind(client_id)
	.bind(item_type.as_str())
	.bind(submitted_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}
