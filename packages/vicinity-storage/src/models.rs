use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use vicinity_domain::{
	geo::GeoPoint,
	item::{ItemScore, ItemType},
	records::{HistoryRecord, RankedItem, Submission, ThrottleState},
};

use crate::{Error, Result};

#[derive(Debug, sqlx::FromRow)]
pub struct SubmissionRow {
	pub submission_id: Uuid,
	pub submitter_id: String,
	pub item_type: String,
	pub items: Json<Vec<ItemScore>>,
	pub lat: f64,
	pub lon: f64,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct HistoryRow {
	pub history_id: Uuid,
	pub owner_id: String,
	pub item_type: String,
	pub items: Json<Vec<RankedItem>>,
	pub lat: f64,
	pub lon: f64,
	pub radius_meters: i32,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ThrottleRow {
	pub client_id: String,
	pub item_type: String,
	pub last_submitted_at: OffsetDateTime,
}

impl TryFrom<SubmissionRow> for Submission {
	type Error = Error;

	fn try_from(row: SubmissionRow) -> Result<Self> {
		Ok(Self {
			submission_id: row.submission_id,
			submitter_id: row.submitter_id,
			item_type: parse_item_type(&row.item_type)?,
			items: row.items.0,
			location: parse_location(row.lat, row.lon)?,
			created_at: row.created_at,
		})
	}
}

impl TryFrom<HistoryRow> for HistoryRecord {
	type Error = Error;

	fn try_from(row: HistoryRow) -> Result<Self> {
		let radius_meters = u32::try_from(row.radius_meters).map_err(|_| {
			Error::Corrupt(format!("History {} has a negative radius.", row.history_id))
		})?;

		Ok(Self {
			history_id: row.history_id,
			owner_id: row.owner_id,
			item_type: parse_item_type(&row.item_type)?,
			items: row.items.0,
			location: parse_location(row.lat, row.lon)?,
			radius_meters,
			created_at: row.created_at,
		})
	}
}

impl TryFrom<ThrottleRow> for ThrottleState {
	type Error = Error;

	fn try_from(row: ThrottleRow) -> Result<Self> {
		Ok(Self {
			client_id: row.client_id,
			item_type: parse_item_type(&row.item_type)?,
			last_submitted_at: row.last_submitted_at,
		})
	}
}

fn parse_item_type(raw: &str) -> Result<ItemType> {
	raw.parse().map_err(|err: vicinity_domain::Error| Error::Corrupt(err.to_string()))
}

fn parse_location(lat: f64, lon: f64) -> Result<GeoPoint> {
	GeoPoint::new(lat, lon).map_err(|err| Error::Corrupt(err.to_string()))
}
