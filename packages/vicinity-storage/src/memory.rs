//! In-process backend for demos and tests.
//!
//! Submissions are indexed on a uniform lat/lon grid per item type. A box lookup walks the cells
//! the box overlaps, or scans the whole partition when that would touch more cells than the
//! partition has submissions.

use std::{
	collections::{HashMap, HashSet},
	sync::{Mutex, RwLock},
};

use time::OffsetDateTime;
use uuid::Uuid;

use vicinity_domain::{
	geo::{BoundingBox, GeoPoint},
	item::ItemType,
	records::{HistoryRecord, Submission, ThrottleState},
};

use crate::{
	Error, Result,
	store::{self, BoxFuture, HistoryStore, SubmissionStore, ThrottleStore},
};

type CellKey = (i64, i64);
type OwnerKey = (String, ItemType);

#[derive(Default)]
struct Partition {
	submissions: HashMap<Uuid, Submission>,
	cells: HashMap<CellKey, Vec<Uuid>>,
}

pub struct MemoryStore {
	cell_degrees: f64,
	partitions: RwLock<HashMap<ItemType, Partition>>,
	history: Mutex<HashMap<OwnerKey, Vec<HistoryRecord>>>,
	throttle: Mutex<HashMap<OwnerKey, OffsetDateTime>>,
}
impl MemoryStore {
	pub fn new(cfg: &vicinity_config::Memory) -> Self {
		Self::with_cell_degrees(cfg.cell_degrees)
	}

	pub fn with_cell_degrees(cell_degrees: f64) -> Self {
		Self {
			cell_degrees,
			partitions: RwLock::new(HashMap::new()),
			history: Mutex::new(HashMap::new()),
			throttle: Mutex::new(HashMap::new()),
		}
	}

	pub fn submission_count(&self, item_type: ItemType) -> usize {
		let partitions = self.partitions.read().unwrap_or_else(|err| err.into_inner());

		partitions.get(&item_type).map(|partition| partition.submissions.len()).unwrap_or(0)
	}

	fn cell_of(&self, point: &GeoPoint) -> CellKey {
		(self.cell_index(point.lat), self.cell_index(point.lon))
	}

	fn cell_index(&self, degrees: f64) -> i64 {
		(degrees / self.cell_degrees).floor() as i64
	}

	fn insert(&self, submission: &Submission) -> Result<()> {
		store::check_submission(submission)?;

		let mut partitions = self.partitions.write().unwrap_or_else(|err| err.into_inner());
		let partition = partitions.entry(submission.item_type).or_default();

		if partition.submissions.contains_key(&submission.submission_id) {
			return Err(Error::InvalidArgument(format!(
				"Submission {} already exists.",
				submission.submission_id
			)));
		}

		partition
			.cells
			.entry(self.cell_of(&submission.location))
			.or_default()
			.push(submission.submission_id);
		partition.submissions.insert(submission.submission_id, submission.clone());

		Ok(())
	}

	fn select(&self, item_type: ItemType, boxes: &[BoundingBox]) -> Vec<Submission> {
		let partitions = self.partitions.read().unwrap_or_else(|err| err.into_inner());
		let Some(partition) = partitions.get(&item_type) else {
			return Vec::new();
		};
		let mut seen = HashSet::new();
		let mut out = Vec::new();

		for bounds in boxes {
			let lat_start = self.cell_index(bounds.min_lat);
			let lat_end = self.cell_index(bounds.max_lat);
			let lon_start = self.cell_index(bounds.min_lon);
			let lon_end = self.cell_index(bounds.max_lon);
			let cell_count = (lat_end - lat_start + 1)
				.unsigned_abs()
				.saturating_mul((lon_end - lon_start + 1).unsigned_abs());

			if cell_count > partition.submissions.len() as u64 {
				for submission in partition.submissions.values() {
					if bounds.contains(&submission.location) && seen.insert(submission.submission_id)
					{
						out.push(submission.clone());
					}
				}

				continue;
			}

			for lat_cell in lat_start..=lat_end {
				for lon_cell in lon_start..=lon_end {
					let Some(ids) = partition.cells.get(&(lat_cell, lon_cell)) else {
						continue;
					};

					for id in ids {
						let Some(submission) = partition.submissions.get(id) else {
							continue;
						};

						if bounds.contains(&submission.location) && seen.insert(*id) {
							out.push(submission.clone());
						}
					}
				}
			}
		}

		out.sort_by(|a, b| {
			a.created_at.cmp(&b.created_at).then_with(|| a.submission_id.cmp(&b.submission_id))
		});

		out
	}
}

impl SubmissionStore for MemoryStore {
	fn put<'a>(&'a self, submission: &'a Submission) -> BoxFuture<'a, Result<()>> {
		let result = self.insert(submission);

		Box::pin(async move { result })
	}

	fn candidates<'a>(
		&'a self,
		item_type: ItemType,
		boxes: &'a [BoundingBox],
	) -> BoxFuture<'a, Result<Vec<Submission>>> {
		let found = self.select(item_type, boxes);

		Box::pin(async move { Ok(found) })
	}
}

impl HistoryStore for MemoryStore {
	fn insert_history<'a>(&'a self, record: &'a HistoryRecord) -> BoxFuture<'a, Result<()>> {
		let mut history = self.history.lock().unwrap_or_else(|err| err.into_inner());

		history
			.entry((record.owner_id.clone(), record.item_type))
			.or_default()
			.push(record.clone());

		Box::pin(async move { Ok(()) })
	}

	fn list_history<'a>(
		&'a self,
		owner_id: &'a str,
		item_type: ItemType,
		limit: u32,
	) -> BoxFuture<'a, Result<Vec<HistoryRecord>>> {
		let history = self.history.lock().unwrap_or_else(|err| err.into_inner());
		let mut records =
			history.get(&(owner_id.to_string(), item_type)).cloned().unwrap_or_default();

		drop(history);

		records.sort_by(|a, b| {
			b.created_at.cmp(&a.created_at).then_with(|| b.history_id.cmp(&a.history_id))
		});
		records.truncate(limit as usize);

		Box::pin(async move { Ok(records) })
	}

	fn get_history<'a>(
		&'a self,
		owner_id: &'a str,
		item_type: ItemType,
		history_id: Uuid,
	) -> BoxFuture<'a, Result<Option<HistoryRecord>>> {
		let history = self.history.lock().unwrap_or_else(|err| err.into_inner());
		let found = history
			.get(&(owner_id.to_string(), item_type))
			.and_then(|records| records.iter().find(|record| record.history_id == history_id))
			.cloned();

		Box::pin(async move { Ok(found) })
	}

	fn delete_history<'a>(
		&'a self,
		owner_id: &'a str,
		item_type: ItemType,
		history_id: Uuid,
	) -> BoxFuture<'a, Result<()>> {
		let mut history = self.history.lock().unwrap_or_else(|err| err.into_inner());
		let removed = history
			.get_mut(&(owner_id.to_string(), item_type))
			.and_then(|records| {
				records.iter().position(|record| record.history_id == history_id).map(|index| {
					records.remove(index);
				})
			})
			.is_some();
		let result = if removed {
			Ok(())
		} else {
			Err(Error::NotFound(format!("History record {history_id} does not exist.")))
		};

		Box::pin(async move { result })
	}
}

impl ThrottleStore for MemoryStore {
	fn throttle_state<'a>(
		&'a self,
		client_id: &'a str,
		item_type: ItemType,
	) -> BoxFuture<'a, Result<Option<ThrottleState>>> {
		let throttle = self.throttle.lock().unwrap_or_else(|err| err.into_inner());
		let state = throttle.get(&(client_id.to_string(), item_type)).map(|last| ThrottleState {
			client_id: client_id.to_string(),
			item_type,
			last_submitted_at: *last,
		});

		Box::pin(async move { Ok(state) })
	}

	fn record_submitted<'a>(
		&'a self,
		client_id: &'a str,
		item_type: ItemType,
		submitted_at: OffsetDateTime,
	) -> BoxFuture<'a, Result<()>> {
		let mut throttle = self.throttle.lock().unwrap_or_else(|err| err.into_inner());
		let last = throttle.entry((client_id.to_string(), item_type)).or_insert(submitted_at);

		if submitted_at > *last {
			*last = submitted_at;
		}

		Box::pin(async move { Ok(()) })
	}
}
