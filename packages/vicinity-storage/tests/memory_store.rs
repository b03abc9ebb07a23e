use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use vicinity_domain::{
	geo::{self, GeoPoint},
	item::{ItemScore, ItemType},
	records::{HistoryRecord, RankedItem, Submission},
};
use vicinity_storage::{
	Error, HistoryStore, SubmissionStore, ThrottleStore, memory::MemoryStore,
};

fn submission(submitter_id: &str, item_type: ItemType, lat: f64, lon: f64) -> Submission {
	Submission {
		submission_id: Uuid::new_v4(),
		submitter_id: submitter_id.to_string(),
		item_type,
		items: vec![ItemScore::new("song", 10)],
		location: GeoPoint { lat, lon },
		created_at: OffsetDateTime::UNIX_EPOCH,
	}
}

fn history(owner_id: &str, created_at: OffsetDateTime) -> HistoryRecord {
	HistoryRecord {
		history_id: Uuid::new_v4(),
		owner_id: owner_id.to_string(),
		item_type: ItemType::Track,
		items: vec![RankedItem { rank: 1, item_id: "song".to_string(), popularity: 10 }],
		location: GeoPoint { lat: 35.0, lon: 139.0 },
		radius_meters: 1_000,
		created_at,
	}
}

#[tokio::test]
async fn keeps_duplicate_submissions_from_one_submitter() {
	let store = MemoryStore::with_cell_degrees(0.05);

	store.put(&submission("a", ItemType::Track, 35.0, 139.0)).await.expect("put");
	store.put(&submission("a", ItemType::Track, 35.0, 139.0)).await.expect("put");

	assert_eq!(store.submission_count(ItemType::Track), 2);
}

#[tokio::test]
async fn rejects_empty_item_lists() {
	let store = MemoryStore::with_cell_degrees(0.05);
	let mut bad = submission("a", ItemType::Track, 35.0, 139.0);

	bad.items.clear();

	let err = store.put(&bad).await.expect_err("Empty items must be rejected.");

	assert!(matches!(err, Error::InvalidArgument(ref code) if code == "REJECT_EMPTY_ITEMS"));
}

#[tokio::test]
async fn rejects_malformed_coordinates() {
	let store = MemoryStore::with_cell_degrees(0.05);
	let err = store
		.put(&submission("a", ItemType::Track, 95.0, 139.0))
		.await
		.expect_err("Latitude above 90 must be rejected.");

	assert!(matches!(err, Error::InvalidArgument(_)));
}

#[tokio::test]
async fn candidates_are_partitioned_by_item_type() {
	let store = MemoryStore::with_cell_degrees(0.05);

	store.put(&submission("a", ItemType::Track, 35.0, 139.0)).await.expect("put");
	store.put(&submission("b", ItemType::Artist, 35.0, 139.0)).await.expect("put");

	let boxes = geo::covering_boxes(&GeoPoint { lat: 35.0, lon: 139.0 }, 100.0);
	let found = store.candidates(ItemType::Artist, &boxes).await.expect("candidates");

	assert_eq!(found.len(), 1);
	assert_eq!(found[0].submitter_id, "b");
}

#[tokio::test]
async fn candidates_span_grid_cells() {
	let store = MemoryStore::with_cell_degrees(0.01);

	// Straddles a cell edge on both axes.
	store.put(&submission("west", ItemType::Track, 35.0099, 138.9999)).await.expect("put");
	store.put(&submission("east", ItemType::Track, 35.0101, 139.0001)).await.expect("put");
	store.put(&submission("far", ItemType::Track, 36.0, 140.0)).await.expect("put");

	let boxes = geo::covering_boxes(&GeoPoint { lat: 35.01, lon: 139.0 }, 500.0);
	let mut found = store
		.candidates(ItemType::Track, &boxes)
		.await
		.expect("candidates")
		.into_iter()
		.map(|s| s.submitter_id)
		.collect::<Vec<_>>();

	found.sort();

	assert_eq!(found, vec!["east".to_string(), "west".to_string()]);
}

#[tokio::test]
async fn wide_boxes_fall_back_to_a_partition_scan() {
	let store = MemoryStore::with_cell_degrees(0.001);

	store.put(&submission("a", ItemType::Track, 10.0, 10.0)).await.expect("put");
	store.put(&submission("b", ItemType::Track, -10.0, -10.0)).await.expect("put");

	let boxes = geo::covering_boxes(&GeoPoint { lat: 0.0, lon: 0.0 }, 2_000_000.0);
	let found = store.candidates(ItemType::Track, &boxes).await.expect("candidates");

	assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn candidates_cross_the_antimeridian() {
	let store = MemoryStore::with_cell_degrees(0.05);

	store.put(&submission("east", ItemType::Track, 0.0, 179.999)).await.expect("put");
	store.put(&submission("west", ItemType::Track, 0.0, -179.999)).await.expect("put");

	let boxes = geo::covering_boxes(&GeoPoint { lat: 0.0, lon: 180.0 }, 1_000.0);
	let found = store.candidates(ItemType::Track, &boxes).await.expect("candidates");

	assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn history_lists_newest_first_and_respects_limit() {
	let store = MemoryStore::with_cell_degrees(0.05);
	let base = OffsetDateTime::UNIX_EPOCH;

	for minutes in [5, 1, 3] {
		store.insert_history(&history("owner", base + Duration::minutes(minutes))).await.expect("insert");
	}

	let listed = store.list_history("owner", ItemType::Track, 2).await.expect("list");

	assert_eq!(listed.len(), 2);
	assert_eq!(listed[0].created_at, base + Duration::minutes(5));
	assert_eq!(listed[1].created_at, base + Duration::minutes(3));
}

#[tokio::test]
async fn history_is_partitioned_by_owner() {
	let store = MemoryStore::with_cell_degrees(0.05);
	let record = history("owner", OffsetDateTime::UNIX_EPOCH);

	store.insert_history(&record).await.expect("insert");

	assert!(store.list_history("someone-else", ItemType::Track, 25).await.expect("list").is_empty());
	assert!(
		store
			.get_history("someone-else", ItemType::Track, record.history_id)
			.await
			.expect("get")
			.is_none()
	);

	let err = store
		.delete_history("someone-else", ItemType::Track, record.history_id)
		.await
		.expect_err("Other owners must not delete the record.");

	assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn repeated_delete_is_not_found() {
	let store = MemoryStore::with_cell_degrees(0.05);
	let record = history("owner", OffsetDateTime::UNIX_EPOCH);

	store.insert_history(&record).await.expect("insert");
	store.delete_history("owner", ItemType::Track, record.history_id).await.expect("delete");

	let err = store
		.delete_history("owner", ItemType::Track, record.history_id)
		.await
		.expect_err("Second delete must fail.");

	assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn throttle_record_is_monotonic() {
	let store = MemoryStore::with_cell_degrees(0.05);
	let later = OffsetDateTime::UNIX_EPOCH + Duration::hours(2);

	assert!(store.throttle_state("client", ItemType::Track).await.expect("state").is_none());

	store.record_submitted("client", ItemType::Track, later).await.expect("record");
	store
		.record_submitted("client", ItemType::Track, OffsetDateTime::UNIX_EPOCH)
		.await
		.expect("record");

	let state = store.throttle_state("client", ItemType::Track).await.expect("state");

	assert_eq!(state.map(|s| s.last_submitted_at), Some(later));
	assert!(store.throttle_state("client", ItemType::Artist).await.expect("state").is_none());
}
