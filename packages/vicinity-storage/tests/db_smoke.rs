use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use vicinity_config::Postgres;
use vicinity_domain::{
	geo::{self, GeoPoint},
	item::{ItemScore, ItemType},
	records::{HistoryRecord, RankedItem, Submission},
};
use vicinity_storage::{Error, HistoryStore, SubmissionStore, ThrottleStore, db::Db};

async fn bootstrapped(dsn: String) -> Db {
	let cfg = Postgres { dsn, pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn submission(submitter_id: &str, lat: f64, lon: f64) -> Submission {
	Submission {
		submission_id: Uuid::new_v4(),
		submitter_id: submitter_id.to_string(),
		item_type: ItemType::Track,
		items: vec![ItemScore::new("song", 7)],
		location: GeoPoint { lat, lon },
		created_at: OffsetDateTime::UNIX_EPOCH,
	}
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set VICINITY_PG_DSN to run."]
async fn db_connects_and_bootstraps_twice() {
	let Some(base_dsn) = vicinity_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps_twice; set VICINITY_PG_DSN to run.");

		return;
	};

	vicinity_testkit::with_test_db(&base_dsn, |dsn| async move {
		let db = bootstrapped(dsn).await;

		db.ensure_schema().await.expect("Schema bootstrap must be idempotent.");

		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name IN ('geo_submissions', 'search_history', 'submission_throttle')",
		)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 3);

		Ok(())
	})
	.await
	.expect("Failed to run against a test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set VICINITY_PG_DSN to run."]
async fn submissions_round_trip_through_box_queries() {
	let Some(base_dsn) = vicinity_testkit::env_dsn() else {
		eprintln!("Skipping submissions_round_trip_through_box_queries; set VICINITY_PG_DSN to run.");

		return;
	};

	vicinity_testkit::with_test_db(&base_dsn, |dsn| async move {
		let db = bootstrapped(dsn).await;
		let near = submission("near", 35.0, 139.0);

		db.put(&near).await.expect("put");
		db.put(&submission("far", 40.0, 139.0)).await.expect("put");

		let boxes = geo::covering_boxes(&GeoPoint { lat: 35.0, lon: 139.0 }, 1_000.0);
		let found = db.candidates(ItemType::Track, &boxes).await.expect("candidates");

		assert_eq!(found.len(), 1);
		assert_eq!(found[0].submission_id, near.submission_id);
		assert_eq!(found[0].items, near.items);
		assert!(db.candidates(ItemType::Artist, &boxes).await.expect("candidates").is_empty());

		Ok(())
	})
	.await
	.expect("Failed to run against a test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set VICINITY_PG_DSN to run."]
async fn history_orders_and_deletes() {
	let Some(base_dsn) = vicinity_testkit::env_dsn() else {
		eprintln!("Skipping history_orders_and_deletes; set VICINITY_PG_DSN to run.");

		return;
	};

	vicinity_testkit::with_test_db(&base_dsn, |dsn| async move {
		let db = bootstrapped(dsn).await;
		let base = OffsetDateTime::UNIX_EPOCH + Duration::days(20_000);
		let mut ids = Vec::new();

		for minutes in 0..3 {
			let record = HistoryRecord {
				history_id: Uuid::new_v4(),
				owner_id: "owner".to_string(),
				item_type: ItemType::Artist,
				items: vec![RankedItem { rank: 1, item_id: "band".to_string(), popularity: 4 }],
				location: GeoPoint { lat: 1.0, lon: 2.0 },
				radius_meters: 500,
				created_at: base + Duration::minutes(minutes),
			};

			db.insert_history(&record).await.expect("insert");
			ids.push(record.history_id);
		}

		let listed = db.list_history("owner", ItemType::Artist, 25).await.expect("list");
		let listed_ids = listed.iter().map(|record| record.history_id).collect::<Vec<_>>();

		assert_eq!(listed_ids, vec![ids[2], ids[1], ids[0]]);

		db.delete_history("owner", ItemType::Artist, ids[1]).await.expect("delete");

		let err = db
			.delete_history("owner", ItemType::Artist, ids[1])
			.await
			.expect_err("Second delete must fail.");

		assert!(matches!(err, Error::NotFound(_)));

		Ok(())
	})
	.await
	.expect("Failed to run against a test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set VICINITY_PG_DSN to run."]
async fn throttle_upsert_never_moves_backwards() {
	let Some(base_dsn) = vicinity_testkit::env_dsn() else {
		eprintln!("Skipping throttle_upsert_never_moves_backwards; set VICINITY_PG_DSN to run.");

		return;
	};

	vicinity_testkit::with_test_db(&base_dsn, |dsn| async move {
		let db = bootstrapped(dsn).await;
		let later = OffsetDateTime::UNIX_EPOCH + Duration::days(20_000);

		db.record_submitted("client", ItemType::Track, later).await.expect("record");
		db.record_submitted("client", ItemType::Track, later - Duration::hours(1))
			.await
			.expect("record");

		let state = db.throttle_state("client", ItemType::Track).await.expect("state");

		assert_eq!(state.map(|s| s.last_submitted_at), Some(later));

		Ok(())
	})
	.await
	.expect("Failed to run against a test database.");
}
