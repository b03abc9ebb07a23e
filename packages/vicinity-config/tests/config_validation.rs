use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use vicinity_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_with<F>(edit: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");

	edit(root);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn section<'a>(root: &'a mut toml::Table, name: &str) -> &'a mut toml::Table {
	root.get_mut(name)
		.and_then(Value::as_table_mut)
		.unwrap_or_else(|| panic!("Template config must include [{name}]."))
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("vicinity_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_payload(payload: String) -> vicinity_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = vicinity_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn expect_validation(payload: String, needle: &str) {
	let err = load_payload(payload).expect_err("Expected validation error.");

	assert!(matches!(err, Error::Validation { .. }), "Unexpected error kind: {err:?}");

	let message = err.to_string();

	assert!(message.contains(needle), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads() {
	let cfg = load_payload(sample_with(|_| {})).expect("Sample config must load.");

	assert_eq!(cfg.storage.backend, "postgres");
	assert_eq!(cfg.search.max_radius_meters, 50_000);
	assert_eq!(cfg.favorites.limit, 50);
	assert!(cfg.security.bind_localhost_only);
}

#[test]
fn api_base_trailing_slash_is_trimmed() {
	let cfg = load_payload(sample_with(|_| {})).expect("Sample config must load.");

	assert_eq!(cfg.favorites.api_base, "https://api.spotify.com");
}

#[test]
fn backend_is_normalized_to_lowercase() {
	let payload = sample_with(|root| {
		section(root, "storage").insert("backend".to_string(), Value::String(" Memory ".into()));
	});
	let cfg = load_payload(payload).expect("Memory backend must load.");

	assert_eq!(cfg.storage.backend, "memory");
}

#[test]
fn unknown_backend_is_rejected() {
	let payload = sample_with(|root| {
		section(root, "storage").insert("backend".to_string(), Value::String("redis".into()));
	});

	expect_validation(payload, "storage.backend must be one of postgres or memory.");
}

#[test]
fn postgres_backend_requires_postgres_section() {
	let payload = sample_with(|root| {
		section(root, "storage").remove("postgres");
	});

	expect_validation(payload, "storage.postgres is required");
}

#[test]
fn memory_backend_does_not_require_postgres_section() {
	let payload = sample_with(|root| {
		let storage = section(root, "storage");

		storage.remove("postgres");
		storage.insert("backend".to_string(), Value::String("memory".into()));
	});
	let cfg = load_payload(payload).expect("Memory backend must load without postgres.");

	assert!(cfg.storage.postgres.is_none());
}

#[test]
fn zero_pool_size_is_rejected() {
	let payload = sample_with(|root| {
		let storage = section(root, "storage");

		section(storage, "postgres").insert("pool_max_conns".to_string(), Value::Integer(0));
	});

	expect_validation(payload, "storage.postgres.pool_max_conns must be greater than zero.");
}

#[test]
fn cell_size_must_be_positive() {
	let payload = sample_with(|root| {
		let storage = section(root, "storage");

		section(storage, "memory").insert("cell_degrees".to_string(), Value::Float(0.0));
	});

	expect_validation(payload, "storage.memory.cell_degrees must be in the range");
}

#[test]
fn max_radius_must_be_positive() {
	let payload = sample_with(|root| {
		section(root, "search").insert("max_radius_meters".to_string(), Value::Integer(0));
	});

	expect_validation(payload, "search.max_radius_meters must be greater than zero.");
}

#[test]
fn max_radius_must_fit_a_postgres_integer() {
	let payload = sample_with(|root| {
		section(root, "search")
			.insert("max_radius_meters".to_string(), Value::Integer(i64::from(i32::MAX) + 1));
	});

	expect_validation(payload, "search.max_radius_meters must be at most 2147483647.");
}

#[test]
fn max_radius_at_the_integer_limit_loads() {
	let payload = sample_with(|root| {
		section(root, "search")
			.insert("max_radius_meters".to_string(), Value::Integer(i64::from(i32::MAX)));
	});
	let cfg = load_payload(payload).expect("Radius at i32::MAX must load.");

	assert_eq!(cfg.search.max_radius_meters, 2_147_483_647);
}

#[test]
fn favorites_limit_is_capped_by_submission_size() {
	let payload = sample_with(|root| {
		section(root, "favorites").insert("limit".to_string(), Value::Integer(201));
	});

	expect_validation(payload, "favorites.limit must be at most 200.");
}

#[test]
fn favorites_limit_at_submission_size_loads() {
	let payload = sample_with(|root| {
		section(root, "favorites").insert("limit".to_string(), Value::Integer(200));
	});
	let cfg = load_payload(payload).expect("Limit of 200 must load.");

	assert_eq!(cfg.favorites.limit, 200);
}

#[test]
fn favorites_path_must_be_absolute() {
	let payload = sample_with(|root| {
		section(root, "favorites")
			.insert("path".to_string(), Value::String("v1/me/top/{item_type}".into()));
	});

	expect_validation(payload, "favorites.path must start with '/'.");
}

#[test]
fn favorites_header_values_must_be_strings() {
	let payload = sample_with(|root| {
		let favorites = section(root, "favorites");

		section(favorites, "default_headers").insert("X-Retry".to_string(), Value::Integer(3));
	});

	expect_validation(payload, "favorites.default_headers.X-Retry must be a string.");
}

#[test]
fn search_section_defaults_when_missing() {
	let payload = sample_with(|root| {
		root.remove("search");
	});
	let cfg = load_payload(payload).expect("Config without [search] must load.");

	assert_eq!(cfg.search.max_radius_meters, 50_000);
}

#[test]
fn missing_file_reports_read_error() {
	let path = env::temp_dir().join("vicinity_config_test_missing_file.toml");
	let err = vicinity_config::load(&path).expect_err("Expected read error.");

	assert!(matches!(err, Error::ReadConfig { .. }), "Unexpected error kind: {err:?}");
}

#[test]
fn malformed_toml_reports_parse_error() {
	let err = load_payload("[service\nhttp_bind = ".to_string()).expect_err("Expected parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error kind: {err:?}");
}
