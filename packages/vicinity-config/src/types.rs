use serde::Deserialize;
use serde_json::{Map, Value};

pub const STORAGE_BACKEND_POSTGRES: &str = "postgres";
pub const STORAGE_BACKEND_MEMORY: &str = "memory";

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub search: Search,
	pub favorites: Favorites,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	/// Either "postgres" or "memory". The memory backend keeps everything in process and is
	/// meant for demos and tests.
	pub backend: String,
	pub postgres: Option<Postgres>,
	#[serde(default)]
	pub memory: Memory,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Memory {
	/// Edge length, in degrees, of one spatial index cell.
	pub cell_degrees: f64,
}
impl Default for Memory {
	fn default() -> Self {
		Self { cell_degrees: 0.05 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub max_radius_meters: u32,
}
impl Default for Search {
	fn default() -> Self {
		Self { max_radius_meters: 50_000 }
	}
}

#[derive(Debug, Deserialize)]
pub struct Favorites {
	pub api_base: String,
	/// Request path. `{item_type}` is replaced with `tracks` or `artists`.
	pub path: String,
	#[serde(default = "default_favorites_limit")]
	pub limit: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
}
impl Default for Security {
	fn default() -> Self {
		Self { bind_localhost_only: true }
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_favorites_limit() -> u32 {
	50
}
