mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Favorites, Memory, Postgres, STORAGE_BACKEND_MEMORY, STORAGE_BACKEND_POSTGRES, Search,
	Security, Service, Storage,
};

use std::{fs, path::Path};

use vicinity_domain::gate::MAX_ITEMS_PER_SUBMISSION;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	match cfg.storage.backend.as_str() {
		STORAGE_BACKEND_POSTGRES => {
			let Some(postgres) = cfg.storage.postgres.as_ref() else {
				return Err(Error::Validation {
					message: "storage.postgres is required when storage.backend is postgres."
						.to_string(),
				});
			};

			if postgres.dsn.trim().is_empty() {
				return Err(Error::Validation {
					message: "storage.postgres.dsn must be non-empty.".to_string(),
				});
			}
			if postgres.pool_max_conns == 0 {
				return Err(Error::Validation {
					message: "storage.postgres.pool_max_conns must be greater than zero."
						.to_string(),
				});
			}
		},
		STORAGE_BACKEND_MEMORY => {},
		_ => {
			return Err(Error::Validation {
				message: "storage.backend must be one of postgres or memory.".to_string(),
			});
		},
	}

	let cell = cfg.storage.memory.cell_degrees;

	if !cell.is_finite() || cell <= 0.0 || cell > 90.0 {
		return Err(Error::Validation {
			message: "storage.memory.cell_degrees must be in the range (0.0, 90.0].".to_string(),
		});
	}
	if cfg.search.max_radius_meters == 0 {
		return Err(Error::Validation {
			message: "search.max_radius_meters must be greater than zero.".to_string(),
		});
	}
	// History rows store the radius as a Postgres integer.
	if i64::from(cfg.search.max_radius_meters) > i64::from(i32::MAX) {
		return Err(Error::Validation {
			message: format!("search.max_radius_meters must be at most {}.", i32::MAX),
		});
	}
	if cfg.favorites.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "favorites.api_base must be non-empty.".to_string(),
		});
	}
	if !cfg.favorites.path.starts_with('/') {
		return Err(Error::Validation {
			message: "favorites.path must start with '/'.".to_string(),
		});
	}
	if cfg.favorites.limit == 0 {
		return Err(Error::Validation {
			message: "favorites.limit must be greater than zero.".to_string(),
		});
	}
	if cfg.favorites.limit as usize > MAX_ITEMS_PER_SUBMISSION {
		return Err(Error::Validation {
			message: format!("favorites.limit must be at most {MAX_ITEMS_PER_SUBMISSION}."),
		});
	}
	if cfg.favorites.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "favorites.timeout_ms must be greater than zero.".to_string(),
		});
	}

	for (key, value) in &cfg.favorites.default_headers {
		if !value.is_string() {
			return Err(Error::Validation {
				message: format!("favorites.default_headers.{key} must be a string."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.storage.backend = cfg.storage.backend.trim().to_ascii_lowercase();
	cfg.favorites.api_base = cfg.favorites.api_base.trim().trim_end_matches('/').to_string();

	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}
}
