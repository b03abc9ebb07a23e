//! Client for the upstream service that knows a user's favorite tracks and artists.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;

use vicinity_domain::item::{ItemScore, ItemType};

use crate::{Error, Result};

pub const ITEM_TYPE_PLACEHOLDER: &str = "{item_type}";

/// Path segment the provider uses for each item type.
pub fn collection_name(item_type: ItemType) -> &'static str {
	match item_type {
		ItemType::Track => "tracks",
		ItemType::Artist => "artists",
	}
}

pub fn request_url(cfg: &vicinity_config::Favorites, item_type: ItemType) -> String {
	let path = cfg.path.replace(ITEM_TYPE_PLACEHOLDER, collection_name(item_type));

	format!("{}{}", cfg.api_base, path)
}

pub async fn fetch(
	cfg: &vicinity_config::Favorites,
	access_token: &str,
	item_type: ItemType,
) -> Result<Vec<ItemScore>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let res = client
		.get(request_url(cfg, item_type))
		.headers(crate::auth_headers(access_token, &cfg.default_headers)?)
		.query(&[("limit", cfg.limit)])
		.send()
		.await?;
	let status = res.status();

	if status == StatusCode::UNAUTHORIZED {
		return Err(Error::Unauthenticated);
	}
	if !status.is_success() {
		return Err(Error::Status { status: status.as_u16() });
	}

	let json: Value = res.json().await?;

	parse_favorites_response(json)
}

fn parse_favorites_response(json: Value) -> Result<Vec<ItemScore>> {
	let items = json.get("items").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Favorites response is missing items array.".to_string() }
	})?;
	let mut out = Vec::with_capacity(items.len());

	for item in items {
		let item_id = item
			.get("id")
			.and_then(|v| v.as_str())
			.filter(|id| !id.trim().is_empty())
			.ok_or_else(|| Error::InvalidResponse {
				message: "Favorites item is missing a non-empty id.".to_string(),
			})?;
		let popularity = item.get("popularity").and_then(|v| v.as_u64()).ok_or_else(|| {
			Error::InvalidResponse {
				message: format!("Favorites item {item_id} has no non-negative popularity."),
			}
		})?;

		out.push(ItemScore::new(item_id, popularity));
	}

	Ok(out)
}
