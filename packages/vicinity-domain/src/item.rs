use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
	Track,
	Artist,
}
impl ItemType {
	pub const ALL: [ItemType; 2] = [ItemType::Track, ItemType::Artist];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Track => "track",
			Self::Artist => "artist",
		}
	}
}
impl fmt::Display for ItemType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ItemType {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"track" => Ok(Self::Track),
			"artist" => Ok(Self::Artist),
			_ => Err(Error::UnknownItemType(raw.to_string())),
		}
	}
}

/// One entry of a favorites list: an item and how popular it is for the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemScore {
	pub item_id: String,
	pub popularity: u64,
}
impl ItemScore {
	pub fn new(item_id: impl Into<String>, popularity: u64) -> Self {
		Self { item_id: item_id.into(), popularity }
	}
}
