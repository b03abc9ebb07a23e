pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("Unknown item type: {0}.")]
	UnknownItemType(String),
	#[error("Latitude must be a finite number in the range -90 to 90, got {0}.")]
	InvalidLatitude(f64),
	#[error("Longitude must be a finite number in the range -180 to 180, got {0}.")]
	InvalidLongitude(f64),
}
