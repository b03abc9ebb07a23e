use time::{Duration, OffsetDateTime};

/// Minimum interval between two self-submissions from the same client and item type.
pub const THROTTLE_PERIOD: Duration = Duration::milliseconds(600_000);

pub fn should_submit(
	last_submitted_at: Option<OffsetDateTime>,
	now: OffsetDateTime,
	period: Duration,
) -> bool {
	match last_submitted_at {
		None => true,
		Some(last) => now - last >= period,
	}
}
