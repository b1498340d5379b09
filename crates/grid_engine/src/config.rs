pub const GRID_WIDTH: usize = 256;
pub const GRID_HEIGHT: usize = 256;

/// Edge length, in cells, of one spatial-hash bucket. Tuned to the median
/// service-coverage query radius; larger buckets mean fewer buckets to scan
/// per query but more candidates to filter.
pub const BUCKET_CELLS: usize = 8;

/// Fraction of the original placement cost returned when a building is
/// demolished.
pub const REFUND_FRACTION: f64 = 0.5;

/// Treasury balance for a fresh city.
pub const STARTING_FUNDS: i64 = 10_000;
