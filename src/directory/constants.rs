/// Adapter names accepted in `directory.adapter`
pub const HTTP_ADAPTER: &str = "http";
pub const FIXTURE_ADAPTER: &str = "fixture";

/// Path segment of the directory's single-address lookup endpoint
pub const IPINFO_PATH: &str = "ipinfo";
