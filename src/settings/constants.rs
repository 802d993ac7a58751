/// Example configuration
pub const DEFAULT_CONFIG: &str = r#"
# Logging configuration
[log]
# Level can be "error", "warn", "info", "debug", or "trace"
level = "info"

# Geo directory configuration
[directory]
# Directory client: "http" or "fixture"
adapter = "http"

# Records served by the "fixture" client (JSON object keyed by address)
# fixture_path = "fixtures/directory.json"

# Connection settings. Pool size, timeout and the primary server are required;
# without them no connection is made.
[directory.properties]
connection_pool_size = "10"
client_timeout_ms = "500"
primary_server_ip = "127.0.0.1"
primary_server_port = "7000"

# Optional failover server, used only when both ip and port are set
# secondary_server_ip = ""
# secondary_server_port = ""

# Minimum city confidence required to report zip, city and state
city_confidence_threshold = "0"

# NON-PRODUCTION ONLY: query this address instead of the requested one
# ip_address_override = ""
"#;
