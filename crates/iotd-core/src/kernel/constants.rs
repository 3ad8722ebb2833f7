/// Application name
pub const APP_NAME: &str = "iotd";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default query service port
pub const DEFAULT_SERVICE_PORT: u16 = crate::config::DEFAULT_SERVICE_PORT;

/// Name under which the getter manager registers as a kernel component
pub const GETTER_MANAGER_NAME: &str = "DataGetterManager";

/// Name under which the query front-end registers as a kernel component
pub const QUERY_SERVICE_NAME: &str = "QueryService";
