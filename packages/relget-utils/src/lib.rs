pub mod http;
pub mod versioning;

// Re-export main utilities
pub use http::{get, http_get, http_status_is_ok, https_get, ResponseData};
pub use versioning::{cmp_precedence, ParsedVersion};
