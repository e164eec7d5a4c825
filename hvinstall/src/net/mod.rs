//! Outbound HTTP used for remote documents and webhook delivery.

mod http;

pub use http::{HttpOptions, fetch_url, http_client, is_success_status};
