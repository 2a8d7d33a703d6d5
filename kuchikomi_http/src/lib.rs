//! Fetch layer for review pages: a reusable HTTP client with a configurable
//! user-agent policy and a small error taxonomy for transport and status
//! failures.

mod client;
mod errors;
pub mod user_agent;
pub use self::client::{parse_url, resolve_link, Client, ClientConfig};
pub use self::errors::Error;
pub use self::user_agent::UserAgent;
pub use url::Url;
