//! A client for the Nike+ API, reached through the Nike developer site's request relay.
//!
//! ```no_run
//! # async fn example() -> nikeplus::Result<()> {
//! let client = nikeplus::ApiClient::login("runner@example.com", "password").await?;
//! let totals = client.general_data().await?;
//! let recent = client.activities().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod relay;

pub use api::ApiClient;
pub use auth::{AccessToken, Credentials, SessionCookies};
pub use config::ClientConfig;
pub use error::{ErrorKind, NikeError, Result, Stage, TokenErrorKind};
