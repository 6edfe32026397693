mod authenticate;
mod oauth_client;
mod token;

pub use authenticate::{login, Credentials, SessionCookies};
pub use oauth_client::obtain_access_token;
pub use token::AccessToken;
