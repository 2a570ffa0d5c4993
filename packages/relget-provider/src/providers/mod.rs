//! Release provider implementations.
//!
//! Each provider implements `ReleaseProvider`, supplying its listing URL and
//! request headers; pagination, status mapping and decoding are shared.

pub mod gitea;
pub mod github;

pub use gitea::GiteaProvider;
pub use github::GitHubProvider;
