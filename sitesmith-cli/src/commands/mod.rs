//! CLI command implementations

pub mod auth;
pub mod export;
pub mod fetch;
pub mod form;
pub mod publish;

pub use auth::AuthCommand;
pub use export::ExportCommand;
pub use fetch::FetchCommand;
pub use form::FormCommand;
pub use publish::PublishCommand;
