pub mod errors;
pub mod favicons;
pub mod ids;
pub mod notifications;
pub mod repositories;
pub mod resolver;
pub mod sites;

// Re-exports
pub use errors::RepositoryError;
