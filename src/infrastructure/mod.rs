pub mod database;
pub mod favicon;
pub mod notifier;
pub mod repositories;
