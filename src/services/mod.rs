pub mod browser;
pub mod dispatcher;
pub mod extractors;

pub use dispatcher::TrailerDispatcher;
