pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod model;
pub mod repository;
pub mod session;
pub mod storage;

pub use error::AppError;
pub use session::Session;
pub use storage::UserStore;
