pub mod json_store;
pub mod lock;

pub use json_store::UserStore;
