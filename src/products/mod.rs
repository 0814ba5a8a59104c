//! Product catalogue
//! Mission: CRUD over products, read by any session and written by admins

pub mod store;

pub use store::ProductStore;
