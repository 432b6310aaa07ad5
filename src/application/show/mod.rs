//! Show catalogue management

pub mod catalog;

pub use catalog::ShowCatalog;
