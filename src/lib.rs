pub mod config;
pub mod error;
pub mod image_classifier;
pub mod inference;
pub mod label_table;
pub mod library;
pub mod menu;
pub mod server;
