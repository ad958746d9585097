pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod http;
pub mod model;
pub mod static_files;
pub mod types;
