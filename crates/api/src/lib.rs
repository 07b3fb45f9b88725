pub mod config;
pub mod logging;
pub mod routes;
pub mod session;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use session::{AppContext, UiMessage, analyze_document, analyze_path};
