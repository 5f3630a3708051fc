//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::IndexConfig;
pub use site::SiteConfig;
