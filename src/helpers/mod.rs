//! Helper functions shared by the build pipeline and the page renderers

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
