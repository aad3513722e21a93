pub mod config;
pub mod current;
pub mod error;
pub mod frontmatter;
pub mod io;
pub mod paths;
pub mod spec;
pub mod template;
pub mod transition;
pub mod types;

pub use error::{Result, ZestError};
