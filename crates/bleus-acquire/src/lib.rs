pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod html_table;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod types;

pub use config::{BrowserOptions, ScrapeConfig};
pub use error::ScrapeError;
pub use fetch::{BrowserFetcher, FileFetcher, HttpFetcher, PageFetcher};
pub use pipeline::{process, run};
pub use types::{Provenance, RenderedPage, RunReport};
