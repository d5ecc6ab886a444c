pub mod http_source;
pub mod util;

pub use http_source::HttpQuoteSource;
