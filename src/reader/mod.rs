pub mod record;
pub mod url_reader;

pub use record::{column_index, split_record};
pub use url_reader::{count_urls, extract_marked_url, ReadStats, UrlReader, UrlSource};
