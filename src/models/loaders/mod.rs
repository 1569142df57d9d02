pub mod url_loader;

pub use url_loader::{load_urls_from_file, normalize_url, parse_manual_input, parse_url_file_content};
