pub mod pagespeed_client;
pub mod title_client;

pub use pagespeed_client::PageSpeedClient;
pub use title_client::TitleClient;
