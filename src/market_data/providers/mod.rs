pub(crate) mod brapi_provider;
pub(crate) mod yahoo_provider;

pub use brapi_provider::BrapiProvider;
pub use yahoo_provider::YahooProvider;
