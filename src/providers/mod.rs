pub mod demo;
pub mod exchangerate_api;

pub use demo::DemoRateSource;
pub use exchangerate_api::ExchangeRateApiProvider;
