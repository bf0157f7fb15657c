pub mod market;

pub use market::{ExchangeCode, Market, Period};
