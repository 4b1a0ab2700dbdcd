pub mod alimarket;
pub mod gds;
pub mod mxnzp;
pub mod pace;
pub mod provider;
pub mod tianapi;
pub(crate) mod util;

pub use alimarket::AliMarketProvider;
pub use gds::GdsProvider;
pub use mxnzp::MxnzpProvider;
pub use pace::RateGate;
pub use provider::{MockProvider, ProductProvider};
pub use tianapi::TianApiProvider;
