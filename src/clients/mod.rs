pub mod flexible;
pub mod http;
pub mod mock;

pub use flexible::*;
pub use http::*;
pub use mock::*;
