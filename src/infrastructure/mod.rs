pub mod http;
pub mod mock;
pub mod observability;
pub mod yahoo;
