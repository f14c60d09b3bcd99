pub mod ids;
pub mod request;

pub use ids::*;
pub use request::*;
