pub mod aggregate;
pub mod errors;
pub mod models;
pub mod preview;
pub mod schema;
pub mod validate;

pub use aggregate::*;
pub use errors::*;
pub use models::*;
pub use preview::*;
pub use schema::*;
pub use validate::*;
