//! Command implementations.

pub mod ask;
pub mod check;
pub mod schema;

pub use self::ask::execute_ask;
pub use self::check::execute_check;
pub use self::schema::execute_schema;
