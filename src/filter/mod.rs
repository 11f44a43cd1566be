pub mod filter;
pub mod filter_where;
pub mod types;

pub use filter::ContactFilter;
pub use types::*;
