pub mod common;
pub mod drink;
pub mod order;
pub mod pagination;
pub mod stats;
pub mod sync;
pub mod user;

pub use common::*;
pub use drink::*;
pub use order::*;
pub use pagination::*;
pub use stats::*;
pub use sync::*;
pub use user::*;
