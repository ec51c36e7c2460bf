pub mod code_generator;
pub mod jwt;
pub mod password;
pub mod time;
pub mod validation;

pub use code_generator::{generate_order_number, generate_receipt_number};
pub use jwt::*;
pub use password::*;
pub use validation::*;
