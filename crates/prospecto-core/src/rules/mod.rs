pub mod validation;

pub use validation::{validate, Draft, Field};
