pub mod domain;
pub mod error;
pub mod rules;
pub mod select;
pub mod session;
pub mod time;

pub use domain::Lead;
pub use error::CoreError;
pub use rules::{validate, Draft, Field};
pub use select::{MultiSelect, SelectOption};
pub use session::FormSession;
