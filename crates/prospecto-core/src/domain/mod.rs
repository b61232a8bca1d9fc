pub mod email;
pub mod lead;
pub mod name;
pub mod phone;
pub mod rut;

pub use lead::Lead;
