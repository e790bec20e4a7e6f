pub mod error;

pub use error::{handle_domain_error, handle_refresh_error, validation_error};
