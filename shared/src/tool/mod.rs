pub mod error;
pub mod get_id;

pub use error::{AppError, ErrorSeverity};
pub use get_id::IdGenerator;
