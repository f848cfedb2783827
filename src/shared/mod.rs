pub mod dispatchers;
pub mod errors;
pub mod utils;

pub use dispatchers::Dispatchers;
pub use errors::{AppError, AppResult};
