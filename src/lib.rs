pub mod cli;
pub mod error;
pub mod io;
pub mod model;
pub mod ops;
pub mod store;

pub use error::{HabitError, StoreOp, ValidationError};
pub use ops::book::HabitBook;
pub use store::{HabitStore, StoreError};
