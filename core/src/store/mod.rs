pub mod seed;

pub use seed::{OperationsSnapshot, OPERATIONS_CENTER, OPERATIONS_SNAPSHOT};
