mod types;

pub use types::{CallNode, CallType};
