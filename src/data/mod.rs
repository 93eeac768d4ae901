pub mod value;

pub use value::{DataType, Value};
