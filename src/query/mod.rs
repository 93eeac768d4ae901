pub mod builder;
pub mod function;
pub mod functions;
pub mod predicate;

pub use builder::{Fill, GroupBy, Order, Query};
pub use function::{Argument, Expression, Flavor};
pub use predicate::{all, any, Criteria, Field, Operand, Operator};
