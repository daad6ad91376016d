mod array;
mod object;
mod value;

pub use array::Array;
pub use object::{IntoIter, Iter, IterMut, Object};
pub use value::Value;
