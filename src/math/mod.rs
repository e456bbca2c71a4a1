pub mod matrix;
pub mod stack;

pub use matrix::Matrix;
pub use stack::Stack;
