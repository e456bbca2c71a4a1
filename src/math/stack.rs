use crate::math::matrix::Matrix;

/// Fixed-capacity LIFO buffer of matrices.
///
/// The forward pass pushes one activation per layer; the backward pass pops
/// them in reverse and pushes one gradient per non-input layer. Exceeding the
/// capacity or popping an empty stack means the chain and the stack were sized
/// for different networks, so both panic.
#[derive(Debug)]
pub struct Stack {
    capacity: usize,
    items: Vec<Matrix>,
}

impl Stack {
    pub fn new(capacity: usize) -> Stack {
        Stack {
            capacity,
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, m: Matrix) {
        if self.items.len() + 1 > self.capacity {
            panic!("stack overflow");
        }
        self.items.push(m);
    }

    pub fn pop(&mut self) -> Matrix {
        match self.items.pop() {
            Some(m) => m,
            None => panic!("stack underflow"),
        }
    }

    pub fn peek(&self) -> &Matrix {
        match self.items.last() {
            Some(m) => m,
            None => panic!("stack underflow"),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
