use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("Cannot divide {dividend} by zero")]
    DivisionByZero { dividend: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Sum,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    /// Two's-complement arithmetic: overflow wraps instead of panicking.
    /// Division truncates toward zero.
    pub fn apply(self, a: i64, b: i64) -> Result<i64, ArithmeticError> {
        match self {
            Operation::Sum => Ok(a.wrapping_add(b)),
            Operation::Subtract => Ok(a.wrapping_sub(b)),
            Operation::Multiply => Ok(a.wrapping_mul(b)),
            Operation::Divide if b == 0 => Err(ArithmeticError::DivisionByZero { dividend: a }),
            Operation::Divide => Ok(a.wrapping_div(b)),
        }
    }

    /// Word used in the "The <noun> result is" line.
    pub fn noun(self) -> &'static str {
        match self {
            Operation::Sum => "sum",
            Operation::Subtract => "subtraction",
            Operation::Multiply => "multiplication",
            Operation::Divide => "division",
        }
    }
}
