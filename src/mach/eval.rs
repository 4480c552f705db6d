use super::host::Readings;
use super::var::VariableTable;
use crate::error;
use crate::lang::cursor::{is_name_start, Cursor};
use crate::lang::Error;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulus,
}

impl Operator {
    pub fn parse(cursor: &mut Cursor) -> Option<Operator> {
        let op = match cursor.peek()? {
            b'+' => Operator::Add,
            b'-' => Operator::Subtract,
            b'*' => Operator::Multiply,
            b'/' => Operator::Divide,
            b'%' => Operator::Modulus,
            _ => return None,
        };
        cursor.advance(1);
        Some(op)
    }

    /// Integer arithmetic. Overflow and division by zero are errors.
    pub fn apply(self, lhs: i32, rhs: i32) -> Result<i32> {
        use Operator::*;
        let result = match self {
            Add => lhs.checked_add(rhs),
            Subtract => lhs.checked_sub(rhs),
            Multiply => lhs.checked_mul(rhs),
            Divide | Modulus if rhs == 0 => return Err(error!(DivisionByZero)),
            Divide => lhs.checked_div(rhs),
            Modulus => lhs.checked_rem(rhs),
        };
        match result {
            Some(n) => Ok(n),
            None => Err(error!(Overflow)),
        }
    }

    pub fn as_str(self) -> &'static str {
        use Operator::*;
        match self {
            Add => "+",
            Subtract => "-",
            Multiply => "*",
            Divide => "/",
            Modulus => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl Comparison {
    pub fn parse(cursor: &mut Cursor) -> Option<Comparison> {
        let second_is_equal = cursor.peek_at(1) == Some(b'=');
        let (cmp, len) = match (cursor.peek()?, second_is_equal) {
            (b'=', true) => (Comparison::Equal, 2),
            (b'!', true) => (Comparison::NotEqual, 2),
            (b'<', true) => (Comparison::LessEqual, 2),
            (b'>', true) => (Comparison::GreaterEqual, 2),
            (b'<', false) => (Comparison::Less, 1),
            (b'>', false) => (Comparison::Greater, 1),
            _ => return None,
        };
        cursor.advance(len);
        Some(cmp)
    }

    pub fn test(self, lhs: i32, rhs: i32) -> bool {
        use Comparison::*;
        match self {
            Equal => lhs == rhs,
            NotEqual => lhs != rhs,
            Less => lhs < rhs,
            Greater => lhs > rhs,
            LessEqual => lhs <= rhs,
            GreaterEqual => lhs >= rhs,
        }
    }

    pub fn as_str(self) -> &'static str {
        use Comparison::*;
        match self {
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
        }
    }
}

/// Reads an optionally signed decimal literal.
pub fn parse_literal(cursor: &mut Cursor) -> Result<i32> {
    let negative = match cursor.peek() {
        Some(b'-') => {
            cursor.advance(1);
            true
        }
        Some(b'+') => {
            cursor.advance(1);
            false
        }
        _ => false,
    };
    let digits = cursor.take_while(|b| b.is_ascii_digit());
    if digits.is_empty() {
        return Err(error!(InvalidOperand));
    }
    let mut n: i64 = 0;
    for d in digits {
        n = n * 10 + i64::from(d - b'0');
        if n > i64::from(i32::max_value()) + 1 {
            return Err(error!(Overflow));
        }
    }
    if negative {
        n = -n;
    }
    if n > i64::from(i32::max_value()) {
        return Err(error!(Overflow));
    }
    Ok(n as i32)
}

/// ## Expression evaluation
///
/// Expressions are one operand, or two operands joined by an arithmetic
/// operator. Conditions are two operands joined by a comparison.

pub struct Evaluator<'a> {
    vars: &'a VariableTable,
    readings: &'a Readings,
}

impl<'a> Evaluator<'a> {
    pub fn new(vars: &'a VariableTable, readings: &'a Readings) -> Evaluator<'a> {
        Evaluator { vars, readings }
    }

    pub fn operand(&self, cursor: &mut Cursor) -> Result<i32> {
        cursor.skip_spaces();
        match cursor.peek() {
            Some(b) if is_name_start(b) => {
                let (slot, len) = self.vars.find(cursor.remaining())?;
                cursor.advance(len);
                self.vars.get(slot)
            }
            Some(b) if b.is_ascii_digit() || b == b'+' || b == b'-' => parse_literal(cursor),
            Some(b'@') => {
                cursor.advance(1);
                match self.readings.find(cursor.remaining()) {
                    Some((id, len)) => {
                        cursor.advance(len);
                        self.readings
                            .read(id)
                            .ok_or_else(|| error!(InvalidReading))
                    }
                    None => Err(error!(InvalidReading)),
                }
            }
            _ => Err(error!(InvalidOperand)),
        }
    }

    pub fn value(&self, cursor: &mut Cursor) -> Result<i32> {
        let lhs = self.operand(cursor)?;
        cursor.skip_spaces();
        match cursor.peek() {
            None | Some(b',') => return Ok(lhs),
            _ => {}
        }
        let op = match Operator::parse(cursor) {
            Some(op) => op,
            None => return Err(error!(MissingOperator)),
        };
        let rhs = self.operand(cursor)?;
        op.apply(lhs, rhs)
    }

    pub fn condition(&self, cursor: &mut Cursor) -> Result<bool> {
        let lhs = self.operand(cursor)?;
        cursor.skip_spaces();
        let cmp = match Comparison::parse(cursor) {
            Some(cmp) => cmp,
            None => return Err(error!(MissingOperator)),
        };
        let rhs = self.operand(cursor)?;
        Ok(cmp.test(lhs, rhs))
    }
}
