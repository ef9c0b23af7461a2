//! Arbitrary-precision decimal numbers: `coefficient × 10^exp` with a
//! `BigInt` coefficient, plus the four arithmetic operations at a fixed
//! division precision (default 8 significant digits, round half-up).

use num_bigint::BigInt;
use num_traits::{Pow, Signed, ToPrimitive, Zero};

use crate::error::{self, Diagnostic};

const MAX_DIGIT_COUNT: usize = 18; // XXXXXXXX.XXXXXXXXXX
const MAX_LEAD_DECIMAL_ZERO: usize = 6; // 0.XXXXXX1234
const MAX_SCI_DIGIT_COUNT: usize = 8; // 2.XXXXXXXX *10^ N

pub const DEFAULT_PRECISION: usize = 8;

#[derive(Debug, Clone, Eq)]
pub struct Decimal {
    co: BigInt,
    exp: i32,
}

impl Decimal {
    pub fn from_int(value: i64, exp: i32) -> Self {
        Self {
            co: BigInt::from(value),
            exp,
        }
    }

    pub fn zero() -> Self {
        Self {
            co: BigInt::zero(),
            exp: 0,
        }
    }

    /// Parse a number literal as scanned by the lexer: optional sign,
    /// digits with optional point, optional exponent marked `E`, `e`,
    /// `*10^` or `*^`. Underscores were already dropped by the lexer but
    /// are tolerated here.
    pub fn parse(raw: &str) -> Result<Self, Diagnostic> {
        const S_BEGIN: u8 = 1;
        const S_INT_NUM: u8 = 3;
        const S_DOT_NUM: u8 = 6;
        const S_EXP_NUM: u8 = 7;

        let chars: Vec<char> = raw.chars().collect();
        let mut int_part = String::new();
        let mut exp_part = String::new();
        let mut dot_count: i32 = 0;

        let mut state = S_BEGIN;
        let mut idx = 0;
        while idx < chars.len() {
            let ch = chars[idx];
            if ch == '_' {
                idx += 1;
                continue;
            }
            match state {
                S_BEGIN => match ch {
                    '+' => state = S_INT_NUM,
                    '-' => {
                        state = S_INT_NUM;
                        int_part.push('-');
                    }
                    '.' => state = S_DOT_NUM,
                    _ => {
                        state = S_INT_NUM;
                        int_part.push(ch);
                    }
                },
                S_INT_NUM | S_DOT_NUM => match ch {
                    '.' if state == S_INT_NUM => state = S_DOT_NUM,
                    '*' => {
                        // *^N or *10^N
                        state = S_EXP_NUM;
                        if chars.get(idx + 1) == Some(&'^') {
                            idx += 1;
                        } else {
                            idx += 3;
                        }
                    }
                    'E' | 'e' => state = S_EXP_NUM,
                    _ => {
                        int_part.push(ch);
                        if state == S_DOT_NUM {
                            dot_count += 1;
                        }
                    }
                },
                _ => exp_part.push(ch),
            }
            idx += 1;
        }

        let co: BigInt = int_part
            .parse()
            .map_err(|_| error::parse_from_string_error(raw))?;
        let exp_int: i32 = if exp_part.is_empty() {
            0
        } else {
            exp_part
                .parse()
                .map_err(|_| error::parse_from_string_error(raw))?
        };

        Ok(Self {
            co,
            exp: exp_int - dot_count,
        })
    }

    pub fn is_zero(&self) -> bool {
        self.co.is_zero()
    }

    /// True when the number carries no fractional part (`exp >= 0`).
    pub fn is_integer(&self) -> bool {
        self.exp >= 0
    }

    /// Export as a machine integer when `exp >= 0` and the coefficient
    /// fits; otherwise a conversion error.
    pub fn as_integer(&self) -> Result<i64, Diagnostic> {
        if self.exp < 0 {
            return Err(error::to_integer_error(&self.to_string()));
        }
        let scaled = &self.co * pow10(self.exp as u32);
        scaled
            .to_i64()
            .ok_or_else(|| error::to_integer_error(&self.to_string()))
    }

    /// Numeric comparison at a rescaled common exponent.
    pub fn cmp_value(&self, other: &Decimal) -> std::cmp::Ordering {
        let (a, b) = rescale_pair(self, other);
        a.co.cmp(&b.co)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_value(other) == std::cmp::Ordering::Equal
    }
}

impl std::fmt::Display for Decimal {
    /// Canonical display: plain integer, embedded point, leading-zero
    /// fraction, or scientific with `⏨`, depending on where the implicit
    /// point lands.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.co.is_negative() { "-" } else { "" };
        let txt = self.co.abs().to_string();
        let digit_count = txt.len() as i64;
        let point_pos = self.exp as i64 + digit_count;

        // CASE I: integer, optionally with trailing zeros
        if digit_count <= point_pos && point_pos <= MAX_DIGIT_COUNT as i64 {
            if self.exp > 0 {
                let zeros = "0".repeat(self.exp as usize);
                return write!(f, "{sign}{txt}{zeros}");
            }
            return write!(f, "{sign}{txt}");
        }
        // CASE II: point inside the digit string
        if point_pos <= MAX_DIGIT_COUNT as i64
            && point_pos < digit_count
            && point_pos > 0
            && digit_count <= MAX_DIGIT_COUNT as i64
        {
            let pp = point_pos as usize;
            return write!(f, "{sign}{}.{}", &txt[..pp], &txt[pp..]);
        }
        // CASE III: 0.00…DDDD
        if point_pos <= 0 && point_pos > -(MAX_LEAD_DECIMAL_ZERO as i64) {
            let zeros = "0".repeat((-point_pos) as usize);
            return write!(f, "{sign}0.{zeros}{txt}");
        }
        // CASE IV: scientific
        if digit_count > MAX_SCI_DIGIT_COUNT as i64 {
            return write!(
                f,
                "{sign}{}.{}⏨{}",
                &txt[..1],
                &txt[1..=MAX_SCI_DIGIT_COUNT],
                point_pos - 1
            );
        }
        if digit_count > 1 {
            return write!(f, "{sign}{}.{}⏨{}", &txt[..1], &txt[1..], point_pos - 1);
        }
        write!(f, "{sign}{txt}⏨{}", point_pos - 1)
    }
}

fn pow10(exp: u32) -> BigInt {
    BigInt::from(10).pow(exp)
}

/// Bring two decimals to the same exponent (the smaller one).
fn rescale_pair(d1: &Decimal, d2: &Decimal) -> (Decimal, Decimal) {
    if d1.exp == d2.exp {
        return (d1.clone(), d2.clone());
    }
    if d1.exp > d2.exp {
        let diff = (d1.exp - d2.exp) as u32;
        let scaled = Decimal {
            co: &d1.co * pow10(diff),
            exp: d2.exp,
        };
        return (scaled, d2.clone());
    }
    let diff = (d2.exp - d1.exp) as u32;
    let scaled = Decimal {
        co: &d2.co * pow10(diff),
        exp: d1.exp,
    };
    (d1.clone(), scaled)
}

/// Arithmetic over decimals at a configured division precision.
pub struct Arith {
    precision: usize,
}

impl Arith {
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    pub fn add(&self, a: &Decimal, b: &Decimal) -> Decimal {
        let (r1, r2) = rescale_pair(a, b);
        Decimal {
            co: r1.co + r2.co,
            exp: r1.exp,
        }
    }

    pub fn sub(&self, a: &Decimal, b: &Decimal) -> Decimal {
        let (r1, r2) = rescale_pair(a, b);
        Decimal {
            co: r1.co - r2.co,
            exp: r1.exp,
        }
    }

    pub fn mul(&self, a: &Decimal, b: &Decimal) -> Decimal {
        Decimal {
            co: &a.co * &b.co,
            exp: a.exp + b.exp,
        }
    }

    /// Precision-controlled long division with round half-up. A zero
    /// dividend short-circuits to zero; a zero divisor is an error.
    pub fn div(&self, a: &Decimal, b: &Decimal) -> Result<Decimal, Diagnostic> {
        if a.co.is_zero() {
            return Ok(a.clone());
        }
        if b.co.is_zero() {
            return Err(error::arith_div_zero());
        }

        let ten = BigInt::from(10);
        let negative = a.co.is_negative() != b.co.is_negative();
        let mut dividend = a.co.abs();
        let mut divisor = b.co.abs();

        // align magnitudes, tracking the shift
        let mut adjust: i32 = 0;
        if dividend < divisor {
            let upper = &divisor * &ten;
            while !(dividend >= divisor && dividend < upper) {
                dividend *= &ten;
                adjust += 1;
            }
        } else {
            let upper = &dividend * &ten;
            while !(divisor >= dividend && divisor < upper) {
                divisor *= &ten;
                adjust -= 1;
            }
        }

        let prec_factor = if adjust < 0 {
            self.precision
        } else {
            self.precision - 1
        } as i32;

        let scaled = dividend * pow10(prec_factor as u32);
        let mut quotient = &scaled / &divisor;
        let remainder = &scaled % &divisor;

        // round half-up
        if remainder * 2 > divisor {
            quotient += 1;
        }
        if negative {
            quotient = -quotient;
        }

        Ok(Decimal {
            co: quotient,
            exp: a.exp - b.exp - adjust - prec_factor,
        })
    }
}

impl Default for Arith {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: i64, exp: i32) -> Decimal {
        Decimal::from_int(value, exp)
    }

    #[test]
    fn displays_four_layouts() {
        assert_eq!(dec(10241024, 0).to_string(), "10241024");
        assert_eq!(dec(12345, 4).to_string(), "123450000");
        assert_eq!(dec(1234, -3).to_string(), "1.234");
        assert_eq!(dec(1217543, -9).to_string(), "0.001217543");
        assert_eq!(dec(-255, -1).to_string(), "-25.5");
        // point too far left for a plain fraction
        assert_eq!(dec(123, -10).to_string(), "1.23⏨-8");
        // too many digits for a plain integer
        assert_eq!(
            dec(1234567890123456789, 1).to_string(),
            "1.23456789⏨19"
        );
    }

    #[test]
    fn parses_literal_forms() {
        assert_eq!(Decimal::parse("10").expect("parse"), dec(10, 0));
        assert_eq!(Decimal::parse("-0.25").expect("parse"), dec(-25, -2));
        assert_eq!(Decimal::parse("3.1415926").expect("parse"), dec(31415926, -7));
        assert_eq!(Decimal::parse("2.5E-3").expect("parse"), dec(25, -4));
        assert_eq!(Decimal::parse("314159*10^-8").expect("parse"), dec(314159, -8));
        assert_eq!(Decimal::parse("31*^2").expect("parse"), dec(31, 2));
        assert_eq!(Decimal::parse(".5").expect("parse"), dec(5, -1));
    }

    #[test]
    fn equality_rescales() {
        assert_eq!(dec(10, 0), dec(100, -1));
        assert_ne!(dec(10, 0), dec(101, -1));
    }

    #[test]
    fn addition_commutes_and_rescales() {
        let arith = Arith::default();
        let a = dec(255, -1); // 25.5
        let b = dec(5, 0);
        assert_eq!(arith.add(&a, &b).to_string(), "30.5");
        assert_eq!(arith.add(&a, &b), arith.add(&b, &a));
    }

    #[test]
    fn multiplication_associates() {
        let arith = Arith::default();
        let (a, b, c) = (dec(12, -1), dec(25, 0), dec(4, 2));
        let left = arith.mul(&arith.mul(&a, &b), &c);
        let right = arith.mul(&a, &arith.mul(&b, &c));
        assert_eq!(left, right);
    }

    #[test]
    fn division_keeps_eight_significant_digits() {
        let arith = Arith::default();
        let third = arith.div(&dec(1, 0), &dec(3, 0)).expect("divide");
        assert_eq!(third.to_string(), "0.33333333");
        let two_thirds = arith.div(&dec(2, 0), &dec(3, 0)).expect("divide");
        // round half-up on the trailing digit
        assert_eq!(two_thirds.to_string(), "0.66666667");
    }

    #[test]
    fn division_by_zero_rules() {
        let arith = Arith::default();
        let err = arith.div(&dec(5, 0), &Decimal::zero()).expect_err("div zero");
        assert_eq!(err.code(), 0x2601);
        // zero dividend short-circuits, even over a zero divisor
        assert_eq!(arith.div(&Decimal::zero(), &Decimal::zero()).expect("zero"), Decimal::zero());
    }

    #[test]
    fn integer_narrowing() {
        assert_eq!(dec(12, 0).as_integer().expect("int"), 12);
        assert_eq!(dec(12, 2).as_integer().expect("int"), 1200);
        let err = dec(125, -1).as_integer().expect_err("fractional");
        assert_eq!(err.code(), 0x2603);
    }
}
