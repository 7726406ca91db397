use std::fmt;

use veil_schema::Value;
use veil_schema::info::{ScalarKind, Shape, TypeDescriptor};

use crate::DateFormat;

/// A scalar read from the token stream.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Token<'t> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(&'t str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(_) => f.write_str("bool"),
            Self::Int(_) | Self::UInt(_) => f.write_str("integer"),
            Self::Float(_) => f.write_str("float"),
            Self::Str(text) => write!(f, "string {text:?}"),
        }
    }
}

/// What a token was expected to be.
pub(crate) struct Mismatch {
    pub expected: String,
}

/// Converts `token` to a value of the described scalar, enum or untyped shape.
pub(crate) fn coerce(
    token: Token<'_>,
    descriptor: &TypeDescriptor,
    dates: &DateFormat,
) -> Result<Value, Mismatch> {
    let coerced = match descriptor.shape() {
        Shape::Scalar(ScalarKind::Bool) => to_bool(token),
        Shape::Scalar(ScalarKind::Integer) => {
            let value = to_integer(token);
            if let (Some(value), Some(bounds)) = (&value, descriptor.integer_bounds()) {
                let wide = match *value {
                    Value::Int(v) => i128::from(v),
                    Value::UInt(v) => i128::from(v),
                    _ => 0,
                };
                if !bounds.contains(&wide) {
                    return Err(Mismatch {
                        expected: format!("{} in {}..={}", descriptor.name(), bounds.start(), bounds.end()),
                    });
                }
            }
            value
        }
        Shape::Scalar(ScalarKind::Float) => to_float(token),
        Shape::Scalar(ScalarKind::String) => Some(to_string(token)),
        Shape::Scalar(ScalarKind::Date) => {
            return to_date(token, dates).ok_or_else(|| Mismatch {
                expected: format!("date formatted as `{}`", dates.pattern()),
            });
        }
        Shape::Enum(shape) => match token {
            Token::Str(name) if shape.contains(name) => Some(Value::Str(name.to_owned())),
            _ => {
                return Err(Mismatch {
                    expected: format!("one of {:?}", shape.variants()),
                });
            }
        },
        Shape::Any => Some(untyped(token)),
        _ => None,
    };

    coerced.ok_or_else(|| Mismatch {
        expected: descriptor.kind().to_string(),
    })
}

fn untyped(token: Token<'_>) -> Value {
    match token {
        Token::Bool(v) => Value::Bool(v),
        Token::Int(v) => Value::Int(v),
        Token::UInt(v) => Value::UInt(v),
        Token::Float(v) => Value::Float(v),
        Token::Str(v) => Value::Str(v.to_owned()),
    }
}

fn to_bool(token: Token<'_>) -> Option<Value> {
    match token {
        Token::Bool(v) => Some(Value::Bool(v)),
        Token::Str("true") => Some(Value::Bool(true)),
        Token::Str("false") => Some(Value::Bool(false)),
        _ => None,
    }
}

fn to_integer(token: Token<'_>) -> Option<Value> {
    // Bounds of the exactly representable i64 range.
    const MIN: f64 = i64::MIN as f64;
    const MAX: f64 = i64::MAX as f64;

    match token {
        Token::Int(v) => Some(Value::Int(v)),
        Token::UInt(v) => Some(Value::UInt(v)),
        Token::Float(v) if v.fract() == 0.0 && (MIN..MAX).contains(&v) => Some(Value::Int(v as i64)),
        Token::Str(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .map(Value::Int)
                .or_else(|_| text.parse::<u64>().map(Value::UInt))
                .ok()
        }
        _ => None,
    }
}

fn to_float(token: Token<'_>) -> Option<Value> {
    match token {
        Token::Int(v) => Some(Value::Float(v as f64)),
        Token::UInt(v) => Some(Value::Float(v as f64)),
        Token::Float(v) => Some(Value::Float(v)),
        Token::Str(text) => text.trim().parse::<f64>().ok().map(Value::Float),
        Token::Bool(_) => None,
    }
}

fn to_string(token: Token<'_>) -> Value {
    Value::Str(match token {
        Token::Bool(v) => v.to_string(),
        Token::Int(v) => v.to_string(),
        Token::UInt(v) => v.to_string(),
        Token::Float(v) => v.to_string(),
        Token::Str(v) => v.to_owned(),
    })
}

fn to_date(token: Token<'_>, dates: &DateFormat) -> Option<Value> {
    let date = match token {
        Token::Str(text) => dates.parse(text),
        Token::Int(millis) => DateFormat::from_epoch_millis(millis),
        Token::UInt(millis) => DateFormat::from_epoch_millis(i64::try_from(millis).ok()?),
        _ => None,
    };
    date.map(Value::Date)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use veil_schema::Describe;
    use veil_schema::Value;

    use super::{Token, coerce};
    use crate::DateFormat;

    fn ok<T: Describe>(token: Token<'_>) -> Value {
        coerce(token, T::type_descriptor(), &DateFormat::default())
            .ok()
            .unwrap()
    }

    fn fails<T: Describe>(token: Token<'_>) -> String {
        match coerce(token, T::type_descriptor(), &DateFormat::default()) {
            Ok(value) => panic!("coerced to {value:?}"),
            Err(mismatch) => mismatch.expected,
        }
    }

    #[test]
    fn numbers() {
        assert_eq!(ok::<i32>(Token::Str(" 42 ")), Value::Int(42));
        assert_eq!(ok::<i32>(Token::Float(3.0)), Value::Int(3));
        assert_eq!(ok::<u64>(Token::Str("18446744073709551615")), Value::UInt(u64::MAX));
        assert_eq!(fails::<i32>(Token::Float(3.5)), "integer");
        assert_eq!(fails::<i32>(Token::Bool(true)), "integer");
        assert_eq!(fails::<u8>(Token::Int(300)), "u8 in 0..=255");
        assert_eq!(fails::<u8>(Token::Int(-1)), "u8 in 0..=255");
        assert_eq!(fails::<i8>(Token::Str("-129")), "i8 in -128..=127");
        assert_eq!(ok::<u8>(Token::Float(255.0)), Value::Int(255));

        assert_eq!(ok::<f64>(Token::Int(2)), Value::Float(2.0));
        assert_eq!(ok::<f64>(Token::Str("1e3")), Value::Float(1000.0));
        assert_eq!(fails::<f64>(Token::Str("x")), "float");
    }

    #[test]
    fn strings_and_bools() {
        assert_eq!(ok::<String>(Token::Int(12)), Value::from("12"));
        assert_eq!(ok::<String>(Token::Bool(false)), Value::from("false"));
        assert_eq!(ok::<bool>(Token::Str("true")), Value::Bool(true));
        assert_eq!(fails::<bool>(Token::Int(1)), "bool");
    }

    #[test]
    fn dates() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(ok::<chrono::NaiveDateTime>(Token::Str("31/01/2020")), Value::Date(date));
        assert_eq!(
            ok::<chrono::NaiveDateTime>(Token::Int(0)),
            Value::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(
            fails::<chrono::NaiveDateTime>(Token::Str("2020-01-31")),
            "date formatted as `%d/%m/%Y`"
        );
    }

    #[test]
    fn untyped_keeps_tokens() {
        assert_eq!(ok::<Value>(Token::Str("31/01/2020")), Value::from("31/01/2020"));
        assert_eq!(ok::<Value>(Token::UInt(5)), Value::UInt(5));
        assert_eq!(fails::<Vec<i32>>(Token::Int(1)), "sequence");
    }
}
