use std::any::Any;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use crate::info::{DescriptorCell, ScalarKind, TypeDescriptor};
use crate::{Describe, FromValue, FromValueError, Inspect, Introspect, Value};

macro_rules! impl_date {
    ($ty:ty, $path:literal, $ident:literal, |$this:ident| $view:expr, |$date:ident| $build:expr) => {
        impl Describe for $ty {
            fn type_descriptor() -> &'static TypeDescriptor {
                static CELL: DescriptorCell = DescriptorCell::new();
                CELL.get_or_init(|| {
                    TypeDescriptor::new::<Self>($path, $ident, $ident, crate::info::Shape::Scalar(ScalarKind::Date))
                })
            }
        }

        impl Introspect for $ty {
            #[inline]
            fn descriptor(&self) -> &'static TypeDescriptor {
                Self::type_descriptor()
            }

            #[inline]
            fn as_any(&self) -> &dyn Any {
                self
            }

            #[inline]
            fn inspect(&self) -> Inspect<'_> {
                let $this = self;
                Inspect::Date($view)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, FromValueError> {
                match value {
                    Value::Date($date) => Ok($build),
                    other => Err(FromValueError::unexpected($path, "date", &other)),
                }
            }
        }
    };
}

impl_date!(NaiveDateTime, "chrono::NaiveDateTime", "NaiveDateTime", |this| *this, |date| date);
impl_date!(NaiveDate, "chrono::NaiveDate", "NaiveDate", |this| this.and_time(NaiveTime::MIN), |date| date.date());
impl_date!(DateTime<Utc>, "chrono::DateTime<chrono::Utc>", "DateTime", |this| this.naive_utc(), |date| date.and_utc());

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::info::ValueKind;
    use crate::{Describe, FromValue, Inspect, Introspect, Value};

    #[test]
    fn dates_view_as_midnight() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let Inspect::Date(at) = day.inspect() else {
            panic!("expected date");
        };
        assert_eq!(at, day.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(NaiveDate::from_value(Value::Date(at)), Ok(day));
        assert_eq!(NaiveDate::type_descriptor().kind(), ValueKind::Date);
    }

    #[test]
    fn strings_are_not_dates() {
        assert!(NaiveDate::from_value(Value::from("29/02/2024")).is_err());
    }
}
