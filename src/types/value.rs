// Copyright 2024 RisingLight Project Authors. Licensed under Apache-2.0.

use ordered_float::OrderedFloat;
use parse_display::Display;
use serde::{Deserialize, Serialize};

use super::*;

/// A wrapper around floats providing implementations of `Eq`, `Ord`, and `Hash`.
pub type F32 = OrderedFloat<f32>;
pub type F64 = OrderedFloat<f64>;

/// A scalar value of one of the supported column types.
#[derive(Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataValue {
    #[display("{0}")]
    Int32(i32),
    #[display("{0}")]
    Int64(i64),
    #[display("{0}")]
    Float32(F32),
    #[display("{0}")]
    Float64(F64),
    #[display("'{0}'")]
    String(String),
}

impl DataValue {
    /// Get the type of value.
    pub fn data_type(&self) -> DataTypeKind {
        match self {
            Self::Int32(_) => DataTypeKind::Int32,
            Self::Int64(_) => DataTypeKind::Int64,
            Self::Float32(_) => DataTypeKind::Float32,
            Self::Float64(_) => DataTypeKind::Float64,
            Self::String(_) => DataTypeKind::String,
        }
    }

    /// Recover a concrete value.
    ///
    /// Lossless numeric conversions are accepted, e.g. an `Int32` value can be
    /// read as `i64` or `f64`. Everything else fails with [`ConvertError::Cast`].
    pub fn cast<T: NativeType>(&self) -> Result<T, ConvertError> {
        T::try_from(self)
    }

    fn cast_err(&self, ty: DataTypeKind) -> ConvertError {
        ConvertError::Cast(self.to_string(), ty)
    }
}

impl TryFrom<&DataValue> for i32 {
    type Error = ConvertError;

    fn try_from(value: &DataValue) -> Result<Self, Self::Error> {
        match value {
            DataValue::Int32(v) => Ok(*v),
            DataValue::Int64(v) => (*v)
                .try_into()
                .map_err(|_| value.cast_err(DataTypeKind::Int32)),
            _ => Err(value.cast_err(DataTypeKind::Int32)),
        }
    }
}

impl TryFrom<&DataValue> for i64 {
    type Error = ConvertError;

    fn try_from(value: &DataValue) -> Result<Self, Self::Error> {
        match value {
            DataValue::Int32(v) => Ok(i64::from(*v)),
            DataValue::Int64(v) => Ok(*v),
            _ => Err(value.cast_err(DataTypeKind::Int64)),
        }
    }
}

impl TryFrom<&DataValue> for F32 {
    type Error = ConvertError;

    fn try_from(value: &DataValue) -> Result<Self, Self::Error> {
        match value {
            DataValue::Float32(v) => Ok(*v),
            _ => Err(value.cast_err(DataTypeKind::Float32)),
        }
    }
}

impl TryFrom<&DataValue> for F64 {
    type Error = ConvertError;

    fn try_from(value: &DataValue) -> Result<Self, Self::Error> {
        match value {
            DataValue::Int32(v) => Ok(OrderedFloat(f64::from(*v))),
            DataValue::Float32(v) => Ok(OrderedFloat(f64::from(v.0))),
            DataValue::Float64(v) => Ok(*v),
            _ => Err(value.cast_err(DataTypeKind::Float64)),
        }
    }
}

impl TryFrom<&DataValue> for String {
    type Error = ConvertError;

    fn try_from(value: &DataValue) -> Result<Self, Self::Error> {
        match value {
            DataValue::String(v) => Ok(v.clone()),
            _ => Err(value.cast_err(DataTypeKind::String)),
        }
    }
}

macro_rules! impl_from_native {
    ($($t:ty => $variant:ident),*) => {
        $(
            impl From<$t> for DataValue {
                fn from(v: $t) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_native! {
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    F32 => Float32,
    f64 => Float64,
    F64 => Float64,
    String => String,
    &str => String
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_exact() {
        assert_eq!(DataValue::from(7).cast::<i32>(), Ok(7));
        assert_eq!(DataValue::from(7i64).cast::<i64>(), Ok(7));
        assert_eq!(DataValue::from(1.5f32).cast::<F32>(), Ok(OrderedFloat(1.5)));
        assert_eq!(DataValue::from(2.5).cast::<F64>(), Ok(OrderedFloat(2.5)));
        assert_eq!(
            DataValue::from("Hasso").cast::<String>(),
            Ok("Hasso".to_string())
        );
    }

    #[test]
    fn test_cast_widening() {
        assert_eq!(DataValue::from(3).cast::<i64>(), Ok(3));
        assert_eq!(DataValue::from(3).cast::<F64>(), Ok(OrderedFloat(3.0)));
        assert_eq!(DataValue::from(0.5f32).cast::<F64>(), Ok(OrderedFloat(0.5)));
        assert_eq!(DataValue::from(42i64).cast::<i32>(), Ok(42));
    }

    #[test]
    fn test_cast_incompatible() {
        assert_eq!(
            DataValue::from("3").cast::<i32>(),
            Err(ConvertError::Cast("'3'".into(), DataTypeKind::Int32))
        );
        assert!(DataValue::from(3).cast::<String>().is_err());
        assert!(DataValue::from(1.0).cast::<i64>().is_err());
        assert!(DataValue::from(i64::MAX).cast::<i32>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(DataValue::from("Alexander") < DataValue::from("Bill"));
        assert!(DataValue::from(-1.0) < DataValue::from(0.0));
        assert_eq!(DataValue::from(3).data_type(), DataTypeKind::Int32);
    }
}
