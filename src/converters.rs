//! Default scalar converter suite.
//!
//! Point-to-point converters and factories for the builtin value types:
//! string parsing, to-string rendering, boolean text forms, and
//! bounds-checked number-to-number conversions. Registered by
//! [`crate::ConversionService::with_defaults`]; each is also usable
//! standalone on a plain service.

use std::sync::Arc;

use recast_registry::{
    builtin, ConversionError, Converter, ConverterFactory, ConvertiblePair, TypeKey, Value,
};

use crate::service::ConversionService;

/// Register the default scalar suite into a service.
pub(crate) fn register_defaults(service: &mut ConversionService) {
    service.add_converter(BoolToString);
    service.add_converter(StringToBool);
    service.add_converter(IntToString);
    service.add_converter(UIntToString);
    service.add_converter(FloatToString);
    service.add_converter_factory(StringToNumberFactory);
    service.add_converter_factory(NumberToNumberFactory);
}

fn mismatch(expected: &'static str, actual: &Value) -> ConversionError {
    ConversionError::TypeMismatch {
        expected,
        actual: actual.kind_name(),
    }
}

/// `bool` to its text form.
pub struct BoolToString;

impl Converter for BoolToString {
    fn pair(&self) -> ConvertiblePair {
        ConvertiblePair::new(builtin::BOOL, builtin::STRING)
    }

    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Bool(b) => Ok(Value::Str(b.to_string())),
            other => Err(mismatch("bool", other)),
        }
    }
}

/// Text forms to `bool`: true/false, yes/no, on/off, 1/0.
pub struct StringToBool;

impl Converter for StringToBool {
    fn pair(&self) -> ConvertiblePair {
        ConvertiblePair::new(builtin::STRING, builtin::BOOL)
    }

    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        let Value::Str(s) = value else {
            return Err(mismatch("string", value));
        };
        match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            other => Err(ConversionError::invalid(format!(
                "'{other}' is not a boolean"
            ))),
        }
    }
}

/// `int` to its decimal text form.
pub struct IntToString;

impl Converter for IntToString {
    fn pair(&self) -> ConvertiblePair {
        ConvertiblePair::new(builtin::INT, builtin::STRING)
    }

    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Int(i) => Ok(Value::Str(i.to_string())),
            other => Err(mismatch("int", other)),
        }
    }
}

/// `uint` to its decimal text form.
pub struct UIntToString;

impl Converter for UIntToString {
    fn pair(&self) -> ConvertiblePair {
        ConvertiblePair::new(builtin::UINT, builtin::STRING)
    }

    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::UInt(u) => Ok(Value::Str(u.to_string())),
            other => Err(mismatch("uint", other)),
        }
    }
}

/// `float` to its text form.
pub struct FloatToString;

impl Converter for FloatToString {
    fn pair(&self) -> ConvertiblePair {
        ConvertiblePair::new(builtin::FLOAT, builtin::STRING)
    }

    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Float(x) => Ok(Value::Str(x.to_string())),
            other => Err(mismatch("float", other)),
        }
    }
}

/// Parses a string into one concrete numeric type.
pub struct StringToNumber {
    target: TypeKey,
}

impl Converter for StringToNumber {
    fn pair(&self) -> ConvertiblePair {
        ConvertiblePair::new(builtin::STRING, self.target)
    }

    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        let Value::Str(s) = value else {
            return Err(mismatch("string", value));
        };
        let text = s.trim();
        if self.target == builtin::INT {
            text.parse::<i64>()
                .map(Value::Int)
                .map_err(|e| ConversionError::invalid(format!("'{text}': {e}")))
        } else if self.target == builtin::UINT {
            text.parse::<u64>()
                .map(Value::UInt)
                .map_err(|e| ConversionError::invalid(format!("'{text}': {e}")))
        } else {
            text.parse::<f64>()
                .map(Value::Float)
                .map_err(|e| ConversionError::invalid(format!("'{text}': {e}")))
        }
    }
}

/// Factory over the numeric range: `string` to any subtype of `number`.
///
/// Declares one (string, number) pair; the engine materializes a concrete
/// parser per target subtype.
pub struct StringToNumberFactory;

impl ConverterFactory for StringToNumberFactory {
    fn range(&self) -> ConvertiblePair {
        ConvertiblePair::new(builtin::STRING, builtin::NUMBER)
    }

    fn create(&self, target: TypeKey) -> Option<Arc<dyn Converter>> {
        if target == builtin::INT || target == builtin::UINT || target == builtin::FLOAT {
            Some(Arc::new(StringToNumber { target }))
        } else {
            None
        }
    }
}

/// Converts any numeric value into one concrete numeric type, failing on
/// values the target cannot represent.
pub struct ToNumber {
    target: TypeKey,
}

impl ToNumber {
    fn to_int(value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::UInt(u) => {
                if *u <= i64::MAX as u64 {
                    Ok(Value::Int(*u as i64))
                } else {
                    Err(ConversionError::invalid(format!("{u} overflows int")))
                }
            }
            Value::Float(x) => {
                if x.is_finite() && *x >= i64::MIN as f64 && *x <= i64::MAX as f64 {
                    Ok(Value::Int(*x as i64))
                } else {
                    Err(ConversionError::invalid(format!("{x} overflows int")))
                }
            }
            other => Err(mismatch("number", other)),
        }
    }

    fn to_uint(value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::UInt(u) => Ok(Value::UInt(*u)),
            Value::Int(i) => {
                if *i >= 0 {
                    Ok(Value::UInt(*i as u64))
                } else {
                    Err(ConversionError::invalid(format!("{i} is negative")))
                }
            }
            Value::Float(x) => {
                if x.is_finite() && *x >= 0.0 && *x <= u64::MAX as f64 {
                    Ok(Value::UInt(*x as u64))
                } else {
                    Err(ConversionError::invalid(format!("{x} overflows uint")))
                }
            }
            other => Err(mismatch("number", other)),
        }
    }

    fn to_float(value: &Value) -> Result<Value, ConversionError> {
        match value {
            Value::Float(x) => Ok(Value::Float(*x)),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::UInt(u) => Ok(Value::Float(*u as f64)),
            other => Err(mismatch("number", other)),
        }
    }
}

impl Converter for ToNumber {
    fn pair(&self) -> ConvertiblePair {
        ConvertiblePair::new(builtin::NUMBER, self.target)
    }

    fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        if self.target == builtin::INT {
            Self::to_int(value)
        } else if self.target == builtin::UINT {
            Self::to_uint(value)
        } else {
            Self::to_float(value)
        }
    }
}

/// Factory over the numeric range: any `number` subtype to any other.
pub struct NumberToNumberFactory;

impl ConverterFactory for NumberToNumberFactory {
    fn range(&self) -> ConvertiblePair {
        ConvertiblePair::new(builtin::NUMBER, builtin::NUMBER)
    }

    fn create(&self, target: TypeKey) -> Option<Arc<dyn Converter>> {
        if target == builtin::INT || target == builtin::UINT || target == builtin::FLOAT {
            Some(Arc::new(ToNumber { target }))
        } else {
            None
        }
    }
}
