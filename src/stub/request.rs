use serde::{Deserialize, Serialize};

use crate::stub::error::StubError;

/// A single JSON scalar carried by a request field
///
/// Callers are loose about types: `info` is sometimes a number, `exitcode`
/// sometimes a string. Every field therefore accepts any scalar and the
/// accessors on [`StubRequest`] decide how to read it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Whether the value is meaningfully set
    ///
    /// Empty strings, zero and `false` count as unset, the same as an
    /// absent or `null` field. Unlike PHP's `empty()`, the string `"0"`
    /// is set: `{"info":"0"}` prints `0` and `{"exception":"0"}` aborts.
    pub fn is_set(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Int(n) => *n != 0,
            Scalar::Float(f) => *f != 0.0,
            Scalar::Text(s) => !s.is_empty(),
        }
    }

    /// Render the value the way it is written to a stream
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Bool(true) => "1".to_string(),
            Scalar::Bool(false) => String::new(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    /// Coerce the value to an integer
    ///
    /// Floats truncate toward zero, strings must hold a decimal integer.
    pub fn to_integer(&self, field: &'static str) -> Result<i64, StubError> {
        match self {
            Scalar::Bool(b) => Ok(i64::from(*b)),
            Scalar::Int(n) => Ok(*n),
            Scalar::Float(f) => {
                if !f.is_finite() {
                    return Err(StubError::invalid_field(field, "number is not finite"));
                }
                Ok(f.trunc() as i64)
            }
            Scalar::Text(s) => s.trim().parse::<i64>().map_err(|e| {
                StubError::invalid_field(field, format!("'{}' is not an integer: {}", s, e))
            }),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Int(i64::from(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

/// Instructions decoded from the stub's standard input
///
/// Absent fields are treated as unset, never as errors. Unknown fields are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StubRequest {
    /// Written verbatim to standard error when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Scalar>,

    /// Written verbatim to standard output when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<Scalar>,

    /// Microseconds to suspend for, only when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep: Option<Scalar>,

    /// Microseconds to suspend for, always applied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delay: Option<Scalar>,

    /// Abort message when set and faults are enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<Scalar>,

    /// Process exit status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exitcode: Option<Scalar>,
}

fn set_text(value: &Option<Scalar>) -> Option<String> {
    value.as_ref().filter(|v| v.is_set()).map(Scalar::to_text)
}

fn micros(field: &'static str, value: &Scalar) -> Result<u64, StubError> {
    let n = value.to_integer(field)?;
    u64::try_from(n)
        .map_err(|_| StubError::invalid_field(field, format!("duration {} is negative", n)))
}

impl StubRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a request from raw bytes
    ///
    /// The payload must be a JSON object; arrays and bare scalars are
    /// rejected even where serde would accept them for a struct.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StubError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        if !value.is_object() {
            return Err(StubError::NotAnObject);
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, StubError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn error(mut self, value: impl Into<Scalar>) -> Self {
        self.error = Some(value.into());
        self
    }

    pub fn info(mut self, value: impl Into<Scalar>) -> Self {
        self.info = Some(value.into());
        self
    }

    pub fn sleep(mut self, micros: u32) -> Self {
        self.sleep = Some(micros.into());
        self
    }

    pub fn delay(mut self, micros: u32) -> Self {
        self.delay = Some(micros.into());
        self
    }

    pub fn exception(mut self, value: impl Into<Scalar>) -> Self {
        self.exception = Some(value.into());
        self
    }

    pub fn exitcode(mut self, code: i32) -> Self {
        self.exitcode = Some(code.into());
        self
    }

    pub fn error_text(&self) -> Option<String> {
        set_text(&self.error)
    }

    pub fn info_text(&self) -> Option<String> {
        set_text(&self.info)
    }

    pub fn exception_text(&self) -> Option<String> {
        set_text(&self.exception)
    }

    /// Conditional suspension, `None` when `sleep` is unset
    pub fn sleep_micros(&self) -> Result<Option<u64>, StubError> {
        match self.sleep.as_ref().filter(|v| v.is_set()) {
            Some(value) => micros("sleep", value).map(Some),
            None => Ok(None),
        }
    }

    /// Unconditional suspension, zero when `delay` is absent
    pub fn delay_micros(&self) -> Result<u64, StubError> {
        match &self.delay {
            Some(value) => micros("delay", value),
            None => Ok(0),
        }
    }

    /// Exit status reduced into the 0..=255 range
    pub fn exit_code(&self) -> Result<u8, StubError> {
        let code = match &self.exitcode {
            Some(value) => value.to_integer("exitcode")?,
            None => 0,
        };
        Ok(code.rem_euclid(256) as u8)
    }
}
