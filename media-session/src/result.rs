//! Results produced by session-side operations

use crate::extras::Extras;
use crate::item::LibraryParams;

/// Status code carried by every session result
///
/// Well-known codes get their own variant; anything else is kept verbatim
/// in [`ResultCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Success,
    InfoSkipped,
    ErrorUnknown,
    ErrorInvalidState,
    ErrorBadValue,
    ErrorPermissionDenied,
    ErrorIo,
    ErrorNotSupported,
    ErrorSessionDisconnected,
    Other(i32),
}

impl ResultCode {
    /// Numeric wire value of this code
    pub fn code(&self) -> i32 {
        match self {
            ResultCode::Success => 0,
            ResultCode::InfoSkipped => 1,
            ResultCode::ErrorUnknown => -1,
            ResultCode::ErrorInvalidState => -2,
            ResultCode::ErrorBadValue => -3,
            ResultCode::ErrorPermissionDenied => -4,
            ResultCode::ErrorIo => -5,
            ResultCode::ErrorNotSupported => -6,
            ResultCode::ErrorSessionDisconnected => -100,
            ResultCode::Other(code) => *code,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ResultCode::Success,
            1 => ResultCode::InfoSkipped,
            -1 => ResultCode::ErrorUnknown,
            -2 => ResultCode::ErrorInvalidState,
            -3 => ResultCode::ErrorBadValue,
            -4 => ResultCode::ErrorPermissionDenied,
            -5 => ResultCode::ErrorIo,
            -6 => ResultCode::ErrorNotSupported,
            -100 => ResultCode::ErrorSessionDisconnected,
            other => ResultCode::Other(other),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultCode::Success)
    }
}

/// Outcome of a library operation: status, optional payload, optional params
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryResult<T> {
    pub code: ResultCode,
    pub value: Option<T>,
    pub params: Option<LibraryParams>,
}

impl<T> LibraryResult<T> {
    /// Successful result carrying `value`
    pub fn success(value: T, params: Option<LibraryParams>) -> Self {
        Self {
            code: ResultCode::Success,
            value: Some(value),
            params,
        }
    }

    /// Result with the given status and no payload
    pub fn error(code: ResultCode) -> Self {
        Self {
            code,
            value: None,
            params: None,
        }
    }

    /// The payload, but only when the status is success
    ///
    /// A success status with no payload is indistinguishable from failure.
    pub fn into_success_value(self) -> Option<T> {
        if self.code.is_success() {
            self.value
        } else {
            None
        }
    }
}

impl LibraryResult<()> {
    /// Successful result for operations without a payload
    pub fn void() -> Self {
        Self::success((), None)
    }
}

/// Outcome of a custom session command
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub code: ResultCode,
    pub extras: Extras,
}

impl SessionResult {
    pub fn new(code: ResultCode) -> Self {
        Self {
            code,
            extras: Extras::new(),
        }
    }

    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip_for_known_codes() {
        for code in [0, 1, -1, -2, -3, -4, -5, -6, -100, 42] {
            assert_eq!(ResultCode::from_code(code).code(), code);
        }
        assert_eq!(ResultCode::from_code(42), ResultCode::Other(42));
    }

    #[test]
    fn test_success_without_payload_is_none() {
        let result: LibraryResult<String> = LibraryResult {
            code: ResultCode::Success,
            value: None,
            params: None,
        };
        assert_eq!(result.into_success_value(), None);
    }

    #[test]
    fn test_error_with_payload_is_none() {
        let result = LibraryResult {
            code: ResultCode::ErrorIo,
            value: Some("root".to_string()),
            params: None,
        };
        assert_eq!(result.into_success_value(), None);
    }

    #[test]
    fn test_success_value() {
        let result = LibraryResult::success("root".to_string(), None);
        assert_eq!(result.into_success_value(), Some("root".to_string()));
    }
}
