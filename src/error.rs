use {
    crate::constants::*,
    http::status::StatusCode,
    scratchstack_errors::ServiceError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Error returned when an attempt at signing an AWS request fails.
///
/// Signing is pure and in-memory, so every variant is a malformed-input or configuration error.
/// There is no transient-failure class here; retrying a failed signing call with the same inputs
/// will fail the same way.
#[derive(Debug)]
#[non_exhaustive]
pub enum SignatureError {
    /// The supplied credentials cannot be used for signing -- e.g. an empty secret key. This is a
    /// hard configuration error; the signer never substitutes defaults for security-relevant
    /// fields.
    InvalidCredentials(/* message */ String),

    /// The URI path includes invalid components. This can be a malformed hex encoding (e.g. `%0J`),
    /// a non-absolute URI path (`foo/bar`), or a URI path that attempts to navigate above the root
    /// (`/x/../../../y`).
    InvalidURIPath(/* message */ String),

    /// A header was malformed -- the value could not be represented as US-ASCII after trimming, or
    /// a date header (`x-amz-date` or `date`) could not be parsed.
    MalformedHeader(/* message */ String),

    /// A query parameter was malformed -- e.g. an incomplete or invalid percent escape in a key or
    /// value.
    MalformedQueryString(/* message */ String),

    /// The request is missing a header required for signing and it could not be derived (e.g. no
    /// `Host` header and no authority in the URI).
    MissingRequiredHeader(/* message */ String),
}

impl SignatureError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials(_) => ERR_CODE_INVALID_CREDENTIALS,
            Self::InvalidURIPath(_) => ERR_CODE_INVALID_URI_PATH,
            Self::MalformedHeader(_) => ERR_CODE_MALFORMED_HEADER,
            Self::MalformedQueryString(_) => ERR_CODE_MALFORMED_QUERY_STRING,
            Self::MissingRequiredHeader(_) => ERR_CODE_MISSING_REQUIRED_HEADER,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl ServiceError for SignatureError {
    fn error_code(&self) -> &'static str {
        SignatureError::error_code(self)
    }

    fn http_status(&self) -> StatusCode {
        SignatureError::http_status(self)
    }
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::InvalidCredentials(msg) => f.write_str(msg),
            Self::InvalidURIPath(msg) => f.write_str(msg),
            Self::MalformedHeader(msg) => f.write_str(msg),
            Self::MalformedQueryString(msg) => f.write_str(msg),
            Self::MissingRequiredHeader(msg) => f.write_str(msg),
        }
    }
}

impl Error for SignatureError {}

#[cfg(test)]
mod tests {
    use {crate::SignatureError, scratchstack_errors::ServiceError};

    #[test_log::test]
    fn test_codes_and_statuses() {
        let e = SignatureError::InvalidCredentials("Secret key must not be empty".to_string());
        assert_eq!(e.error_code(), "InvalidCredentials");
        assert_eq!(e.http_status(), 403);
        assert_eq!(format!("{}", e), "Secret key must not be empty");

        let e = SignatureError::InvalidURIPath("Path is not absolute: foo/bar".to_string());
        assert_eq!(e.error_code(), "InvalidURIPath");
        assert_eq!(e.http_status(), 400);

        let e = SignatureError::MalformedHeader("Header value is not US-ASCII: x-custom".to_string());
        assert_eq!(e.error_code(), "MalformedHeader");
        assert_eq!(e.http_status(), 400);
        assert_eq!(format!("{}", e), "Header value is not US-ASCII: x-custom");

        let e = SignatureError::MalformedQueryString("Incomplete trailing escape % sequence".to_string());
        assert_eq!(e.error_code(), "MalformedQueryString");
        assert_eq!(e.http_status(), 400);

        let e = SignatureError::MissingRequiredHeader("Host".to_string());
        assert_eq!(e.error_code(), "MissingRequiredHeader");
        assert_eq!(e.http_status(), 400);
    }
}
