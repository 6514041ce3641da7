//! Common constants used throughout the crate.
//!
//! This was consolidated here because we started redefining this in separate modules accidentally.
//! This helps ensure the entire crate is on the same page about these constant values. If a value
//! is spelled incorrectly, at least it can be fixed in one spot.
//!
//! Tests that are testing the content of an error code or message should not use these constants;
//! they should use hard-coded strings so the tests are also testing for misspellings.
//!
//! Please keep this file organized alphabetically. (This can be a bit hard with comments, etc.)

/// Algorithm prefix for the AWS SigV3 (AWS3-HTTPS) authorization value
pub(crate) const AWS3_HTTPS: &str = "AWS3-HTTPS";

/// Algorithm for AWS SigV4
pub(crate) const AWS4_HMAC_SHA256: &str = "AWS4-HMAC-SHA256";

/// String included at the end of the AWS SigV4 credential scope
pub(crate) const AWS4_REQUEST: &str = "aws4_request";

/// Error code: InvalidCredentials (non-AWS standard; client-side configuration error)
pub(crate) const ERR_CODE_INVALID_CREDENTIALS: &str = "InvalidCredentials";

/// Error code: InvalidURIPath
pub(crate) const ERR_CODE_INVALID_URI_PATH: &str = "InvalidURIPath";

/// Error code: MalformedHeader
pub(crate) const ERR_CODE_MALFORMED_HEADER: &str = "MalformedHeader";

/// Error code: MalformedQueryString
pub(crate) const ERR_CODE_MALFORMED_QUERY_STRING: &str = "MalformedQueryString";

/// Error code: MissingRequiredHeader
pub(crate) const ERR_CODE_MISSING_REQUIRED_HEADER: &str = "MissingRequiredHeader";

/// Header for `authorization`
pub(crate) const HDR_AUTHORIZATION: &str = "authorization";

/// Header for `date`
pub(crate) const HDR_DATE: &str = "date";

/// Header for `host`
pub(crate) const HDR_HOST: &str = "host";

/// Header for delivering the alternate date
pub(crate) const HDR_X_AMZ_DATE: &str = "x-amz-date";

/// Header for delivering the session token
pub(crate) const HDR_X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

/// Compact ISO8601 format used for the string to sign.
pub(crate) const ISO8601_COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Short date format used for the credential scope.
pub(crate) const ISO8601_DATE_FORMAT: &str = "%Y%m%d";

/// Length of an ISO8601 date string in the UTC time zone.
pub(crate) const ISO8601_UTC_LENGTH: usize = 16;

/// Error message: `"Access key must not be empty"`
pub(crate) const MSG_ACCESS_KEY_EMPTY: &str = "Access key must not be empty";

/// Error message: `"Request has no 'Host' header and no URI authority to derive one from"`
pub(crate) const MSG_HOST_REQUIRED: &str = "Request has no 'Host' header and no URI authority to derive one from";

/// Error message: `"Illegal hex character in escape % pattern: %"`
pub(crate) const MSG_ILLEGAL_HEX_CHAR: &str = "Illegal hex character in escape % pattern: %";

/// Error message: `"Incomplete trailing escape % sequence"`
pub(crate) const MSG_INCOMPLETE_TRAILING_ESCAPE: &str = "Incomplete trailing escape % sequence";

/// Error message: `"Secret key must not be empty"`
pub(crate) const MSG_SECRET_KEY_EMPTY: &str = "Secret key must not be empty";

/// Query parameter for delivering the access key in SigV2 requests
pub(crate) const QP_AWS_ACCESS_KEY_ID: &str = "AWSAccessKeyId";

/// Query parameter for delivering the session token in SigV2 requests
pub(crate) const QP_SECURITY_TOKEN: &str = "SecurityToken";

/// Query parameter for delivering the signature in SigV2 requests
pub(crate) const QP_SIGNATURE: &str = "Signature";

/// Query parameter for the signature method in SigV2 requests
pub(crate) const QP_SIGNATURE_METHOD: &str = "SignatureMethod";

/// Query parameter for the signature version in SigV2 requests
pub(crate) const QP_SIGNATURE_VERSION: &str = "SignatureVersion";

/// RFC 1123-style date format used by the SigV3 scheme for the `Date` header.
pub(crate) const RFC1123Z_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// SHA-256 of an empty string.
pub(crate) const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Length of a SHA-256 hex string.
pub(crate) const SHA256_HEX_LENGTH: usize = SHA256_EMPTY.len();

/// The length of a SHA-256 digest in bytes.
pub(crate) const SHA256_OUTPUT_LEN: usize = 32;

/// The signature method inserted by the SigV2 signer.
pub(crate) const SIGV2_SIGNATURE_METHOD: &str = "HmacSHA256";

/// The signature version inserted by the SigV2 signer.
pub(crate) const SIGV2_SIGNATURE_VERSION: &str = "2";

/// The region to use for testing.
#[cfg(test)]
pub(crate) const TEST_REGION: &str = "us-east-1";
