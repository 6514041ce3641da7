//! AWS API request signing routines.
//!
//! This implements the client half of AWS [SigV4](http://docs.aws.amazon.com/general/latest/gr/signature-version-4.html):
//! given an outgoing HTTP request and a set of credentials, produce the `Authorization` header the
//! service-side verifier will recompute and compare against.
//!
//! Each pipeline stage -- timestamp extraction, string-to-sign construction, signature
//! computation, authorization assembly -- is a public method so it can be exercised directly
//! against fixed vectors. The stages are pure functions of their inputs; the only clock involved
//! is the one the caller passes in.

use {
    crate::{
        canonical::CanonicalRequest,
        chronoutil::ParseISO8601,
        constants::*,
        credentials::Credentials,
        crypto::hmac_sha256,
        signing_key::KSecretKey,
        SignatureError,
    },
    bytes::Bytes,
    chrono::{DateTime, FixedOffset, Utc},
    http::{
        header::{HeaderName, HeaderValue, AUTHORIZATION, HOST},
        request::Parts,
    },
    log::trace,
};

/// A signer for AWS SigV4 requests, scoped to a single region and service.
///
/// There are no global defaults: each call site constructs (or is handed) a `SigV4Signer` carrying
/// the region/service scope it signs for, so one process can sign for many scopes concurrently.
/// The signer is immutable and cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigV4Signer {
    /// The region the credential scope is bound to, e.g. `us-east-1`.
    region: String,

    /// The service the credential scope is bound to, e.g. `dynamodb`.
    service: String,
}

impl SigV4Signer {
    /// Create a signer for the given region and service.
    pub fn new<R: Into<String>, S: Into<String>>(region: R, service: S) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
        }
    }

    /// Retrieve the region the signer is scoped to.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Retrieve the service the signer is scoped to.
    #[inline]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Determine the timestamp the request will be signed with.
    ///
    /// An `x-amz-date` header, if present, wins and is returned exactly as carried by the request;
    /// otherwise a `date` header (RFC 2822) is used; otherwise the caller-supplied `now`. A date
    /// header that fails to parse is a [SignatureError::MalformedHeader] error -- it is never
    /// silently replaced with the clock.
    pub fn request_timestamp(&self, parts: &Parts, now: DateTime<Utc>) -> Result<DateTime<Utc>, SignatureError> {
        if let Some(value) = parts.headers.get(HDR_X_AMZ_DATE) {
            let value_str = value
                .to_str()
                .map_err(|_| SignatureError::MalformedHeader("x-amz-date header is not valid UTF-8".to_string()))?;
            let timestamp = DateTime::<FixedOffset>::parse_from_iso8601(value_str).map_err(|_| {
                SignatureError::MalformedHeader(format!(
                    "x-amz-date header is not a valid ISO-8601 timestamp: '{}'",
                    value_str
                ))
            })?;
            Ok(timestamp.with_timezone(&Utc))
        } else if let Some(value) = parts.headers.get(HDR_DATE) {
            let value_str = value
                .to_str()
                .map_err(|_| SignatureError::MalformedHeader("date header is not valid UTF-8".to_string()))?;
            let timestamp = DateTime::parse_from_rfc2822(value_str).map_err(|_| {
                SignatureError::MalformedHeader(format!("date header is not a valid RFC 2822 timestamp: '{}'", value_str))
            })?;
            Ok(timestamp.with_timezone(&Utc))
        } else {
            Ok(now)
        }
    }

    /// Return the credential scope for the given timestamp:
    /// `YYYYMMDD/region/service/aws4_request`.
    pub fn credential_scope(&self, timestamp: DateTime<Utc>) -> String {
        format!(
            "{}/{}/{}/{}",
            timestamp.format(ISO8601_DATE_FORMAT),
            self.region,
            self.service,
            AWS4_REQUEST
        )
    }

    /// Return the string to sign for the request: the algorithm identifier, compact ISO-8601
    /// timestamp, credential scope, and the hex SHA-256 of the canonical request, newline-joined.
    pub fn string_to_sign(
        &self,
        timestamp: DateTime<Utc>,
        canonical_request_sha256: &[u8; SHA256_OUTPUT_LEN],
    ) -> Vec<u8> {
        let scope = self.credential_scope(timestamp);
        let mut result = Vec::with_capacity(
            AWS4_HMAC_SHA256.len() + 1 + ISO8601_UTC_LENGTH + 1 + scope.len() + 1 + SHA256_HEX_LENGTH,
        );

        result.extend(AWS4_HMAC_SHA256.as_bytes());
        result.push(b'\n');
        result.extend(timestamp.format(ISO8601_COMPACT_FORMAT).to_string().as_bytes());
        result.push(b'\n');
        result.extend(scope.as_bytes());
        result.push(b'\n');
        result.extend(hex::encode(canonical_request_sha256).as_bytes());
        result
    }

    /// Compute the SigV4 signature: the string to sign, HMAC-SHA256 keyed by the derived signing
    /// key (`kSigning`) for this scope and the timestamp's date, hex-encoded lowercase.
    pub fn signature(&self, timestamp: DateTime<Utc>, string_to_sign: &[u8], secret_key: &KSecretKey) -> String {
        let ksigning = secret_key.to_ksigning(timestamp.date_naive(), &self.region, &self.service);
        hex::encode(hmac_sha256(ksigning.as_ref(), string_to_sign))
    }

    /// Assemble the `Authorization` header value from the computed signature.
    ///
    /// `signed_headers` must be the exact list produced by
    /// [CanonicalRequest::signed_headers] for the request being signed; any divergence between
    /// what was hashed and what is claimed here is rejected by the verifier.
    pub fn authorization(
        &self,
        signed_headers: &[String],
        timestamp: DateTime<Utc>,
        signature: &str,
        access_key: &str,
    ) -> String {
        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            AWS4_HMAC_SHA256,
            access_key,
            self.credential_scope(timestamp),
            signed_headers.join(";"),
            signature
        )
    }

    /// Sign a request, returning the annotated [Parts].
    ///
    /// This runs the full pipeline: ensures a `host` header (derived from the URI authority when
    /// absent), attaches the session token as `x-amz-security-token` when the credentials carry
    /// one, resolves the signing timestamp (adding an `x-amz-date` header when the request has no
    /// date header at all), canonicalizes, signs, and inserts the `authorization` header.
    ///
    /// The body is hashed but never modified, and no I/O is performed; the caller's transport
    /// sends the returned parts as-is.
    pub fn sign(
        &self,
        parts: Parts,
        body: &Bytes,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<Parts, SignatureError> {
        if credentials.access_key().is_empty() {
            return Err(SignatureError::InvalidCredentials(MSG_ACCESS_KEY_EMPTY.to_string()));
        }
        let secret_key = KSecretKey::new(credentials.secret_key())?;

        let mut parts = parts;

        if !parts.headers.contains_key(HDR_HOST) {
            let host = match parts.uri.authority() {
                Some(authority) => authority.as_str().to_string(),
                None => return Err(SignatureError::MissingRequiredHeader(MSG_HOST_REQUIRED.to_string())),
            };
            let value = HeaderValue::from_str(&host)
                .map_err(|_| SignatureError::MalformedHeader(format!("Host is not a valid header value: {}", host)))?;
            parts.headers.insert(HOST, value);
        }

        if let Some(token) = credentials.session_token() {
            let value = HeaderValue::from_str(token).map_err(|_| {
                SignatureError::InvalidCredentials("Session token is not a valid header value".to_string())
            })?;
            parts.headers.insert(HeaderName::from_static(HDR_X_AMZ_SECURITY_TOKEN), value);
        }

        let timestamp = self.request_timestamp(&parts, now)?;
        if !parts.headers.contains_key(HDR_X_AMZ_DATE) && !parts.headers.contains_key(HDR_DATE) {
            let value = timestamp.format(ISO8601_COMPACT_FORMAT).to_string();
            parts.headers.insert(
                HeaderName::from_static(HDR_X_AMZ_DATE),
                HeaderValue::from_str(&value).expect("compact ISO-8601 timestamps are valid header values"),
            );
        }

        let canonical = CanonicalRequest::from_request_parts(&parts, body)?;
        let signed_headers = canonical.signed_headers();
        let canonical_request_sha256 = canonical.canonical_request_sha256(&signed_headers);
        let string_to_sign = self.string_to_sign(timestamp, &canonical_request_sha256);
        trace!("String to sign:\n{}", String::from_utf8_lossy(&string_to_sign));

        let signature = self.signature(timestamp, &string_to_sign, &secret_key);
        let authorization = self.authorization(&signed_headers, timestamp, &signature, credentials.access_key());
        let value = HeaderValue::from_str(&authorization)
            .map_err(|_| SignatureError::InvalidCredentials("Access key is not a valid header value".to_string()))?;
        parts.headers.insert(AUTHORIZATION, value);

        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::SigV4Signer,
        crate::{constants::TEST_REGION, KSecretKey},
        chrono::{DateTime, TimeZone, Utc},
        http::Request,
    };

    const TEST_SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

    fn test_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap()
    }

    fn parts_with_headers(headers: &[(&str, &str)]) -> http::request::Parts {
        let mut builder = Request::builder().method("GET").uri("https://iam.amazonaws.com/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test_log::test]
    fn test_request_timestamp_prefers_x_amz_date() {
        let signer = SigV4Signer::new(TEST_REGION, "iam");
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let parts = parts_with_headers(&[("x-amz-date", "20150830T123600Z")]);
        assert_eq!(signer.request_timestamp(&parts, now).unwrap(), test_time());
    }

    #[test_log::test]
    fn test_request_timestamp_falls_back_to_date_header() {
        let signer = SigV4Signer::new(TEST_REGION, "iam");
        let now = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let parts = parts_with_headers(&[("date", "Sun, 30 Aug 2015 12:36:00 GMT")]);
        assert_eq!(signer.request_timestamp(&parts, now).unwrap(), test_time());
    }

    #[test_log::test]
    fn test_request_timestamp_uses_clock_when_no_header() {
        let signer = SigV4Signer::new(TEST_REGION, "iam");
        let parts = parts_with_headers(&[]);
        assert_eq!(signer.request_timestamp(&parts, test_time()).unwrap(), test_time());
    }

    #[test_log::test]
    fn test_request_timestamp_rejects_malformed_date() {
        let signer = SigV4Signer::new(TEST_REGION, "iam");
        let parts = parts_with_headers(&[("x-amz-date", "yesterday")]);
        let e = signer.request_timestamp(&parts, test_time()).unwrap_err();
        assert_eq!(e.to_string(), "x-amz-date header is not a valid ISO-8601 timestamp: 'yesterday'");

        let parts = parts_with_headers(&[("date", "yesterday")]);
        let e = signer.request_timestamp(&parts, test_time()).unwrap_err();
        assert_eq!(e.to_string(), "date header is not a valid RFC 2822 timestamp: 'yesterday'");
    }

    #[test_log::test]
    fn test_aws_docs_string_to_sign_and_signature() {
        // Published example from the AWS SigV4 signing documentation (ListUsers against IAM).
        let signer = SigV4Signer::new(TEST_REGION, "iam");
        let timestamp = test_time();

        let mut creq_sha256 = [0u8; 32];
        hex::decode_to_slice("f536975d06c0309214f805bb90ccff089219ecd68b2577efef23edd43b7e1a59", &mut creq_sha256)
            .unwrap();

        let string_to_sign = signer.string_to_sign(timestamp, &creq_sha256);
        assert_eq!(
            String::from_utf8(string_to_sign.clone()).unwrap(),
            "AWS4-HMAC-SHA256\n\
             20150830T123600Z\n\
             20150830/us-east-1/iam/aws4_request\n\
             f536975d06c0309214f805bb90ccff089219ecd68b2577efef23edd43b7e1a59"
        );

        let secret_key = KSecretKey::new(TEST_SECRET_KEY).unwrap();
        let signature = signer.signature(timestamp, &string_to_sign, &secret_key);
        assert_eq!(signature, "5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7");

        // Repeated computation over the same inputs is byte-identical.
        assert_eq!(signer.signature(timestamp, &string_to_sign, &secret_key), signature);
    }

    #[test_log::test]
    fn test_authorization_format() {
        let signer = SigV4Signer::new(TEST_REGION, "iam");
        let signed_headers = vec!["content-type".to_string(), "host".to_string(), "x-amz-date".to_string()];
        let authorization = signer.authorization(
            &signed_headers,
            test_time(),
            "5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7",
            "AKIDEXAMPLE",
        );
        assert_eq!(
            authorization,
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/iam/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date, \
             Signature=5d672d79c15b13162d9279b0855cfba6789a8edb4c82c400e06b5924a6f2b5d7"
        );
    }
}
