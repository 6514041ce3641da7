//! Canonicalization functionality for signature generation.
//!
//! This includes various URL and header canonicalization functions, as well as the ability to
//! create an AWS SigV4 canonical request from an outgoing HTTP request.
//!
//! The canonical form is ephemeral: it is recomputed for every signing operation from the request
//! alone, with no hidden state, so two canonicalizations of the same request always agree.

use {
    crate::{
        constants::{
            HDR_AUTHORIZATION, HDR_X_AMZ_SECURITY_TOKEN, MSG_ILLEGAL_HEX_CHAR, MSG_INCOMPLETE_TRAILING_ESCAPE,
            SHA256_OUTPUT_LEN,
        },
        crypto::{sha256, sha256_hex},
        SignatureError,
    },
    bytes::Bytes,
    http::{
        header::{HeaderMap, HeaderValue},
        request::Parts,
    },
    lazy_static::lazy_static,
    log::trace,
    regex::Regex,
    std::{
        borrow::Cow,
        collections::HashMap,
        fmt::{Debug, Formatter, Result as FmtResult},
        str::from_utf8,
    },
};

/// Uppercase hex digits.
const HEX_DIGITS_UPPER: [u8; 16] =
    [b'0', b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8', b'9', b'A', b'B', b'C', b'D', b'E', b'F'];

lazy_static! {
    /// Multiple slash pattern for condensing URIs
    static ref MULTISLASH: Regex = Regex::new("//+").unwrap();
}

/// A canonicalized request for AWS SigV4.
///
/// This is the deterministic textual form of an outgoing request that the remote verifier
/// recomputes on its side; every byte here must match what the verifier derives or the signature
/// is rejected.
#[derive(Clone)]
pub struct CanonicalRequest {
    /// The HTTP method for the request (e.g., "GET", "POST", etc.)
    request_method: String,

    /// The canonicalized path from the HTTP request. This is guaranteed to be ASCII.
    canonical_path: String,

    /// Query parameters from the HTTP request, normalized to be percent-encoded. Values are
    /// ordered as they appear in the URL.
    query_parameters: HashMap<String, Vec<String>>,

    /// Headers from the HTTP request, keyed by lowercased name. Values are ordered as they appear
    /// in the HTTP request and are guaranteed to be US-ASCII.
    headers: HashMap<String, Vec<Vec<u8>>>,

    /// The SHA-256 hash of the body.
    body_sha256: String,
}

impl CanonicalRequest {
    /// Create a CanonicalRequest from an HTTP request [Parts] and a body of [Bytes].
    ///
    /// The request is treated as immutable input; nothing here mutates or annotates it.
    pub fn from_request_parts(parts: &Parts, body: &Bytes) -> Result<Self, SignatureError> {
        let canonical_path = canonicalize_uri_path(parts.uri.path())?;
        let query_parameters = query_string_to_normalized_map(parts.uri.query().unwrap_or(""))?;
        let headers = normalize_headers(&parts.headers)?;
        let body_sha256 = sha256_hex(body.as_ref());

        Ok(CanonicalRequest {
            request_method: parts.method.to_string(),
            canonical_path,
            query_parameters,
            headers,
            body_sha256,
        })
    }

    /// Retrieve the HTTP request method.
    #[inline(always)]
    pub fn request_method(&self) -> &str {
        &self.request_method
    }

    /// Retrieve the canonicalized URI path from the request.
    #[inline(always)]
    pub fn canonical_path(&self) -> &str {
        &self.canonical_path
    }

    /// Retrieve the query parameters from the request. Values are ordered as they appear in the
    /// URL and are normalized to be percent-encoded.
    #[inline(always)]
    pub fn query_parameters(&self) -> &HashMap<String, Vec<String>> {
        &self.query_parameters
    }

    /// Retrieve the headers from the request, keyed by lowercased name. Values are ordered as they
    /// appear in the HTTP request.
    #[inline(always)]
    pub fn headers(&self) -> &HashMap<String, Vec<Vec<u8>>> {
        &self.headers
    }

    /// Retrieve the SHA-256 hash of the request body.
    #[inline(always)]
    pub fn body_sha256(&self) -> &str {
        &self.body_sha256
    }

    /// Get the canonical query string from the request.
    pub fn canonical_query_string(&self) -> String {
        canonicalize_query_to_string(&self.query_parameters)
    }

    /// Get the sorted, lowercased list of headers included in signing.
    ///
    /// Every header present on the request is signed except `authorization` itself. The exact
    /// list returned here must be reused verbatim when building the `Authorization` value --
    /// recomputing it independently is a correctness bug.
    pub fn signed_headers(&self) -> Vec<String> {
        let mut result: Vec<String> = self.headers.keys().filter(|k| k.as_str() != HDR_AUTHORIZATION).cloned().collect();
        result.sort_unstable();
        result
    }

    /// Get the [canonical request to hash](https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html)
    /// for the request.
    pub fn canonical_request(&self, signed_headers: &[String]) -> Vec<u8> {
        let mut result = Vec::with_capacity(1024);
        result.extend(self.request_method().as_bytes());
        result.push(b'\n');
        result.extend(self.canonical_path().as_bytes());
        result.push(b'\n');
        result.extend(self.canonical_query_string().as_bytes());
        result.push(b'\n');

        for header in signed_headers {
            let values = self.headers.get(header);
            if let Some(values) = values {
                for (i, value) in values.iter().enumerate() {
                    if i == 0 {
                        result.extend(header.as_bytes());
                        result.push(b':');
                    } else {
                        result.push(b',');
                    }
                    result.extend(value);
                }
                result.push(b'\n')
            }
        }

        result.push(b'\n');
        result.extend(signed_headers.join(";").as_bytes());
        result.push(b'\n');
        result.extend(self.body_sha256().as_bytes());

        trace!("Canonical request:\n{}", redact_session_token(&String::from_utf8_lossy(&result)));

        result
    }

    /// Get the SHA-256 hash of the [canonical request](https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html).
    pub fn canonical_request_sha256(&self, signed_headers: &[String]) -> [u8; SHA256_OUTPUT_LEN] {
        sha256(&self.canonical_request(signed_headers))
    }
}

impl Debug for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let headers = debug_headers(&self.headers);

        f.debug_struct("CanonicalRequest")
            .field("request_method", &self.request_method)
            .field("canonical_path", &self.canonical_path)
            .field("query_parameters", &self.query_parameters)
            .field("headers", &headers)
            .field("body_sha256", &self.body_sha256)
            .finish()
    }
}

/// Indicates whether we are normalizing a URI path element or a query string element. This is used
/// to create the correct error message.
enum UriElement {
    /// URI element represents a path
    Path,

    /// URI element represents a query string
    Query,
}

/// Convert a [`HashMap`] of query parameters to a string for the canonical request.
///
/// Entries are sorted lexicographically by the encoded `key=value` form, so the insertion order of
/// the map never affects the output.
pub fn canonicalize_query_to_string(query_parameters: &HashMap<String, Vec<String>>) -> String {
    let mut results = Vec::new();

    for (key, values) in query_parameters.iter() {
        for value in values.iter() {
            results.push(format!("{}={}", key, value));
        }
    }

    results.sort_unstable();
    results.join("&")
}

/// Normalizes the specified URI path, removing redundant slashes and relative path components.
pub fn canonicalize_uri_path(uri_path: &str) -> Result<String, SignatureError> {
    // Special case: empty path is converted to '/'; also short-circuit the usual '/' path here.
    if uri_path.is_empty() || uri_path == "/" {
        return Ok("/".to_string());
    }

    // All other paths must be absolute.
    if !uri_path.starts_with('/') {
        return Err(SignatureError::InvalidURIPath(format!("Path is not absolute: {}", uri_path)));
    }

    // Replace double slashes; this makes it easier to handle slashes at the end.
    let uri_path = MULTISLASH.replace_all(uri_path, "/");

    // Examine each path component for relative directories.
    let mut components: Vec<String> = uri_path.split('/').map(|s| s.to_string()).collect();
    let mut i = 1; // Ignore the leading "/"
    while i < components.len() {
        let component = normalize_uri_path_component(&components[i])?;

        if component == "." {
            // Relative path: current directory; remove this.
            components.remove(i);

            // Don't increment i; with the deletion, we're now pointing to the next element in the path.
        } else if component == ".." {
            // Relative path: parent directory.  Remove this and the previous component.

            if i <= 1 {
                // This isn't allowed at the beginning!
                return Err(SignatureError::InvalidURIPath(format!(
                    "Relative path entry '..' navigates above root: {}",
                    uri_path
                )));
            }

            components.remove(i - 1);
            components.remove(i - 1);

            // Since we've deleted two components, we need to back up one to examine what's now the next component.
            i -= 1;
        } else {
            // Leave it alone; proceed to the next component.
            components[i] = component;
            i += 1;
        }
    }

    assert!(!components.is_empty());
    match components.len() {
        1 => Ok("/".to_string()),
        _ => Ok(components.join("/")),
    }
}

/// Formats HTTP headers in a HashMap suitable for debugging.
fn debug_headers(headers: &HashMap<String, Vec<Vec<u8>>>) -> String {
    use std::io::Write;
    let mut result = Vec::new();
    for (key, values) in headers.iter() {
        for value in values {
            if key == HDR_X_AMZ_SECURITY_TOKEN {
                writeln!(result, "{}: <redacted>", key).unwrap();
                continue;
            }
            match String::from_utf8(value.clone()) {
                Ok(s) => writeln!(result, "{}: {}", key, s).unwrap(),
                Err(_) => writeln!(result, "{}: {:?}", key, value).unwrap(),
            }
        }
    }

    if result.is_empty() {
        return String::new();
    }

    // Remove the last newline.
    let result_except_last = &result[..result.len() - 1];
    String::from_utf8_lossy(result_except_last).to_string()
}

/// Indicates whether the specified byte is RFC3986 unreserved -- i.e., can be represented without
/// being percent-encoded, e.g. '?' -> '%3F'.
#[inline(always)]
pub fn is_rfc3986_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'.' || c == b'_' || c == b'~'
}

/// Returns a dictionary containing the lowercased header names and their values.
///
/// Header values are trimmed and space-collapsed, and must be representable as US-ASCII
/// afterwards; a header that is not is a [SignatureError::MalformedHeader] error.
pub fn normalize_headers(headers: &HeaderMap<HeaderValue>) -> Result<HashMap<String, Vec<Vec<u8>>>, SignatureError> {
    let mut result = HashMap::<String, Vec<Vec<u8>>>::new();
    for (key, value) in headers.iter() {
        let key = key.as_str().to_lowercase();
        let value = normalize_header_value(value.as_bytes());
        if !value.iter().all(|c| c.is_ascii()) {
            return Err(SignatureError::MalformedHeader(format!("Header value is not US-ASCII: {}", key)));
        }
        result.entry(key).or_default().push(value);
    }

    Ok(result)
}

/// Normalizes a header value by trimming whitespace and converting multiple spaces to a single space.
pub fn normalize_header_value(value: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(value.len());

    // Remove leading whitespace and reduce multiple spaces to a single space.
    let mut last_was_space = true;

    for c in value {
        if *c == b' ' {
            if !last_was_space {
                result.push(b' ');
                last_was_space = true;
            }
        } else {
            result.push(*c);
            last_was_space = false;
        }
    }

    if last_was_space {
        // Remove trailing spaces.
        while result.last() == Some(&b' ') {
            result.pop();
        }
    }

    result
}

/// Normalize a single element (key or value from key=value) of a query string.
pub fn normalize_query_string_element(element: &str) -> Result<String, SignatureError> {
    normalize_uri_element(element, UriElement::Query)
}

/// Normalizes a path element of a URI.
pub fn normalize_uri_path_component(path: &str) -> Result<String, SignatureError> {
    normalize_uri_element(path, UriElement::Path)
}

/// Normalize the URI or query string according to RFC 3986.  This performs the following operations:
/// * Alpha, digit, and the symbols `-`, `.`, `_`, and `~` (unreserved characters) are left alone.
/// * Characters outside this range are percent-encoded.
/// * Plus-encoded spaces (`+`) become `%20`.
/// * Percent-encoded values are upper-cased (`%2a` becomes `%2A`)
/// * Percent-encoded values in the unreserved space (`%41`-`%5A`, `%61`-`%7A`, `%30`-`%39`, `%2D`,
///   `%2E`, `%5F`, `%7E`) are converted to normal characters.
///
/// Existing percent escapes are preserved rather than re-encoded, which is what makes this
/// normalization idempotent: feeding its own output back in produces the same string.
///
/// If a percent encoding is incomplete, an error is returned.
fn normalize_uri_element(uri_el: &str, uri_el_type: UriElement) -> Result<String, SignatureError> {
    let path_component = uri_el.as_bytes();
    let mut i = 0;
    let result = &mut Vec::<u8>::new();

    while i < path_component.len() {
        let c = path_component[i];

        if is_rfc3986_unreserved(c) {
            result.push(c);
            i += 1;
        } else if c == b'%' {
            if i + 2 >= path_component.len() {
                // % encoding would go beyond end of string.
                return Err(match uri_el_type {
                    UriElement::Path => SignatureError::InvalidURIPath(MSG_INCOMPLETE_TRAILING_ESCAPE.to_string()),
                    UriElement::Query => {
                        SignatureError::MalformedQueryString(MSG_INCOMPLETE_TRAILING_ESCAPE.to_string())
                    }
                });
            }

            let hex_digits = &path_component[i + 1..i + 3];
            match hex::decode(hex_digits) {
                Ok(value) => {
                    assert_eq!(value.len(), 1);
                    let c = value[0];

                    if is_rfc3986_unreserved(c) {
                        result.push(c);
                    } else {
                        // Rewrite the hex-escape so it's always upper-cased.
                        result.push(b'%');
                        result.extend(u8_to_upper_hex(c));
                    }
                    i += 3;
                }
                Err(_) => {
                    let message = format!("{}{}{}", MSG_ILLEGAL_HEX_CHAR, hex_digits[0] as char, hex_digits[1] as char);
                    return Err(match uri_el_type {
                        UriElement::Path => SignatureError::InvalidURIPath(message),
                        UriElement::Query => SignatureError::MalformedQueryString(message),
                    });
                }
            }
        } else if c == b'+' {
            // Plus-encoded space. Convert this to %20.
            result.extend_from_slice(b"%20");
            i += 1;
        } else {
            // Character should have been encoded.
            result.push(b'%');
            result.extend(u8_to_upper_hex(c));
            i += 1;
        }
    }

    Ok(from_utf8(result.as_slice()).expect("percent-encoded output is always ASCII").to_string())
}

/// Normalize the query parameters by normalizing the keys and values of each parameter and return
/// a `HashMap` mapping each key to a *vector* of values (since it is valid for a query parameter
/// to appear multiple times).
///
/// The order of the values matches the order that they appeared in the query string.
pub fn query_string_to_normalized_map(query_string: &str) -> Result<HashMap<String, Vec<String>>, SignatureError> {
    if query_string.is_empty() {
        return Ok(HashMap::new());
    }

    // Split the query string into parameters on '&' boundaries.
    let components = query_string.split('&');
    let mut result = HashMap::<String, Vec<String>>::new();

    for component in components {
        if component.is_empty() {
            // Empty component; skip it.
            continue;
        }

        // Split the parameter into key and value portions on the '='
        let parts: Vec<&str> = component.splitn(2, '=').collect();
        let key = parts[0];
        let value = if parts.len() > 1 {
            parts[1]
        } else {
            ""
        };

        // Normalize the key and value.
        let norm_key = normalize_query_string_element(key)?;
        let norm_value = normalize_query_string_element(value)?;

        // If we already have a value for this key, append to it; otherwise, create a new vector containing the value.
        if let Some(result_value) = result.get_mut(&norm_key) {
            result_value.push(norm_value);
        } else {
            result.insert(norm_key, vec![norm_value]);
        }
    }

    Ok(result)
}

/// Replace the session token value in a rendered canonical request before it is logged. The token
/// is a credential and must never reach log output.
fn redact_session_token(rendered: &str) -> String {
    rendered
        .lines()
        .map(|line| {
            if line.starts_with(HDR_X_AMZ_SECURITY_TOKEN) {
                format!("{}:<redacted>", HDR_X_AMZ_SECURITY_TOKEN)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<String>>()
        .join("\n")
}

/// Convert a single byte to its uppercase two-digit hex representation.
#[inline(always)]
fn u8_to_upper_hex(c: u8) -> [u8; 2] {
    [HEX_DIGITS_UPPER[(c >> 4) as usize], HEX_DIGITS_UPPER[(c & 0x0f) as usize]]
}

/// Percent-encode a *raw* (already-decoded) string per the RFC 3986 unreserved-character rules.
///
/// Unlike [normalize_query_string_element], this does not interpret `%` or `+` specially: every
/// reserved byte, including `%` itself, is encoded. Space becomes `%20`, never `+`. This is the
/// encoding the SigV2 signer applies to both keys and values.
pub fn uri_encode(value: &str) -> Cow<'_, str> {
    if value.bytes().all(is_rfc3986_unreserved) {
        return Cow::Borrowed(value);
    }

    let mut result = Vec::with_capacity(value.len() * 3);
    for c in value.bytes() {
        if is_rfc3986_unreserved(c) {
            result.push(c);
        } else {
            result.push(b'%');
            result.extend(u8_to_upper_hex(c));
        }
    }

    Cow::Owned(String::from_utf8(result).expect("percent-encoded output is always ASCII"))
}
