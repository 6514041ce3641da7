//! Client-side AWS request signing.
//!
//! This crate signs outbound HTTP requests with AWS Signature Version 4 (SigV4), the scheme used
//! by most AWS service APIs, and carries signers for the older SigV2 (query-string) and SigV3
//! (`AWS3-HTTPS`) schemes still required by some API families.
//!
//! The SigV4 pipeline is exposed stage by stage on [SigV4Signer]: the canonical request
//! ([CanonicalRequest]), the credential scope, the string to sign, the derived signing key
//! ([KSecretKey] through [KSigningKey]), and the final `Authorization` header. Each stage is a
//! pure function of its inputs, with the signing instant passed in by the caller, so every
//! intermediate value can be checked against known test vectors.
//!
//! ```no_run
//! use {
//!     bytes::Bytes,
//!     chrono::Utc,
//!     http::Request,
//!     scratchstack_aws_signer::{Credentials, SigV4Signer},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY");
//! let signer = SigV4Signer::new("us-east-1", "dynamodb");
//!
//! let request = Request::post("https://dynamodb.us-east-1.amazonaws.com/")
//!     .header("content-type", "application/x-amz-json-1.0")
//!     .header("x-amz-target", "DynamoDB_20120810.ListTables")
//!     .body(())?;
//! let (parts, _) = request.into_parts();
//! let body = Bytes::from_static(b"{}");
//!
//! let signed_parts = signer.sign(parts, &body, &credentials, Utc::now())?;
//! assert!(signed_parts.headers.contains_key("authorization"));
//! # Ok(())
//! # }
//! ```

mod canonical;
mod chronoutil;
mod constants;
mod credentials;
mod crypto;
mod error;
mod legacy;
mod signer;
mod signing_key;

pub use crate::{
    canonical::{
        canonicalize_query_to_string, canonicalize_uri_path, is_rfc3986_unreserved, normalize_header_value,
        normalize_headers, normalize_query_string_element, normalize_uri_path_component,
        query_string_to_normalized_map, uri_encode, CanonicalRequest,
    },
    chronoutil::ParseISO8601,
    credentials::{Credentials, CredentialsBuilder},
    error::SignatureError,
    legacy::{SigV2Signer, SigV3Authorization, SigV3Signer},
    signer::SigV4Signer,
    signing_key::{KDateKey, KRegionKey, KSecretKey, KServiceKey, KSigningKey},
};
