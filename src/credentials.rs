use {
    chrono::{DateTime, Utc},
    derive_builder::Builder,
    std::fmt::{Debug, Formatter, Result as FmtResult},
};

/// An immutable bundle of AWS credentials: access key, secret key, and, for temporary (STS-style)
/// credentials, a session token and expiration.
///
/// Credentials are read-only to the signers. Callers that refresh temporary credentials must do so
/// by atomically replacing the `Credentials` value shared with concurrent signing calls, never by
/// mutating fields in place.
///
/// Whether an expiration in the past makes the credentials unusable is the caller's decision; the
/// signers only read the fields they need. The secret key and session token are never included in
/// `Debug` output.
#[derive(Builder, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The access key id.
    #[builder(setter(into))]
    access_key: String,

    /// The secret access key. Never logged.
    #[builder(setter(into))]
    secret_key: String,

    /// The session token accompanying temporary credentials, if any.
    #[builder(setter(into, strip_option), default)]
    session_token: Option<String>,

    /// The expiration of temporary credentials. `None` means non-expiring.
    #[builder(default)]
    expiration: Option<DateTime<Utc>>,
}

impl Credentials {
    /// Create a [CredentialsBuilder] to construct a [Credentials].
    #[inline]
    pub fn builder() -> CredentialsBuilder {
        CredentialsBuilder::default()
    }

    /// Create long-lived credentials from an access key and secret key.
    pub fn new<A: Into<String>, S: Into<String>>(access_key: A, secret_key: S) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            session_token: None,
            expiration: None,
        }
    }

    /// Retrieve the access key id.
    #[inline]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Retrieve the secret access key.
    #[inline]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// Retrieve the session token, if any.
    #[inline]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Retrieve the expiration of the credentials, if any.
    #[inline]
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .field("expiration", &self.expiration)
            .finish()
    }
}
