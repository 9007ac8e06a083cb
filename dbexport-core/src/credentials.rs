//! Credential container with automatic memory zeroing.
//!
//! The username and password are wrapped in `Zeroizing` so they are cleared
//! when the configuration is dropped. Neither `Debug` nor `Display` of any
//! config type ever prints the password.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Database login credentials.
///
/// # Example
///
/// ```rust
/// use dbexport_core::credentials::Credentials;
///
/// let creds = Credentials::new("postgres".to_string(), Some("secret".to_string()));
/// assert_eq!(creds.username(), "postgres");
/// assert!(creds.has_password());
/// assert!(!format!("{:?}", creds).contains("secret"));
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    username: Zeroizing<String>,
    password: Zeroizing<Option<String>>,
}

impl Credentials {
    /// Creates new credentials.
    pub fn new(username: String, password: Option<String>) -> Self {
        Self {
            username: Zeroizing::new(username),
            password: Zeroizing::new(password),
        }
    }

    /// Gets the username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Checks if a password is present without exposing it.
    pub fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Borrows the password for handing to the driver.
    pub(crate) fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username())
            .field("password", &self.has_password().then_some("****"))
            .finish()
    }
}
