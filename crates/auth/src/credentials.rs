/// The one username/password pair that opens the gate.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialPolicy {
    username: String,
    password: String,
}

impl CredentialPolicy {
    pub const DEFAULT_USERNAME: &'static str = "admin";
    pub const DEFAULT_PASSWORD: &'static str = "admin123";

    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Exact, case-sensitive comparison of both fields.
    pub fn accepts(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }

    pub fn is_default(&self) -> bool {
        self.username == Self::DEFAULT_USERNAME && self.password == Self::DEFAULT_PASSWORD
    }
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_USERNAME, Self::DEFAULT_PASSWORD)
    }
}

// Keep the password out of logs.
impl core::fmt::Debug for CredentialPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialPolicy")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
