use secrecy::SecretString;

/// Credentials for authenticating with an EOS device.
///
/// eAPI uses HTTP basic auth on every request; there is no session or
/// cookie flow. The password is held as a [`SecretString`] so it never
/// shows up in `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into().into(),
        }
    }
}
