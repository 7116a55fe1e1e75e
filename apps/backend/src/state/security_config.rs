use jsonwebtoken::Algorithm;

const DEFAULT_REFEREE_ROLE: &str = "Arbitro";

/// JWT and role settings used to authenticate actors
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// JWT secret key for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// JWT algorithm to use (defaults to HS256)
    pub algorithm: Algorithm,
    /// Role granting referee capability on every match
    pub referee_role: String,
}

impl SecurityConfig {
    /// Create a new SecurityConfig with the given JWT secret
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            referee_role: DEFAULT_REFEREE_ROLE.to_string(),
        }
    }

    pub fn with_referee_role(mut self, role: impl Into<String>) -> Self {
        self.referee_role = role.into();
        self
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
