//! Configuration for the authentication service

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// bcrypt cost factor used when hashing new passwords
    pub password_hash_cost: u32,
    /// Minimum accepted password length in characters
    pub min_password_length: usize,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            password_hash_cost: bcrypt::DEFAULT_COST,
            min_password_length: 8,
        }
    }
}

impl AuthServiceConfig {
    /// Set the bcrypt cost (tests use the minimum of 4)
    pub fn with_password_hash_cost(mut self, cost: u32) -> Self {
        self.password_hash_cost = cost;
        self
    }
}
