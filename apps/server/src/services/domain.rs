use std::collections::HashSet;

/// Disposable mailbox providers that are always refused
pub const DEFAULT_BLOCKED_DOMAINS: [&str; 5] = [
    "10minutemail.com",
    "tempmail.org",
    "guerrillamail.com",
    "mailinator.com",
    "temp-mail.org",
];

/// Recipient domain denylist
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    blocked: HashSet<String>,
}

impl Default for DomainPolicy {
    fn default() -> Self {
        Self {
            blocked: DEFAULT_BLOCKED_DOMAINS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

impl DomainPolicy {
    /// Default list plus extra domains (case-insensitive)
    pub fn with_additional<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = Self::default();
        policy.blocked.extend(
            domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty()),
        );
        policy
    }

    /// The part after the first `@` must be present and not blocked
    pub fn is_allowed(&self, email: &str) -> bool {
        match email.split('@').nth(1) {
            Some(domain) if !domain.is_empty() => !self.blocked.contains(&domain.to_lowercase()),
            _ => false,
        }
    }
}
