//! Random test-data generation for signup and registration scenarios.
//!
//! Emails are salted with a short random suffix so repeated suite runs
//! against a shared backend never collide on accounts. Passwords
//! always contain one lowercase, one uppercase, one digit, and one
//! special character, matching the backend's complexity rules.

use rand::seq::SliceRandom;
use rand::Rng;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Margaret", "Tony", "Radia", "Dennis",
    "Frances", "Ken", "Adele", "John", "Lynn", "Niklaus",
];

const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Hamilton", "Hoare",
    "Perlman", "Ritchie", "Allen", "Thompson", "Goldberg", "Backus", "Conway", "Wirth",
];

const SPECIAL_CHARS: &[u8] = b"!@#$%^&*";

/// Malformed email shapes the signup form must reject
const INVALID_EMAILS: &[&str] = &[
    "test@",
    "@example.com",
    "test@example",
    "test@.com",
    "test@example..com",
    "test@example.com.",
    "test@example@com",
    "test example.com",
    "test@example com",
];

/// One generated user for signup/registration flows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserData {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Unique email address
    pub email: String,
    /// Policy-conforming password
    pub password: String,
}

impl UserData {
    /// Generate a fresh valid user
    #[must_use]
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let first_name = (*FIRST_NAMES.choose(&mut rng).unwrap()).to_string();
        let last_name = (*LAST_NAMES.choose(&mut rng).unwrap()).to_string();
        let salt = uuid::Uuid::new_v4().simple().to_string();
        let email = format!(
            "{}.{}.{}@example.test",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            &salt[..8]
        );
        Self {
            first_name,
            last_name,
            email,
            password: password(12),
        }
    }

    /// The same user with a malformed email
    #[must_use]
    pub fn with_invalid_email(mut self) -> Self {
        self.email = invalid_email().to_string();
        self
    }

    /// The same user with a password below the minimum length
    #[must_use]
    pub fn with_short_password(mut self) -> Self {
        self.password = short_password();
        self
    }
}

/// Generate a password of `length` (minimum 4) containing at least one
/// lowercase, one uppercase, one digit, and one special character
#[must_use]
pub fn password(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let length = length.max(4);

    let mut bytes = vec![
        rng.gen_range(b'a'..=b'z'),
        rng.gen_range(b'A'..=b'Z'),
        rng.gen_range(b'0'..=b'9'),
        *SPECIAL_CHARS.choose(&mut rng).unwrap(),
    ];
    while bytes.len() < length {
        let class = rng.gen_range(0..4);
        bytes.push(match class {
            0 => rng.gen_range(b'a'..=b'z'),
            1 => rng.gen_range(b'A'..=b'Z'),
            2 => rng.gen_range(b'0'..=b'9'),
            _ => *SPECIAL_CHARS.choose(&mut rng).unwrap(),
        });
    }
    bytes.shuffle(&mut rng);
    String::from_utf8(bytes).unwrap()
}

/// A password that is too short for the backend's minimum
#[must_use]
pub fn short_password() -> String {
    password(5)
}

/// Pick one malformed email shape
#[must_use]
pub fn invalid_email() -> &'static str {
    INVALID_EMAILS.choose(&mut rand::thread_rng()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_random_users_are_unique_by_email() {
        let a = UserData::random();
        let b = UserData::random();
        assert_ne!(a.email, b.email);
        assert!(a.email.contains('@'));
        assert!(a.email.ends_with("@example.test"));
    }

    #[test]
    fn test_invalid_email_comes_from_corpus() {
        let user = UserData::random().with_invalid_email();
        assert!(INVALID_EMAILS.contains(&user.email.as_str()));
    }

    #[test]
    fn test_short_password_is_short() {
        assert_eq!(short_password().len(), 5);
    }

    proptest! {
        #[test]
        fn password_always_covers_all_classes(len in 4usize..32) {
            let pw = password(len);
            prop_assert_eq!(pw.len(), len);
            prop_assert!(pw.bytes().any(|b| b.is_ascii_lowercase()));
            prop_assert!(pw.bytes().any(|b| b.is_ascii_uppercase()));
            prop_assert!(pw.bytes().any(|b| b.is_ascii_digit()));
            prop_assert!(pw.bytes().any(|b| SPECIAL_CHARS.contains(&b)));
        }
    }
}
