//! Password policy model

use super::common::UuidStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Per-domain password rules. The domain's default policy governs passwords
/// set through user creation and reset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordPolicy {
    pub id: UuidStr,
    pub domain_id: UuidStr,
    pub name: String,
    pub min_length: i32,
    pub max_length: i32,
    pub include_numbers: bool,
    pub include_special_characters: bool,
    /// 0 = no case requirement, 1 = mixed case required
    pub letters_in_mixed_case: bool,
    /// Maximum run of identical consecutive characters; 0 disables the check
    pub max_consecutive_letters: i32,
    /// Whether this is the domain's default policy
    pub default_policy: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: UuidStr::new_v4(),
            domain_id: UuidStr::new_v4(),
            name: String::new(),
            min_length: 8,
            max_length: 128,
            include_numbers: false,
            include_special_characters: false,
            letters_in_mixed_case: false,
            max_consecutive_letters: 0,
            default_policy: false,
            created_at: now,
            updated_at: now,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password against this policy
    pub fn check(&self, password: &str) -> Result<(), String> {
        let len = password.chars().count() as i32;
        if len < self.min_length {
            return Err(format!(
                "Password must be at least {} characters",
                self.min_length
            ));
        }
        if len > self.max_length {
            return Err(format!(
                "Password must be at most {} characters",
                self.max_length
            ));
        }
        if self.include_numbers && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err("Password must include a number".to_string());
        }
        if self.include_special_characters
            && !password.chars().any(|c| !c.is_alphanumeric())
        {
            return Err("Password must include a special character".to_string());
        }
        if self.letters_in_mixed_case
            && !(password.chars().any(|c| c.is_uppercase())
                && password.chars().any(|c| c.is_lowercase()))
        {
            return Err("Password must mix upper and lower case".to_string());
        }
        if self.max_consecutive_letters > 0 {
            let mut run = 0;
            let mut previous = None;
            for c in password.chars() {
                if Some(c) == previous {
                    run += 1;
                    if run > self.max_consecutive_letters {
                        return Err(format!(
                            "Password must not repeat a character more than {} times in a row",
                            self.max_consecutive_letters
                        ));
                    }
                } else {
                    run = 1;
                    previous = Some(c);
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePasswordPolicyInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 1, max = 1024))]
    pub min_length: Option<i32>,
    #[validate(range(min = 1, max = 1024))]
    pub max_length: Option<i32>,
    pub include_numbers: Option<bool>,
    pub include_special_characters: Option<bool>,
    pub letters_in_mixed_case: Option<bool>,
    #[validate(range(min = 0))]
    pub max_consecutive_letters: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdatePasswordPolicyInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(range(min = 1, max = 1024))]
    pub min_length: Option<i32>,
    #[validate(range(min = 1, max = 1024))]
    pub max_length: Option<i32>,
    pub include_numbers: Option<bool>,
    pub include_special_characters: Option<bool>,
    pub letters_in_mixed_case: Option<bool>,
    #[validate(range(min = 0))]
    pub max_consecutive_letters: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("short", false)]
    #[case("longenough", true)]
    fn test_min_length(#[case] password: &str, #[case] ok: bool) {
        let policy = PasswordPolicy {
            min_length: 8,
            ..Default::default()
        };
        assert_eq!(policy.check(password).is_ok(), ok);
    }

    #[test]
    fn test_number_requirement() {
        let policy = PasswordPolicy {
            include_numbers: true,
            ..Default::default()
        };
        assert!(policy.check("lettersonly").is_err());
        assert!(policy.check("letters4nd1").is_ok());
    }

    #[test]
    fn test_special_character_requirement() {
        let policy = PasswordPolicy {
            include_special_characters: true,
            ..Default::default()
        };
        assert!(policy.check("plainword").is_err());
        assert!(policy.check("plain-word").is_ok());
    }

    #[test]
    fn test_mixed_case_requirement() {
        let policy = PasswordPolicy {
            letters_in_mixed_case: true,
            ..Default::default()
        };
        assert!(policy.check("alllower1").is_err());
        assert!(policy.check("MixedCase1").is_ok());
    }

    #[test]
    fn test_consecutive_letters() {
        let policy = PasswordPolicy {
            max_consecutive_letters: 2,
            ..Default::default()
        };
        assert!(policy.check("aaabcdefg").is_err());
        assert!(policy.check("aabcdefgh").is_ok());
    }
}
