//! Password Generation and Strength Analysis
//!
//! Scoring is delegated to a [`StrengthEstimator`]; the default one wraps zxcvbn.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::validation::{LengthRule, RangeRule, Validate, Violations};

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
pub const SIMILAR: &str = "il1Lo0O";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordStrength {
    VeryWeak,
    Weak,
    Fair,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Self::VeryWeak,
            1 => Self::Weak,
            2 => Self::Fair,
            3 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackTimes {
    pub offline_fast_hashing: String,
    pub offline_slow_hashing: String,
    pub online_no_throttling: String,
    pub online_throttling: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PasswordFeedback {
    #[serde(default)]
    pub warning: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthInfo {
    pub strength: PasswordStrength,
    pub score: u8,
    pub guesses: u64,
    pub guesses_log10: f64,
    pub crack_times: CrackTimes,
    pub feedback: PasswordFeedback,
}

/// Black-box password scorer
pub trait StrengthEstimator: Send + Sync {
    fn estimate(&self, password: &str) -> Result<StrengthInfo, ServiceError>;
}

/// Dropbox's zxcvbn heuristic
#[derive(Debug, Default, Clone, Copy)]
pub struct ZxcvbnEstimator;

impl StrengthEstimator for ZxcvbnEstimator {
    fn estimate(&self, password: &str) -> Result<StrengthInfo, ServiceError> {
        if password.is_empty() {
            return Ok(blank_password_info());
        }
        let entropy = zxcvbn::zxcvbn(password, &[]).map_err(ServiceError::internal)?;
        let times = entropy.crack_times();
        let feedback = entropy
            .feedback()
            .as_ref()
            .map(|f| PasswordFeedback {
                warning: f.warning().map(|w| w.to_string()).unwrap_or_default(),
                suggestions: f.suggestions().iter().map(|s| s.to_string()).collect(),
            })
            .unwrap_or_default();

        Ok(StrengthInfo {
            strength: PasswordStrength::from_score(entropy.score()),
            score: entropy.score(),
            guesses: entropy.guesses(),
            guesses_log10: entropy.guesses_log10(),
            crack_times: CrackTimes {
                offline_fast_hashing: times.offline_fast_hashing_1e10_per_second().to_string(),
                offline_slow_hashing: times.offline_slow_hashing_1e4_per_second().to_string(),
                online_no_throttling: times.online_no_throttling_10_per_second().to_string(),
                online_throttling: times.online_throttling_100_per_hour().to_string(),
            },
            feedback,
        })
    }
}

// zxcvbn refuses empty input; an empty password is trivially guessable
fn blank_password_info() -> StrengthInfo {
    let instant = "less than a second".to_string();
    StrengthInfo {
        strength: PasswordStrength::VeryWeak,
        score: 0,
        guesses: 1,
        guesses_log10: 0.0,
        crack_times: CrackTimes {
            offline_fast_hashing: instant.clone(),
            offline_slow_hashing: instant.clone(),
            online_no_throttling: instant.clone(),
            online_throttling: instant,
        },
        feedback: PasswordFeedback {
            warning: String::new(),
            suggestions: vec!["Use a few words, avoid common phrases.".to_string()],
        },
    }
}

fn default_length() -> usize { 16 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordGenerateRequest {
    #[serde(default = "default_length")]
    pub length: usize,
    #[serde(default = "default_true")]
    pub include_uppercase: bool,
    #[serde(default = "default_true")]
    pub include_lowercase: bool,
    #[serde(default = "default_true")]
    pub include_numbers: bool,
    #[serde(default = "default_true")]
    pub include_symbols: bool,
    #[serde(default)]
    pub include_similar: bool,
}

impl Default for PasswordGenerateRequest {
    fn default() -> Self {
        Self {
            length: default_length(),
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
            include_similar: false,
        }
    }
}

impl PasswordGenerateRequest {
    /// Concatenation of every enabled character class
    pub fn charset(&self) -> Vec<char> {
        [
            (self.include_uppercase, UPPERCASE),
            (self.include_lowercase, LOWERCASE),
            (self.include_numbers, NUMBERS),
            (self.include_symbols, SYMBOLS),
            (self.include_similar, SIMILAR),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .flat_map(|(_, class)| class.chars())
        .collect()
    }
}

impl Validate for PasswordGenerateRequest {
    fn collect_violations(&self, violations: &mut Violations) {
        violations.check(&RangeRule::new("length", 4usize, 128), &self.length);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordGenerateResponse {
    pub password: String,
    pub strength: StrengthInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordAnalyzeRequest {
    pub password: String,
}

impl Validate for PasswordAnalyzeRequest {
    fn collect_violations(&self, violations: &mut Violations) {
        violations.check(&LengthRule::new("password", 0, 128), self.password.as_str());
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordAnalyzeResponse {
    pub info: StrengthInfo,
}

/// Draw `length` characters uniformly from `charset` using the OS CSPRNG
pub fn random_password(charset: &[char], length: usize) -> Result<String, ServiceError> {
    if charset.is_empty() {
        return Err(ServiceError::InvalidCharacterTypes);
    }
    let mut rng = OsRng;
    Ok((0..length)
        .filter_map(|_| charset.choose(&mut rng).copied())
        .collect())
}

pub fn generate(
    request: &PasswordGenerateRequest,
    estimator: &dyn StrengthEstimator,
) -> Result<PasswordGenerateResponse, ServiceError> {
    request.validate()?;
    let password = random_password(&request.charset(), request.length)?;
    let strength = estimator.estimate(&password)?;
    Ok(PasswordGenerateResponse { password, strength })
}

pub fn analyze(
    request: &PasswordAnalyzeRequest,
    estimator: &dyn StrengthEstimator,
) -> Result<PasswordAnalyzeResponse, ServiceError> {
    request.validate()?;
    Ok(PasswordAnalyzeResponse {
        info: estimator.estimate(&request.password)?,
    })
}
