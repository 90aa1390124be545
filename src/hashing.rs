//! Hashing System - Digests, HMAC and Verification
//!
//! Every supported algorithm goes through the same generic path, keyed or not.

use std::fmt;
use std::str::FromStr;

use hmac::digest::core_api::BlockSizeUser;
use hmac::digest::Digest;
use hmac::{Mac, SimpleHmac};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::encoding;
use crate::error::ServiceError;

/// Largest decoded file accepted by [`hash_file`]
pub const MAX_FILE_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    #[serde(rename = "sha3_256")]
    Sha3_256,
    #[serde(rename = "sha3_512")]
    Sha3_512,
    Blake2b,
    Blake2s,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 8] = [
        Self::Md5,
        Self::Sha1,
        Self::Sha256,
        Self::Sha512,
        Self::Sha3_256,
        Self::Sha3_512,
        Self::Blake2b,
        Self::Blake2s,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Sha3_256 => "sha3_256",
            Self::Sha3_512 => "sha3_512",
            Self::Blake2b => "blake2b",
            Self::Blake2s => "blake2s",
        }
    }

    pub fn output_bits(&self) -> usize {
        match self {
            Self::Md5 => 128,
            Self::Sha1 => 160,
            Self::Sha256 | Self::Sha3_256 | Self::Blake2s => 256,
            Self::Sha512 | Self::Sha3_512 | Self::Blake2b => 512,
        }
    }

    fn digest(&self, data: &[u8], key: Option<&[u8]>) -> Result<Vec<u8>, ServiceError> {
        match self {
            Self::Md5 => compute::<md5::Md5>(data, key),
            Self::Sha1 => compute::<sha1::Sha1>(data, key),
            Self::Sha256 => compute::<sha2::Sha256>(data, key),
            Self::Sha512 => compute::<sha2::Sha512>(data, key),
            Self::Sha3_256 => compute::<sha3::Sha3_256>(data, key),
            Self::Sha3_512 => compute::<sha3::Sha3_512>(data, key),
            Self::Blake2b => compute::<blake2::Blake2b512>(data, key),
            Self::Blake2s => compute::<blake2::Blake2s256>(data, key),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ServiceError::UnknownAlgorithm(s.to_string()))
    }
}

fn compute<D>(data: &[u8], key: Option<&[u8]>) -> Result<Vec<u8>, ServiceError>
where
    D: Digest + BlockSizeUser,
{
    match key {
        Some(key) => {
            let mut mac = <SimpleHmac<D> as Mac>::new_from_slice(key).map_err(ServiceError::internal)?;
            Mac::update(&mut mac, data);
            Ok(mac.finalize().into_bytes().to_vec())
        }
        None => Ok(D::digest(data).to_vec()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    #[default]
    Hex,
    Base64,
}

impl OutputEncoding {
    fn encode(&self, digest: &[u8]) -> String {
        match self {
            Self::Hex => hex::encode(digest),
            Self::Base64 => encoding::encode(digest),
        }
    }

    /// Hex digits only means hex; otherwise it must decode as base64
    pub fn detect(hash: &str) -> Result<Self, ServiceError> {
        if hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Self::Hex);
        }
        encoding::decode_payload(hash)
            .map(|_| Self::Base64)
            .map_err(|_| ServiceError::InvalidHashFormat)
    }
}

fn algorithm_or_default(algorithm: Option<&str>) -> Result<HashAlgorithm, ServiceError> {
    algorithm.map_or(Ok(HashAlgorithm::Sha256), |name| name.parse())
}

// An empty key means unkeyed
fn key_bytes(key: Option<&str>) -> Option<&[u8]> {
    key.filter(|k| !k.is_empty()).map(str::as_bytes)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashGenerateRequest {
    pub data: String,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub hmac_key: Option<String>,
    #[serde(default)]
    pub output_format: OutputEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashGenerateResponse {
    pub hash: String,
    pub algorithm: HashAlgorithm,
    pub format: OutputEncoding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashVerifyRequest {
    pub data: String,
    pub expected_hash: String,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub output_format: Option<OutputEncoding>,
    #[serde(default)]
    pub hmac_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashVerifyResponse {
    pub valid: bool,
    pub algorithm: HashAlgorithm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashFileRequest {
    pub file_base64: String,
    #[serde(default)]
    pub algorithm: Option<String>,
    #[serde(default)]
    pub output_format: OutputEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashFileResponse {
    pub hash: String,
    pub algorithm: HashAlgorithm,
    pub format: OutputEncoding,
    pub file_size: usize,
}

/// Digest `data` (keyed when `hmac_key` is non-empty) and encode it
pub fn generate_hash(
    data: &[u8],
    algorithm: HashAlgorithm,
    output_format: OutputEncoding,
    hmac_key: Option<&str>,
) -> Result<String, ServiceError> {
    let digest = algorithm.digest(data, key_bytes(hmac_key))?;
    Ok(output_format.encode(&digest))
}

pub fn generate(request: &HashGenerateRequest) -> Result<HashGenerateResponse, ServiceError> {
    let algorithm = algorithm_or_default(request.algorithm.as_deref())?;
    let hash = generate_hash(
        request.data.as_bytes(),
        algorithm,
        request.output_format,
        request.hmac_key.as_deref(),
    )?;
    Ok(HashGenerateResponse {
        hash,
        algorithm,
        format: request.output_format,
    })
}

/// Regenerate and compare in constant time
pub fn verify(request: &HashVerifyRequest) -> Result<HashVerifyResponse, ServiceError> {
    let algorithm = algorithm_or_default(request.algorithm.as_deref())?;
    let output_format = match request.output_format {
        Some(format) => format,
        None => OutputEncoding::detect(&request.expected_hash)?,
    };
    let generated = generate_hash(
        request.data.as_bytes(),
        algorithm,
        output_format,
        request.hmac_key.as_deref(),
    )?;
    let valid: bool = generated
        .as_bytes()
        .ct_eq(request.expected_hash.as_bytes())
        .into();
    Ok(HashVerifyResponse { valid, algorithm })
}

pub fn hash_file(request: &HashFileRequest) -> Result<HashFileResponse, ServiceError> {
    let algorithm = algorithm_or_default(request.algorithm.as_deref())?;
    let bytes = encoding::decode_payload(&request.file_base64)
        .map_err(|e| ServiceError::InvalidFileData(e.to_string()))?;
    if bytes.len() > MAX_FILE_BYTES {
        return Err(ServiceError::FileTooLarge {
            max_bytes: MAX_FILE_BYTES,
            actual_bytes: bytes.len(),
        });
    }
    let hash = generate_hash(&bytes, algorithm, request.output_format, None)?;
    Ok(HashFileResponse {
        hash,
        algorithm,
        format: request.output_format,
        file_size: bytes.len(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmInfo {
    pub name: &'static str,
    pub label: &'static str,
    pub output_bits: usize,
    pub output_hex_length: usize,
    pub output_base64_length: usize,
    pub security: &'static str,
    pub description: &'static str,
    pub recommended: bool,
}

/// Catalog served by `GET /hash/algorithms`
pub fn algorithm_catalog() -> Vec<AlgorithmInfo> {
    HashAlgorithm::ALL
        .into_iter()
        .map(|algorithm| {
            let (label, security, description, recommended) = match algorithm {
                HashAlgorithm::Md5 => (
                    "MD5 (128-bit)",
                    "Legacy",
                    "Fast but cryptographically broken. Use only for checksums.",
                    false,
                ),
                HashAlgorithm::Sha1 => (
                    "SHA-1 (160-bit)",
                    "Deprecated",
                    "Collision attacks exist. Avoid for security-critical applications.",
                    false,
                ),
                HashAlgorithm::Sha256 => (
                    "SHA-256 (256-bit)",
                    "Strong",
                    "Industry standard. Excellent balance of security and performance.",
                    true,
                ),
                HashAlgorithm::Sha512 => (
                    "SHA-512 (512-bit)",
                    "Very Strong",
                    "High security for sensitive data. Slower than SHA-256.",
                    true,
                ),
                HashAlgorithm::Sha3_256 => (
                    "SHA-3 (256-bit)",
                    "Strong",
                    "SHA-3 (Keccak) family. Modern alternative to SHA-2.",
                    true,
                ),
                HashAlgorithm::Sha3_512 => (
                    "SHA-3 (512-bit)",
                    "Very Strong",
                    "SHA-3 with 512-bit output. High security applications.",
                    true,
                ),
                HashAlgorithm::Blake2b => (
                    "BLAKE2b (512-bit)",
                    "Very Strong",
                    "Faster than SHA-2/SHA-3. Modern and secure.",
                    true,
                ),
                HashAlgorithm::Blake2s => (
                    "BLAKE2s (256-bit)",
                    "Strong",
                    "Optimized for 8-32 bit platforms. Fast and secure.",
                    true,
                ),
            };
            let bytes = algorithm.output_bits() / 8;
            AlgorithmInfo {
                name: algorithm.name(),
                label,
                output_bits: algorithm.output_bits(),
                output_hex_length: bytes * 2,
                output_base64_length: bytes.div_ceil(3) * 4,
                security,
                description,
                recommended,
            }
        })
        .collect()
}
