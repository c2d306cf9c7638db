// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM field encryption for stored transactions.
//!
//! A sealed field is `base64(nonce || ciphertext || tag)` with a fresh random
//! 96-bit nonce per call.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bolso_core::BolsoError;
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, NONCE_LEN, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

/// Seals and opens individual text fields with one 256-bit key.
#[derive(Clone)]
pub struct FieldCipher {
    key: [u8; 32],
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldCipher").field("key", &"[REDACTED]").finish()
    }
}

impl FieldCipher {
    pub fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Build a cipher from a base64-encoded 32-byte key.
    pub fn from_base64(encoded: &str) -> Result<Self, BolsoError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| BolsoError::Crypto(format!("encryption key is not valid base64: {e}")))?;
        let key: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            BolsoError::Crypto(format!("encryption key must be 32 bytes, got {}", b.len()))
        })?;
        Ok(Self::new(key))
    }

    fn less_safe_key(&self) -> Result<LessSafeKey, BolsoError> {
        let unbound = UnboundKey::new(&AES_256_GCM, &self.key)
            .map_err(|_| BolsoError::Crypto("failed to create AES-256-GCM key".to_string()))?;
        Ok(LessSafeKey::new(unbound))
    }

    /// Encrypt `plaintext` into its stored representation.
    pub fn seal(&self, plaintext: &str) -> Result<String, BolsoError> {
        let key = self.less_safe_key()?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        SystemRandom::new()
            .fill(&mut nonce_bytes)
            .map_err(|_| BolsoError::Crypto("failed to generate random nonce".to_string()))?;

        let mut in_out = plaintext.as_bytes().to_vec();
        key.seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| BolsoError::Crypto("AES-256-GCM encryption failed".to_string()))?;

        let mut packed = Vec::with_capacity(NONCE_LEN + in_out.len());
        packed.extend_from_slice(&nonce_bytes);
        packed.extend_from_slice(&in_out);
        Ok(STANDARD.encode(packed))
    }

    /// Decrypt a value produced by [`FieldCipher::seal`].
    pub fn open(&self, encoded: &str) -> Result<String, BolsoError> {
        let packed = STANDARD
            .decode(encoded)
            .map_err(|e| BolsoError::Crypto(format!("sealed field is not valid base64: {e}")))?;
        if packed.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(BolsoError::Crypto("sealed field is too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = packed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| BolsoError::Crypto("invalid nonce".to_string()))?;

        let key = self.less_safe_key()?;
        let mut in_out = ciphertext.to_vec();
        let plaintext = key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| {
                BolsoError::Crypto("decryption failed -- wrong key or corrupted data".to_string())
            })?;

        String::from_utf8(plaintext.to_vec())
            .map_err(|e| BolsoError::Crypto(format!("decrypted field is not UTF-8: {e}")))
    }
}
