//! Ed25519 request signature verification.
//!
//! Discord signs `timestamp || body` with the application's key and sends
//! the hex signature and the timestamp as headers.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::error::InteractionError;

pub const SIGNATURE_HEADER: &str = "x-signature-ed25519";
pub const TIMESTAMP_HEADER: &str = "x-signature-timestamp";

#[derive(Clone, Debug)]
pub struct SignatureVerifier {
    key: VerifyingKey,
}

impl SignatureVerifier {
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Parse the application public key as shown in the developer portal.
    pub fn from_hex(public_key: &str) -> Result<Self, InteractionError> {
        let bytes = hex::decode(public_key.trim())
            .map_err(|e| InteractionError::InvalidPublicKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|v: Vec<u8>| {
            InteractionError::InvalidPublicKey(format!("expected 32 bytes, got {}", v.len()))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| InteractionError::InvalidPublicKey(e.to_string()))?;
        Ok(Self { key })
    }

    pub fn verify(
        &self,
        timestamp: &str,
        body: &[u8],
        signature_hex: &str,
    ) -> Result<(), InteractionError> {
        let sig_bytes = hex::decode(signature_hex).map_err(|_| InteractionError::BadSignature)?;
        let sig_bytes: [u8; 64] = sig_bytes
            .try_into()
            .map_err(|_| InteractionError::BadSignature)?;
        let signature = Signature::from_bytes(&sig_bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body);

        self.key
            .verify(&message, &signature)
            .map_err(|_| InteractionError::BadSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn signed(key: &SigningKey, timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(key.sign(&message).to_bytes())
    }

    #[test]
    fn accepts_valid_signature() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let verifier =
            SignatureVerifier::from_hex(&hex::encode(key.verifying_key().to_bytes())).unwrap();
        let sig = signed(&key, "1700000000", b"{\"type\":1}");
        assert!(verifier.verify("1700000000", b"{\"type\":1}", &sig).is_ok());
    }

    #[test]
    fn rejects_tampered_body_and_timestamp() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let verifier = SignatureVerifier::new(key.verifying_key());
        let sig = signed(&key, "1700000000", b"{\"type\":1}");
        assert!(verifier.verify("1700000000", b"{\"type\":2}", &sig).is_err());
        assert!(verifier.verify("1700000001", b"{\"type\":1}", &sig).is_err());
        assert!(verifier.verify("1700000000", b"{\"type\":1}", "zz").is_err());
    }

    #[test]
    fn rejects_bad_public_key() {
        assert!(SignatureVerifier::from_hex("abcd").is_err());
        assert!(SignatureVerifier::from_hex("not hex").is_err());
    }
}
