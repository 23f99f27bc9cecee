//! Local ed25519 signer.
//!
//! Minimal signing capability for the CLI binary: a hex-encoded 32-byte
//! seed plus the owner address it authorizes. Production deployments are
//! expected to substitute their own [`Signer`] backed by real key
//! management; the engine only ever sees the trait.

use async_trait::async_trait;
use ed25519_dalek::{Signer as DalekSigner, SigningKey};

use crate::domain::Address;
use crate::error::{Error, Result};
use crate::tx::TransactionData;

use super::{Signature, Signer};

#[derive(Debug)]
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl LocalSigner {
    /// Build from a hex-encoded 32-byte seed and the owner address.
    pub fn from_hex(secret_hex: &str, address: Address) -> Result<Self> {
        let secret_hex = secret_hex.strip_prefix("0x").unwrap_or(secret_hex);
        let bytes = decode_hex(secret_hex)?;
        let seed: [u8; 32] = bytes
            .try_into()
            .map_err(|_| Error::Signing("private key must be exactly 32 bytes".into()))?;
        Ok(Self {
            key: SigningKey::from_bytes(&seed),
            address,
        })
    }
}

#[async_trait]
impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.address.clone()
    }

    async fn sign(&self, data: &TransactionData) -> Result<Signature> {
        let payload = serde_json::to_vec(data)?;
        let signature = self.key.sign(&payload);
        Ok(Signature(encode_hex(&signature.to_bytes())))
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(Error::Signing("hex key has odd length".into()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| Error::Signing("invalid hex in private key".into()))
        })
        .collect()
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
