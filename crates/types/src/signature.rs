//! Secp256k1 signature recovery for bundle digests.

use crate::error::TypesError;
use alloy_primitives::{Address, Signature, B256};

/// Recover the signer address from a 65-byte `r || s || v` signature over the
/// given prehashed digest.
pub fn recover_signer(digest: B256, signature: &[u8]) -> Result<Address, TypesError> {
    let sig = Signature::try_from(signature)
        .map_err(|e| TypesError::MalformedSignature(e.to_string()))?;
    sig.recover_address_from_prehash(&digest)
        .map_err(|e| TypesError::Recovery(e.to_string()))
}
