//! Crate specific errors

use crate::MKDigest;

/// Error types related to Merkle tree construction and proof generation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MKTreeError {
    /// The leaf sequence handed to the tree factory was empty
    #[error("Merkle tree cannot be built from an empty leaf sequence")]
    EmptyTree,

    /// No leaf digest matches the requested payload
    #[error("No leaf matches the payload digest '{0}'")]
    LeafNotFound(MKDigest),

    /// A digest could not be decoded from its hex representation
    #[error("Digest is not a valid hex string")]
    DigestDecode(#[from] hex::FromHexError),

    /// A digest was built from a byte slice of the wrong length
    #[error("Digest has an invalid length: expected {0} bytes, found {1}")]
    DigestLength(usize, usize),
}
