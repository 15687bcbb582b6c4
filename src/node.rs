use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::MKTreeError;

/// Alias for a byte sequence carried by a tree node
pub(crate) type Bytes = Vec<u8>;

/// Byte length of a [MKDigest]
pub const MK_DIGEST_SIZE: usize = 32;

/// A SHA-256 digest, the currency of tree roots and proof siblings.
///
/// Serialized as a lowercase hex string of 64 characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MKDigest([u8; MK_DIGEST_SIZE]);

impl MKDigest {
    /// Compute the digest of a payload
    pub fn compute(payload: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(payload.as_ref());
        Self(hasher.finalize().into())
    }

    /// Digest of the concatenation of two digests, left first.
    ///
    /// This is the pairwise folding rule shared by tree construction and
    /// proof verification.
    pub(crate) fn merge(left: &Self, right: &Self) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(left);
        hasher.update(right);
        Self(hasher.finalize().into())
    }

    /// Create a MKDigest from a hex representation
    pub fn from_hex(hex_string: &str) -> Result<Self, MKTreeError> {
        let bytes = hex::decode(hex_string)?;
        Self::try_from(bytes.as_slice())
    }

    /// Create a hex representation of the MKDigest
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; MK_DIGEST_SIZE]> for MKDigest {
    fn from(bytes: [u8; MK_DIGEST_SIZE]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for MKDigest {
    type Error = MKTreeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; MK_DIGEST_SIZE] = bytes
            .try_into()
            .map_err(|_| MKTreeError::DigestLength(MK_DIGEST_SIZE, bytes.len()))?;
        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for MKDigest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for MKDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for MKDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for MKDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_string = String::deserialize(deserializer)?;
        Self::from_hex(&hex_string).map_err(serde::de::Error::custom)
    }
}

/// A node of a Merkle tree: a payload and its digest, hashed once at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MKTreeNode {
    payload: Bytes,
    digest: MKDigest,
}

impl MKTreeNode {
    /// MKTreeNode factory
    pub fn new(payload: Bytes) -> Self {
        let digest = MKDigest::compute(&payload);
        Self { payload, digest }
    }

    /// The payload bytes the node commits to
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The cached digest of the payload
    pub fn digest(&self) -> &MKDigest {
        &self.digest
    }

    /// Create the parent of two sibling nodes.
    ///
    /// The parent payload is the left digest followed by the right digest,
    /// with no separator, and its digest is the digest of that payload.
    pub(crate) fn merge(left: &Self, right: &Self) -> Self {
        let mut payload = Vec::with_capacity(2 * MK_DIGEST_SIZE);
        payload.extend_from_slice(left.digest.as_ref());
        payload.extend_from_slice(right.digest.as_ref());
        let digest = MKDigest::merge(&left.digest, &right.digest);
        Self { payload, digest }
    }
}

impl From<MKTreeNode> for Bytes {
    fn from(other: MKTreeNode) -> Self {
        other.payload
    }
}

impl From<Bytes> for MKTreeNode {
    fn from(other: Bytes) -> Self {
        Self::new(other)
    }
}

impl From<&[u8]> for MKTreeNode {
    fn from(other: &[u8]) -> Self {
        Self::new(other.to_vec())
    }
}

impl From<String> for MKTreeNode {
    fn from(other: String) -> Self {
        Self::new(other.into_bytes())
    }
}

impl From<&str> for MKTreeNode {
    fn from(other: &str) -> Self {
        Self::new(other.as_bytes().to_vec())
    }
}

impl fmt::Display for MKTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digest)
    }
}
