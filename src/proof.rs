use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{MKDigest, StdResult};

/// Side a proof step sibling occupies relative to the node being folded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MKProofSide {
    /// The sibling digest is hashed before the running digest
    Left,

    /// The sibling digest is hashed after the running digest
    Right,
}

/// One step of an inclusion proof.
///
/// A step with no sibling marks a layer where the proven node was the lonely
/// trailing one and was carried up without hashing. Such a step only ever
/// occurs on the right side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MKProofStep {
    /// Side of the sibling
    pub side: MKProofSide,

    /// Digest of the sibling, if any
    pub sibling: Option<MKDigest>,
}

/// An inclusion proof for a single leaf, one step per non root tree layer,
/// ordered from the leaf layer up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MKProof {
    steps: Vec<MKProofStep>,
}

impl MKProof {
    /// MKProof factory
    pub fn new(steps: Vec<MKProofStep>) -> Self {
        Self { steps }
    }

    /// The ordered proof steps, bottom up
    pub fn steps(&self) -> &[MKProofStep] {
        &self.steps
    }

    /// Verification of the proof against a root digest.
    ///
    /// The payload digest is folded through the steps and the outcome is
    /// compared byte for byte with `root`. A tampered payload, sibling or
    /// root yields `false`, never an error.
    pub fn verify(&self, payload: impl AsRef<[u8]>, root: &MKDigest) -> bool {
        let mut current = MKDigest::compute(payload);
        for step in &self.steps {
            current = match (step.side, &step.sibling) {
                (MKProofSide::Left, Some(sibling)) => MKDigest::merge(sibling, &current),
                (MKProofSide::Right, Some(sibling)) => MKDigest::merge(&current, sibling),
                // A lonely carry over contributed no hashing on the way up.
                (MKProofSide::Right, None) => current,
                // A left step always has a sibling in a well formed proof.
                (MKProofSide::Left, None) => return false,
            };
        }

        current == *root
    }

    /// Verification of the proof against a hex encoded root digest.
    ///
    /// A malformed root yields `false`.
    pub fn verify_hex(&self, payload: impl AsRef<[u8]>, root_hex: &str) -> bool {
        match MKDigest::from_hex(root_hex) {
            Ok(root) => self.verify(payload, &root),
            Err(_) => false,
        }
    }

    /// Create a JSON hex representation of the proof, for transport
    pub fn to_json_hex(&self) -> StdResult<String> {
        let json = serde_json::to_string(self)
            .with_context(|| "MKProof could not be serialized to JSON")?;

        Ok(hex::encode(json))
    }

    /// Create a MKProof from a JSON hex representation
    pub fn from_json_hex(hex_string: &str) -> StdResult<Self> {
        let json = hex::decode(hex_string)
            .with_context(|| "Could not decode MKProof hex representation")?;
        let proof = serde_json::from_slice(&json)
            .with_context(|| "Could not deserialize MKProof from JSON")?;

        Ok(proof)
    }
}
