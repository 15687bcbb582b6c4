#![warn(missing_docs)]

//! Merkle tree with compact single leaf inclusion proofs.
//!
//! A [MKTree] commits to an ordered sequence of byte payloads with SHA-256.
//! Layers are built bottom up by hashing consecutive pairs of digests, and
//! the trailing node of an odd sized layer is carried up unchanged. The root
//! of a tree travels as a 64 character hex string, and a [MKProof] holds one
//! step per layer so that any single payload can be checked against the root
//! without the tree at hand.
//!
//! ```
//! use mktree::MKTree;
//!
//! # fn main() -> Result<(), mktree::MKTreeError> {
//! let tree = MKTree::new(&["leaf-1", "leaf-2", "leaf-3", "leaf-4", "leaf-5"])?;
//! let proof = tree.compute_proof("leaf-3")?;
//!
//! assert!(proof.verify("leaf-3", tree.root().digest()));
//! assert!(proof.verify_hex("leaf-3", &tree.root_hex()));
//! assert!(!proof.verify("leaf-6", tree.root().digest()));
//! # Ok(())
//! # }
//! ```

mod error;
mod node;
mod proof;
mod tree;

pub use error::MKTreeError;
pub use node::{MKDigest, MKTreeNode, MK_DIGEST_SIZE};
pub use proof::{MKProof, MKProofSide, MKProofStep};
pub use tree::{MKTree, MKTreeLayer};

/// Error type used by the fallible codec helpers
pub type StdError = anyhow::Error;

/// Result type used by the fallible codec helpers
pub type StdResult<T> = anyhow::Result<T, StdError>;
