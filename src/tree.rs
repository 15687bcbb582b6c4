//! Merkle tree construction over an ordered sequence of byte payloads

use std::collections::HashMap;

use crate::{MKDigest, MKProof, MKProofSide, MKProofStep, MKTreeError, MKTreeNode};

/// Alias for an ordered horizontal layer of tree nodes
pub type MKTreeLayer = Vec<MKTreeNode>;

/// A binary Merkle tree committing to an ordered sequence of leaves.
///
/// The full ladder of layers is built once at creation, from the leaf layer
/// up to the single node root layer. Odd sized layers carry their trailing
/// node up unchanged, without rehashing, so a lonely node may climb several
/// layers before it finds a sibling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MKTree {
    layers: Vec<MKTreeLayer>,
    leaves_index: HashMap<MKDigest, usize>,
}

impl MKTree {
    /// MKTree factory
    ///
    /// Leaves keep the order they are supplied in. When several leaves share
    /// a payload, lookups resolve to the lowest index.
    ///
    /// # Error
    /// Fails with [MKTreeError::EmptyTree] when `leaves` is empty.
    pub fn new<T: Clone + Into<MKTreeNode>>(leaves: &[T]) -> Result<Self, MKTreeError> {
        if leaves.is_empty() {
            return Err(MKTreeError::EmptyTree);
        }

        let leaves: MKTreeLayer = leaves.iter().map(|leaf| leaf.clone().into()).collect();
        let mut leaves_index = HashMap::with_capacity(leaves.len());
        for (position, leaf) in leaves.iter().enumerate() {
            leaves_index.entry(*leaf.digest()).or_insert(position);
        }

        let mut layers = vec![leaves];
        loop {
            let next_layer = Self::build_next_layer(&layers[layers.len() - 1]);
            let reached_root = next_layer.len() == 1;
            layers.push(next_layer);
            if reached_root {
                break;
            }
        }

        Ok(Self {
            layers,
            leaves_index,
        })
    }

    /// Derive the layer above an ordered layer of nodes.
    ///
    /// Consecutive pairs are merged left to right. A trailing unpaired node
    /// is carried over as is.
    fn build_next_layer(layer: &[MKTreeNode]) -> MKTreeLayer {
        layer
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => MKTreeNode::merge(left, right),
                lonely => lonely[0].clone(),
            })
            .collect()
    }

    /// The root node of the tree
    pub fn root(&self) -> &MKTreeNode {
        &self.layers[self.layers.len() - 1][0]
    }

    /// Hex representation of the root digest, the interchange form
    pub fn root_hex(&self) -> String {
        self.root().digest().to_hex()
    }

    /// Number of leaves committed in the tree
    pub fn total_leaves(&self) -> usize {
        self.layers[0].len()
    }

    /// Number of layers in the ladder, leaf and root layers included
    pub fn total_layers(&self) -> usize {
        self.layers.len()
    }

    /// The leaf nodes, in the order they were supplied
    pub fn leaves(&self) -> &[MKTreeNode] {
        &self.layers[0]
    }

    /// Check whether a payload is committed in the tree
    pub fn contains(&self, payload: impl AsRef<[u8]>) -> bool {
        self.leaves_index.contains_key(&MKDigest::compute(payload))
    }

    /// Compute the inclusion proof for the leaf holding `payload`.
    ///
    /// The proof records one step per non root layer, bottom up. At each
    /// layer the step stores the sibling digest and the side the sibling
    /// occupies, or no sibling at all when the node is the lonely trailing
    /// one of an odd sized layer.
    ///
    /// # Error
    /// Fails with [MKTreeError::LeafNotFound] when no leaf digest matches
    /// the payload; the error carries the digest of the missing payload.
    pub fn compute_proof(&self, payload: impl AsRef<[u8]>) -> Result<MKProof, MKTreeError> {
        let digest = MKDigest::compute(payload);
        let mut position = *self
            .leaves_index
            .get(&digest)
            .ok_or(MKTreeError::LeafNotFound(digest))?;

        let mut steps = Vec::with_capacity(self.layers.len() - 1);
        for layer in &self.layers[..self.layers.len() - 1] {
            let step = if position % 2 == 0 {
                MKProofStep {
                    side: MKProofSide::Right,
                    sibling: layer.get(position + 1).map(|node| *node.digest()),
                }
            } else {
                MKProofStep {
                    side: MKProofSide::Left,
                    sibling: Some(*layer[position - 1].digest()),
                }
            };
            steps.push(step);
            position /= 2;
        }

        Ok(MKProof::new(steps))
    }
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;

    fn tamper(payload: &[u8]) -> Vec<u8> {
        let mut tampered = payload.to_vec();
        match tampered.last_mut() {
            Some(last) => *last ^= 0x01,
            None => tampered.push(0x01),
        }
        tampered
    }

    #[test]
    fn should_fail_building_tree_without_leaves() {
        let error = MKTree::new::<&str>(&[]).expect_err("tree creation should fail");

        assert_eq!(MKTreeError::EmptyTree, error);
    }

    #[test]
    fn should_duplicate_single_leaf_into_root_layer() {
        let tree = MKTree::new(&["golden"]).expect("tree creation should not fail");

        let leaf = MKTreeNode::from("golden");
        assert_eq!(vec![vec![leaf.clone()], vec![leaf.clone()]], tree.layers);
        assert_eq!(leaf.digest(), tree.root().digest());
        assert_eq!(1, tree.total_leaves());
        assert_eq!(2, tree.total_layers());
    }

    #[test]
    fn should_pair_leaves_and_carry_lonely_node_unchanged() {
        let tree = MKTree::new(&["1", "2", "3"]).expect("tree creation should not fail");

        let layer_sizes: Vec<usize> = tree.layers.iter().map(|layer| layer.len()).collect();
        assert_eq!(vec![3, 2, 1], layer_sizes);

        let pair = MKTreeNode::merge(&tree.layers[0][0], &tree.layers[0][1]);
        assert_eq!(pair, tree.layers[1][0]);
        assert_eq!(tree.layers[0][2], tree.layers[1][1]);
        assert_eq!(
            MKTreeNode::merge(&tree.layers[1][0], &tree.layers[1][1]),
            *tree.root()
        );
    }

    #[test]
    fn should_halve_layer_sizes_up_the_ladder() {
        let leaves: Vec<String> = (0..8).map(|i| format!("leaf-{i}")).collect();

        let tree_five = MKTree::new(&leaves[..5]).expect("tree creation should not fail");
        let tree_eight = MKTree::new(&leaves).expect("tree creation should not fail");

        let layer_sizes_five: Vec<usize> =
            tree_five.layers.iter().map(|layer| layer.len()).collect();
        let layer_sizes_eight: Vec<usize> =
            tree_eight.layers.iter().map(|layer| layer.len()).collect();
        assert_eq!(vec![5, 3, 2, 1], layer_sizes_five);
        assert_eq!(vec![8, 4, 2, 1], layer_sizes_eight);
    }

    #[test]
    fn should_index_leaves_for_payload_lookup() {
        let tree = MKTree::new(&["1", "2", "3"]).expect("tree creation should not fail");

        assert!(tree.contains("1"));
        assert!(tree.contains("3"));
        assert!(!tree.contains("4"));
    }

    #[test]
    fn should_resolve_duplicate_payloads_to_their_first_index() {
        let tree = MKTree::new(&["1", "2", "1", "3"]).expect("tree creation should not fail");

        let digest = MKDigest::compute("1");
        assert_eq!(Some(&0), tree.leaves_index.get(&digest));
    }

    #[test]
    fn should_fail_proof_generation_for_missing_payload() {
        let tree = MKTree::new(&["1", "2", "3"]).expect("tree creation should not fail");

        let error = tree
            .compute_proof("4")
            .expect_err("proof generation should fail");

        assert_eq!(MKTreeError::LeafNotFound(MKDigest::compute("4")), error);
    }

    #[test]
    fn should_record_one_proof_step_per_non_root_layer() {
        let tree = MKTree::new(&["1", "2", "3", "4"]).expect("tree creation should not fail");

        let proof = tree
            .compute_proof("3")
            .expect("proof generation should not fail");

        let expected_steps = vec![
            MKProofStep {
                side: MKProofSide::Right,
                sibling: Some(*tree.layers[0][3].digest()),
            },
            MKProofStep {
                side: MKProofSide::Left,
                sibling: Some(*tree.layers[1][0].digest()),
            },
        ];
        assert_eq!(expected_steps, proof.steps());
    }

    #[test]
    fn should_record_lonely_carry_over_steps_without_sibling() {
        let tree = MKTree::new(&["1", "2", "3", "4", "5"]).expect("tree creation should not fail");

        let proof = tree
            .compute_proof("5")
            .expect("proof generation should not fail");

        let expected_steps = vec![
            MKProofStep {
                side: MKProofSide::Right,
                sibling: None,
            },
            MKProofStep {
                side: MKProofSide::Right,
                sibling: None,
            },
            MKProofStep {
                side: MKProofSide::Left,
                sibling: Some(*tree.layers[2][0].digest()),
            },
        ];
        assert_eq!(expected_steps, proof.steps());
    }

    prop_compose! {
        fn arb_tree(max_leaves: usize)
                   (payloads in vec(vec(any::<u8>(), 0..64), 1..max_leaves)) -> (MKTree, Vec<Vec<u8>>) {
            let tree = MKTree::new(&payloads).expect("tree creation should not fail");
            (tree, payloads)
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn should_verify_the_proof_of_every_leaf((tree, payloads) in arb_tree(32)) {
            let root = *tree.root().digest();
            for payload in &payloads {
                let proof = tree
                    .compute_proof(payload)
                    .expect("proof generation should not fail");
                prop_assert!(proof.verify(payload, &root));
                prop_assert!(proof.verify_hex(payload, &tree.root_hex()));
            }
        }

        #[test]
        fn should_reject_the_proof_of_a_tampered_payload((tree, payloads) in arb_tree(32)) {
            let root = *tree.root().digest();
            for payload in &payloads {
                let proof = tree
                    .compute_proof(payload)
                    .expect("proof generation should not fail");
                prop_assert!(!proof.verify(tamper(payload), &root));
            }
        }

        #[test]
        fn should_compute_the_same_root_for_the_same_leaves((tree, payloads) in arb_tree(32)) {
            let tree_rebuilt = MKTree::new(&payloads).expect("tree creation should not fail");

            prop_assert_eq!(tree.root_hex(), tree_rebuilt.root_hex());
        }
    }
}
