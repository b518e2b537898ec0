//! Layered Merkle tree representation.
//!
//! [`TreeLayers`] replaces the raw nested-array shape with an explicit
//! structure whose invariants are enforced at construction (and therefore
//! at deserialization): layer 0 holds the leaf commitments, the top layer
//! is the single root, every non-root layer is even-sized, and each layer
//! is exactly half the one below it.
//!
//! The external tree builder's convention for odd leaf counts is
//! unresolved, so no duplication or zero-padding rule is assumed here:
//! an odd layer is a hard [`Error::MalformedTree`] at load time.

use crate::error::{Error, Result};
use crate::felt::Felt;
use serde::{Deserialize, Serialize};

/// Validated hash layers, leaf layer first, root layer last.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Felt>>", into = "Vec<Vec<Felt>>")]
pub struct TreeLayers {
    layers: Vec<Vec<Felt>>,
}

impl TreeLayers {
    /// Construct from raw layers, checking every structural invariant.
    pub fn new(layers: Vec<Vec<Felt>>) -> Result<Self> {
        let Some(top) = layers.last() else {
            return Err(Error::MalformedTree {
                detail: "tree has no layers".to_owned(),
            });
        };
        if top.len() != 1 {
            return Err(Error::MalformedTree {
                detail: format!("top layer holds {} hashes, expected the single root", top.len()),
            });
        }
        for (i, layer) in layers.iter().enumerate() {
            let is_root = i + 1 == layers.len();
            if layer.is_empty() {
                return Err(Error::MalformedTree {
                    detail: format!("layer {i} is empty"),
                });
            }
            if !is_root && layer.len() % 2 != 0 {
                return Err(Error::MalformedTree {
                    detail: format!("layer {i} has odd size {}", layer.len()),
                });
            }
            if !is_root && layers[i + 1].len() != layer.len() / 2 {
                return Err(Error::MalformedTree {
                    detail: format!(
                        "layer {} has {} hashes, expected {} (half of layer {i})",
                        i + 1,
                        layers[i + 1].len(),
                        layer.len() / 2,
                    ),
                });
            }
        }
        Ok(Self { layers })
    }

    /// Borrow the raw layers, leaf layer first.
    #[inline]
    #[must_use]
    pub fn as_layers(&self) -> &[Vec<Felt>] {
        &self.layers
    }

    /// The leaf-commitment layer.
    #[inline]
    #[must_use]
    pub fn leaf_layer(&self) -> &[Felt] {
        &self.layers[0]
    }

    /// The committed root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> Felt {
        self.layers[self.layers.len() - 1][0]
    }

    /// Number of layers, leaves included.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

impl TryFrom<Vec<Vec<Felt>>> for TreeLayers {
    type Error = Error;

    fn try_from(layers: Vec<Vec<Felt>>) -> Result<Self> {
        Self::new(layers)
    }
}

impl From<TreeLayers> for Vec<Vec<Felt>> {
    fn from(t: TreeLayers) -> Self {
        t.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(v: u64) -> Felt {
        Felt::from_u64(v)
    }

    #[test]
    fn accepts_well_formed_layers() {
        let t = TreeLayers::new(vec![
            vec![f(1), f(2), f(3), f(4)],
            vec![f(5), f(6)],
            vec![f(7)],
        ])
        .unwrap();
        assert_eq!(t.depth(), 3);
        assert_eq!(t.root(), f(7));
        assert_eq!(t.leaf_layer().len(), 4);
    }

    #[test]
    fn single_leaf_tree_is_valid() {
        let t = TreeLayers::new(vec![vec![f(9)]]).unwrap();
        assert_eq!(t.root(), f(9));
        assert_eq!(t.depth(), 1);
    }

    #[test]
    fn rejects_odd_layer() {
        let err = TreeLayers::new(vec![vec![f(1), f(2), f(3)], vec![f(4)]]).unwrap_err();
        assert!(matches!(err, Error::MalformedTree { .. }));
    }

    #[test]
    fn rejects_bad_halving() {
        let err =
            TreeLayers::new(vec![vec![f(1), f(2), f(3), f(4)], vec![f(5), f(6), f(7), f(8)], vec![f(9)]])
                .unwrap_err();
        assert!(matches!(err, Error::MalformedTree { .. }));
    }

    #[test]
    fn rejects_multi_hash_top() {
        let err = TreeLayers::new(vec![vec![f(1), f(2)]]).unwrap_err();
        assert!(matches!(err, Error::MalformedTree { .. }));
    }

    #[test]
    fn serde_enforces_invariants() {
        let good = r#"[["0x1","0x2"],["0x3"]]"#;
        let t: TreeLayers = serde_json::from_str(good).unwrap();
        assert_eq!(t.root(), f(3));

        let bad = r#"[["0x1","0x2","0x3"],["0x4"]]"#;
        assert!(serde_json::from_str::<TreeLayers>(bad).is_err());
    }
}
