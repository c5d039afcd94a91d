//! Diff operations between replica trees

use crate::model::Range;
use crate::tree::{MerkleTree, NodeId, NodeKind};
use crate::{Error, Result};
use tracing::debug;

/// How two corresponding subtrees compare
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Consistency {
    /// Equal hashes, nothing below needs to be visited
    FullyConsistent,
    /// Some, but not all, of the subtree differs
    PartiallyInconsistent,
    /// The whole subtree differs
    FullyInconsistent,
}

/// Compute the ranges where two filled trees disagree
///
/// Both trees must cover the same range of the same ring with the same
/// depth and combiner. Adjacent divergent leaves are merged into the
/// largest subtree range that is divergent as a whole, and ranges are
/// returned in the order they are discovered, not sorted.
pub fn diff(a: &MerkleTree, b: &MerkleTree) -> Result<Vec<Range>> {
    diff_with(a, b, || true)
}

/// Like [`diff`], but calls `check` before descending into each pair of
/// internal nodes and stops with [`Error::Cancelled`] once it returns false
pub fn diff_with<F>(a: &MerkleTree, b: &MerkleTree, mut check: F) -> Result<Vec<Range>>
where
    F: FnMut() -> bool,
{
    check_shape(a, b)?;
    if !a.is_filled() || !b.is_filled() {
        return Err(Error::NotFilled);
    }

    let mut result = Vec::new();
    let root = compare(a, b, a.root(), &mut check, &mut result)?;

    debug!(
        range = %a.full_range(),
        root = ?root,
        ranges = result.len(),
        "diffed merkle trees"
    );

    Ok(result)
}

fn check_shape(a: &MerkleTree, b: &MerkleTree) -> Result<()> {
    if a.depth() != b.depth() {
        return Err(Error::ShapeMismatch(format!(
            "depth {} vs {}",
            a.depth(),
            b.depth()
        )));
    }
    if a.ring() != b.ring() {
        return Err(Error::ShapeMismatch(format!(
            "ring {:?} vs {:?}",
            a.ring(),
            b.ring()
        )));
    }
    if a.full_range() != b.full_range() {
        return Err(Error::ShapeMismatch(format!(
            "range {} vs {}",
            a.full_range(),
            b.full_range()
        )));
    }
    if a.combiner().name() != b.combiner().name() {
        return Err(Error::ShapeMismatch(format!(
            "combiner {} vs {}",
            a.combiner().name(),
            b.combiner().name()
        )));
    }
    Ok(())
}

/// Compare the nodes at `id` in both trees, pushing fully divergent
/// ranges into `result` once they cannot grow any further
fn compare<F>(
    a: &MerkleTree,
    b: &MerkleTree,
    id: NodeId,
    check: &mut F,
    result: &mut Vec<Range>,
) -> Result<Consistency>
where
    F: FnMut() -> bool,
{
    let (n1, n2) = (a.get(id), b.get(id));
    if n1.is_leaf() != n2.is_leaf() {
        return Err(Error::Invariant(format!("node type mismatch at {:?}", id)));
    }
    if n1.range() != n2.range() {
        return Err(Error::Invariant(format!(
            "node range mismatch at {:?}: {} vs {}",
            id,
            n1.range(),
            n2.range()
        )));
    }

    if n1.hash_bytes() == n2.hash_bytes() {
        return Ok(Consistency::FullyConsistent);
    }

    let (left, right) = match n1.kind() {
        NodeKind::Leaf => return Ok(Consistency::FullyInconsistent),
        NodeKind::Internal { left, right } => (left, right),
    };

    if !check() {
        return Err(Error::Cancelled);
    }

    let lcon = compare(a, b, left, check, result)?;
    let rcon = compare(a, b, right, check, result)?;

    use Consistency::*;
    let state = match (lcon, rcon) {
        (FullyInconsistent, FullyInconsistent) => {
            if n1.is_root() {
                result.push(n1.range().clone());
            }
            FullyInconsistent
        }
        (_, FullyInconsistent) => {
            result.push(a.get(right).range().clone());
            PartiallyInconsistent
        }
        (FullyInconsistent, _) => {
            result.push(a.get(left).range().clone());
            PartiallyInconsistent
        }
        _ => PartiallyInconsistent,
    };

    Ok(state)
}
