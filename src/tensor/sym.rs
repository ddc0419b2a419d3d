//! Symmetry tags and the bookkeeping for symmetric storage.
//!
//! Tensors keep every symmetric image of an element populated in their dense
//! buffer. The helpers here find the canonical representative of a
//! coordinate, enumerate its images and restore consistency after a kernel
//! has written the buffer freely.

use std::collections::HashSet;

use crate::algebra::Element;
use crate::error::{Error, Result};

/// Symmetry relation between dimension `d` and dimension `d + 1`.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sym {
    /// No symmetry.
    #[default]
    NS,
    /// Symmetric: `T[.., i, j, ..] == T[.., j, i, ..]`.
    SY,
    /// Antisymmetric: `T[.., i, j, ..] == -T[.., j, i, ..]`, zero diagonal.
    AS,
    /// Symmetric with a zero diagonal.
    SH,
}

impl Sym {
    /// Whether equal indices inside a run of this tag are structurally zero.
    #[inline]
    pub fn is_hollow(self) -> bool {
        matches!(self, Sym::AS | Sym::SH)
    }

    /// Whether values tagged `self` may be stored under `dst`.
    pub(crate) fn flows_into(self, dst: Sym) -> bool {
        self == dst || dst == Sym::NS || (self == Sym::SH && dst == Sym::SY)
    }

    /// Relation of an element-wise product of two factors related by `self`
    /// and `other`: signs multiply, and a hollow factor keeps the diagonal zero.
    pub(crate) fn product(self, other: Sym) -> Sym {
        if self == Sym::NS || other == Sym::NS {
            return Sym::NS;
        }
        if (self == Sym::AS) != (other == Sym::AS) {
            Sym::AS
        } else if self.is_hollow() || other.is_hollow() {
            Sym::SH
        } else {
            Sym::SY
        }
    }

    /// Relation of a sum of two terms related by `self` and `other`.
    pub(crate) fn join(self, other: Sym) -> Sym {
        match (self, other) {
            (a, b) if a == b => a,
            (Sym::SY, Sym::SH) | (Sym::SH, Sym::SY) => Sym::SY,
            _ => Sym::NS,
        }
    }
}

/// How a term relates an ordered pair of labels `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairTag {
    /// Neither label appears: the values are constant in both.
    Absent,
    /// Only one label appears; `true` for `x`.
    Half(bool),
    /// Each label comes from a different factor.
    Split,
    /// Both labels are held by the same factors, related by the tag.
    Joined(Sym),
}

impl PairTag {
    /// Relation of one operand with the given labels and symmetry.
    pub(crate) fn of<L: Copy + Eq>(labels: &[L], sym: &[Sym], x: L, y: L) -> Self {
        let p = labels.iter().position(|&l| l == x);
        let q = labels.iter().position(|&l| l == y);
        match (p, q) {
            (None, None) => PairTag::Absent,
            (Some(p), Some(q)) => {
                let r = runs(sym);
                if same_run(&r, p, q) {
                    PairTag::Joined(run_tag(&r, p))
                } else {
                    PairTag::Joined(Sym::NS)
                }
            }
            (p, _) => PairTag::Half(p.is_some()),
        }
    }

    /// Relation of the element-wise product of two terms.
    pub(crate) fn product(self, other: Self) -> Self {
        use PairTag::*;
        match (self, other) {
            (Absent, t) | (t, Absent) => t,
            (Half(a), Half(b)) if a == b => Half(a),
            (Half(_), Half(_)) | (Half(_), Split) | (Split, Half(_)) | (Split, Split) => Split,
            (Half(_), Joined(_)) | (Joined(_), Half(_)) => Joined(Sym::NS),
            (Split, Joined(s)) | (Joined(s), Split) => Joined(s.product(Sym::SY)),
            (Joined(a), Joined(b)) => Joined(a.product(b)),
        }
    }

    /// Relation of the sum of two terms.
    pub(crate) fn sum(self, other: Self) -> Self {
        use PairTag::*;
        match (self, other) {
            (Half(a), _) | (_, Half(a)) => Half(a),
            (Absent, Absent) => Absent,
            (Split, Split) | (Split, Absent) | (Absent, Split) => Split,
            (Joined(a), Joined(b)) => Joined(a.join(b)),
            (Joined(s), _) | (_, Joined(s)) => Joined(s.join(Sym::SY)),
        }
    }

    /// Tag an intermediate holding these values may carry.
    pub(crate) fn kept(self) -> Sym {
        match self {
            PairTag::Joined(s) => s,
            _ => Sym::NS,
        }
    }

    /// Tag the values satisfy, or `None` for a split pair, whose values are
    /// projected onto the canonical entries.
    fn stored(self) -> Option<Sym> {
        match self {
            PairTag::Absent => Some(Sym::SY),
            PairTag::Half(_) => Some(Sym::NS),
            PairTag::Split => None,
            PairTag::Joined(s) => Some(s),
        }
    }
}

/// A maximal run `[start, end)` of dimensions joined by one non-NS tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Run {
    pub start: usize,
    pub end: usize,
    pub tag: Sym,
}

/// Check the structural invariants of a shape/symmetry pair.
pub(crate) fn validate(len: &[usize], sym: &[Sym]) -> Result<()> {
    if sym.len() != len.len() {
        return Err(Error::shape(format!(
            "{} symmetry tags for {} dimensions",
            sym.len(),
            len.len()
        )));
    }
    if let Some(&last) = sym.last() {
        if last != Sym::NS {
            return Err(Error::shape("the last dimension must be tagged NS"));
        }
    }
    for d in 0..sym.len().saturating_sub(1) {
        if sym[d] == Sym::NS {
            continue;
        }
        if len[d] != len[d + 1] {
            return Err(Error::shape(format!(
                "dimensions {d} and {} are joined by {:?} but have extents {} and {}",
                d + 1,
                sym[d],
                len[d],
                len[d + 1]
            )));
        }
        if d + 1 < sym.len() && sym[d + 1] != Sym::NS && sym[d + 1] != sym[d] {
            return Err(Error::shape(format!(
                "run starting before dimension {d} mixes {:?} and {:?}",
                sym[d],
                sym[d + 1]
            )));
        }
    }
    Ok(())
}

/// Joined runs of length at least two.
pub(crate) fn runs(sym: &[Sym]) -> Vec<Run> {
    let mut out = Vec::new();
    let mut d = 0;
    while d < sym.len() {
        if sym[d] == Sym::NS {
            d += 1;
            continue;
        }
        let start = d;
        let tag = sym[d];
        while d < sym.len() && sym[d] == tag {
            d += 1;
        }
        // the dimension closing the run carries the next tag
        out.push(Run {
            start,
            end: d + 1,
            tag,
        });
        d += 1;
    }
    out
}

/// Tag of the run containing dimension `d`, or NS.
pub(crate) fn run_tag(runs: &[Run], d: usize) -> Sym {
    runs.iter()
        .find(|r| r.start <= d && d < r.end)
        .map_or(Sym::NS, |r| r.tag)
}

/// Whether dimensions `p` and `q` lie in the same run.
pub(crate) fn same_run(runs: &[Run], p: usize, q: usize) -> bool {
    runs.iter()
        .any(|r| r.start <= p && p < r.end && r.start <= q && q < r.end)
}

/// Sort `idx` into canonical order in place.
///
/// Returns `None` for structurally zero coordinates, otherwise whether the
/// stored value at the original coordinate is the negation of the canonical
/// one.
pub(crate) fn canonicalize(idx: &mut [usize], runs: &[Run]) -> Option<bool> {
    let mut negate = false;
    for run in runs {
        let part = &mut idx[run.start..run.end];
        let mut swaps = 0usize;
        // insertion sort, counting transpositions
        for i in 1..part.len() {
            let mut j = i;
            while j > 0 && part[j - 1] > part[j] {
                part.swap(j - 1, j);
                swaps += 1;
                j -= 1;
            }
        }
        if run.tag.is_hollow() && part.windows(2).any(|w| w[0] == w[1]) {
            return None;
        }
        if run.tag == Sym::AS && swaps % 2 == 1 {
            negate = !negate;
        }
    }
    Some(negate)
}

/// Whether `idx` is its own canonical representative.
pub(crate) fn is_canonical(idx: &[usize], runs: &[Run]) -> bool {
    runs.iter().all(|run| {
        idx[run.start..run.end].windows(2).all(|w| {
            if run.tag.is_hollow() {
                w[0] < w[1]
            } else {
                w[0] <= w[1]
            }
        })
    })
}

/// All orderings of `0..k`, each with its parity (true = odd).
fn permutations(k: usize) -> Vec<(Vec<usize>, bool)> {
    let mut perms = vec![(Vec::new(), false)];
    for item in 0..k {
        let mut next = Vec::with_capacity(perms.len() * (item + 1));
        for (perm, odd) in &perms {
            for pos in 0..=perm.len() {
                let mut p = perm.clone();
                p.insert(pos, item);
                // `item` is larger than everything after it
                let inversions = perm.len() - pos;
                next.push((p, *odd ^ (inversions % 2 == 1)));
            }
        }
        perms = next;
    }
    perms
}

/// Visit every symmetric image of the canonical coordinate `canon`.
///
/// The callback gets the image and whether it holds the negated value.
pub(crate) fn for_each_image(canon: &[usize], runs: &[Run], mut f: impl FnMut(&[usize], bool)) {
    let tables: Vec<Vec<(Vec<usize>, bool)>> =
        runs.iter().map(|r| permutations(r.end - r.start)).collect();
    let mut choice = vec![0usize; runs.len()];
    let mut image = canon.to_vec();

    loop {
        let mut negate = false;
        for ((run, table), &c) in runs.iter().zip(tables.iter()).zip(choice.iter()) {
            let (perm, odd) = &table[c];
            for (slot, &src) in perm.iter().enumerate() {
                image[run.start + slot] = canon[run.start + src];
            }
            if run.tag == Sym::AS && *odd {
                negate = !negate;
            }
        }
        f(&image, negate);

        let mut level = 0;
        loop {
            if level == runs.len() {
                return;
            }
            choice[level] += 1;
            if choice[level] < tables[level].len() {
                break;
            }
            choice[level] = 0;
            level += 1;
        }
    }
}

/// Restore symmetric consistency of a dense buffer.
///
/// Canonical entries are kept; every other image is overwritten from its
/// representative and structurally zero entries are set to `zero`.
pub(crate) fn symmetrize<T: Element>(data: &mut [T], len: &[usize], sym: &[Sym], zero: T) {
    let runs = runs(sym);
    if runs.is_empty() {
        return;
    }
    let strides = super::compute_contiguous_strides(len);
    let mut idx = vec![0usize; len.len()];
    let mut canon = vec![0usize; len.len()];

    for g in 0..data.len() {
        canon.copy_from_slice(&idx);
        match canonicalize(&mut canon, &runs) {
            None => data[g] = zero,
            Some(negate) => {
                let cg: usize = canon.iter().zip(strides.iter()).map(|(i, s)| i * s).sum();
                if cg != g {
                    let v = data[cg];
                    data[g] = if negate { -v } else { v };
                }
            }
        }

        for (d, i) in idx.iter_mut().enumerate() {
            *i += 1;
            if *i < len[d] {
                break;
            }
            *i = 0;
        }
    }
}

/// Check that a term's relation on every joined destination pair can be
/// stored under the destination's tag.
///
/// `tag_of(x, y)` reports how the term relates the labels `x` and `y`.
pub(crate) fn check_term_flow(
    dst_labels: &[char],
    dst_sym: &[Sym],
    tag_of: impl Fn(char, char) -> PairTag,
) -> Result<()> {
    for d in 0..dst_sym.len().saturating_sub(1) {
        let t = dst_sym[d];
        if t == Sym::NS {
            continue;
        }
        let (x, y) = (dst_labels[d], dst_labels[d + 1]);
        if x == y {
            continue;
        }
        if let Some(s) = tag_of(x, y).stored() {
            if !s.flows_into(t) {
                return Err(Error::symmetry(format!(
                    "labels '{x}{y}' are {s:?} in the operands but {t:?} in the destination"
                )));
            }
        }
    }
    Ok(())
}

/// Check that the element-wise product of `factors` can be stored in the
/// destination.
///
/// Pairs assembled from different factors are accepted and projected onto
/// the canonical entries afterwards.
pub(crate) fn check_flow(
    dst_labels: &[char],
    dst_sym: &[Sym],
    factors: &[(&[char], &[Sym])],
) -> Result<()> {
    check_term_flow(dst_labels, dst_sym, |x, y| {
        factors
            .iter()
            .fold(PairTag::Absent, |acc, &(labels, sym)| {
                acc.product(PairTag::of(labels, sym, x, y))
            })
    })
}

/// Check a block transfer against the destination's symmetry.
///
/// `written[d]` lists the destination indices written along dimension `d`,
/// `carried[d]` the source relation the transfer keeps between `d` and
/// `d + 1`. A joined pair whose written indices share at least two values
/// receives both an entry and its image, so the source must carry the
/// destination's relation there.
pub(crate) fn check_transfer(dst_sym: &[Sym], written: &[Vec<usize>], carried: &[Sym]) -> Result<()> {
    for d in 0..dst_sym.len().saturating_sub(1) {
        let t = dst_sym[d];
        if t == Sym::NS {
            continue;
        }
        let next: HashSet<usize> = written[d + 1].iter().copied().collect();
        let shared = written[d].iter().filter(|i| next.contains(i)).count();
        if shared >= 2 && !carried[d].flows_into(t) {
            return Err(Error::symmetry(format!(
                "dimensions {d} and {} are {t:?} but the transferred block is {:?} there",
                d + 1,
                carried[d]
            )));
        }
    }
    Ok(())
}
