//! Slicing, index permutation and transfers between related worlds.

use super::sym::{self, Sym};
use super::Tensor;
use crate::algebra::Element;
use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::world::{World, WorldRelation};

const RELATED: &[WorldRelation] = &[
    WorldRelation::Equal,
    WorldRelation::Subset,
    WorldRelation::Superset,
];

fn require_relation(
    src: &World,
    dst: &World,
    allowed: &[WorldRelation],
    operation: &'static str,
) -> Result<()> {
    let relation = src.relation(dst);
    if allowed.contains(&relation) {
        Ok(())
    } else {
        Err(Error::IncompatibleWorlds {
            relation,
            operation,
        })
    }
}

/// Visit every multi-index of a box of the given extents, column-major.
fn for_each_index(extents: &[usize], mut f: impl FnMut(&[usize])) {
    if extents.iter().any(|&n| n == 0) {
        return;
    }
    let mut idx = vec![0usize; extents.len()];
    loop {
        f(&idx);
        let mut d = 0;
        loop {
            if d == extents.len() {
                return;
            }
            idx[d] += 1;
            if idx[d] < extents[d] {
                break;
            }
            idx[d] = 0;
            d += 1;
        }
    }
}

/// Source relation kept between dimensions `d` and `d + 1` by per-dimension
/// maps: only identical maps on both dimensions carry it.
fn mapped_sym(maps: &[Option<&[Option<usize>]>], src_sym: &[Sym]) -> Vec<Sym> {
    (0..maps.len())
        .map(|d| {
            if d + 1 < maps.len() && maps[d] == maps[d + 1] {
                src_sym[d]
            } else {
                Sym::NS
            }
        })
        .collect()
}

impl<T: Element, B: Backend> Tensor<T, B> {
    fn check_box(&self, offsets: &[usize], ends: &[usize]) -> Result<Vec<usize>> {
        for args in [offsets.len(), ends.len()] {
            if args != self.ndim() {
                return Err(Error::shape(format!(
                    "{args} box bounds for a tensor of order {}",
                    self.ndim()
                )));
            }
        }
        offsets
            .iter()
            .zip(ends.iter())
            .zip(self.len.iter())
            .enumerate()
            .map(|(d, ((&o, &e), &n))| {
                if o <= e && e <= n {
                    Ok(e - o)
                } else {
                    Err(Error::shape(format!(
                        "box [{o}, {e}) out of bounds for dimension {d} of extent {n}"
                    )))
                }
            })
            .collect()
    }

    /// Box bounds from global corner coordinates, the end corner inclusive.
    fn corners_to_box(&self, corner_off: usize, corner_end: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        self.check_coord(corner_off)?;
        self.check_coord(corner_end)?;
        let mut offsets = vec![0usize; self.ndim()];
        let mut ends = vec![0usize; self.ndim()];
        self.decode(corner_off, &mut offsets);
        self.decode(corner_end, &mut ends);
        for (d, (o, e)) in offsets.iter().zip(ends.iter_mut()).enumerate() {
            if *e < *o {
                return Err(Error::shape(format!(
                    "end corner precedes start corner in dimension {d}"
                )));
            }
            *e += 1;
        }
        Ok((offsets, ends))
    }

    /// Symmetry tags that survive cutting out the box.
    fn box_sym(&self, offsets: &[usize], ends: &[usize]) -> Vec<Sym> {
        (0..self.ndim())
            .map(|d| {
                let keep = d + 1 < self.ndim()
                    && offsets[d] == offsets[d + 1]
                    && ends[d] == ends[d + 1];
                if keep {
                    self.sym[d]
                } else {
                    Sym::NS
                }
            })
            .collect()
    }

    // ========================================================================
    // Slicing
    // ========================================================================

    /// The sub-tensor `self[offsets, ends)`, in the same world.
    pub fn slice(&self, offsets: &[usize], ends: &[usize]) -> Result<Self> {
        self.slice_in(offsets, ends, &self.world)
    }

    /// The sub-tensor `self[offsets, ends)`, placed in `world`.
    ///
    /// A symmetry tag is kept only where the box is identical on both joined
    /// dimensions.
    pub fn slice_in(&self, offsets: &[usize], ends: &[usize], world: &World) -> Result<Self> {
        let extents = self.check_box(offsets, ends)?;
        require_relation(&self.world, world, RELATED, "slice")?;
        let _prof = self.trace_op("slice");

        let sym = self.box_sym(offsets, ends);
        let mut out = Self {
            data: Vec::with_capacity(extents.iter().product()),
            len: extents.clone(),
            sym,
            world: world.clone(),
            arithmetic: self.arithmetic,
            name: None,
            profile: false,
            backend: self.backend.clone(),
        };
        let mut src = vec![0usize; self.ndim()];
        for_each_index(&extents, |idx| {
            for (s, (&i, &o)) in src.iter_mut().zip(idx.iter().zip(offsets.iter())) {
                *s = i + o;
            }
            out.data.push(self.data[self.offset(&src)]);
        });
        Ok(out)
    }

    /// The sub-tensor between two global corner coordinates, both inclusive.
    pub fn slice_corners(&self, corner_off: usize, corner_end: usize) -> Result<Self> {
        let (offsets, ends) = self.corners_to_box(corner_off, corner_end)?;
        self.slice(&offsets, &ends)
    }

    /// `self[offsets, ends) = β·self[offsets, ends) + α·A[offsets_a, ends_a)`.
    ///
    /// Both boxes must have the same extents. `A` may live in any world
    /// related to this one.
    #[allow(clippy::too_many_arguments)]
    pub fn slice_assign(
        &mut self,
        offsets: &[usize],
        ends: &[usize],
        beta: T,
        a: &Tensor<T, B>,
        offsets_a: &[usize],
        ends_a: &[usize],
        alpha: T,
    ) -> Result<()> {
        let extents = self.check_box(offsets, ends)?;
        let extents_a = a.check_box(offsets_a, ends_a)?;
        if extents != extents_a {
            return Err(Error::shape(format!(
                "box extents {extents:?} and {extents_a:?} differ"
            )));
        }
        require_relation(&a.world, &self.world, RELATED, "slice")?;
        let written: Vec<Vec<usize>> = offsets
            .iter()
            .zip(ends.iter())
            .map(|(&o, &e)| (o..e).collect())
            .collect();
        let carried: Vec<Sym> = (0..self.ndim())
            .map(|d| {
                let aligned = d + 1 < self.ndim()
                    && offsets[d] == offsets[d + 1]
                    && ends[d] == ends[d + 1]
                    && offsets_a[d] == offsets_a[d + 1]
                    && ends_a[d] == ends_a[d + 1];
                if aligned {
                    a.sym[d]
                } else {
                    Sym::NS
                }
            })
            .collect();
        sym::check_transfer(&self.sym, &written, &carried)?;
        let _prof = self.trace_op("slice_assign");

        let ar = self.arithmetic;
        let mut entries = Vec::with_capacity(extents.iter().product());
        let mut dst = vec![0usize; self.ndim()];
        let mut src = vec![0usize; a.ndim()];
        for_each_index(&extents, |idx| {
            for d in 0..idx.len() {
                dst[d] = idx[d] + offsets[d];
                src[d] = idx[d] + offsets_a[d];
            }
            let g = self.offset(&dst);
            entries.push((g, ar.blend(alpha, a.data[a.offset(&src)], beta, self.data[g])));
        });
        self.write_entries(ar.one(), ar.zero(), entries.into_iter());
        Ok(())
    }

    /// [`Tensor::slice_assign`] with boxes given by inclusive global corners.
    #[allow(clippy::too_many_arguments)]
    pub fn slice_assign_corners(
        &mut self,
        corner_off: usize,
        corner_end: usize,
        beta: T,
        a: &Tensor<T, B>,
        corner_off_a: usize,
        corner_end_a: usize,
        alpha: T,
    ) -> Result<()> {
        let (offsets, ends) = self.corners_to_box(corner_off, corner_end)?;
        let (offsets_a, ends_a) = a.corners_to_box(corner_off_a, corner_end_a)?;
        self.slice_assign(&offsets, &ends, beta, a, &offsets_a, &ends_a, alpha)
    }

    // ========================================================================
    // Permutation
    // ========================================================================

    fn check_maps(
        maps: &[Option<&[Option<usize>]>],
        domain: &[usize],
        range: &[usize],
    ) -> Result<()> {
        if maps.len() != domain.len() || domain.len() != range.len() {
            return Err(Error::shape(format!(
                "{} index maps between tensors of order {} and {}",
                maps.len(),
                domain.len(),
                range.len()
            )));
        }
        for (d, map) in maps.iter().enumerate() {
            match map {
                None if domain[d] != range[d] => {
                    return Err(Error::shape(format!(
                        "identity map on dimension {d} between extents {} and {}",
                        domain[d], range[d]
                    )))
                }
                None => {}
                Some(map) => {
                    if map.len() != domain[d] {
                        return Err(Error::LengthMismatch {
                            expected: domain[d],
                            got: map.len(),
                        });
                    }
                    if let Some(&k) = map.iter().flatten().find(|&&k| k >= range[d]) {
                        return Err(Error::OutOfRange {
                            index: k,
                            size: range[d],
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Map a multi-index through per-dimension maps; `None` if any entry skips.
    fn map_index(maps: &[Option<&[Option<usize>]>], idx: &[usize], out: &mut [usize]) -> bool {
        for (d, map) in maps.iter().enumerate() {
            out[d] = match map {
                None => idx[d],
                Some(map) => match map[idx[d]] {
                    Some(k) => k,
                    None => return false,
                },
            };
        }
        true
    }

    /// `self[i, j, …] = β·self[i, j, …] + α·A[perms_a[0][i], perms_a[1][j], …]`.
    ///
    /// `perms_a[d]` has one entry per index of this tensor's dimension `d`;
    /// `None` as a whole map is the identity and `None` as an entry leaves
    /// that index untouched. `A` must live in this world or a subset of it.
    pub fn permute_from(
        &mut self,
        beta: T,
        a: &Tensor<T, B>,
        perms_a: &[Option<&[Option<usize>]>],
        alpha: T,
    ) -> Result<()> {
        Self::check_maps(perms_a, &self.len, &a.len)?;
        require_relation(
            &a.world,
            &self.world,
            &[WorldRelation::Equal, WorldRelation::Subset],
            "permute_from",
        )?;
        let written: Vec<Vec<usize>> = perms_a
            .iter()
            .zip(self.len.iter())
            .map(|(map, &n)| match map {
                None => (0..n).collect(),
                Some(map) => (0..n).filter(|&i| map[i].is_some()).collect(),
            })
            .collect();
        sym::check_transfer(&self.sym, &written, &mapped_sym(perms_a, &a.sym))?;
        let _prof = self.trace_op("permute");

        let ar = self.arithmetic;
        let mut entries = Vec::new();
        let mut src = vec![0usize; a.ndim()];
        for_each_index(&self.len, |idx| {
            if Self::map_index(perms_a, idx, &mut src) {
                let g = self.offset(idx);
                entries.push((g, ar.blend(alpha, a.data[a.offset(&src)], beta, self.data[g])));
            }
        });
        self.write_entries(ar.one(), ar.zero(), entries.into_iter());
        Ok(())
    }

    /// `self[perms_b[0][i], perms_b[1][j], …] = β·self[…] + α·A[i, j, …]`.
    ///
    /// `perms_b[d]` has one entry per index of A's dimension `d`. `A` must
    /// live in this world or a superset of it.
    pub fn permute_into(
        &mut self,
        perms_b: &[Option<&[Option<usize>]>],
        beta: T,
        a: &Tensor<T, B>,
        alpha: T,
    ) -> Result<()> {
        Self::check_maps(perms_b, &a.len, &self.len)?;
        require_relation(
            &a.world,
            &self.world,
            &[WorldRelation::Equal, WorldRelation::Superset],
            "permute_into",
        )?;
        let written: Vec<Vec<usize>> = perms_b
            .iter()
            .zip(a.len.iter())
            .map(|(map, &n)| match map {
                None => (0..n).collect(),
                Some(map) => map.iter().flatten().copied().collect(),
            })
            .collect();
        sym::check_transfer(&self.sym, &written, &mapped_sym(perms_b, &a.sym))?;
        let _prof = self.trace_op("permute");

        let ar = self.arithmetic;
        let mut entries = Vec::new();
        let mut dst = vec![0usize; self.ndim()];
        for_each_index(&a.len, |idx| {
            if Self::map_index(perms_b, idx, &mut dst) {
                let g = self.offset(&dst);
                entries.push((g, ar.blend(alpha, a.data[a.offset(idx)], beta, self.data[g])));
            }
        });
        self.write_entries(ar.one(), ar.zero(), entries.into_iter());
        Ok(())
    }

    // ========================================================================
    // Transfers between related worlds
    // ========================================================================

    fn check_twin(&self, other: &Tensor<T, B>) -> Result<()> {
        if self.len != other.len {
            return Err(Error::shape(format!(
                "extents {:?} and {:?} differ",
                self.len, other.len
            )));
        }
        if self.sym != other.sym {
            return Err(Error::symmetry(format!(
                "symmetry {:?} and {:?} differ",
                self.sym, other.sym
            )));
        }
        Ok(())
    }

    /// `tsr = α·self + β·tsr` where `tsr` lives in a related world.
    pub fn add_to_subworld(&self, tsr: &mut Tensor<T, B>, alpha: T, beta: T) -> Result<()> {
        self.check_twin(tsr)?;
        require_relation(&self.world, &tsr.world, RELATED, "add_to_subworld")?;
        let _prof = self.trace_op("add_to_subworld");
        let ar = tsr.arithmetic;
        for (dst, &src) in tsr.data.iter_mut().zip(self.data.iter()) {
            *dst = ar.blend(alpha, src, beta, *dst);
        }
        Ok(())
    }

    /// `self = α·tsr + β·self` where `tsr` lives in a related world.
    pub fn add_from_subworld(&mut self, tsr: &Tensor<T, B>, alpha: T, beta: T) -> Result<()> {
        self.check_twin(tsr)?;
        require_relation(&tsr.world, &self.world, RELATED, "add_from_subworld")?;
        let _prof = self.trace_op("add_from_subworld");
        let ar = self.arithmetic;
        for (dst, &src) in self.data.iter_mut().zip(tsr.data.iter()) {
            *dst = ar.blend(alpha, src, beta, *dst);
        }
        Ok(())
    }
}
