//! Label-space loops for the general kernels.
//!
//! Every distinct mode across the operands becomes one loop level. An operand
//! steps by the sum of its strides over all dimensions carrying the mode, so
//! repeated modes walk the diagonal and absent modes do not move it.

use crate::tensor::compute_contiguous_strides;

pub(super) struct LabelSpace {
    extents: Vec<usize>,
    /// `steps[op][level]`
    steps: Vec<Vec<usize>>,
}

impl LabelSpace {
    /// Build the loop nest over `(shape, modes)` operands.
    pub(super) fn new(operands: &[(&[usize], &[i32])]) -> Self {
        let mut labels: Vec<i32> = Vec::new();
        let mut extents = Vec::new();
        for (shape, modes) in operands {
            for (&m, &len) in modes.iter().zip(shape.iter()) {
                if !labels.contains(&m) {
                    labels.push(m);
                    extents.push(len);
                }
            }
        }

        let steps = operands
            .iter()
            .map(|(shape, modes)| {
                let strides = compute_contiguous_strides(shape);
                labels
                    .iter()
                    .map(|l| {
                        modes
                            .iter()
                            .zip(strides.iter())
                            .filter(|(m, _)| *m == l)
                            .map(|(_, s)| *s)
                            .sum::<usize>()
                    })
                    .collect()
            })
            .collect();

        Self { extents, steps }
    }

    /// Visit every point of the label space in column-major order, passing
    /// the offset of each operand.
    pub(super) fn for_each(&self, mut f: impl FnMut(&[usize])) {
        if self.extents.iter().any(|&e| e == 0) {
            return;
        }

        let mut idx = vec![0usize; self.extents.len()];
        let mut offsets = vec![0usize; self.steps.len()];
        loop {
            f(&offsets);

            let mut level = 0;
            loop {
                if level == self.extents.len() {
                    return;
                }
                idx[level] += 1;
                for (off, steps) in offsets.iter_mut().zip(self.steps.iter()) {
                    *off += steps[level];
                }
                if idx[level] < self.extents[level] {
                    break;
                }
                for (off, steps) in offsets.iter_mut().zip(self.steps.iter()) {
                    *off -= steps[level] * self.extents[level];
                }
                idx[level] = 0;
                level += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space(operands: &[(Vec<usize>, Vec<i32>)]) -> LabelSpace {
        let refs: Vec<(&[usize], &[i32])> = operands
            .iter()
            .map(|(s, m)| (s.as_slice(), m.as_slice()))
            .collect();
        LabelSpace::new(&refs)
    }

    #[test]
    fn test_diagonal_walk() {
        // "ii" on a 3x3 visits 0, 4, 8
        let mut seen = Vec::new();
        space(&[(vec![3, 3], vec![0, 0])]).for_each(|off| seen.push(off[0]));
        assert_eq!(seen, vec![0, 4, 8]);
    }

    #[test]
    fn test_broadcast_and_reduce() {
        // a["i"] against c["j"]: a steps on level 0, c on level 1
        let mut seen = Vec::new();
        space(&[(vec![2], vec![0]), (vec![3], vec![1])])
            .for_each(|off| seen.push((off[0], off[1])));
        assert_eq!(
            seen,
            vec![(0, 0), (1, 0), (0, 1), (1, 1), (0, 2), (1, 2)]
        );
    }

    #[test]
    fn test_scalar_and_empty() {
        let mut count = 0;
        space(&[(vec![], vec![])]).for_each(|_| count += 1);
        assert_eq!(count, 1);

        count = 0;
        space(&[(vec![0, 4], vec![0, 1])]).for_each(|_| count += 1);
        assert_eq!(count, 0);
    }
}
