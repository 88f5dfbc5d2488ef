/*!
 * Round-robin block partitioning
 *
 * Global block `k` spans `[k * block_size, (k + 1) * block_size)` and is owned
 * by worker `k % worker_count`. Each worker therefore walks the file with a
 * stride of `worker_count * block_size`, starting at `worker_index * block_size`.
 * The planner is pure: no I/O, no state beyond its inputs.
 */

use serde::Serialize;

/// A contiguous span of the source file, copied to the same offset in the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub offset: u64,
    pub len: u64,
}

impl ByteRange {
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// Iterator over the ranges owned by one worker
#[derive(Debug, Clone)]
pub struct StridePlan {
    next: u64,
    stride: u64,
    block_size: u64,
    file_size: u64,
}

impl Iterator for StridePlan {
    type Item = ByteRange;

    fn next(&mut self) -> Option<ByteRange> {
        if self.next >= self.file_size {
            return None;
        }
        let offset = self.next;
        let len = self.block_size.min(self.file_size - offset);
        // Saturate so a stride past u64::MAX ends the walk instead of wrapping
        self.next = offset.saturating_add(self.stride);
        Some(ByteRange { offset, len })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.next >= self.file_size {
            return (0, Some(0));
        }
        let remaining = (self.file_size - self.next - 1) / self.stride + 1;
        let n = usize::try_from(remaining).unwrap_or(usize::MAX);
        (n, Some(n))
    }
}

/// Plan the ranges worker `worker_index` owns.
///
/// `block_size` and `worker_count` must be positive and
/// `worker_index < worker_count`; a worker whose first block lies at or past
/// the end of the file gets an empty plan.
pub fn plan_ranges(
    file_size: u64,
    block_size: u64,
    worker_count: usize,
    worker_index: usize,
) -> StridePlan {
    debug_assert!(block_size > 0 && worker_count > 0);
    debug_assert!(worker_index < worker_count);

    let start = (worker_index as u64).saturating_mul(block_size);
    let stride = (worker_count as u64).saturating_mul(block_size);

    StridePlan {
        next: start,
        stride,
        block_size,
        file_size,
    }
}

/// A worker index together with the ranges it owns, in ascending offset order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerAssignment {
    pub index: usize,
    pub ranges: Vec<ByteRange>,
}

impl WorkerAssignment {
    pub fn total_bytes(&self) -> u64 {
        self.ranges.iter().map(|r| r.len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

pub fn assignment_for(
    file_size: u64,
    block_size: u64,
    worker_count: usize,
    worker_index: usize,
) -> WorkerAssignment {
    WorkerAssignment {
        index: worker_index,
        ranges: plan_ranges(file_size, block_size, worker_count, worker_index).collect(),
    }
}

/// Assignments for every worker of a request, indexed by worker
pub fn assign_all(file_size: u64, block_size: u64, worker_count: usize) -> Vec<WorkerAssignment> {
    (0..worker_count)
        .map(|i| assignment_for(file_size, block_size, worker_count, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    /// Verify the assignments tile `[0, file_size)` exactly once
    fn assert_exact_cover(file_size: u64, block_size: u64, worker_count: usize) {
        let mut ranges: Vec<ByteRange> = assign_all(file_size, block_size, worker_count)
            .into_iter()
            .flat_map(|a| a.ranges)
            .collect();
        ranges.sort_by_key(|r| r.offset);

        let mut cursor = 0;
        for r in &ranges {
            assert!(r.len > 0, "empty range {:?}", r);
            assert_eq!(
                r.offset, cursor,
                "gap or overlap at {} (fs={}, bs={}, w={})",
                cursor, file_size, block_size, worker_count
            );
            cursor = r.end();
        }
        assert_eq!(cursor, file_size);
    }

    #[test]
    fn test_three_mib_two_workers() {
        let w0 = assignment_for(3 * MIB, MIB, 2, 0);
        let w1 = assignment_for(3 * MIB, MIB, 2, 1);

        assert_eq!(
            w0.ranges,
            vec![
                ByteRange { offset: 0, len: MIB },
                ByteRange {
                    offset: 2 * MIB,
                    len: MIB
                },
            ]
        );
        assert_eq!(w1.ranges, vec![ByteRange { offset: MIB, len: MIB }]);
        assert_exact_cover(3 * MIB, MIB, 2);
    }

    #[test]
    fn test_single_worker_is_sequential() {
        let a = assignment_for(10_000, 4096, 1, 0);
        assert_eq!(a.ranges.len(), 3);
        assert_eq!(a.ranges[0].offset, 0);
        assert_eq!(a.ranges[2], ByteRange { offset: 8192, len: 1808 });
        assert_eq!(a.total_bytes(), 10_000);
    }

    #[test]
    fn test_short_tail_block() {
        let a = assignment_for(MIB + 17, MIB, 2, 1);
        assert_eq!(a.ranges, vec![ByteRange { offset: MIB, len: 17 }]);
    }

    #[test]
    fn test_more_workers_than_blocks() {
        let all = assign_all(3 * 4096, 4096, 8);
        assert_eq!(all.iter().filter(|a| !a.is_empty()).count(), 3);
        assert!(all[3..].iter().all(WorkerAssignment::is_empty));
        assert_exact_cover(3 * 4096, 4096, 8);
    }

    #[test]
    fn test_empty_file() {
        for w in 0..4 {
            assert_eq!(plan_ranges(0, 4096, 4, w).count(), 0);
        }
    }

    #[test]
    fn test_size_hint_matches_count() {
        for (fs, bs, wc) in [(10_000u64, 4096u64, 1usize), (3 * MIB, MIB, 2), (1, 7, 5)] {
            for i in 0..wc {
                let plan = plan_ranges(fs, bs, wc, i);
                let (lo, hi) = plan.size_hint();
                let n = plan.count();
                assert_eq!(lo, n);
                assert_eq!(hi, Some(n));
            }
        }
    }

    #[test]
    fn test_cover_over_grid() {
        for file_size in [1u64, 2, 7, 4095, 4096, 4097, 65_536, 100_003, 3 * MIB + 1] {
            for block_size in [1u64, 3, 512, 4096, 65_536, MIB] {
                for worker_count in [1usize, 2, 3, 4, 7, 16, 33] {
                    if file_size / block_size > 50_000 {
                        continue;
                    }
                    assert_exact_cover(file_size, block_size, worker_count);
                }
            }
        }
    }

    #[test]
    fn test_plan_is_restartable() {
        let first: Vec<_> = plan_ranges(MIB, 4096, 3, 2).collect();
        let second: Vec<_> = plan_ranges(MIB, 4096, 3, 2).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_huge_offsets_do_not_wrap() {
        let plan: Vec<_> = plan_ranges(u64::MAX, u64::MAX / 2, 4, 1).collect();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].offset, u64::MAX / 2);
    }
}
