//! Load distribution primitives
//!
//! Everything that has to be split across agents (threads, threads per
//! ramp-up step, executions per time frame, parameter values) goes through
//! [`even_load`]. The remaining submodules hold the small cursor and sampling
//! helpers the data providers and pacing code share.
//!
//! # Example
//!
//! ```
//! use loadsplit::distribution::even_load;
//!
//! assert_eq!(even_load(10, 3), vec![3, 3, 4]);
//! assert!(even_load(2, 3).is_empty());
//! ```

pub mod sequential;
pub mod uniform;
pub mod weighted;

/// Split `total` units into `buckets` near-equal integer shares
///
/// Every bucket but the last receives `total / buckets`; the last bucket
/// receives whatever is left, so the shares always sum to `total`.
///
/// Returns an empty vector when `total < buckets` (some bucket would get
/// nothing) or when `buckets == 0`. Callers turn the empty result into a
/// distribution error naming the quantity and the requested bucket count.
pub fn even_load(total: u64, buckets: usize) -> Vec<u64> {
    if buckets == 0 || total < buckets as u64 {
        return Vec::new();
    }

    let share = total / buckets as u64;
    let mut shares = vec![share; buckets];
    shares[buckets - 1] = total - share * (buckets as u64 - 1);
    shares
}

/// Starting offset of every bucket produced by [`even_load`]
///
/// `offsets[i]` is the sum of all shares before bucket `i`.
pub fn bucket_offsets(shares: &[u64]) -> Vec<u64> {
    shares
        .iter()
        .scan(0u64, |acc, share| {
            let offset = *acc;
            *acc += share;
            Some(offset)
        })
        .collect()
}
