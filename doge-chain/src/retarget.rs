//! Difficulty retarget, ported from `contract/src/dogecoin.rs`'s
//! `get_next_work_required`/`calculate_next_work_required`, itself a port of
//! `dogecoin/dogecoin`'s `pow.cpp`. The store supplies the ancestor lookups
//! this needs (`ancestor_time_at_height`, walking back via `prev_hash`);
//! this module is the pure arithmetic.

use crate::error::{ChainError, Result};
use doge_types::{ChainParams, U256};

/// Per-block inputs the retarget needs about the header being connected and
/// its immediate parent, independent of how the store looked them up.
pub struct RetargetContext {
    pub parent_height: u32,
    pub parent_bits: u32,
    pub parent_timestamp: u32,
    pub candidate_timestamp: u32,
}

/// Looks up the timestamp and bits of the ancestor `difficulty_adjustment_interval`
/// (or one fewer, at the first-ever retarget) blocks before `parent`.
pub trait AncestorLookup {
    fn ancestor_bits_at_height(&self, height: u32) -> Result<u32>;
    fn ancestor_timestamp_at_height(&self, height: u32) -> Result<u32>;
}

/// Whether a block may legally bear the network's minimum difficulty because
/// it arrived long after its predecessor (mirrors `allow_min_difficulty_for_block`'s
/// magic activation height).
fn allow_min_difficulty(params: &ChainParams, ctx: &RetargetContext) -> bool {
    match params.allow_min_difficulty_after_height {
        Some(activation) if ctx.parent_height >= activation => {
            ctx.candidate_timestamp > ctx.parent_timestamp + params.pow_target_spacing * 2
        }
        _ => false,
    }
}

/// Computes the `bits` value a header at `parent.height + 1` must carry.
pub fn expected_bits(params: &ChainParams, ctx: &RetargetContext, ancestors: &impl AncestorLookup) -> Result<u32> {
    if allow_min_difficulty(params, ctx) {
        return Ok(params.pow_limit.target_to_bits());
    }

    let new_difficulty_protocol = ctx.parent_height + 1 >= params.digishield_height;
    let interval = if new_difficulty_protocol { 1 } else { params.blocks_per_adjustment_legacy };

    if (ctx.parent_height + 1) % interval != 0 {
        if params.allow_min_difficulty_after_height.is_some() {
            if ctx.candidate_timestamp > ctx.parent_timestamp + params.pow_target_spacing * 2 {
                return Ok(params.pow_limit.target_to_bits());
            }
            // Walk back to the last block that was not itself a special
            // min-difficulty exception, and reuse its bits.
            let mut height = ctx.parent_height;
            let mut bits = ctx.parent_bits;
            let pow_limit_bits = params.pow_limit.target_to_bits();
            while bits == pow_limit_bits && height % params.blocks_per_adjustment_legacy != 0 {
                if height == 0 {
                    break;
                }
                height -= 1;
                bits = ancestors.ancestor_bits_at_height(height)?;
            }
            return Ok(bits);
        }
        return Ok(ctx.parent_bits);
    }

    let blocks_to_go_back = if ctx.parent_height + 1 != interval { interval } else { interval - 1 };
    let height_first = ctx
        .parent_height
        .checked_sub(blocks_to_go_back)
        .ok_or(ChainError::Disconnected)?;
    let first_timestamp = ancestors.ancestor_timestamp_at_height(height_first)?;

    retarget(params, ctx.parent_bits, ctx.parent_timestamp, first_timestamp)
}

/// The core retarget formula: rescale the previous target by the ratio of
/// actual to expected timespan, clamped to a 4x window either way, and
/// floored at the network's `pow_limit`.
fn retarget(params: &ChainParams, prev_bits: u32, prev_timestamp: u32, first_timestamp: u32) -> Result<u32> {
    let timespan = params.pow_target_timespan_legacy as i64;
    let mut actual_timespan = prev_timestamp as i64 - first_timestamp as i64;
    if actual_timespan < timespan / 4 {
        actual_timespan = timespan / 4;
    }
    if actual_timespan > timespan * 4 {
        actual_timespan = timespan * 4;
    }

    let (prev_target, negative, overflow) = U256::set_compact(prev_bits);
    if negative || overflow {
        return Err(ChainError::PowFailed);
    }

    let divided = prev_target / U256::from(timespan as u64);
    let (mut new_target, mul_overflow) = divided.overflowing_mul(actual_timespan as u64);
    if mul_overflow {
        return Err(ChainError::PowFailed);
    }
    if new_target > params.pow_limit {
        new_target = params.pow_limit;
    }

    Ok(new_target.target_to_bits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doge_types::Network;

    struct NoAncestors;
    impl AncestorLookup for NoAncestors {
        fn ancestor_bits_at_height(&self, _height: u32) -> Result<u32> {
            Err(ChainError::Disconnected)
        }
        fn ancestor_timestamp_at_height(&self, _height: u32) -> Result<u32> {
            Err(ChainError::Disconnected)
        }
    }

    #[test]
    fn non_retarget_block_keeps_parent_bits_when_min_difficulty_is_unavailable() {
        let mut params = ChainParams::for_network(Network::Main);
        params.allow_min_difficulty_after_height = None;
        let ctx = RetargetContext {
            parent_height: 10,
            parent_bits: 0x1d00_ffff,
            parent_timestamp: 1000,
            candidate_timestamp: 1060,
        };
        assert_eq!(expected_bits(&params, &ctx, &NoAncestors).unwrap(), 0x1d00_ffff);
    }

    #[test]
    fn stale_block_past_threshold_gets_minimum_difficulty() {
        let params = ChainParams::for_network(Network::Testnet);
        let ctx = RetargetContext {
            parent_height: 200_000,
            parent_bits: 0x1d00_ffff,
            parent_timestamp: 1000,
            candidate_timestamp: 1000 + params.pow_target_spacing * 2 + 1,
        };
        assert_eq!(expected_bits(&params, &ctx, &NoAncestors).unwrap(), params.pow_limit.target_to_bits());
    }

    #[test]
    fn retarget_widens_target_when_blocks_arrive_slowly() {
        let mut params = ChainParams::for_network(Network::Main);
        params.allow_min_difficulty_after_height = None;
        // interval collapses to 1 post-digishield, so every block retargets.
        let parent_height = params.digishield_height + 10;
        let prev_bits = 0x1d00_ffffu32;
        let ctx = RetargetContext {
            parent_height,
            parent_bits: prev_bits,
            parent_timestamp: 100_000,
            candidate_timestamp: 100_060,
        };
        struct FixedAncestor(u32, u32);
        impl AncestorLookup for FixedAncestor {
            fn ancestor_bits_at_height(&self, _height: u32) -> Result<u32> {
                Ok(self.1)
            }
            fn ancestor_timestamp_at_height(&self, _height: u32) -> Result<u32> {
                Ok(self.0)
            }
        }
        // "first" block is far enough back that the actual timespan clamps
        // to the maximum 4x widening allowed per retarget.
        let ancestors = FixedAncestor(0, prev_bits);
        let bits = expected_bits(&params, &ctx, &ancestors).unwrap();
        let (prev_target, _, _) = U256::set_compact(prev_bits);
        let (new_target, _, _) = U256::set_compact(bits);
        assert!(new_target > prev_target);
        assert!(new_target <= params.pow_limit);
    }
}
