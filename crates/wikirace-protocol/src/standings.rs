//! Leaderboard ordering shared by the server and the client projection.
//!
//! Order: finished players first, by ascending finish time; then the
//! unfinished, by ascending path length. Only finished players get a rank,
//! their 1-based position among the finished. The sort is stable, so ties
//! keep the input (join) order.

use std::cmp::Ordering;

/// What the ordering looks at for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankKey {
    /// `Some` iff the player finished.
    pub finish_time: Option<u64>,
    pub path_length: usize,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    /// Index into the slice passed to [`standings`].
    pub index: usize,
    /// Podium position, `None` for players still racing.
    pub rank: Option<usize>,
}

/// Computes leaderboard rows for `keys`, best first.
pub fn standings(keys: &[RankKey]) -> Vec<Standing> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| compare(&keys[a], &keys[b]));

    let mut next_rank = 1;
    order
        .into_iter()
        .map(|index| {
            let rank = keys[index].finish_time.map(|_| {
                let rank = next_rank;
                next_rank += 1;
                rank
            });
            Standing { index, rank }
        })
        .collect()
}

fn compare(a: &RankKey, b: &RankKey) -> Ordering {
    match (a.finish_time, b.finish_time) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.path_length.cmp(&b.path_length),
    }
}
