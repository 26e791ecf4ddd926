//! Single-pass merge-join of two ascending sequences.
//!
//! Both inputs must already be sorted by their key (timestamp for items,
//! day key for day counts). The output contains every input element in
//! non-decreasing key order together with the largest version observed.

use std::cmp::Ordering;
use std::iter::Peekable;

use super::entities::{DynamicRecord, LiveRecord};
use super::timeline::{DayCount, TimelineItem};

/// Merge dynamic and live records by timestamp.
///
/// On equal timestamps the live record is emitted first. The returned version
/// is the maximum `last_modified` of all merged items, or 0 for empty input.
pub fn merge_items(
    dynamics: Vec<DynamicRecord>,
    lives: Vec<LiveRecord>,
) -> (Vec<TimelineItem>, i64) {
    let mut merged = Vec::with_capacity(dynamics.len() + lives.len());
    let mut version = 0_i64;
    let mut dynamics = dynamics.into_iter().peekable();
    let mut lives = lives.into_iter().peekable();

    loop {
        let take_live = match (dynamics.peek(), lives.peek()) {
            (Some(dynamic), Some(live)) => live.timestamp <= dynamic.timestamp,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (None, None) => break,
        };

        let item = if take_live {
            lives.next().map(TimelineItem::Live)
        } else {
            dynamics.next().map(TimelineItem::Dynamic)
        };

        if let Some(item) = item {
            version = version.max(item.last_modified());
            merged.push(item);
        }
    }

    (merged, version)
}

/// Merge two ascending day-count sequences.
///
/// Equal days collapse into one row with summed counts and the larger version.
/// The returned version is the maximum version among emitted rows, or 0.
pub fn merge_day_counts(left: Vec<DayCount>, right: Vec<DayCount>) -> (Vec<DayCount>, i64) {
    let mut merged = Vec::with_capacity(left.len().max(right.len()));
    let mut version = 0_i64;
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    while let Some(row) = next_day(&mut left, &mut right) {
        version = version.max(row.version);
        merged.push(row);
    }

    (merged, version)
}

fn next_day<L, R>(left: &mut Peekable<L>, right: &mut Peekable<R>) -> Option<DayCount>
where
    L: Iterator<Item = DayCount>,
    R: Iterator<Item = DayCount>,
{
    let order = match (left.peek(), right.peek()) {
        (Some(l), Some(r)) => l.day.cmp(&r.day),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => return None,
    };

    match order {
        Ordering::Less => left.next(),
        Ordering::Greater => right.next(),
        Ordering::Equal => {
            let l = left.next()?;
            let r = right.next()?;
            Some(DayCount {
                day: l.day,
                count: l.count + r.count,
                version: l.version.max(r.version),
            })
        }
    }
}
