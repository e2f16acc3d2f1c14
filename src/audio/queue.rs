use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, collections::VecDeque, fmt};
use tracing::{debug, info};

use crate::error::QueueError;

/// Opaque reference to a playable item (a URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track(String);

impl Track {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Track {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

/// Result of removing a single 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    Removed { position: usize, track: Track },
    OutOfRange(i64),
}

impl Removal {
    pub fn is_removed(&self) -> bool {
        matches!(self, Removal::Removed { .. })
    }
}

/// Pending tracks in playback order. Position 0 plays next.
#[derive(Debug, Default, Clone)]
pub struct TrackQueue {
    items: VecDeque<Track>,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a queue from a persisted snapshot, preserving order.
    pub fn from_snapshot(tracks: Vec<Track>) -> Self {
        Self {
            items: tracks.into(),
        }
    }

    /// Appends a track and returns its 1-based position.
    ///
    /// URL validation is the caller's job; only blank references are refused here.
    pub fn enqueue(&mut self, track: Track) -> Result<usize, QueueError> {
        if track.as_str().trim().is_empty() {
            return Err(QueueError::InvalidTrackReference(track.0));
        }

        debug!("➕ Queued: {}", track);
        self.items.push_back(track);
        Ok(self.items.len())
    }

    /// Removes and returns the head of the queue (FIFO).
    pub fn pop_next(&mut self) -> Option<Track> {
        let next = self.items.pop_front();
        match &next {
            Some(track) => debug!("➡️ Next in queue: {}", track),
            None => debug!("📭 Queue is empty"),
        }
        next
    }

    /// Puts a track back at the head, ahead of everything else.
    pub fn requeue_front(&mut self, track: Track) {
        debug!("↩️ Requeued at head: {}", track);
        self.items.push_front(track);
    }

    /// Removes the track at a 1-based position.
    pub fn remove_at(&mut self, position: i64) -> Removal {
        let index = match usize::try_from(position) {
            Ok(p) if p >= 1 && p <= self.items.len() => p - 1,
            _ => return Removal::OutOfRange(position),
        };

        match self.items.remove(index) {
            Some(track) => {
                debug!("❌ Removed position {}: {}", position, track);
                Removal::Removed {
                    position: index + 1,
                    track,
                }
            }
            None => Removal::OutOfRange(position),
        }
    }

    /// Removes every distinct position in `positions`.
    ///
    /// Positions are always applied from highest to lowest so earlier removals
    /// never shift the entries later ones refer to. Outcomes come back in that
    /// same descending order.
    pub fn remove_many<I>(&mut self, positions: I) -> Vec<Removal>
    where
        I: IntoIterator<Item = i64>,
    {
        let distinct: BTreeSet<i64> = positions.into_iter().collect();
        distinct
            .into_iter()
            .rev()
            .map(|position| self.remove_at(position))
            .collect()
    }

    /// Empties the queue, returning how many tracks were dropped.
    pub fn clear_all(&mut self) -> usize {
        let dropped = self.items.len();
        self.items.clear();
        info!("🗑️ Queue cleared ({} tracks)", dropped);
        dropped
    }

    /// Uniform Fisher-Yates shuffle of the pending tracks.
    pub fn shuffle(&mut self) {
        let mut rng = rand::thread_rng();
        self.items.make_contiguous().shuffle(&mut rng);
        info!("🔀 Queue shuffled ({} tracks)", self.items.len());
    }

    pub fn snapshot(&self) -> Vec<Track> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn queue_of(refs: &[&str]) -> TrackQueue {
        TrackQueue::from_snapshot(refs.iter().map(|r| Track::from(*r)).collect())
    }

    fn refs(queue: &TrackQueue) -> Vec<String> {
        queue.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn pop_next_is_fifo() {
        let mut queue = TrackQueue::new();
        for r in ["one", "two", "three", "two"] {
            queue.enqueue(Track::from(r)).unwrap();
        }

        let mut popped = Vec::new();
        while let Some(track) = queue.pop_next() {
            popped.push(track.to_string());
        }

        assert_eq!(popped, vec!["one", "two", "three", "two"]);
        assert!(queue.pop_next().is_none());
    }

    #[test]
    fn pop_next_leaves_the_rest_in_order() {
        let mut queue = queue_of(&["a", "b", "c"]);
        assert_eq!(queue.pop_next(), Some(Track::from("a")));
        assert_eq!(refs(&queue), vec!["b", "c"]);
    }

    #[test]
    fn enqueue_reports_one_based_position() {
        let mut queue = queue_of(&["a"]);
        assert_eq!(queue.enqueue(Track::from("b")), Ok(2));
    }

    #[test]
    fn enqueue_rejects_blank_reference() {
        let mut queue = TrackQueue::new();
        assert_eq!(
            queue.enqueue(Track::from("   ")),
            Err(QueueError::InvalidTrackReference("   ".to_string()))
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn remove_at_out_of_range_does_not_mutate() {
        let mut empty = TrackQueue::new();
        assert_eq!(empty.remove_at(1), Removal::OutOfRange(1));

        let mut queue = queue_of(&["a", "b"]);
        assert_eq!(queue.remove_at(0), Removal::OutOfRange(0));
        assert_eq!(queue.remove_at(3), Removal::OutOfRange(3));
        assert_eq!(queue.remove_at(-1), Removal::OutOfRange(-1));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn remove_at_uses_one_based_positions() {
        let mut queue = queue_of(&["a", "b", "c"]);
        assert_eq!(
            queue.remove_at(2),
            Removal::Removed {
                position: 2,
                track: Track::from("b")
            }
        );
        assert_eq!(refs(&queue), vec!["a", "c"]);
    }

    #[test]
    fn remove_many_is_independent_of_input_order() {
        for input in [vec![3, 1], vec![1, 3]] {
            let mut queue = queue_of(&["a", "b", "c", "d", "e"]);
            let outcomes = queue.remove_many(input);

            assert!(outcomes.iter().all(Removal::is_removed));
            assert_eq!(refs(&queue), vec!["b", "d", "e"]);
        }
    }

    #[test]
    fn remove_many_reports_bad_positions_and_collapses_duplicates() {
        let mut queue = queue_of(&["a", "b", "c"]);
        let outcomes = queue.remove_many(vec![2, 9, 2, 0]);

        assert_eq!(
            outcomes,
            vec![
                Removal::OutOfRange(9),
                Removal::Removed {
                    position: 2,
                    track: Track::from("b")
                },
                Removal::OutOfRange(0),
            ]
        );
        assert_eq!(refs(&queue), vec!["a", "c"]);
    }

    #[test]
    fn clear_all_empties() {
        let mut queue = queue_of(&["a", "b"]);
        assert_eq!(queue.clear_all(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn requeue_front_goes_ahead_of_everything() {
        let mut queue = queue_of(&["b"]);
        queue.requeue_front(Track::from("a"));
        assert_eq!(refs(&queue), vec!["a", "b"]);
    }

    #[test]
    fn shuffle_keeps_membership() {
        let mut queue = queue_of(&["a", "b", "c", "d", "a"]);
        queue.shuffle();

        let mut shuffled = refs(&queue);
        shuffled.sort();
        assert_eq!(shuffled, vec!["a", "a", "b", "c", "d"]);
    }

    #[test]
    fn shuffle_is_roughly_uniform() {
        const RUNS: usize = 60_000;
        let mut counts: HashMap<Vec<String>, usize> = HashMap::new();

        for _ in 0..RUNS {
            let mut queue = queue_of(&["a", "b", "c"]);
            queue.shuffle();
            *counts.entry(refs(&queue)).or_default() += 1;
        }

        // 3! permutations, each expected RUNS / 6 = 10_000 times.
        assert_eq!(counts.len(), 6);
        for (perm, count) in &counts {
            assert!(
                (9_000..=11_000).contains(count),
                "permutation {:?} seen {} times",
                perm,
                count
            );
        }
    }

    #[test]
    fn track_serializes_as_plain_string() {
        let json = serde_json::to_string(&vec![Track::from("https://x")]).unwrap();
        assert_eq!(json, r#"["https://x"]"#);
    }
}
