//! Per-clip playback cursor
//!
//! Holds one current index per clip plus the fixed last index of each clip.
//! Both operations touch only two frames per clip (the one being hidden and
//! the one being shown), so cost is O(clips) regardless of clip length.
//!
//! # Wraparound
//!
//! `tick(n)` uses Euclidean modulo: with limit `L`, index `i` becomes
//! `(i + n) mod (L + 1)`. Negative `n` wraps backward (L=4, i=0, n=-1 -> 4).

/// Visibility change for one clip: hide `from`, show `to`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSwap {
    pub clip: usize,
    pub from: usize,
    pub to: usize,
}

/// Current frame per clip with wraparound stepping and percent seek
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackCursor {
    frame_indices: Vec<usize>,
    frame_limits: Vec<usize>,
}

impl PlaybackCursor {
    /// Build from clip lengths. Every index starts at 0.
    ///
    /// Clip lengths are at least 1 by the time a scene is assembled;
    /// a zero length is treated as a single-frame clip.
    pub fn new(clip_lengths: &[usize]) -> Self {
        Self {
            frame_indices: vec![0; clip_lengths.len()],
            frame_limits: clip_lengths.iter().map(|len| len.saturating_sub(1)).collect(),
        }
    }

    pub fn frame_indices(&self) -> &[usize] {
        &self.frame_indices
    }

    pub fn frame_limits(&self) -> &[usize] {
        &self.frame_limits
    }

    pub fn clip_count(&self) -> usize {
        self.frame_indices.len()
    }

    /// Step every clip by `n` frames with wraparound.
    pub fn tick(&mut self, n: i64) -> Vec<FrameSwap> {
        self.frame_indices
            .iter_mut()
            .zip(&self.frame_limits)
            .enumerate()
            .map(|(clip, (index, &limit))| {
                let from = *index;
                let to = wrap_index(from, n, limit);
                *index = to;
                FrameSwap { clip, from, to }
            })
            .collect()
    }

    /// Jump every clip to `floor(limit * percent)`, percent clamped to [0, 1].
    pub fn set_frame(&mut self, percent: f64) -> Vec<FrameSwap> {
        let p = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 1.0) };

        self.frame_indices
            .iter_mut()
            .zip(&self.frame_limits)
            .enumerate()
            .map(|(clip, (index, &limit))| {
                let from = *index;
                let to = ((limit as f64 * p).floor() as usize).min(limit);
                *index = to;
                FrameSwap { clip, from, to }
            })
            .collect()
    }
}

/// `(index + n) mod (limit + 1)`, always in `[0, limit]`.
pub fn wrap_index(index: usize, n: i64, limit: usize) -> usize {
    let len = limit as i64 + 1;
    (index as i64 + n).rem_euclid(len) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, -1, 4), 4);
        assert_eq!(wrap_index(4, 1, 4), 0);
        assert_eq!(wrap_index(2, 1, 4), 3);
        assert_eq!(wrap_index(1, 7, 4), 3);
        assert_eq!(wrap_index(1, -7, 4), 4);
        assert_eq!(wrap_index(0, 3, 0), 0);
    }

    #[test]
    fn test_new_limits() {
        let cursor = PlaybackCursor::new(&[3, 2, 1]);
        assert_eq!(cursor.frame_indices(), &[0, 0, 0]);
        assert_eq!(cursor.frame_limits(), &[2, 1, 0]);
    }

    /// Test: Tick wraps each clip independently
    /// Validates: [0,0] -> [1,1] -> [2,0] for limits [2,1]
    #[test]
    fn test_tick_sequence() {
        let mut cursor = PlaybackCursor::new(&[3, 2]);

        let swaps = cursor.tick(1);
        assert_eq!(cursor.frame_indices(), &[1, 1]);
        assert_eq!(swaps[1], FrameSwap { clip: 1, from: 0, to: 1 });

        cursor.tick(1);
        assert_eq!(cursor.frame_indices(), &[2, 0]);

        cursor.tick(-1);
        assert_eq!(cursor.frame_indices(), &[1, 1]);
    }

    /// Test: Percent seek
    /// Validates: 0 -> first, 1 -> last, out-of-range values clamp, floor rounding
    #[test]
    fn test_set_frame() {
        let mut cursor = PlaybackCursor::new(&[3, 2, 10]);

        cursor.set_frame(0.5);
        assert_eq!(cursor.frame_indices(), &[1, 0, 4]);

        cursor.set_frame(1.0);
        assert_eq!(cursor.frame_indices(), &[2, 1, 9]);

        cursor.set_frame(0.0);
        assert_eq!(cursor.frame_indices(), &[0, 0, 0]);

        cursor.set_frame(7.5);
        assert_eq!(cursor.frame_indices(), &[2, 1, 9]);

        cursor.set_frame(-2.0);
        assert_eq!(cursor.frame_indices(), &[0, 0, 0]);

        cursor.set_frame(f64::NAN);
        assert_eq!(cursor.frame_indices(), &[0, 0, 0]);
    }

    #[test]
    fn test_swaps_report_previous_index() {
        let mut cursor = PlaybackCursor::new(&[5]);
        cursor.tick(3);
        let swaps = cursor.set_frame(0.25);
        assert_eq!(swaps, vec![FrameSwap { clip: 0, from: 3, to: 1 }]);
    }
}
