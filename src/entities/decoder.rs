//! Frame decoder: nested polylines -> flat line-segment buffers
//!
//! Pure and deterministic. Workers call it in parallel without sharing
//! anything, which is what makes result order irrelevant.
//!
//! A group of `k` points becomes `k` positions and `k - 1` index pairs
//! chaining `i -> i + 1`. Groups never connect to each other.

use super::frame::{DecodedFrame, RawFrame, MAX_FRAME_VERTICES};

/// Decoder errors
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// Frame has more vertices than a u16 index can address
    TooManyVertices(usize),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::TooManyVertices(n) => write!(
                f,
                "frame has {} vertices, limit is {}",
                n, MAX_FRAME_VERTICES
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode one raw frame.
pub fn decode_frame(raw: &RawFrame) -> Result<DecodedFrame, DecodeError> {
    let vertex_count = raw.vertex_count();
    if vertex_count > MAX_FRAME_VERTICES {
        return Err(DecodeError::TooManyVertices(vertex_count));
    }

    let segment_count: usize = raw.groups.iter().map(|g| g.len().saturating_sub(1)).sum();
    let mut positions = Vec::with_capacity(vertex_count * 3);
    let mut indices = Vec::with_capacity(segment_count * 2);

    for group in raw.groups.iter().filter(|g| !g.is_empty()) {
        let base = positions.len() / 3;

        for p in group {
            positions.extend_from_slice(&[p.x, p.y, p.z]);
        }
        // Checked above: every index fits in u16
        for i in base + 1..base + group.len() {
            indices.push((i - 1) as u16);
            indices.push(i as u16);
        }
    }

    Ok(DecodedFrame { positions, indices })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::frame::Point3;

    fn group(len: usize, offset: f32) -> Vec<Point3> {
        (0..len)
            .map(|i| Point3::new(offset + i as f32, i as f32 * 0.5, -(i as f32)))
            .collect()
    }

    /// Test: Single group chains consecutive vertices
    /// Validates: k positions, k-1 pairs (i, i+1)
    #[test]
    fn test_single_group_chain() {
        let raw = RawFrame::new(vec![group(4, 0.0)]);
        let decoded = decode_frame(&raw).unwrap();

        assert_eq!(decoded.vertex_count(), 4);
        assert_eq!(decoded.indices, vec![0, 1, 1, 2, 2, 3]);
        assert_eq!(&decoded.positions[3..6], &[1.0, 0.5, -1.0]);
    }

    /// Test: Groups are independent
    /// Validates: second group indices start at its own base offset, no bridging pair
    #[test]
    fn test_groups_do_not_connect() {
        let raw = RawFrame::new(vec![group(3, 0.0), group(2, 10.0)]);
        let decoded = decode_frame(&raw).unwrap();

        assert_eq!(decoded.vertex_count(), 5);
        assert_eq!(decoded.indices, vec![0, 1, 1, 2, 3, 4]);
    }

    /// Test: Degenerate groups
    /// Validates: empty groups are skipped, single-point groups emit a position but no pair
    #[test]
    fn test_empty_and_single_point_groups() {
        let raw = RawFrame::new(vec![vec![], group(1, 0.0), vec![], group(2, 5.0)]);
        let decoded = decode_frame(&raw).unwrap();

        assert_eq!(decoded.vertex_count(), 3);
        assert_eq!(decoded.indices, vec![1, 2]);
    }

    #[test]
    fn test_empty_frame() {
        let decoded = decode_frame(&RawFrame::default()).unwrap();
        assert!(decoded.positions.is_empty());
        assert!(decoded.indices.is_empty());
    }

    /// Test: Determinism
    /// Validates: decoding the same frame twice gives identical buffers
    #[test]
    fn test_deterministic() {
        let raw = RawFrame::new(vec![group(7, 1.0), vec![], group(3, -2.0)]);
        assert_eq!(decode_frame(&raw).unwrap(), decode_frame(&raw).unwrap());
    }

    /// Test: u16 capacity boundary
    /// Validates: exactly 65536 vertices decode, 65537 fail
    #[test]
    fn test_capacity_boundary() {
        let at_limit = RawFrame::new(vec![vec![Point3::new(0.0, 0.0, 0.0); MAX_FRAME_VERTICES]]);
        let decoded = decode_frame(&at_limit).unwrap();
        assert_eq!(decoded.vertex_count(), MAX_FRAME_VERTICES);
        assert_eq!(decoded.indices.last().copied(), Some(u16::MAX));

        let over = RawFrame::new(vec![
            vec![Point3::new(0.0, 0.0, 0.0); MAX_FRAME_VERTICES],
            vec![Point3::new(1.0, 1.0, 1.0)],
        ]);
        assert_eq!(
            decode_frame(&over),
            Err(DecodeError::TooManyVertices(MAX_FRAME_VERTICES + 1))
        );
    }
}
