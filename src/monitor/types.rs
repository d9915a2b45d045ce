//! Data types for the voice monitoring pipeline.

/// A fixed-duration block of raw 16-bit PCM mono samples.
///
/// Frames are produced by the [`Framer`](crate::audio::framer::Framer) in
/// arrival order and are immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// PCM samples (16-bit signed integers).
    pub samples: Vec<i16>,
    /// Sequence number for ordering and gap detection.
    pub sequence: u64,
}

impl Frame {
    /// Creates a new frame.
    pub fn new(samples: Vec<i16>, sequence: u64) -> Self {
        Self { samples, sequence }
    }
}

/// A contiguous run of frames judged to be one utterance.
///
/// Created by the accumulator when a candidate segment completes; handed to
/// the dispatch scheduler as a unit and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    frames: Vec<Frame>,
}

impl Segment {
    /// Creates a segment from the accumulated frames.
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Number of frames in the segment.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Flattens the frames into one contiguous sample buffer for transcription.
    pub fn samples(&self) -> Vec<i16> {
        let total: usize = self.frames.iter().map(|f| f.samples.len()).sum();
        let mut out = Vec::with_capacity(total);
        for frame in &self.frames {
            out.extend_from_slice(&frame.samples);
        }
        out
    }

    /// Segment duration in milliseconds for the given frame duration.
    pub fn duration_ms(&self, frame_ms: u32) -> u32 {
        self.frames.len() as u32 * frame_ms
    }

    /// Sequence number of the first frame, if any.
    pub fn first_sequence(&self) -> Option<u64> {
        self.frames.first().map(|f| f.sequence)
    }
}

/// Result of feeding one classified frame to the accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentEvent {
    /// Nothing to dispatch yet.
    None,
    /// A segment completed and is ready for transcription.
    SegmentReady(Segment),
}

impl SegmentEvent {
    /// Returns true if this event carries a ready segment.
    pub fn is_ready(&self) -> bool {
        matches!(self, SegmentEvent::SegmentReady(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(sequence: u64, value: i16) -> Frame {
        Frame::new(vec![value; 4], sequence)
    }

    #[test]
    fn test_frame_creation() {
        let f = Frame::new(vec![100, 200, 300], 42);
        assert_eq!(f.samples, vec![100, 200, 300]);
        assert_eq!(f.sequence, 42);
    }

    #[test]
    fn test_segment_flattens_frames_in_order() {
        let segment = Segment::new(vec![frame(0, 1), frame(1, 2), frame(2, 3)]);

        assert_eq!(segment.frame_count(), 3);
        assert_eq!(segment.samples(), vec![1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3]);
        assert_eq!(segment.first_sequence(), Some(0));
    }

    #[test]
    fn test_segment_duration() {
        let segment = Segment::new(vec![frame(0, 0), frame(1, 0), frame(2, 0)]);
        assert_eq!(segment.duration_ms(20), 60);
    }

    #[test]
    fn test_empty_segment() {
        let segment = Segment::new(Vec::new());
        assert_eq!(segment.frame_count(), 0);
        assert!(segment.samples().is_empty());
        assert_eq!(segment.first_sequence(), None);
    }

    #[test]
    fn test_segment_event_is_ready() {
        assert!(!SegmentEvent::None.is_ready());
        let event = SegmentEvent::SegmentReady(Segment::new(vec![frame(0, 0)]));
        assert!(event.is_ready());
    }
}
