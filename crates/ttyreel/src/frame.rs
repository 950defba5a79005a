//! Frames and frame sequences.
//!
//! A [`Frame`] is one coalesced unit of terminal output plus the delay that
//! preceded it. Content is opaque: raw terminal bytes including control
//! sequences, never interpreted here.

use serde::{Deserialize, Serialize};

/// One unit of captured terminal output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Milliseconds since the previous frame finished
    pub delay: f64,
    /// Raw terminal bytes
    #[serde(with = "content_repr")]
    pub content: Vec<u8>,
}

impl Frame {
    /// Create a frame
    #[must_use]
    pub fn new(delay: f64, content: impl Into<Vec<u8>>) -> Self {
        Self {
            delay,
            content: content.into(),
        }
    }

    /// Content as text, replacing invalid UTF-8
    #[must_use]
    pub fn content_lossy(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }
}

/// Ordered list of frames; index order is playback order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameSequence {
    frames: Vec<Frame>,
}

impl FrameSequence {
    /// Create an empty sequence
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence has no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// All frames in order
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Iterate frames in order
    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Delays in order
    #[must_use]
    pub fn delays(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.delay).collect()
    }

    /// Total duration in milliseconds
    #[must_use]
    pub fn total_delay(&self) -> f64 {
        self.frames.iter().map(|f| f.delay).sum()
    }

    /// Delay of the frame after `index`, wrapping to the first frame.
    ///
    /// This is how long the still image taken after frame `index` stays on
    /// screen in a looping animation.
    #[must_use]
    pub fn delay_after(&self, index: usize) -> Option<f64> {
        if self.frames.is_empty() {
            return None;
        }
        Some(self.frames[(index + 1) % self.frames.len()].delay)
    }

    /// Consume into the underlying frames
    #[must_use]
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }

    pub(crate) fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Frame> {
        self.frames.iter_mut()
    }
}

impl From<Vec<Frame>> for FrameSequence {
    fn from(frames: Vec<Frame>) -> Self {
        Self { frames }
    }
}

impl FromIterator<Frame> for FrameSequence {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Content is stored as a plain string when it is valid UTF-8, otherwise as
/// `{ base64: "..." }`.
mod content_repr {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Binary { base64: String },
    }

    pub fn serialize<S: Serializer>(content: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        match std::str::from_utf8(content) {
            Ok(text) => Repr::Text(text.to_string()).serialize(serializer),
            Err(_) => Repr::Binary {
                base64: general_purpose::STANDARD.encode(content),
            }
            .serialize(serializer),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(text) => Ok(text.into_bytes()),
            Repr::Binary { base64 } => general_purpose::STANDARD
                .decode(base64.as_bytes())
                .map_err(serde::de::Error::custom),
        }
    }
}
