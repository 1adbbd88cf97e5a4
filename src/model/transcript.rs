/// A single spoken word with timing in seconds.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Word {
    /// Display text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds (`end >= start` after validation).
    pub end: f64,
    /// Optional source identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Word {
    /// Build a word without an id.
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            id: None,
        }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Inclusive containment test on `[start, end]`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// A transcript segment (cue) grouping consecutive words.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Segment {
    /// Full segment text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Words in spoken order.
    pub words: Vec<Word>,
    /// Optional source identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Optional speaker label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_id: Option<String>,
}

impl Segment {
    /// Build a segment whose text is the space-joined word texts.
    pub fn from_words(start: f64, end: f64, words: Vec<Word>) -> Self {
        let text = words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            text,
            start,
            end,
            words,
            id: None,
            speaker_id: None,
        }
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Inclusive containment test on `[start, end]`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// A complete time-aligned transcript.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transcript {
    /// Time-ordered segments.
    pub segments: Vec<Segment>,
    /// Total duration in seconds; drives the compiled frame count.
    pub duration: f64,
    /// Optional language tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Optional full transcript text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Transcript {
    /// Build a transcript with no language or text metadata.
    pub fn new(segments: Vec<Segment>, duration: f64) -> Self {
        Self {
            segments,
            duration,
            language: None,
            text: None,
        }
    }

    /// Total number of words across all segments.
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }
}
