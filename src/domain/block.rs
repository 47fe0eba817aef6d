use serde::{Deserialize, Serialize};

/// A single lexical unit extracted from the OCR text of a line.
///
/// A word has no identity of its own beyond its position in the enclosing
/// [`LineTranslation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// The surface form as it appears in the source line.
    pub word: String,
    /// The dictionary (base) form of the word.
    pub dictionary_entry: String,
    /// A human-readable gloss.
    pub meaning: String,
    /// The grammatical form the word takes in the sentence.
    pub sentence_form: String,
}

/// The annotated words of one source line, in reading order.
///
/// Reading order is left-to-right for horizontal text and top-to-bottom for
/// vertical text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTranslation {
    /// The words of the line.
    pub words: Vec<Word>,
}

/// The four numbers locating a block on its page.
///
/// The coordinate convention is owned by the OCR pipeline that produced the
/// document. The values are carried through unchanged and never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox(pub [f64; 4]);

impl BoundingBox {
    /// The raw values, in the order the producer wrote them.
    #[must_use]
    pub const fn values(&self) -> [f64; 4] {
        self.0
    }

    /// Whether every value is neither NaN nor infinite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.into_iter().all(f64::is_finite)
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(values: [f64; 4]) -> Self {
        Self(values)
    }
}

/// A rectangular text region detected on a page.
///
/// The source lines and their translations are positionally correlated: the
/// translation at index `i` annotates the line at index `i`. Both sequences
/// are only reachable through accessors so that they can never drift apart.
/// The bounding box and font size are always finite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    #[serde(rename = "box")]
    bounding_box: BoundingBox,
    /// Whether the text is written vertically.
    pub vertical: bool,
    font_size: f64,
    lines: Vec<String>,
    /// Translation of the block as a whole.
    pub translation: String,
    line_translations: Vec<LineTranslation>,
}

/// A block could not be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidBlock {
    /// The lines and line translations have different lengths.
    #[error("block has {lines} lines but {line_translations} line translations")]
    LineCountMismatch {
        /// Number of source lines.
        lines: usize,
        /// Number of line translations.
        line_translations: usize,
    },
    /// The bounding box or font size is NaN or infinite.
    #[error("block {field} is not a finite number")]
    NonFinite {
        /// Either `box` or `font_size`.
        field: &'static str,
    },
}

impl Block {
    /// Construct a new [`Block`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBlock::LineCountMismatch`] if `lines` and
    /// `line_translations` do not have the same length, and
    /// [`InvalidBlock::NonFinite`] if any number is NaN or infinite.
    pub fn new(
        bounding_box: BoundingBox,
        vertical: bool,
        font_size: f64,
        lines: Vec<String>,
        translation: String,
        line_translations: Vec<LineTranslation>,
    ) -> Result<Self, InvalidBlock> {
        if lines.len() != line_translations.len() {
            return Err(InvalidBlock::LineCountMismatch {
                lines: lines.len(),
                line_translations: line_translations.len(),
            });
        }
        if !bounding_box.is_finite() {
            return Err(InvalidBlock::NonFinite { field: "box" });
        }
        if !font_size.is_finite() {
            return Err(InvalidBlock::NonFinite { field: "font_size" });
        }

        Ok(Self {
            bounding_box,
            vertical,
            font_size,
            lines,
            translation,
            line_translations,
        })
    }

    /// Location of the block on the page.
    #[must_use]
    pub const fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// The detected font size.
    #[must_use]
    pub const fn font_size(&self) -> f64 {
        self.font_size
    }

    /// The raw source-language lines, in order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The per-line translations, one for each entry of [`Block::lines`].
    #[must_use]
    pub fn line_translations(&self) -> &[LineTranslation] {
        &self.line_translations
    }

    /// Iterate over each source line together with its translation.
    pub fn iter_lines(&self) -> impl Iterator<Item = (&str, &LineTranslation)> {
        self.lines
            .iter()
            .map(String::as_str)
            .zip(&self.line_translations)
    }

    /// Iterate over every annotated word in the block, line by line.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        self.line_translations
            .iter()
            .flat_map(|translation| &translation.words)
    }
}
