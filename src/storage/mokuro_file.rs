//! The `.mokuro` JSON document format.
//!
//! Decoding goes through private record types that mirror the wire layout.
//! They are converted into the domain types afterwards, so that a block whose
//! lines and line translations disagree can be reported with its position in
//! the document.

use std::{
    io::{Read, Write},
    str::FromStr,
};

use serde::Deserialize;

use crate::domain::{Block, BoundingBox, InvalidBlock, LineTranslation, MokuroData, Page};

/// A `.mokuro` document could not be decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The input is not valid JSON, or a required field is absent or has the
    /// wrong kind.
    #[error("malformed mokuro document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A block's lines and line translations have different lengths.
    #[error(
        "page {page}, block {block} has {lines} lines but {line_translations} line translations"
    )]
    StructuralMismatch {
        /// Zero-based index of the page.
        page: usize,
        /// Zero-based index of the block within the page.
        block: usize,
        /// Number of source lines.
        lines: usize,
        /// Number of line translations.
        line_translations: usize,
    },

    /// A block's bounding box or font size is NaN or infinite.
    #[error("page {page}, block {block} has a non-finite {field}")]
    NonFinite {
        /// Zero-based index of the page.
        page: usize,
        /// Zero-based index of the block within the page.
        block: usize,
        /// Either `box` or `font_size`.
        field: &'static str,
    },
}

impl MokuroData {
    /// Decode a document from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] if the input does not have the
    /// shape of a mokuro document, and [`DecodeError::StructuralMismatch`]
    /// if any block's lines and line translations disagree in length.
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        let record: MokuroRecord = serde_json::from_str(json)?;
        record.try_into()
    }

    /// Decode a document from a reader.
    ///
    /// # Errors
    ///
    /// See [`MokuroData::from_json`]. I/O failures are reported as
    /// [`DecodeError::Malformed`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DecodeError> {
        let record: MokuroRecord = serde_json::from_reader(reader)?;
        record.try_into()
    }

    /// Encode the document as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Encode the document as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Encode the document as compact JSON into `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the writer fails.
    pub fn write<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }
}

impl FromStr for MokuroData {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

#[derive(Debug, Deserialize)]
struct MokuroRecord {
    version: String,
    title: String,
    title_uuid: String,
    volume: String,
    volume_uuid: String,
    pages: Vec<PageRecord>,
}

#[derive(Debug, Deserialize)]
struct PageRecord {
    version: String,
    img_width: u32,
    img_height: u32,
    blocks: Vec<BlockRecord>,
    img_path: String,
}

#[derive(Debug, Deserialize)]
struct BlockRecord {
    #[serde(rename = "box")]
    bounding_box: BoundingBox,
    vertical: bool,
    font_size: f64,
    lines: Vec<String>,
    translation: String,
    line_translations: Vec<LineTranslation>,
}

impl TryFrom<MokuroRecord> for MokuroData {
    type Error = DecodeError;

    fn try_from(record: MokuroRecord) -> Result<Self, Self::Error> {
        let pages = record
            .pages
            .into_iter()
            .enumerate()
            .map(|(index, page)| page.into_page(index))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            version: record.version,
            title: record.title,
            title_uuid: record.title_uuid,
            volume: record.volume,
            volume_uuid: record.volume_uuid,
            pages,
        })
    }
}

impl PageRecord {
    fn into_page(self, page: usize) -> Result<Page, DecodeError> {
        let blocks = self
            .blocks
            .into_iter()
            .enumerate()
            .map(|(block, record)| {
                Block::try_from(record).map_err(|error| match error {
                    InvalidBlock::LineCountMismatch {
                        lines,
                        line_translations,
                    } => DecodeError::StructuralMismatch {
                        page,
                        block,
                        lines,
                        line_translations,
                    },
                    InvalidBlock::NonFinite { field } => {
                        DecodeError::NonFinite { page, block, field }
                    }
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Page {
            version: self.version,
            img_width: self.img_width,
            img_height: self.img_height,
            blocks,
            img_path: self.img_path,
        })
    }
}

impl TryFrom<BlockRecord> for Block {
    type Error = InvalidBlock;

    fn try_from(record: BlockRecord) -> Result<Self, Self::Error> {
        Self::new(
            record.bounding_box,
            record.vertical,
            record.font_size,
            record.lines,
            record.translation,
            record.line_translations,
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::Word;

    fn sample() -> serde_json::Value {
        json!({
            "version": "1.0",
            "title": "Sample",
            "title_uuid": "0f8b7c4e-4b7a-4d0e-9d59-3f1f3c9a2b10",
            "volume": "Sample 01",
            "volume_uuid": "5a2e1d3c-8f44-4c3b-a0a1-6b7c8d9e0f12",
            "pages": [{
                "version": "1.0",
                "img_width": 800,
                "img_height": 1200,
                "img_path": "001.jpg",
                "blocks": [{
                    "box": [10, 20, 110, 220],
                    "vertical": true,
                    "font_size": 28,
                    "lines": ["こんにちは"],
                    "translation": "Hello",
                    "line_translations": [{
                        "words": [{
                            "word": "こんにちは",
                            "dictionary_entry": "こんにちは",
                            "meaning": "hello",
                            "sentence_form": "interjection"
                        }]
                    }]
                }]
            }]
        })
    }

    #[test]
    fn decodes_single_word_example() {
        let data = MokuroData::from_json(&sample().to_string()).unwrap();

        assert_eq!(data.version, "1.0");
        assert_eq!(data.title, "Sample");
        assert_eq!(data.pages.len(), 1);

        let page = &data.pages[0];
        assert_eq!((page.img_width, page.img_height), (800, 1200));
        assert_eq!(page.blocks.len(), 1);

        let block = &page.blocks[0];
        assert_eq!(block.lines(), ["こんにちは".to_string()]);
        assert_eq!(block.bounding_box().values(), [10.0, 20.0, 110.0, 220.0]);
        assert!(block.vertical);

        let words: Vec<_> = block.words().collect();
        assert_eq!(
            words,
            [&Word {
                word: "こんにちは".to_string(),
                dictionary_entry: "こんにちは".to_string(),
                meaning: "hello".to_string(),
                sentence_form: "interjection".to_string(),
            }]
        );
    }

    #[test]
    fn round_trip_preserves_content_and_order() {
        let mut value = sample();
        let extra_page: serde_json::Value = serde_json::from_str(
            r#"{
                "version": "1.0",
                "img_width": 800,
                "img_height": 1200,
                "img_path": "002.jpg",
                "blocks": [
                    {
                        "box": [1, 2, 3, 4],
                        "vertical": false,
                        "font_size": 12.5,
                        "lines": ["二", "一"],
                        "translation": "two one",
                        "line_translations": [
                            {"words": [{"word": "二", "dictionary_entry": "二", "meaning": "two", "sentence_form": "numeral"}]},
                            {"words": [
                                {"word": "一", "dictionary_entry": "一", "meaning": "one", "sentence_form": "numeral"},
                                {"word": "つ", "dictionary_entry": "つ", "meaning": "counter", "sentence_form": "suffix"}
                            ]}
                        ]
                    },
                    {
                        "box": [5, 6, 7, 8],
                        "vertical": true,
                        "font_size": 20,
                        "lines": [],
                        "translation": "",
                        "line_translations": []
                    }
                ]
            }"#,
        )
        .unwrap();
        value["pages"].as_array_mut().unwrap().push(extra_page);

        let decoded = MokuroData::from_json(&value.to_string()).unwrap();
        let encoded = decoded.to_json().unwrap();
        let again = MokuroData::from_json(&encoded).unwrap();

        assert_eq!(decoded, again);

        let paths: Vec<_> = again.pages.iter().map(|p| p.img_path.as_str()).collect();
        assert_eq!(paths, ["001.jpg", "002.jpg"]);
        assert_eq!(again.pages[1].blocks[0].lines(), ["二", "一"]);
        let words: Vec<_> = again.pages[1].blocks[0]
            .words()
            .map(|w| w.word.as_str())
            .collect();
        assert_eq!(words, ["二", "一", "つ"]);
    }

    #[test]
    fn encodes_wire_field_names() {
        let data = MokuroData::from_json(&sample().to_string()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&data.to_json_pretty().unwrap()).unwrap();

        let block = &value["pages"][0]["blocks"][0];
        assert_eq!(block["box"], json!([10.0, 20.0, 110.0, 220.0]));
        assert_eq!(block["font_size"], json!(28.0));
        assert_eq!(block["line_translations"][0]["words"][0]["meaning"], "hello");
        assert_eq!(value["pages"][0]["img_path"], "001.jpg");
        assert_eq!(value["volume_uuid"], "5a2e1d3c-8f44-4c3b-a0a1-6b7c8d9e0f12");
    }

    #[test]
    fn write_matches_to_json() {
        let data = MokuroData::from_json(&sample().to_string()).unwrap();
        let mut buffer = Vec::new();
        data.write(&mut buffer).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), data.to_json().unwrap());
    }

    #[test]
    fn from_reader_and_from_str_agree() {
        let json = sample().to_string();
        let from_reader = MokuroData::from_reader(json.as_bytes()).unwrap();
        let from_str: MokuroData = json.parse().unwrap();

        assert_eq!(from_reader, from_str);
    }

    #[test]
    fn non_finite_numbers_cannot_be_encoded() {
        let error = Block::new(
            BoundingBox([0.0, 0.0, f64::INFINITY, 1.0]),
            false,
            f64::NAN,
            Vec::new(),
            String::new(),
            Vec::new(),
        )
        .unwrap_err();
        assert_eq!(error, InvalidBlock::NonFinite { field: "box" });

        let fractional = Block::new(
            BoundingBox([-0.5, 0.0, 1234.25, 65536.0]),
            false,
            12.5,
            Vec::new(),
            String::new(),
            Vec::new(),
        )
        .unwrap();
        let mut data = MokuroData::from_json(&sample().to_string()).unwrap();
        data.pages[0].blocks.push(fractional);

        let decoded = MokuroData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn out_of_range_number_is_malformed() {
        let json = sample()
            .to_string()
            .replace("\"font_size\":28", "\"font_size\":1e400");
        assert!(json.contains("1e400"));

        let error = MokuroData::from_json(&json).unwrap_err();
        assert!(matches!(error, DecodeError::Malformed(_)));
    }

    #[test]
    fn null_number_is_malformed() {
        let mut value = sample();
        value["pages"][0]["blocks"][0]["box"] = json!([0, 0, null, 1]);

        let error = MokuroData::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(error, DecodeError::Malformed(_)));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut value = sample();
        value["pages"][0]["blocks"][0]["lines_coords"] = json!([[[0, 0], [1, 0], [1, 1], [0, 1]]]);
        value["pages"][0]["blocks"][0]["prob"] = json!(0.93);

        assert!(MokuroData::from_json(&value.to_string()).is_ok());
    }

    #[test]
    fn mismatched_lines_are_a_structural_error() {
        let mut value = sample();
        value["pages"][0]["blocks"][0]["lines"] = json!(["こんにちは", "世界"]);

        let error = MokuroData::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(
            error,
            DecodeError::StructuralMismatch {
                page: 0,
                block: 0,
                lines: 2,
                line_translations: 1,
            }
        ));
    }

    #[test]
    fn missing_field_is_malformed() {
        let mut value = sample();
        value["pages"][0]
            .as_object_mut()
            .unwrap()
            .remove("img_path");

        let error = MokuroData::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(error, DecodeError::Malformed(_)));
    }

    #[test]
    fn wrong_kind_is_malformed() {
        let mut value = sample();
        value["pages"][0]["blocks"][0]["vertical"] = json!("yes");

        let error = MokuroData::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(error, DecodeError::Malformed(_)));
    }

    #[test]
    fn bounding_box_must_have_four_numbers() {
        let mut value = sample();
        value["pages"][0]["blocks"][0]["box"] = json!([1, 2, 3]);

        let error = MokuroData::from_json(&value.to_string()).unwrap_err();
        assert!(matches!(error, DecodeError::Malformed(_)));
    }

    #[test]
    fn invalid_json_is_malformed() {
        let error = MokuroData::from_json("{ not json").unwrap_err();
        assert!(error.to_string().starts_with("malformed mokuro document:"));
    }
}
