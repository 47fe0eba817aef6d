use serde::Serialize;

use crate::domain::{Block, Issue};

/// One scanned page image and the text blocks detected on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Version of the OCR pipeline that produced this page.
    pub version: String,
    /// Image width in pixels.
    pub img_width: u32,
    /// Image height in pixels.
    pub img_height: u32,
    /// Detected blocks, in detection order (not necessarily reading order).
    pub blocks: Vec<Block>,
    /// Location of the page image, relative to the volume's image directory.
    pub img_path: String,
}

impl Page {
    /// Whether both image dimensions are positive.
    #[must_use]
    pub const fn has_valid_dimensions(&self) -> bool {
        self.img_width > 0 && self.img_height > 0
    }
}

/// The metadata bundle describing a volume's pages and their translations.
///
/// The order of [`MokuroData::pages`] is the reading order of the volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MokuroData {
    /// Schema version of the document.
    pub version: String,
    /// Title of the series.
    pub title: String,
    /// Stable identifier of the series.
    pub title_uuid: String,
    /// Volume label.
    pub volume: String,
    /// Stable identifier of the volume.
    pub volume_uuid: String,
    /// Pages, in reading order.
    pub pages: Vec<Page>,
}

impl MokuroData {
    /// Consistency problems in the document itself.
    ///
    /// Every page with a zero width or height is reported.
    #[must_use]
    pub fn issues(&self) -> Vec<Issue> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, page)| !page.has_valid_dimensions())
            .map(|(index, page)| Issue::InvalidDimensions {
                page: index,
                img_path: page.img_path.clone(),
                width: page.img_width,
                height: page.img_height,
            })
            .collect()
    }

    /// Total number of blocks across all pages.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|page| page.blocks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(img_path: &str, width: u32, height: u32) -> Page {
        Page {
            version: "0.2.1".to_string(),
            img_width: width,
            img_height: height,
            blocks: Vec::new(),
            img_path: img_path.to_string(),
        }
    }

    fn data(pages: Vec<Page>) -> MokuroData {
        MokuroData {
            version: "0.2.1".to_string(),
            title: "Sample".to_string(),
            title_uuid: "title-uuid".to_string(),
            volume: "Volume 1".to_string(),
            volume_uuid: "volume-uuid".to_string(),
            pages,
        }
    }

    #[test]
    fn valid_pages_have_no_issues() {
        let data = data(vec![page("001.jpg", 800, 1200), page("002.jpg", 800, 1200)]);
        assert!(data.issues().is_empty());
    }

    #[test]
    fn zero_dimensions_are_reported_per_page() {
        let data = data(vec![
            page("001.jpg", 800, 1200),
            page("002.jpg", 0, 1200),
            page("003.jpg", 800, 0),
        ]);

        let issues = data.issues();
        assert_eq!(
            issues,
            vec![
                Issue::InvalidDimensions {
                    page: 1,
                    img_path: "002.jpg".to_string(),
                    width: 0,
                    height: 1200,
                },
                Issue::InvalidDimensions {
                    page: 2,
                    img_path: "003.jpg".to_string(),
                    width: 800,
                    height: 0,
                },
            ]
        );
    }

    #[test]
    fn empty_volume_has_no_issues() {
        assert!(data(Vec::new()).issues().is_empty());
    }
}
