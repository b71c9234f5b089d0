//! Image attributes
//!
//! Any field may carry an inline image; a field of kind `image` with
//! `imageFullField` set renders as the image alone.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Side of the input an inline image sits on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    #[default]
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Image attributes, flattened into the field record as `image*` keys
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSettings {
    #[serde(rename = "imageUrl", alias = "imageSrc", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "imageWidth", default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(rename = "imageHeight", default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(rename = "imageAlt", default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(rename = "imageCaption", default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(rename = "imageAlignment", default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<ImageAlignment>,
    #[serde(rename = "imageBorder", default, skip_serializing_if = "Option::is_none")]
    pub border: Option<bool>,
    #[serde(rename = "imageBorderRadius", default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<u32>,
    #[serde(rename = "imageFullField", default, skip_serializing_if = "Option::is_none")]
    pub full_field: Option<bool>,
    #[serde(rename = "imagePosition", default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ImagePosition>,
    #[serde(rename = "imageSize", default, skip_serializing_if = "Option::is_none")]
    pub size: Option<ImageSize>,
}

impl ImageSettings {
    pub fn is_full_field(&self) -> bool {
        self.full_field.unwrap_or(false)
    }

    pub fn has_image(&self) -> bool {
        self.url.as_deref().map(|u| !u.is_empty()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_src_alias() {
        let image: ImageSettings =
            serde_json::from_str(r#"{"imageSrc": "/a.png", "imageFullField": true}"#).unwrap();
        assert_eq!(image.url.as_deref(), Some("/a.png"));
        assert!(image.is_full_field());

        let json = serde_json::to_value(&image).unwrap();
        assert_eq!(json["imageUrl"], "/a.png");
        assert!(json.get("imageSrc").is_none());
    }
}
