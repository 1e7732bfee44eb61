//! Wire shapes returned by the catalog backend.
//!
//! Every field the backend may omit is optional here; the catalog item
//! types turn these into flat records with `"-"` placeholders.

use serde::Deserialize;

/// Placeholder shown for text fields the backend left out.
pub const MISSING: &str = "-";

/// Normalize an optional text field to a trimmed value or [`MISSING`].
pub fn text_or_missing(value: Option<String>) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => MISSING.to_string(),
    }
}

/// Decimal fields are serialized as JSON strings by the backend, but older
/// records carry plain numbers. Only finite values are accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(serde_json::Number),
    Text(String),
}

impl Numeric {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Numeric::Number(n) => n.as_f64(),
            Numeric::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageDto {
    #[serde(default)]
    pub image_url: Option<String>,
}

/// First usable image URL from a list of images.
pub fn first_image(images: &[ImageDto]) -> Option<String> {
    images
        .iter()
        .filter_map(|img| img.image_url.as_deref())
        .find(|url| !url.trim().is_empty())
        .map(str::to_string)
}

/// Entry of `GET /api/exhibits`. Only entries with a `firearm` are firearms.
#[derive(Debug, Clone, Deserialize)]
pub struct ExhibitDto {
    pub id: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageDto>,
    #[serde(default)]
    pub firearm: Option<FirearmDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirearmDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub mechanism: Option<String>,
    #[serde(default)]
    pub normalized_name: Option<String>,
    #[serde(default)]
    pub example_images: Vec<ImageDto>,
}

/// Entry of `GET /api/narcotics`.
#[derive(Debug, Clone, Deserialize)]
pub struct NarcoticDto {
    pub id: i64,
    #[serde(default)]
    pub drug_type: Option<String>,
    #[serde(default)]
    pub drug_category: Option<String>,
    #[serde(default)]
    pub characteristics: Option<String>,
    #[serde(default)]
    pub consumption_method: Option<String>,
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub weight_grams: Option<Numeric>,
    #[serde(default)]
    pub example_images: Vec<ImageDto>,
}

/// Entry of `GET /api/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDto {
    pub user_id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub role: Option<RoleDto>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoleDto {
    #[serde(default)]
    pub role_name: Option<String>,
}

/// Entry of `GET /api/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryDto {
    pub id: i64,
    #[serde(default)]
    pub exhibit_id: Option<i64>,
    #[serde(default)]
    pub discovery_date: Option<String>,
    #[serde(default)]
    pub discoverer_name: Option<String>,
    #[serde(default)]
    pub province_name: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub subdistrict_name: Option<String>,
    #[serde(default)]
    pub quantity: Option<Numeric>,
    #[serde(default)]
    pub latitude: Option<Numeric>,
    #[serde(default)]
    pub longitude: Option<Numeric>,
    #[serde(default)]
    pub exhibit: Option<HistoryExhibitDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryExhibitDto {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
}
