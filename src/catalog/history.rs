use jiff::civil::{Date, Time};
use serde::Serialize;
use serde_json::Value;

use crate::error::{CatalogError, Result};
use crate::list::{Draft, ItemId, Listable, SaveTarget, SortKey};
use crate::remote::Endpoint;
use crate::remote::dto::{HistoryDto, text_or_missing};

use super::{Resource, ResourceKind};

/// A discovery record: where and when an exhibit was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryRecord {
    pub id: ItemId,
    pub exhibit_id: Option<i64>,
    pub discovery_date: Option<Date>,
    pub discoverer: String,
    pub province: String,
    pub district: String,
    pub subdistrict: String,
    pub category: String,
    pub subcategory: String,
    pub quantity: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Parse the date part of `YYYY-MM-DD` or an ISO timestamp.
fn parse_discovery_date(raw: &str) -> Option<Date> {
    raw.trim().get(..10)?.parse().ok()
}

impl DiscoveryRecord {
    pub fn date_label(&self) -> String {
        self.discovery_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn location(&self) -> String {
        format!("{} / {} / {}", self.subdistrict, self.district, self.province)
    }
}

impl Listable for DiscoveryRecord {
    fn item_id(&self) -> ItemId {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            &self.discoverer,
            &self.province,
            &self.district,
            &self.subdistrict,
            &self.category,
        ]
    }

    fn category(&self, name: &str) -> Option<&str> {
        match name {
            "category" => Some(&self.category),
            "province" => Some(&self.province),
            "district" => Some(&self.district),
            "subdistrict" => Some(&self.subdistrict),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        match field {
            "discovery_date" => self.discovery_date.map(SortKey::Date),
            "discoverer" => Some(SortKey::Text(&self.discoverer)),
            "province" => Some(SortKey::Text(&self.province)),
            "category" => Some(SortKey::Text(&self.category)),
            "quantity" => self.quantity.map(SortKey::Number),
            "id" => Some(SortKey::Number(self.id.0 as f64)),
            _ => None,
        }
    }

    fn date(&self) -> Option<Date> {
        self.discovery_date
    }
}

impl Resource for DiscoveryRecord {
    type Dto = HistoryDto;

    const KIND: ResourceKind = ResourceKind::History;

    fn from_dto(dto: HistoryDto) -> Option<Self> {
        let (category, subcategory) = match dto.exhibit {
            Some(exhibit) => (exhibit.category, exhibit.subcategory),
            None => (None, None),
        };
        Some(Self {
            id: ItemId(dto.id),
            exhibit_id: dto.exhibit_id,
            discovery_date: dto.discovery_date.as_deref().and_then(parse_discovery_date),
            discoverer: text_or_missing(dto.discoverer_name),
            province: text_or_missing(dto.province_name),
            district: text_or_missing(dto.district_name),
            subdistrict: text_or_missing(dto.subdistrict_name),
            category: text_or_missing(category),
            subcategory: text_or_missing(subcategory),
            quantity: dto.quantity.and_then(|q| q.as_f64()),
            latitude: dto.latitude.and_then(|l| l.as_f64()),
            longitude: dto.longitude.and_then(|l| l.as_f64()),
        })
    }

    fn delete_endpoint(&self) -> Endpoint {
        Endpoint::new(format!("/api/history/{}", self.id))
    }

    fn label(&self) -> String {
        format!("record {} ({})", self.id, self.date_label())
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Date", "Category", "Discoverer", "Location", "Quantity"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date_label(),
            self.category.clone(),
            self.discoverer.clone(),
            self.location(),
            self.quantity
                .map(|q| q.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

/// Fields of a discovery record form. Unset fields are left out of the
/// request body, so an update only touches what was given.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscoveryDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhibit_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdistrict_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery_time: Option<Time>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

impl DiscoveryDraft {
    pub fn is_empty(&self) -> bool {
        *self == DiscoveryDraft::default()
    }
}

fn require<T>(value: &Option<T>, field: &str) -> Result<()> {
    match value {
        Some(_) => Ok(()),
        None => Err(CatalogError::validation(field, "is required")),
    }
}

fn check_range(value: Option<f64>, field: &str, min: f64, max: f64) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v < min || v > max => Err(CatalogError::validation(
            field,
            format!("must be between {min} and {max}"),
        )),
        _ => Ok(()),
    }
}

fn check_id(value: Option<i64>, field: &str) -> Result<()> {
    match value {
        Some(id) if id <= 0 => Err(CatalogError::validation(field, "must be a positive id")),
        _ => Ok(()),
    }
}

impl Draft for DiscoveryDraft {
    type Item = DiscoveryRecord;

    fn validate(&self, target: SaveTarget) -> Result<()> {
        match target {
            SaveTarget::New => {
                require(&self.subdistrict_id, "subdistrict_id")?;
                require(&self.latitude, "latitude")?;
                require(&self.longitude, "longitude")?;
            }
            SaveTarget::Existing(_) if self.is_empty() => {
                return Err(CatalogError::validation("record", "no fields to update"));
            }
            SaveTarget::Existing(_) => {}
        }

        check_id(self.subdistrict_id, "subdistrict_id")?;
        check_id(self.exhibit_id, "exhibit_id")?;
        check_range(self.latitude, "latitude", -90.0, 90.0)?;
        check_range(self.longitude, "longitude", -180.0, 180.0)?;
        if let Some(quantity) = self.quantity
            && !(quantity.is_finite() && quantity >= 0.0)
        {
            return Err(CatalogError::validation("quantity", "must be zero or more"));
        }
        if let Some(url) = &self.photo_url
            && url.trim().is_empty()
        {
            return Err(CatalogError::validation("photo_url", "must not be empty"));
        }
        Ok(())
    }

    fn to_body(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
