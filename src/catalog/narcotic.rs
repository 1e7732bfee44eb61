use serde::Serialize;

use crate::list::{ItemId, Listable, SortKey};
use crate::remote::Endpoint;
use crate::remote::dto::{NarcoticDto, first_image, text_or_missing};

use super::{Resource, ResourceKind};

/// A narcotic reference profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narcotic {
    pub id: ItemId,
    pub drug_type: String,
    pub drug_category: String,
    pub characteristics: String,
    pub consumption_method: String,
    pub effect: String,
    pub weight_grams: Option<f64>,
    pub image_url: Option<String>,
}

impl Narcotic {
    pub fn weight_label(&self) -> String {
        match self.weight_grams {
            Some(weight) => format!("{weight} g"),
            None => "-".to_string(),
        }
    }
}

impl Listable for Narcotic {
    fn item_id(&self) -> ItemId {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.drug_type, &self.drug_category, &self.characteristics]
    }

    fn category(&self, name: &str) -> Option<&str> {
        match name {
            "drug_type" => Some(&self.drug_type),
            "drug_category" => Some(&self.drug_category),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        match field {
            "drug_type" => Some(SortKey::Text(&self.drug_type)),
            "drug_category" => Some(SortKey::Text(&self.drug_category)),
            "weight_grams" => self.weight_grams.map(SortKey::Number),
            "id" => Some(SortKey::Number(self.id.0 as f64)),
            _ => None,
        }
    }
}

impl Resource for Narcotic {
    type Dto = NarcoticDto;

    const KIND: ResourceKind = ResourceKind::Narcotics;

    fn from_dto(dto: NarcoticDto) -> Option<Self> {
        Some(Self {
            id: ItemId(dto.id),
            drug_type: text_or_missing(dto.drug_type),
            drug_category: text_or_missing(dto.drug_category),
            characteristics: text_or_missing(dto.characteristics),
            consumption_method: text_or_missing(dto.consumption_method),
            effect: text_or_missing(dto.effect),
            weight_grams: dto.weight_grams.and_then(|w| w.as_f64()),
            image_url: first_image(&dto.example_images),
        })
    }

    fn delete_endpoint(&self) -> Endpoint {
        Endpoint::new(format!("/api/narcotics/{}", self.id))
    }

    fn label(&self) -> String {
        self.drug_type.clone()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Type", "Category", "Characteristics", "Consumption", "Weight"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.drug_type.clone(),
            self.drug_category.clone(),
            self.characteristics.clone(),
            self.consumption_method.clone(),
            self.weight_label(),
        ]
    }
}
