use serde::Serialize;

use crate::list::{ItemId, Listable, SortKey};
use crate::remote::Endpoint;
use crate::remote::dto::{ExhibitDto, first_image, text_or_missing};

use super::{Resource, ResourceKind};

/// A firearm exhibit, flattened from `exhibit.firearm.*`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Firearm {
    /// Exhibit id
    pub id: ItemId,
    /// Id of the nested firearm record, used for the cascading delete
    pub firearm_id: Option<i64>,
    pub brand: String,
    pub model: String,
    pub series: String,
    pub mechanism: String,
    pub category: String,
    pub image_url: Option<String>,
}

impl Listable for Firearm {
    fn item_id(&self) -> ItemId {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.brand, &self.model, &self.series]
    }

    fn category(&self, name: &str) -> Option<&str> {
        match name {
            "category" => Some(&self.category),
            "mechanism" => Some(&self.mechanism),
            "brand" => Some(&self.brand),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        match field {
            "brand" => Some(SortKey::Text(&self.brand)),
            "model" => Some(SortKey::Text(&self.model)),
            "series" => Some(SortKey::Text(&self.series)),
            "mechanism" => Some(SortKey::Text(&self.mechanism)),
            "category" => Some(SortKey::Text(&self.category)),
            "id" => Some(SortKey::Number(self.id.0 as f64)),
            _ => None,
        }
    }
}

impl Resource for Firearm {
    type Dto = ExhibitDto;

    const KIND: ResourceKind = ResourceKind::Firearms;

    fn from_dto(dto: ExhibitDto) -> Option<Self> {
        let firearm = dto.firearm?;
        let image_url = first_image(&dto.images).or_else(|| first_image(&firearm.example_images));
        Some(Self {
            id: ItemId(dto.id),
            firearm_id: firearm.id,
            brand: text_or_missing(firearm.brand),
            model: text_or_missing(firearm.model),
            series: text_or_missing(firearm.series),
            mechanism: text_or_missing(firearm.mechanism),
            category: text_or_missing(dto.subcategory),
            image_url,
        })
    }

    /// Deleting through the firearm removes the exhibit, its images and its
    /// history. Records without a firearm id fall back to the exhibit.
    fn delete_endpoint(&self) -> Endpoint {
        match self.firearm_id {
            Some(firearm_id) => Endpoint::new(format!("/api/firearms/{firearm_id}/complete")),
            None => Endpoint::new(format!("/api/exhibits/{}", self.id)),
        }
    }

    fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Brand", "Model", "Series", "Mechanism", "Category"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.brand.clone(),
            self.model.clone(),
            self.series.clone(),
            self.mechanism.clone(),
            self.category.clone(),
        ]
    }
}
