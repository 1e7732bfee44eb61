//! Catalog record kinds.
//!
//! Each kind is a flat item normalized from the backend's nested payload,
//! plus the configuration its list screen needs: which fields the search
//! looks at, which filter categories exist, how it sorts by default, and
//! which endpoint deletes it.

pub mod firearm;
pub mod history;
pub mod narcotic;
pub mod user;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::list::{ItemId, Listable};
use crate::remote::Endpoint;

pub use firearm::Firearm;
pub use history::{DiscoveryDraft, DiscoveryRecord};
pub use narcotic::Narcotic;
pub use user::UserAccount;

/// The catalog collections a list screen can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Firearms,
    Narcotics,
    Users,
    History,
}

enum_display_fromstr!(
    ResourceKind,
    crate::error::CatalogError::InvalidResource,
    {
        Firearms => "firearms" | "firearm" | "guns",
        Narcotics => "narcotics" | "narcotic" | "drugs",
        Users => "users" | "user",
        History => "history" | "discoveries",
    }
);

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Firearms,
        ResourceKind::Narcotics,
        ResourceKind::Users,
        ResourceKind::History,
    ];

    pub fn list_path(&self) -> &'static str {
        match self {
            ResourceKind::Firearms => "/api/exhibits",
            ResourceKind::Narcotics => "/api/narcotics",
            ResourceKind::Users => "/api/users",
            ResourceKind::History => "/api/history",
        }
    }

    /// Filter categories offered for this kind
    pub fn filter_categories(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Firearms => &["category", "mechanism", "brand"],
            ResourceKind::Narcotics => &["drug_type", "drug_category"],
            ResourceKind::Users => &["role", "department"],
            ResourceKind::History => &["category", "province", "district", "subdistrict"],
        }
    }

    /// Fields that can be sorted on
    pub fn sort_fields(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Firearms => &["brand", "model", "series", "mechanism", "category", "id"],
            ResourceKind::Narcotics => &["drug_type", "drug_category", "weight_grams", "id"],
            ResourceKind::Users => &["firstname", "lastname", "email", "role", "department", "id"],
            ResourceKind::History => &[
                "discovery_date",
                "discoverer",
                "province",
                "category",
                "quantity",
                "id",
            ],
        }
    }

    pub fn default_sort_field(&self) -> &'static str {
        self.sort_fields()[0]
    }

    /// Singular noun used in messages
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceKind::Firearms => "firearm",
            ResourceKind::Narcotics => "narcotic",
            ResourceKind::Users => "user",
            ResourceKind::History => "discovery record",
        }
    }
}

/// A catalog item that can be fetched, listed and deleted.
pub trait Resource: Listable + Clone + Serialize + Send + Sync + 'static {
    /// Wire shape of one collection entry
    type Dto: DeserializeOwned;

    const KIND: ResourceKind;

    fn list_endpoint() -> Endpoint {
        Endpoint::new(Self::KIND.list_path())
    }

    /// `GET`/`PUT` target for a single item
    fn detail_endpoint(id: ItemId) -> Endpoint {
        Endpoint::new(format!("{}/{id}", Self::KIND.list_path()))
    }

    fn create_endpoint() -> Endpoint {
        Self::list_endpoint()
    }

    /// Normalize one entry; `None` drops entries that do not belong in the
    /// collection.
    fn from_dto(dto: Self::Dto) -> Option<Self>;

    fn delete_endpoint(&self) -> Endpoint;

    /// Short human-readable name for confirmations
    fn label(&self) -> String;

    /// Table column headers, matching [`Resource::row`]
    fn columns() -> &'static [&'static str];

    fn row(&self) -> Vec<String>;
}
