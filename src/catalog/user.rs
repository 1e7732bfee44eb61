use serde::Serialize;

use crate::list::{ItemId, Listable, SortKey};
use crate::remote::Endpoint;
use crate::remote::dto::{UserDto, text_or_missing};

use super::{Resource, ResourceKind};

/// A user account as shown in user management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub id: ItemId,
    pub title: String,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub department: String,
    pub role: String,
    pub profile_image_url: Option<String>,
}

impl UserAccount {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

impl Listable for UserAccount {
    fn item_id(&self) -> ItemId {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.firstname, &self.lastname, &self.email]
    }

    fn category(&self, name: &str) -> Option<&str> {
        match name {
            "role" => Some(&self.role),
            "department" => Some(&self.department),
            _ => None,
        }
    }

    fn sort_key(&self, field: &str) -> Option<SortKey<'_>> {
        match field {
            "firstname" => Some(SortKey::Text(&self.firstname)),
            "lastname" => Some(SortKey::Text(&self.lastname)),
            "email" => Some(SortKey::Text(&self.email)),
            "role" => Some(SortKey::Text(&self.role)),
            "department" => Some(SortKey::Text(&self.department)),
            "id" => Some(SortKey::Number(self.id.0 as f64)),
            _ => None,
        }
    }
}

impl Resource for UserAccount {
    type Dto = UserDto;

    const KIND: ResourceKind = ResourceKind::Users;

    fn from_dto(dto: UserDto) -> Option<Self> {
        Some(Self {
            id: ItemId(dto.user_id),
            title: text_or_missing(dto.title),
            firstname: text_or_missing(dto.firstname),
            lastname: text_or_missing(dto.lastname),
            email: text_or_missing(dto.email),
            department: text_or_missing(dto.department),
            role: text_or_missing(dto.role.and_then(|r| r.role_name)),
            profile_image_url: dto.profile_image_url.filter(|url| !url.trim().is_empty()),
        })
    }

    fn delete_endpoint(&self) -> Endpoint {
        Endpoint::new(format!("/api/users/{}", self.id))
    }

    fn label(&self) -> String {
        self.full_name()
    }

    fn columns() -> &'static [&'static str] {
        &["ID", "Title", "Name", "Email", "Department", "Role"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.full_name(),
            self.email.clone(),
            self.department.clone(),
            self.role.clone(),
        ]
    }
}
