use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Entity, RecordId};

const MAX_NAME_LEN: usize = 50;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub RecordId);

impl CategoryId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: CategoryId, name: &str, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validated_name(name)?,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: &str, now: DateTime<Utc>) -> DomainResult<()> {
        self.name = validated_name(name)?;
        self.updated_at = now;
        Ok(())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

fn validated_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("category name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "category name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_bumps_updated_at() {
        let created = Utc::now();
        let mut cat = Category::new(CategoryId::new(RecordId::new()), "Dairy", created).unwrap();

        let later = created + chrono::Duration::seconds(5);
        cat.rename("Dairy & Eggs", later).unwrap();

        assert_eq!(cat.name(), "Dairy & Eggs");
        assert_eq!(cat.created_at(), created);
        assert_eq!(cat.updated_at(), later);
    }

    #[test]
    fn empty_name_is_rejected() {
        let err = Category::new(CategoryId::new(RecordId::new()), " ", Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
