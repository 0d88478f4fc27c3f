use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Entity, RecordId};

// District nicks are short dispatch codes (4 chars max).
const MAX_NICK_LEN: usize = 4;

const MAX_NAME_LEN: usize = 30;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub RecordId);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictId(pub RecordId);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NeighborhoodId(pub RecordId);

macro_rules! impl_place_id {
    ($t:ty) => {
        impl $t {
            pub fn new(id: RecordId) -> Self {
                Self(id)
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

impl_place_id!(CityId);
impl_place_id!(DistrictId);
impl_place_id!(NeighborhoodId);

fn validated_name(kind: &str, name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation(format!("{kind} name cannot be empty")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "{kind} name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Top of the address hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    id: CityId,
    name: String,
}

impl City {
    pub fn new(id: CityId, name: &str) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: validated_name("city", name)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for City {
    type Id = CityId;

    fn id(&self) -> CityId {
        self.id
    }
}

/// District within a city, with an optional short dispatch code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    id: DistrictId,
    city_id: CityId,
    name: String,
    nick: Option<String>,
}

impl District {
    pub fn new(
        id: DistrictId,
        city_id: CityId,
        name: &str,
        nick: Option<&str>,
    ) -> DomainResult<Self> {
        let nick = match nick.map(str::trim) {
            Some("") | None => None,
            Some(n) if n.chars().count() > MAX_NICK_LEN => {
                return Err(DomainError::validation(format!(
                    "district nick cannot exceed {MAX_NICK_LEN} characters"
                )));
            }
            Some(n) => Some(n.to_string()),
        };

        Ok(Self {
            id,
            city_id,
            name: validated_name("district", name)?,
            nick,
        })
    }

    pub fn city_id(&self) -> CityId {
        self.city_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nick(&self) -> Option<&str> {
        self.nick.as_deref()
    }
}

impl Entity for District {
    type Id = DistrictId;

    fn id(&self) -> DistrictId {
        self.id
    }
}

/// Neighborhood within a district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Neighborhood {
    id: NeighborhoodId,
    district_id: DistrictId,
    name: String,
}

impl Neighborhood {
    pub fn new(id: NeighborhoodId, district_id: DistrictId, name: &str) -> DomainResult<Self> {
        Ok(Self {
            id,
            district_id,
            name: validated_name("neighborhood", name)?,
        })
    }

    pub fn district_id(&self) -> DistrictId {
        self.district_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for Neighborhood {
    type Id = NeighborhoodId;

    fn id(&self) -> NeighborhoodId {
        self.id
    }
}
