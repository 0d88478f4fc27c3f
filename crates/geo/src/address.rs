use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Entity, RecordId};

use crate::place::{City, CityId, District, DistrictId, Neighborhood, NeighborhoodId};

const MAX_EXTRA_INFO_LEN: usize = 255;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressId(pub RecordId);

impl AddressId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AddressId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A shipping address: one node from each level of the hierarchy plus a
/// free-text street/building line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    id: AddressId,
    city_id: CityId,
    district_id: DistrictId,
    neighborhood_id: NeighborhoodId,
    extra_info: String,
}

impl Address {
    pub fn new(
        id: AddressId,
        city_id: CityId,
        district_id: DistrictId,
        neighborhood_id: NeighborhoodId,
        extra_info: &str,
    ) -> DomainResult<Self> {
        let extra_info = extra_info.trim();
        if extra_info.is_empty() {
            return Err(DomainError::validation(
                "address extra info cannot be empty",
            ));
        }
        if extra_info.chars().count() > MAX_EXTRA_INFO_LEN {
            return Err(DomainError::validation(format!(
                "address extra info cannot exceed {MAX_EXTRA_INFO_LEN} characters"
            )));
        }

        Ok(Self {
            id,
            city_id,
            district_id,
            neighborhood_id,
            extra_info: extra_info.to_string(),
        })
    }

    pub fn city_id(&self) -> CityId {
        self.city_id
    }

    pub fn district_id(&self) -> DistrictId {
        self.district_id
    }

    pub fn neighborhood_id(&self) -> NeighborhoodId {
        self.neighborhood_id
    }

    pub fn extra_info(&self) -> &str {
        &self.extra_info
    }

    /// Render the delivery slip line for this address.
    ///
    /// The resolved nodes are passed in; the record itself only holds
    /// references.
    pub fn full_address(
        &self,
        city: &City,
        district: &District,
        neighborhood: &Neighborhood,
    ) -> String {
        format!(
            "{} Mahallesi {} {}/{}",
            neighborhood.name(),
            self.extra_info,
            district.name(),
            city.name()
        )
    }
}

impl Entity for Address {
    type Id = AddressId;

    fn id(&self) -> AddressId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_address_renders_all_levels() {
        let city = City::new(CityId::new(RecordId::new()), "Izmir").unwrap();
        let district =
            District::new(DistrictId::new(RecordId::new()), city.id(), "Konak", None).unwrap();
        let neighborhood = Neighborhood::new(
            NeighborhoodId::new(RecordId::new()),
            district.id(),
            "Alsancak",
        )
        .unwrap();
        let address = Address::new(
            AddressId::new(RecordId::new()),
            city.id(),
            district.id(),
            neighborhood.id(),
            "Kibris Sehitleri Cd. 12",
        )
        .unwrap();

        assert_eq!(
            address.full_address(&city, &district, &neighborhood),
            "Alsancak Mahallesi Kibris Sehitleri Cd. 12 Konak/Izmir"
        );
    }

    #[test]
    fn blank_extra_info_is_rejected() {
        let err = Address::new(
            AddressId::new(RecordId::new()),
            CityId::new(RecordId::new()),
            DistrictId::new(RecordId::new()),
            NeighborhoodId::new(RecordId::new()),
            "  ",
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
