use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Entity, RecordId, UserId};
use orderdesk_geo::AddressId;

const MAX_NICK_LEN: usize = 9;
const MAX_PHONE_LEN: usize = 50;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub RecordId);

impl CustomerId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A customer: login identity (external), short nick used on delivery slips,
/// phone numbers, and a shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    user_id: UserId,
    nick: String,
    phone1: String,
    phone2: Option<String>,
    address_id: AddressId,
}

impl Customer {
    pub fn new(
        id: CustomerId,
        user_id: UserId,
        nick: &str,
        phone1: &str,
        phone2: Option<&str>,
        address_id: AddressId,
    ) -> DomainResult<Self> {
        let nick = nick.trim();
        if nick.is_empty() {
            return Err(DomainError::validation("customer nick cannot be empty"));
        }
        if nick.chars().count() > MAX_NICK_LEN {
            return Err(DomainError::validation(format!(
                "customer nick cannot exceed {MAX_NICK_LEN} characters"
            )));
        }

        Ok(Self {
            id,
            user_id,
            nick: nick.to_string(),
            phone1: validated_phone(phone1)?,
            phone2: match phone2.map(str::trim) {
                Some("") | None => None,
                Some(p) => Some(validated_phone(p)?),
            },
            address_id,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn phone1(&self) -> &str {
        &self.phone1
    }

    pub fn phone2(&self) -> Option<&str> {
        self.phone2.as_deref()
    }

    pub fn address_id(&self) -> AddressId {
        self.address_id
    }

    pub fn set_address(&mut self, address_id: AddressId) {
        self.address_id = address_id;
    }
}

fn validated_phone(phone: &str) -> DomainResult<String> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(DomainError::validation("phone number cannot be empty"));
    }
    if phone.chars().count() > MAX_PHONE_LEN {
        return Err(DomainError::validation(format!(
            "phone number cannot exceed {MAX_PHONE_LEN} characters"
        )));
    }
    Ok(phone.to_string())
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> CustomerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (CustomerId, UserId, AddressId) {
        (
            CustomerId::new(RecordId::new()),
            UserId::new(),
            AddressId::new(RecordId::new()),
        )
    }

    #[test]
    fn customer_requires_primary_phone() {
        let (cid, uid, aid) = ids();
        let err = Customer::new(cid, uid, "ayse", "", None, aid).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn secondary_phone_is_optional() {
        let (cid, uid, aid) = ids();
        let c = Customer::new(cid, uid, "ayse", "0555 111 22 33", None, aid).unwrap();
        assert_eq!(c.phone2(), None);

        let c = Customer::new(cid, uid, "ayse", "0555 111 22 33", Some("0555 444 55 66"), aid)
            .unwrap();
        assert_eq!(c.phone2(), Some("0555 444 55 66"));
    }

    #[test]
    fn nick_is_bounded() {
        let (cid, uid, aid) = ids();
        let err = Customer::new(cid, uid, "waytoolongnick", "0555", None, aid).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
