//! Field-name mapping between the external (camelCase) and storage
//! (snake_case) conventions.

use convert_case::{Boundary, Case, Casing};

use crate::entity::Entity;

/// Digits stay attached to the letters before and after them (`address1`,
/// `sha256`). A digit followed by an upper-case letter still starts a new
/// word, so `line2Text` maps to `line2_text`.
const DIGIT_JOINS: [Boundary; 3] = [
    Boundary::LowerDigit,
    Boundary::UpperDigit,
    Boundary::DigitLower,
];

/// `companyId` -> `company_id`. Keys already in snake_case are unchanged.
pub fn to_storage_key(key: &str) -> String {
    key.remove_boundaries(&DIGIT_JOINS).to_case(Case::Snake)
}

/// `company_id` -> `companyId`.
pub fn to_external_key(key: &str) -> String {
    key.remove_boundaries(&DIGIT_JOINS).to_case(Case::Camel)
}

/// Rename every key to the storage convention, keeping values and order.
pub fn to_storage_keys(entity: Entity) -> Entity {
    entity
        .into_iter()
        .map(|(k, v)| (to_storage_key(&k), v))
        .collect()
}

/// Rename every key to the external convention, keeping values and order.
pub fn to_external_keys(entity: Entity) -> Entity {
    entity
        .into_iter()
        .map(|(k, v)| (to_external_key(&k), v))
        .collect()
}
