//! Payer details captured by the checkout form.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Contact and billing details for the person paying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub country: String,
}

impl Payer {
    /// Splits the full name on its first run of whitespace.
    ///
    /// A single-word name is used for both halves, since the gateway
    /// requires a last name.
    pub fn split_name(&self) -> (String, String) {
        let mut words = self.name.split_whitespace();
        let first = words.next().unwrap_or_default().to_string();
        let rest = words.collect::<Vec<_>>().join(" ");
        let last = if rest.is_empty() { first.clone() } else { rest };
        (first, last)
    }

    /// Current value of a recoverable field.
    pub fn value(&self, field: PayerField) -> &str {
        match field {
            PayerField::Name => &self.name,
            PayerField::Email => &self.email,
            PayerField::Address1 => &self.address1,
            PayerField::City => &self.city,
            PayerField::Postcode => &self.postcode,
            PayerField::Country => &self.country,
        }
    }

    /// True when the field is empty or whitespace only.
    pub fn is_blank(&self, field: PayerField) -> bool {
        self.value(field).trim().is_empty()
    }
}

/// Payer fields a gateway decline can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayerField {
    Name,
    Email,
    Address1,
    City,
    Postcode,
    Country,
}

impl PayerField {
    pub const ALL: [PayerField; 6] = [
        PayerField::Name,
        PayerField::Email,
        PayerField::Address1,
        PayerField::City,
        PayerField::Postcode,
        PayerField::Country,
    ];

    /// Wire name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayerField::Name => "name",
            PayerField::Email => "email",
            PayerField::Address1 => "address1",
            PayerField::City => "city",
            PayerField::Postcode => "postcode",
            PayerField::Country => "country",
        }
    }

    /// Label shown to the payer.
    pub fn label(&self) -> &'static str {
        match self {
            PayerField::Name => "full name",
            PayerField::Email => "email",
            PayerField::Address1 => "address",
            PayerField::City => "town / city",
            PayerField::Postcode => "postcode",
            PayerField::Country => "country",
        }
    }
}

impl fmt::Display for PayerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
