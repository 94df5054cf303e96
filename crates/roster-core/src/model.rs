//! Directory records.
//!
//! `RawPerson` is what the directory endpoint returns (after dropping
//! malformed entries); `DisplayEmployee` is the enriched record the UI shows.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Postal address. Missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub suite: String,
    pub city: String,
    pub zipcode: String,
}

impl Address {
    /// Single-line rendering, skipping empty parts.
    pub fn one_line(&self) -> String {
        [
            self.street.as_str(),
            self.suite.as_str(),
            self.city.as_str(),
            self.zipcode.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// A person as returned by the directory endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPerson {
    pub id: u64,
    pub name: String,
    pub address: Address,
}

/// Employment status shown on each card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmploymentStatus {
    Permanent,
    Contract,
}

impl EmploymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EmploymentStatus::Permanent => "Permanent",
            EmploymentStatus::Contract => "Contract",
        }
    }
}

impl fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `RawPerson` plus synthetic presentation fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayEmployee {
    pub id: u64,
    pub name: String,
    pub address: Address,
    pub position: String,
    /// Years of experience, 1..=10.
    pub experience: u8,
    /// One decimal place, "4.0"..="4.9".
    pub rating: String,
    /// Monthly salary, 3,000,000..6,000,000.
    pub salary: u32,
    pub avatar: String,
    pub status: EmploymentStatus,
}

/// Formats a salary as Indonesian Rupiah with `.` thousands separators.
pub fn format_rupiah(value: u32) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("Rp {grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah_groups_thousands() {
        assert_eq!(format_rupiah(3_000_000), "Rp 3.000.000");
        assert_eq!(format_rupiah(5_999_999), "Rp 5.999.999");
        assert_eq!(format_rupiah(999), "Rp 999");
        assert_eq!(format_rupiah(1_000), "Rp 1.000");
    }

    #[test]
    fn test_address_one_line_skips_empty_parts() {
        let address = Address {
            street: "Kulas Light".into(),
            suite: String::new(),
            city: "Gwenborough".into(),
            zipcode: "92998-3874".into(),
        };
        assert_eq!(address.one_line(), "Kulas Light, Gwenborough, 92998-3874");
        assert_eq!(Address::default().one_line(), "");
    }
}
