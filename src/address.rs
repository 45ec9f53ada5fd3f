//! Addresses

use serde::{Deserialize, Serialize};

use crate::validation::{contains_digit, is_present, is_valid_postal_code};

/// Country used when none is given.
pub const DEFAULT_COUNTRY: &str = "India";

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

/// Structured postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// First address line
    #[serde(default)]
    pub address1: String,

    /// Optional second address line
    #[serde(default)]
    pub address2: String,

    /// City
    #[serde(default)]
    pub city: String,

    /// State
    #[serde(default)]
    pub state: String,

    /// Postal code, 5 or 6 digits
    #[serde(default)]
    pub postal_code: String,

    /// Country
    #[serde(default = "default_country")]
    pub country: String,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            address1: String::new(),
            address2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: default_country(),
        }
    }
}

/// Address fields that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AddressField {
    /// First address line
    Address1,

    /// Postal code
    PostalCode,

    /// City
    City,

    /// State
    State,
}

impl Address {
    /// Combined single-line form: `line1[, line2], city, state postal, country`.
    pub fn formatted(&self) -> String {
        let mut line = self.address1.clone();

        if !self.address2.is_empty() {
            line.push_str(", ");
            line.push_str(&self.address2);
        }

        format!(
            "{line}, {}, {} {}, {}",
            self.city, self.state, self.postal_code, self.country
        )
    }

    /// Parse a combined address string leniently.
    ///
    /// Parts are split on commas and blank parts dropped. One part is the first line; two parts
    /// are the first line and the city; three parts are line, city and `state postal`. Four parts
    /// are line, city, `state postal` and country when the third part ends in a postal code and
    /// the fourth does not; otherwise four or more are line, second line, city, `state postal`
    /// and an optional country. Within the `state postal` part the last space-separated token is
    /// the postal code.
    pub fn parse(value: &str) -> Self {
        let parts: Vec<&str> = value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        let mut address = Self::default();

        match parts.as_slice() {
            [] => {}
            [line] => address.address1 = (*line).to_string(),
            [line, city] => {
                address.address1 = (*line).to_string();
                address.city = (*city).to_string();
            }
            [line, city, state_postal] => {
                address.address1 = (*line).to_string();
                address.city = (*city).to_string();
                address.set_state_postal(state_postal);
            }
            [line, city, state_postal, country]
                if ends_with_postal_code(state_postal) && !ends_with_postal_code(country) =>
            {
                address.address1 = (*line).to_string();
                address.city = (*city).to_string();
                address.set_state_postal(state_postal);
                address.country = (*country).to_string();
            }
            [line, line2, city, state_postal, rest @ ..] => {
                address.address1 = (*line).to_string();
                address.address2 = (*line2).to_string();
                address.city = (*city).to_string();
                address.set_state_postal(state_postal);

                if let Some(country) = rest.first() {
                    address.country = (*country).to_string();
                }
            }
        }

        address
    }

    fn set_state_postal(&mut self, value: &str) {
        let tokens: Vec<&str> = value.split_whitespace().collect();

        match tokens.split_last() {
            Some((postal, state)) if !state.is_empty() => {
                self.state = state.join(" ");
                self.postal_code = (*postal).to_string();
            }
            _ => self.state = value.to_string(),
        }
    }

    /// Every rule this address breaks, in field order, with its message.
    pub fn violations(&self) -> Vec<(AddressField, &'static str)> {
        let mut violations = Vec::new();

        if !is_present(&self.address1) {
            violations.push((AddressField::Address1, "Address line 1 required."));
        }

        if !is_valid_postal_code(&self.postal_code) {
            violations.push((AddressField::PostalCode, "Valid postal code required."));
        }

        if let Some(message) = place_violation(
            &self.city,
            "City required.",
            "City cannot contain numbers.",
        ) {
            violations.push((AddressField::City, message));
        }

        if let Some(message) = place_violation(
            &self.state,
            "State required.",
            "State cannot contain numbers.",
        ) {
            violations.push((AddressField::State, message));
        }

        violations
    }

    /// Whether the address satisfies every rule.
    pub fn is_valid(&self) -> bool {
        self.violations().is_empty()
    }

    /// Fill every empty field from `other`.
    pub fn fill_blanks_from(&mut self, other: &Self) {
        for (field, fallback) in [
            (&mut self.address1, &other.address1),
            (&mut self.address2, &other.address2),
            (&mut self.city, &other.city),
            (&mut self.state, &other.state),
            (&mut self.postal_code, &other.postal_code),
            (&mut self.country, &other.country),
        ] {
            if field.is_empty() {
                fallback.clone_into(field);
            }
        }
    }
}

fn ends_with_postal_code(value: &str) -> bool {
    value
        .split_whitespace()
        .next_back()
        .is_some_and(is_valid_postal_code)
}

fn place_violation(
    value: &str,
    required: &'static str,
    no_digits: &'static str,
) -> Option<&'static str> {
    if !is_present(value) {
        return Some(required);
    }

    contains_digit(value).then_some(no_digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bengaluru() -> Address {
        Address {
            address1: "12 MG Road".to_string(),
            address2: "Flat 4".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            postal_code: "560001".to_string(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }

    #[test]
    fn formats_with_optional_second_line() {
        assert_eq!(
            bengaluru().formatted(),
            "12 MG Road, Flat 4, Bengaluru, Karnataka 560001, India"
        );

        let single = Address {
            address2: String::new(),
            ..bengaluru()
        };

        assert_eq!(
            single.formatted(),
            "12 MG Road, Bengaluru, Karnataka 560001, India"
        );
    }

    #[test]
    fn parses_full_formatted_string() {
        let parsed = Address::parse(&bengaluru().formatted());

        assert_eq!(parsed, bengaluru());
    }

    #[test]
    fn parses_formatted_string_without_second_line() {
        let single = Address {
            address2: String::new(),
            ..bengaluru()
        };

        let parsed = Address::parse(&single.formatted());

        assert_eq!(parsed, single);
        assert!(parsed.is_valid());
    }

    #[test]
    fn four_parts_without_trailing_postal_keep_second_line() {
        let parsed = Address::parse("12 MG Road, Flat 4, Bengaluru, Karnataka 560001");

        assert_eq!(parsed.address2, "Flat 4");
        assert_eq!(parsed.city, "Bengaluru");
        assert_eq!(parsed.postal_code, "560001");
    }

    #[test]
    fn parses_three_parts_as_line_city_state_postal() {
        let parsed = Address::parse("12 MG Road, Bengaluru, Tamil Nadu 600001");

        assert_eq!(parsed.address1, "12 MG Road");
        assert_eq!(parsed.city, "Bengaluru");
        assert_eq!(parsed.state, "Tamil Nadu");
        assert_eq!(parsed.postal_code, "600001");
        assert_eq!(parsed.country, DEFAULT_COUNTRY);
    }

    #[test]
    fn parses_short_strings_leniently() {
        assert_eq!(Address::parse("Somewhere").address1, "Somewhere");
        assert_eq!(Address::parse("Somewhere, Pune").city, "Pune");
        assert_eq!(Address::parse("a, Pune, Maharashtra").state, "Maharashtra");
        assert_eq!(Address::parse(" , ,"), Address::default());
    }

    #[test]
    fn valid_address_has_no_violations() {
        assert!(bengaluru().is_valid());
    }

    #[test]
    fn reports_every_broken_rule() {
        let address = Address {
            address1: " ".to_string(),
            city: "Pune 2".to_string(),
            state: String::new(),
            postal_code: "12".to_string(),
            ..Address::default()
        };

        let fields: Vec<_> = address
            .violations()
            .into_iter()
            .map(|(field, _)| field)
            .collect();

        assert_eq!(
            fields,
            [
                AddressField::Address1,
                AddressField::PostalCode,
                AddressField::City,
                AddressField::State
            ]
        );
    }

    #[test]
    fn fill_blanks_keeps_existing_values() {
        let mut address = Address {
            address1: "Typed by hand".to_string(),
            ..Address::default()
        };

        address.fill_blanks_from(&bengaluru());

        assert_eq!(address.address1, "Typed by hand");
        assert_eq!(address.city, "Bengaluru");
        assert_eq!(address.postal_code, "560001");
    }
}
