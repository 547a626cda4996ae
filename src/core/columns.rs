use crate::domain::model::NewCustomer;
use crate::domain::sheet::Sheet;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    FirstName,
    LastName,
    Email,
    Phone,
    Street,
    PostalCode,
    City,
}

/// Accepted header names per customer field, lowercase, in lookup order.
pub const CUSTOMER_COLUMN_ALIASES: &[(CustomerField, &[&str])] = &[
    (CustomerField::FirstName, &["vorname", "first_name"]),
    (CustomerField::LastName, &["name", "nachname", "last_name"]),
    (CustomerField::Email, &["email", "e-mail", "mail"]),
    (CustomerField::Phone, &["telefon", "phone", "tel"]),
    (CustomerField::Street, &["straße", "strasse", "street"]),
    (CustomerField::PostalCode, &["plz", "postal_code", "zip"]),
    (CustomerField::City, &["stadt", "city", "ort"]),
];

/// Column index per customer field, resolved once from a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerColumns {
    indices: HashMap<CustomerField, usize>,
}

impl CustomerColumns {
    pub fn resolve(headers: &[String]) -> Self {
        // Duplicate headers: the rightmost column wins.
        let by_name: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();

        let indices = CUSTOMER_COLUMN_ALIASES
            .iter()
            .filter_map(|(field, aliases)| {
                aliases
                    .iter()
                    .find_map(|alias| by_name.get(*alias))
                    .map(|&index| (*field, index))
            })
            .collect();

        Self { indices }
    }

    pub fn index(&self, field: CustomerField) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    /// Fields without a matching column, for logging.
    pub fn unmapped(&self) -> Vec<CustomerField> {
        CUSTOMER_COLUMN_ALIASES
            .iter()
            .map(|(field, _)| *field)
            .filter(|field| !self.indices.contains_key(field))
            .collect()
    }

    /// Builds the customer of data row `row`; unmapped fields and blank cells
    /// become empty strings.
    pub fn customer(&self, sheet: &Sheet, row: usize) -> NewCustomer {
        let text = |field: CustomerField| {
            self.index(field)
                .map(|column| sheet.cell(row, column).to_text())
                .unwrap_or_default()
        };

        NewCustomer {
            first_name: text(CustomerField::FirstName),
            last_name: text(CustomerField::LastName),
            email: text(CustomerField::Email),
            phone: text(CustomerField::Phone),
            street: text(CustomerField::Street),
            postal_code: text(CustomerField::PostalCode),
            city: text(CustomerField::City),
        }
    }
}
