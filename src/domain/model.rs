use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Fragrance {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewFragrance {
    pub name: String,
    pub code: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub street: String,
    pub postal_code: String,
    pub city: String,
}

/// How an invalid fragrance reference was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// The id turned out to exist after all.
    Exact,
    /// The id is off by the historical shift.
    Offset,
    /// Nothing matched; the lowest fragrance id was used.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdMapping {
    pub from: i64,
    pub to: i64,
    pub strategy: MatchStrategy,
}

impl IdMapping {
    pub fn is_identity(&self) -> bool {
        self.from == self.to
    }
}

/// A customer owning at least one composition detail that points at a
/// nonexistent fragrance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingCustomer {
    pub customer_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub broken_details: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    pub fragrance_count: usize,
    pub invalid_ids: Vec<i64>,
    pub mappings: Vec<IdMapping>,
    pub rows_updated: usize,
    pub low_code_coverage: bool,
    pub dry_run: bool,
}

impl RepairReport {
    pub fn is_noop(&self) -> bool {
        self.invalid_ids.is_empty()
    }

    pub fn fallback_count(&self) -> usize {
        self.mappings
            .iter()
            .filter(|m| m.strategy == MatchStrategy::Fallback)
            .count()
    }
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            return write!(
                f,
                "All references in composition_details are valid. No corrections required."
            );
        }
        let verb = if self.dry_run { "would be remapped" } else { "remapped" };
        write!(
            f,
            "{} invalid references across {} fragrances; {} {} ({} by fallback), {} detail rows updated",
            self.invalid_ids.len(),
            self.fragrance_count,
            self.mappings.iter().filter(|m| !m.is_identity()).count(),
            verb,
            self.fallback_count(),
            self.rows_updated
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositionStats {
    pub rows_read: usize,
    pub compositions_created: usize,
    pub details_created: usize,
    pub rows_skipped: usize,
    pub pairs_skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub fragrances: usize,
    pub customers: usize,
    pub compositions: CompositionStats,
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fragrances, {} customers, {} compositions with {} details imported ({} rows and {} pairs skipped)",
            self.fragrances,
            self.customers,
            self.compositions.compositions_created,
            self.compositions.details_created,
            self.compositions.rows_skipped,
            self.compositions.pairs_skipped
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    pub customers: Vec<DanglingCustomer>,
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.customers.is_empty() {
            return write!(f, "No customer has compositions with missing fragrances.");
        }
        writeln!(
            f,
            "{} customers have compositions with missing fragrances:",
            self.customers.len()
        )?;
        for (i, customer) in self.customers.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "  #{} {} {} ({} broken detail rows)",
                customer.customer_id,
                customer.first_name,
                customer.last_name,
                customer.broken_details
            )?;
        }
        Ok(())
    }
}
