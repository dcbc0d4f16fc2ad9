//! Search and facet filtering over the exam listings.

use super::dto::{FacetValues, JobExam, ListingQuery};

pub const WILDCARD: &str = "all";

/// One facet selection; `None` is the wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facet(Option<String>);

impl Facet {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|v| v.trim().to_lowercase()) {
            None => Facet(None),
            Some(v) if v.is_empty() || v == WILDCARD => Facet(None),
            Some(v) => Facet(Some(v)),
        }
    }

    fn matches(&self, value: &str) -> bool {
        match &self.0 {
            None => true,
            Some(wanted) => value.to_lowercase() == *wanted,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub status: Facet,
    pub company: Facet,
    pub location: Facet,
    pub salary: Facet,
}

impl From<&ListingQuery> for Filters {
    fn from(q: &ListingQuery) -> Self {
        Self {
            status: Facet::parse(q.status.as_deref()),
            company: Facet::parse(q.company.as_deref()),
            location: Facet::parse(q.location.as_deref()),
            salary: Facet::parse(q.salary.as_deref()),
        }
    }
}

/// Case-insensitive substring match of `query` on role or company, ANDed with
/// exact case-insensitive equality on each set facet. Input order is kept.
pub fn filter_listings<'a>(all: &'a [JobExam], query: &str, filters: &Filters) -> Vec<&'a JobExam> {
    let needle = query.trim().to_lowercase();
    all.iter()
        .filter(|job| {
            let matches_search = job.role.to_lowercase().contains(&needle)
                || job.company.to_lowercase().contains(&needle);
            matches_search
                && filters.status.matches(job.status.as_str())
                && filters.company.matches(&job.company)
                && filters.location.matches(&job.location)
                && filters.salary.matches(&job.salary)
        })
        .collect()
}

/// Lowercased option values for each facet control.
pub fn facet_values(all: &[JobExam]) -> FacetValues {
    let mut facets = FacetValues::default();
    for job in all {
        facets.status.insert(job.status.as_str().to_lowercase());
        facets.company.insert(job.company.to_lowercase());
        facets.location.insert(job.location.to_lowercase());
        facets.salary.insert(job.salary.to_lowercase());
    }
    facets
}
