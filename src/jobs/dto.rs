use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExamStatus {
    Upcoming,
    #[serde(rename = "Registration Open")]
    RegistrationOpen,
    Closed,
}

impl ExamStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamStatus::Upcoming => "Upcoming",
            ExamStatus::RegistrationOpen => "Registration Open",
            ExamStatus::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobExam {
    pub id: u32,
    pub company: String,
    pub role: String,
    #[serde(with = "iso_date")]
    pub exam_date: Date,
    #[serde(with = "iso_date")]
    pub registration_deadline: Date,
    pub status: ExamStatus,
    pub requirements: String,
    pub application_link: String,
    /// Display string; compared as text, never parsed into a range.
    pub salary: String,
    pub location: String,
    pub skills: Vec<String>,
    pub applicants: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobNews {
    pub title: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub source: String,
    pub category: String,
    pub summary: String,
    pub link: String,
}

/// Query string of the listing endpoint. An absent facet or `all` matches everything.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    pub q: Option<String>,
    pub status: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub salary: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListingResponse<'a> {
    pub total: usize,
    pub jobs: Vec<&'a JobExam>,
}

#[derive(Debug, Default, Serialize)]
pub struct FacetValues {
    pub status: BTreeSet<String>,
    pub company: BTreeSet<String>,
    pub location: BTreeSet<String>,
    pub salary: BTreeSet<String>,
}
