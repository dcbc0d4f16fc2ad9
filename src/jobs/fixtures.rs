use time::macros::date;

use super::dto::{ExamStatus, JobExam, JobNews};

/// Exam listings shown on the jobs page. Read-only.
pub fn job_exams() -> Vec<JobExam> {
    vec![
        JobExam {
            id: 1,
            company: "Google".into(),
            role: "Software Engineer".into(),
            exam_date: date!(2024 - 04 - 15),
            registration_deadline: date!(2024 - 03 - 30),
            status: ExamStatus::Upcoming,
            requirements: "Bachelor's in CS/related field, 3+ years experience".into(),
            application_link: "https://careers.google.com".into(),
            salary: "$120,000".into(),
            location: "Mountain View, CA".into(),
            skills: vec!["JavaScript".into(), "React".into(), "Node.js".into()],
            applicants: 50,
        },
        JobExam {
            id: 2,
            company: "Microsoft".into(),
            role: "Full Stack Developer".into(),
            exam_date: date!(2024 - 04 - 10),
            registration_deadline: date!(2024 - 03 - 25),
            status: ExamStatus::RegistrationOpen,
            requirements: "5+ years experience in web development".into(),
            application_link: "https://careers.microsoft.com".into(),
            salary: "$130,000".into(),
            location: "Redmond, WA".into(),
            skills: vec!["C#".into(), ".NET".into(), "Azure".into()],
            applicants: 60,
        },
    ]
}

pub fn job_news() -> Vec<JobNews> {
    vec![
        JobNews {
            title: "Tech Industry Hiring Surge Expected in Q2 2024".into(),
            date: date!(2024 - 03 - 01),
            source: "Tech News Daily".into(),
            category: "Industry Trends".into(),
            summary: "Major tech companies announce plans to increase hiring...".into(),
            link: "#".into(),
        },
        JobNews {
            title: "New Remote Work Policies Reshape Job Market".into(),
            date: date!(2024 - 02 - 28),
            source: "Career Insights".into(),
            category: "Work Trends".into(),
            summary: "Companies adapt hiring practices for remote-first approach...".into(),
            link: "#".into(),
        },
    ]
}
