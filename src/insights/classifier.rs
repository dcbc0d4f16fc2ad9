use serde::Serialize;

/// Topic a career question is routed to. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Skills,
    Salary,
    Interview,
    General,
}

impl Category {
    const RANKED: [Category; 3] = [Category::Skills, Category::Salary, Category::Interview];

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Category::Skills => &["skill", "learn", "master", "expertise"],
            Category::Salary => &["salary", "compensation", "negotiate", "pay"],
            Category::Interview => &["interview", "hiring", "question", "prepare"],
            Category::General => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Share of the category's keywords present in the input; 0.0 for `General`.
    pub confidence: f32,
}

/// Substring match on the lowercased input; the first category with any hit wins.
pub fn classify(input: &str) -> Classification {
    let lowered = input.to_lowercase();
    for category in Category::RANKED {
        let words = category.keywords();
        let hits = words.iter().filter(|w| lowered.contains(*w)).count();
        if hits > 0 {
            return Classification {
                category,
                confidence: hits as f32 / words.len() as f32,
            };
        }
    }
    Classification {
        category: Category::General,
        confidence: 0.0,
    }
}
