//! Prompt templates, one per category. Every template asks for `###` headed
//! sections so the reply can be split for display.

use super::classifier::Category;

const GENERAL: &str = "\
As an expert career advisor specializing in technology and professional development, provide detailed guidance on: {input}

Please structure your response in the following format:

### Overview
• Brief summary of the topic
• Current industry relevance

### Detailed Analysis
• Market trends and demands
• Future outlook
• Key challenges and opportunities

### Technical Requirements
• Essential skills needed
• Required certifications or qualifications
• Technology stack recommendations
• Learning path suggestions

### Action Steps
1. Immediate actions to take
2. Short-term goals (3-6 months)
3. Long-term goals (1-2 years)

### Pro Tips
• Best practices
• Common mistakes to avoid
• Interview preparation advice
• Portfolio building suggestions
";

const SKILLS: &str = "\
As an expert technical career coach, analyze the following technical skills question: {input}

Please structure your response in the following format:

### Skill Assessment
• Where these skills stand in today's market
• Related skills that pair well with them

### Learning Path
1. Foundations to cover first
2. Intermediate milestones
3. Advanced topics

### Resources
• Courses, books and documentation worth the time
• Certifications that carry weight

### Practice Projects
• Portfolio projects that demonstrate the skills
";

const SALARY: &str = "\
As an expert compensation advisor for technology roles, provide salary negotiation guidance for: {input}

Please structure your response in the following format:

### Market Range
• Typical compensation bands and what drives them
• Regional and company-size differences

### Negotiation Strategy
1. Research to do before the conversation
2. How to anchor and respond to offers
3. Handling counteroffers

### Beyond Base Salary
• Equity, bonus, benefits and other levers

### Pro Tips
• Phrases that work
• Common mistakes to avoid
";

const INTERVIEW: &str = "\
As an expert technical interviewer and career coach, prepare interview guidance for: {input}

Please structure your response in the following format:

### Interview Format
• Typical rounds and what each evaluates

### Technical Preparation
• Topics to review
• Practice problems and how to approach them

### Behavioral Preparation
• Stories to prepare and how to frame them

### Day-of Checklist
1. Before the interview
2. During the interview
3. Follow-up
";

pub fn template(category: Category) -> &'static str {
    match category {
        Category::Skills => SKILLS,
        Category::Salary => SALARY,
        Category::Interview => INTERVIEW,
        Category::General => GENERAL,
    }
}

/// Fills the category's template with the user's question.
pub fn build_prompt(category: Category, input: &str) -> String {
    template(category).replace("{input}", input.trim())
}
