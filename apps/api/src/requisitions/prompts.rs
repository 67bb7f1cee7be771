// Drafting prompt for job descriptions.

pub const JOB_DESCRIPTION_SYSTEM: &str = "You are an experienced recruiter who writes clear, accurate job postings. \
Describe the role as it is, avoid inflated language and never invent salary or benefit figures.";

/// Replace `{role}`, `{years}` and `{company}` before sending.
pub const JOB_DESCRIPTION_TEMPLATE: &str = r#"Generate a detailed job description for a {role} position requiring {years} years of experience.

Include:
1. Job title and overview
2. Key responsibilities
3. Required skills and qualifications
4. Preferred qualifications
5. Education requirements
6. Any additional requirements or benefits

Format the response in a clear, professional manner suitable for a job posting at {company}.

Write nothing except the job description. Do not leave bracketed placeholders; the text is published as-is."#;

pub fn job_description_prompt(role: &str, years: u32, company: &str) -> String {
    JOB_DESCRIPTION_TEMPLATE
        .replace("{role}", role)
        .replace("{years}", &years.to_string())
        .replace("{company}", company)
}
