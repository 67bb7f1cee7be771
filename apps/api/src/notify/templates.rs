//! HTML bodies for every outbound email. All caller-supplied text is escaped.

use chrono::NaiveDate;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use crate::models::{Requisition, Review};
use crate::screening::TemplateId;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escaped multi-line text with line breaks preserved.
fn multiline(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

fn safe_link(url: CowStr<'_>) -> CowStr<'_> {
    let scheme = url.trim_start().to_ascii_lowercase();
    if ["javascript:", "vbscript:", "data:"]
        .iter()
        .any(|s| scheme.starts_with(s))
    {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Renders model-drafted Markdown. Raw HTML in the source comes out as text.
pub fn markdown_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_link(dest_url),
            title,
            id,
        }),
        other => other,
    });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

pub struct StatusEmail<'a> {
    pub template: TemplateId,
    pub candidate_name: &'a str,
    pub role: &'a str,
    pub company: &'a str,
    pub deadline: NaiveDate,
}

/// Candidate-facing body for the tier picked by the classifier.
pub fn candidate_status_html(email: &StatusEmail<'_>) -> String {
    let role = escape_html(email.role);
    let company = escape_html(email.company);
    match email.template {
        TemplateId::NextRound => format!(
            r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: #2563eb;">Next Round: Technical Assignment</h1>
  <p>Dear {name},</p>
  <p>Thank you for your interest in the <strong>{role}</strong> position. We would like to move your application to the next round of our selection process.</p>
  <div style="background-color: #f8fafc; padding: 20px; border-radius: 8px;">
    <h2 style="color: #1e40af; margin-top: 0;">Technical Assignment Details</h2>
    <ul>
      <li>The assignment is attached to this email</li>
      <li>Submission deadline: <strong>{deadline}</strong></li>
      <li>Please review all requirements thoroughly</li>
      <li>Questions can be asked in this email thread</li>
    </ul>
  </div>
  <p>We look forward to reviewing your submission.</p>
  <p>Best regards,<br><strong>{company} Hiring Team</strong></p>
  <p style="font-size: 14px; color: #6b7280;">This is an automated email. Please do not reply directly to this message.</p>
</div>"#,
            name = escape_html(email.candidate_name),
            deadline = email.deadline.format("%A, %-d %B %Y"),
        ),
        TemplateId::UnderReview => format!(
            "<h1>Application Under Review</h1>\n\
             <p>Thank you for applying for the {role} position.</p>\n\
             <p>Your application is currently under review. We will keep you updated on its status.</p>\n\
             <p>Best regards,<br>The {company} Hiring Team</p>"
        ),
        TemplateId::NotMovingForward => format!(
            "<h1>Application Status Update</h1>\n\
             <p>Thank you for your interest in the {role} position.</p>\n\
             <p>After careful consideration, we will not be moving forward with your application at this time.</p>\n\
             <p>We encourage you to apply for other positions that match your skills and experience.</p>\n\
             <p>Best regards,<br>The {company} Hiring Team</p>"
        ),
    }
}

fn submission_line(review: &Review) -> String {
    match (&review.pr_url, &review.portfolio_file) {
        (Some(url), _) => {
            let url = escape_html(url);
            let mut line = format!(r#"<p><strong>PR URL:</strong> <a href="{url}">{url}</a></p>"#);
            if let Some(preview) = &review.preview_url {
                let preview = escape_html(preview);
                line.push_str(&format!(
                    r#"<p><strong>Preview:</strong> <a href="{preview}">{preview}</a></p>"#
                ));
            }
            line
        }
        (None, Some(file)) => format!("<p><strong>Portfolio:</strong> {}</p>", escape_html(file)),
        (None, None) => String::new(),
    }
}

fn comments_line(review: &Review, label: &str) -> String {
    review
        .comments
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(|c| format!("<p><strong>{label}:</strong> {}</p>", multiline(c)))
        .unwrap_or_default()
}

pub fn review_admin_html(review: &Review) -> String {
    format!(
        "<h2>New Assignment Review Submission</h2>\n\
         <p><strong>Name:</strong> {name}</p>\n\
         <p><strong>Email:</strong> {email}</p>\n\
         <p><strong>Role:</strong> {role}</p>\n\
         {submission}\n\
         <p><strong>Score:</strong> {score}%</p>\n\
         <p><strong>Status:</strong> {status}</p>\n\
         <h3>Analysis:</h3>\n\
         <p>{analysis}</p>\n\
         {comments}\n\
         <p><strong>Submitted At:</strong> {submitted}</p>",
        name = escape_html(&review.name),
        email = escape_html(&review.email),
        role = escape_html(&review.role),
        submission = submission_line(review),
        score = review.analysis.score,
        status = review.status.label(),
        analysis = multiline(&review.analysis.details),
        comments = comments_line(review, "Comments"),
        submitted = review.submitted_at.format("%Y-%m-%d %H:%M UTC"),
    )
}

pub fn review_confirmation_html(review: &Review, company: &str) -> String {
    format!(
        "<h2>Thank You for Your Submission</h2>\n\
         <p>Dear {name},</p>\n\
         <p>We have received your assignment submission. Our team will review it and get back to you soon.</p>\n\
         {submission}\n\
         <p><strong>Initial Analysis Score:</strong> {score}%</p>\n\
         <h3>Analysis Summary:</h3>\n\
         <p>{analysis}</p>\n\
         {comments}\n\
         <p>Best regards,<br>The {company} Team</p>",
        name = escape_html(&review.name),
        submission = submission_line(review),
        score = review.analysis.score,
        analysis = multiline(&review.analysis.details),
        comments = comments_line(review, "Your comments"),
        company = escape_html(company),
    )
}

pub fn requisition_admin_html(requisition: &Requisition) -> String {
    format!(
        "<h1>New Job Requisition Created</h1>\n\
         <p>A new job requisition has been created with the following details:</p>\n\
         <h2>Role Details</h2>\n\
         <p><strong>Position:</strong> {role}</p>\n\
         <p><strong>Years of Experience:</strong> {years}</p>\n\
         <h2>Job Description</h2>\n\
         <div style=\"background-color: #f5f5f5; padding: 15px; border-radius: 5px;\">{description}</div>",
        role = escape_html(&requisition.role),
        years = requisition.years_of_experience,
        description = markdown_html(&requisition.job_description),
    )
}

/// Invitation sent to shortlisted assignment reviews.
pub fn interview_invite_html(name: &str, link: &str, company: &str) -> String {
    format!(
        "<h1>Schedule Your Round 1 Interview</h1>\n\
         <p>Dear {name},</p>\n\
         <p>Congratulations on being shortlisted! Your assignment impressed our team and we would like to \
         invite you to the first interview round.</p>\n\
         <p><a href=\"{link}\" style=\"display: inline-block; padding: 10px 20px; background-color: #2563eb; \
         color: #ffffff; text-decoration: none; border-radius: 5px;\">Start Interview</a></p>\n\
         <ul>\n\
         <li>The interview takes 30-45 minutes.</li>\n\
         <li>Use a quiet place with a stable internet connection.</li>\n\
         <li>Keep your camera and microphone on throughout.</li>\n\
         </ul>\n\
         <p>Best regards,<br>{company} Hiring Team</p>",
        name = escape_html(name),
        link = escape_html(link),
        company = escape_html(company),
    )
}

pub fn resume_analysis_html(score: u8, analysis: &str) -> String {
    format!(
        "<h2>Resume Analysis Results</h2>\n\
         <p><strong>Compatibility Score: {score}%</strong></p>\n\
         <h3>Detailed Analysis:</h3>\n\
         <p>{analysis}</p>",
        analysis = multiline(analysis),
    )
}
