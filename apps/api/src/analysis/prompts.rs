// Scoring rubrics and prompt assembly for the Analysis Gateway.

/// One weighted rubric line. Weights across a rubric sum to 100.
#[derive(Debug)]
pub struct RubricCategory {
    pub label: &'static str,
    pub weight: u8,
    pub guidance: &'static str,
}

#[derive(Debug)]
pub struct Rubric {
    pub reference_heading: &'static str,
    pub artifact_heading: &'static str,
    pub categories: &'static [RubricCategory],
    /// Extra points the reviewer is asked to check, listed after the weights.
    pub focus: &'static [&'static str],
}

pub static RESUME_RUBRIC: Rubric = Rubric {
    reference_heading: "Job Description",
    artifact_heading: "Resume",
    categories: &[
        RubricCategory {
            label: "Required skills match",
            weight: 35,
            guidance: "coverage of the must-have skills and tools named in the job description",
        },
        RubricCategory {
            label: "Relevant experience",
            weight: 30,
            guidance: "years and depth of comparable work at the expected seniority",
        },
        RubricCategory {
            label: "Demonstrated impact",
            weight: 15,
            guidance: "projects or outcomes with concrete, measurable results",
        },
        RubricCategory {
            label: "Education and certifications",
            weight: 10,
            guidance: "formal qualifications the role asks for or prefers",
        },
        RubricCategory {
            label: "Communication",
            weight: 10,
            guidance: "clarity and structure of the resume and any cover letter",
        },
    ],
    focus: &[],
};

/// Code review of a pull request plus its live preview.
pub static FRONTEND_RUBRIC: Rubric = Rubric {
    reference_heading: "Assignment Requirements",
    artifact_heading: "Candidate Submission",
    categories: &[
        RubricCategory {
            label: "Code quality",
            weight: 40,
            guidance: "readability, idiomatic patterns, error handling and edge cases",
        },
        RubricCategory {
            label: "Feature implementation",
            weight: 30,
            guidance: "how completely and correctly the required features work",
        },
        RubricCategory {
            label: "UI/UX",
            weight: 20,
            guidance: "visual design, responsiveness and accessibility of the preview",
        },
        RubricCategory {
            label: "Technical architecture",
            weight: 10,
            guidance: "component structure, state management and data handling",
        },
    ],
    focus: &[
        "Review the code file by file and cite concrete lines when suggesting changes",
        "Check component structure and reuse",
        "Note any missing tests or untested edge cases",
        "List which required features are complete, partial or missing",
    ],
};

/// HR process assignment, submitted as a document.
pub static HR_RUBRIC: Rubric = Rubric {
    reference_heading: "Assignment Requirements",
    artifact_heading: "Candidate Submission",
    categories: &[
        RubricCategory {
            label: "HR process design",
            weight: 40,
            guidance: "recruitment, candidate management and onboarding flows that fit the brief",
        },
        RubricCategory {
            label: "Data management",
            weight: 25,
            guidance: "organisation, validation and privacy of employee and candidate data",
        },
        RubricCategory {
            label: "People experience",
            weight: 20,
            guidance: "how usable and efficient the process is for candidates and staff",
        },
        RubricCategory {
            label: "Execution",
            weight: 15,
            guidance: "feasibility, tooling choices and clarity of the write-up",
        },
    ],
    focus: &[
        "Compare every step of the proposed workflow with the brief",
        "Flag anything that would not comply with data privacy obligations",
        "Assess how the plan handles exceptions and escalations",
    ],
};

/// Design portfolio or case study.
pub static DESIGN_RUBRIC: Rubric = Rubric {
    reference_heading: "Assignment Requirements",
    artifact_heading: "Portfolio",
    categories: &[
        RubricCategory {
            label: "Design quality",
            weight: 40,
            guidance: "visual hierarchy, composition, typography, colour and consistency",
        },
        RubricCategory {
            label: "UX implementation",
            weight: 30,
            guidance: "user flows, information architecture and accessibility",
        },
        RubricCategory {
            label: "Technical execution",
            weight: 20,
            guidance: "attention to detail, responsive behaviour and file organisation",
        },
        RubricCategory {
            label: "Presentation",
            weight: 10,
            guidance: "how clearly the work and its reasoning are communicated",
        },
    ],
    focus: &[
        "Compare the work with every stated assignment requirement",
        "Call out creative or unusual decisions and whether they pay off",
        "Give specific examples with suggested improvements",
    ],
};

impl Rubric {
    pub fn total_weight(&self) -> u32 {
        self.categories.iter().map(|c| u32::from(c.weight)).sum()
    }
}

/// Builds the single scoring prompt: rubric, reference text, artifact, and the
/// output format the score parser looks for.
pub fn scoring_prompt(rubric: &Rubric, reference: &str, artifact: &str) -> String {
    let criteria = rubric
        .categories
        .iter()
        .map(|c| format!("- {} ({} points): {}", c.label, c.weight, c.guidance))
        .collect::<Vec<_>>()
        .join("\n");
    let focus = if rubric.focus.is_empty() {
        String::new()
    } else {
        let items: String = rubric.focus.iter().map(|f| format!("- {f}\n")).collect();
        format!("\nAlso:\n{items}")
    };

    format!(
        "Evaluate the {artifact_heading} below against the {reference_heading}.\n\
         \n\
         Score it out of {total} using this rubric:\n\
         {criteria}\n\
         {focus}\
         \n\
         Respond in exactly this format:\n\
         Score: <integer from 0 to 100>\n\
         <a short explanation of the score, one paragraph per rubric category>\n\
         \n\
         {reference_heading}:\n\
         {reference}\n\
         \n\
         {artifact_heading}:\n\
         {artifact}\n",
        artifact_heading = rubric.artifact_heading,
        reference_heading = rubric.reference_heading,
        total = rubric.total_weight(),
    )
}
