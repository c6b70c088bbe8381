//! Prompt contracts for the two model-backed stages.

use crate::config::{EvaluationCriteria, JobRequirements};

/// Canonical sections of a standardized résumé, in output order.
pub const STANDARD_SECTIONS: [&str; 5] = [
    "Personal Information",
    "Academic Education",
    "Professional Experience",
    "Skills",
    "Additional Information",
];

/// Sub-sections of the Markdown analysis report.
pub const REPORT_SECTIONS: [&str; 6] = [
    "Strengths",
    "Concerns",
    "Overall Fit",
    "Score",
    "Sentiment",
    "Incomplete Info",
];

pub fn standardization_system_prompt() -> String {
    format!(
        "You are a CV standardization expert. Convert the provided CV text into a consistent \
         Markdown format with these sections:\n{}\n\n\
         Follow these rules strictly:\n\
         - Use level 2 headers (##) for all section names\n\
         - Format education and experience in chronological order\n\
         - Use bullet points for skills and responsibilities\n\
         - Keep all original information but reorganize it into the standard format\n\
         - Ensure consistent formatting across all CVs",
        STANDARD_SECTIONS.join("\n")
    )
}

pub fn standardization_user_prompt(output_language: &str, raw_text: &str) -> String {
    format!(
        "Please standardize this CV text in Markdown format. Use the exact section names \
         provided. Output in {} language:\n\n{}",
        output_language, raw_text
    )
}

const RESPONSE_CONTRACT: &str = "Output your response ONLY as a valid JSON object with the following structure:\n\
{\n\
  \"report\": \"[Detailed Markdown analysis with these section names: {sections}]\",\n\
  \"csvData\": {\n\
    \"score\": [numerical score between 0-100],\n\
    \"sentiment\": [short sentiment analysis],\n\
    \"name\": [candidate name],\n\
    \"email\": [candidate email],\n\
    \"incomplete_info\": [incomplete or ambiguous information],\n\
    \"education\": [highest education level],\n\
    \"key_skills\": [comma-separated list of top 5 skills]\n\
  }\n\
}\n\n\
IMPORTANT: Return ONLY valid JSON without any additional text before or after. \
Do not include \"```json\" or \"```\" markers. Your complete response must be parseable as JSON.";

const RECRUITER_BRIEF: &str = "You are an expert HR recruiter with deep technical knowledge. \
Analyze the CV considering:\n\
1. Technical expertise and its alignment with our needs\n\
2. Quality and relevance of professional experience\n\
3. Cultural fit indicators\n\
4. Educational background\n\
5. Evidence of soft skills\n\n\
Provide a structured analysis including:\n\
- Key strengths\n\
- Potential areas of concern\n\
- Overall fit for the position\n\
- Numerical score (0-100)\n\
- Sentiment analysis of the fit (Short text)\n\
- Incomplete or ambiguous information (clearly identify any criteria that could not be \
adequately evaluated due to missing, vague, or contradictory information in the CV)";

const SCORING_INSTRUCTIONS: &str = "Calculate the final score (0-100) considering the weights \
of each criterion. The final score should be objective, but must have a subjective component, \
in what is your personal opinion regarding this criteria, correlated with the overall CV. \
For each criterion, assign a score from 0 to 100 and multiply by its corresponding weight. \
The sum of these weighted values will be the candidate's final score.";

/// `technical_skills` becomes `Technical skills`.
pub fn humanize_criterion_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn render_criterion(name: &str, weight: f64, description: &str) -> String {
    format!(
        "{} (weight: {:.2}): {}",
        humanize_criterion_name(name),
        weight,
        description
    )
}

fn render_criteria(output_language: &str, criteria: &EvaluationCriteria) -> String {
    let mut out = format!(
        "Evaluate the candidate in {} language using the following specific criteria:\n",
        output_language
    );
    for (name, criterion) in criteria.iter() {
        out.push('\n');
        out.push_str(&render_criterion(name, criterion.weight, &criterion.description));
        out.push('\n');
    }
    out
}

pub fn analysis_system_prompt(requirements: &JobRequirements) -> String {
    format!(
        "{}\n\n{}\n\n{}\n{}",
        RESPONSE_CONTRACT.replace("{sections}", &REPORT_SECTIONS.join(", ")),
        RECRUITER_BRIEF,
        render_criteria(
            &requirements.output_language,
            &requirements.evaluation_criteria
        ),
        SCORING_INSTRUCTIONS
    )
}

pub fn analysis_user_prompt(requirements: &JobRequirements, canonical_text: &str) -> String {
    format!(
        "Job Description:\n{}\n\nPosition: {}\n\nCandidate CV:\n{}\n\n\
         Output the analysis in {} language and in valid JSON format.",
        requirements.job_description,
        requirements.position,
        canonical_text,
        requirements.output_language
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvaluationCriterion;

    fn requirements() -> JobRequirements {
        JobRequirements {
            output_language: "pt-br".to_string(),
            job_description: "Build payment APIs".to_string(),
            position: "Backend Engineer".to_string(),
            evaluation_criteria: EvaluationCriteria::new(vec![
                (
                    "technical_skills".to_string(),
                    EvaluationCriterion {
                        weight: 0.7,
                        description: "Go and SQL".to_string(),
                    },
                ),
                (
                    "communication".to_string(),
                    EvaluationCriterion {
                        weight: 0.3,
                        description: "Clear writing".to_string(),
                    },
                ),
            ]),
            directories: None,
        }
    }

    #[test]
    fn test_humanize_criterion_name() {
        assert_eq!(humanize_criterion_name("technical_skills"), "Technical skills");
        assert_eq!(humanize_criterion_name("x"), "X");
        assert_eq!(humanize_criterion_name(""), "");
    }

    #[test]
    fn test_render_criterion_format() {
        assert_eq!(
            render_criterion("technical_skills", 0.7, "Go and SQL"),
            "Technical skills (weight: 0.70): Go and SQL"
        );
    }

    #[test]
    fn test_analysis_prompt_contents() {
        let system = analysis_system_prompt(&requirements());
        for section in REPORT_SECTIONS {
            assert!(system.contains(section));
        }
        for field in [
            "score",
            "sentiment",
            "name",
            "email",
            "incomplete_info",
            "education",
            "key_skills",
        ] {
            assert!(system.contains(&format!("\"{}\"", field)), "{}", field);
        }
        let technical = system.find("Technical skills (weight: 0.70)").unwrap();
        let communication = system.find("Communication (weight: 0.30)").unwrap();
        assert!(technical < communication);
        assert!(system.contains("pt-br language"));
    }

    #[test]
    fn test_analysis_user_prompt_embeds_context() {
        let prompt = analysis_user_prompt(&requirements(), "## Skills\n- Go");
        assert!(prompt.starts_with("Job Description:\nBuild payment APIs"));
        assert!(prompt.contains("Position: Backend Engineer"));
        assert!(prompt.contains("## Skills\n- Go"));
    }

    #[test]
    fn test_standardization_prompt_sections_in_order() {
        let system = standardization_system_prompt();
        let positions: Vec<usize> = STANDARD_SECTIONS
            .iter()
            .map(|s| system.find(s).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(system.contains("level 2 headers (##)"));
        assert!(standardization_user_prompt("en", "raw").ends_with("Output in en language:\n\nraw"));
    }
}
