// Prompt templates for the resume-match flow.

/// Resume match prompt template. Replace `{jd_text}` and `{resume_text}` before sending.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"You are an expert HR recruiter. Analyze this resume against the job description and provide a comprehensive comparison.

JOB DESCRIPTION:
{jd_text}

CANDIDATE RESUME:
{resume_text}

Please provide your analysis in the following JSON format:
{
    "candidate_name": "Extract the candidate's full name from the resume, nothing other than the full name",
    "experience_match": "Yes/No/Partially",
    "experience_analysis": "Short explanation of the experience match including years and relevance",
    "missing_keywords": ["keyword1", "keyword2", "keyword3", "keyword4", "keyword5"],
    "suggestions": "Specific suggestions for improvement, concerns about JD match, and overall impact assessment in 2-3 lines"
}

Analysis Requirements:
1. CANDIDATE NAME: Extract only the full name from the resume text.
2. EXPERIENCE MATCH: Compare the candidate's experience with the job requirements. Answer "Yes" if the experience falls within the range given in the JD, "No" if it does not, "Partially" if it only partly fits.
3. EXPERIENCE ANALYSIS: Explain the experience match, years of experience, and relevance in 3-4 lines.
4. MISSING KEYWORDS: List 3-5 key technical skills, tools, or requirements from the JD that are missing from the resume (more if many are missing). Technical skills only.
5. SUGGESTIONS: Specific improvement suggestions and impact assessment for the JD match in 3-4 lines only.

Focus on:
- Technical skills and tools mentioned in the JD but not in the resume
- Experience level comparison (years and relevance)
- Overall job fit and compatibility
- Specific actionable suggestions for improvement
- Any red flags or concerns about the match

Return only valid JSON, no additional text."#;

pub fn build_match_prompt(jd_text: &str, resume_text: &str) -> String {
    // Resume first so a JD containing "{resume_text}" is never re-expanded.
    MATCH_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replacen("{jd_text}", jd_text, 1)
}
