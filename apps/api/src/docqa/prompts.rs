const QA_PREAMBLE: &str = "You are an expert in analyzing Resume with Comparing job Description.\
Resume and Jd is with Any Name\n";

/// Builds the document Q&A prompt around the single most relevant document.
pub fn build_qa_prompt(relevant_text: &str, query: &str) -> String {
    format!("{QA_PREAMBLE}Relevant Information:\n{relevant_text}\n\nUser Query: {query}")
}
