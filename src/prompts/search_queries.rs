const ROLE: &str = "Role: You are an expert at \"Google Dorking.\" You excel at translating user requirements into precise, effective search queries for Google's Custom Search API.";
const OBJECTIVE: &str = "Objective: Analyze the user's natural language request to understand their underlying lead generation goal. Based on that goal, produce search queries for Google's Custom Search API that find leads matching the user's criteria.";
const INPUT_HEADER: &str = "Input from User:\nThe user's request is:";
const OUTPUT_HEADER: &str = "Output Requirements:";
const RULES: &[&str] = &[
    "Respond only with a JSON array of strings.",
    "Do not include explanations or introductory text. Your entire response must be the raw JSON array.",
];

pub fn build_search_query_prompt(user_message: &str) -> String {
    let rules = RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {}", i + 1, rule))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{role}\n\n{objective}\n\n{input_header}\n\n{user_message}\n\n{output_header}\n{rules}\n",
        role = ROLE,
        objective = OBJECTIVE,
        input_header = INPUT_HEADER,
        user_message = user_message.trim(),
        output_header = OUTPUT_HEADER,
        rules = rules
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_user_request() {
        let prompt = build_search_query_prompt("  fintech startups in Nairobi  ");
        assert!(prompt.contains("\n\nfintech startups in Nairobi\n\n"));
    }

    #[test]
    fn prompt_demands_json_array() {
        let prompt = build_search_query_prompt("x");
        assert!(prompt.contains("JSON array of strings"));
        assert!(prompt.contains("1. Respond only"));
        assert!(prompt.contains("2. Do not include"));
    }

    #[test]
    fn prompt_starts_with_role() {
        let prompt = build_search_query_prompt("x");
        assert!(prompt.starts_with("Role:"));
        assert!(prompt.ends_with('\n'));
    }
}
