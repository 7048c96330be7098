// Prompt templates for the CV chatbot. Placeholders are `{name}` and are
// filled by `fill`.

/// Rewrites a follow-up into a question that stands on its own
pub const CONDENSE_QUESTION: &str = "\
Given the following conversation and a follow up question, rephrase the follow up question to be a standalone question, in its original language.

Chat History:
{chat_history}
Follow Up Input: {question}
Standalone question:";

/// Answers the standalone question from retrieved context on behalf of the CV owner
pub const ANSWER: &str = "\
You are a chatbot with the task of convincing users to hire {owner} at their company.
The absence of information regarding something doesn't imply its negation, if you don't know something just say it. Give brief but impactful answers to their question considering the following context:
{context}

Question: {question}
";

/// Separator between retrieved passages in the context block
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

/// Substitute every `{key}` in `template` in one left-to-right pass.
/// Inserted values are copied verbatim; unknown keys are left as written.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v, close))
        });
        match value {
            Some((v, close)) => {
                out.push_str(v);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_condense_prompt() {
        let prompt = fill(
            CONDENSE_QUESTION,
            &[("chat_history", "Human: hi\nAI: hello"), ("question", "why?")],
        );
        assert!(prompt.contains("Chat History:\nHuman: hi\nAI: hello\nFollow Up Input: why?"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_fill_leaves_unknown_keys() {
        assert_eq!(fill("{a} {b}", &[("a", "1")]), "1 {b}");
        assert_eq!(fill("{{a}} {", &[("a", "1")]), "{1} {");
    }

    #[test]
    fn test_fill_does_not_rescan_values() {
        assert_eq!(fill("{a}|{b}", &[("a", "{b}"), ("b", "X")]), "{b}|X");
        assert_eq!(
            fill(ANSWER, &[("owner", "Alex"), ("context", "see {question}"), ("question", "Q")])
                .matches("see {question}")
                .count(),
            1
        );
    }
}
