//! Fixed instruction templates for the plain chat CLI.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Summarize,
    Qa,
    Classify,
    Rewrite,
    Plan,
}

impl PromptMode {
    pub const ALL: [PromptMode; 5] = [Self::Summarize, Self::Qa, Self::Classify, Self::Rewrite, Self::Plan];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Qa => "qa",
            Self::Classify => "classify",
            Self::Rewrite => "rewrite",
            Self::Plan => "plan",
        }
    }

    /// Wrap `input` in the mode's instructions.
    pub fn render(&self, input: &str) -> String {
        match self {
            Self::Summarize => format!(
                "You are a professional analyst.\n\n\
                 Summarize the text accurately.\n\n\
                 Rules:\n- Use only provided text\n- No external info\n\n\
                 Output:\n- 5 bullet points\n- Each bullet = 1 sentence\n\n\
                 TEXT:\n{input}\n"
            ),
            Self::Qa => format!(
                "You are a cautious assistant.\n\n\
                 Answer clearly and concisely.\nIf unsure, say you are unsure.\n\n\
                 QUESTION:\n{input}\n\n\
                 Output:\n- One short paragraph\n"
            ),
            Self::Classify => format!(
                "You are a strict classifier.\n\n\
                 Classify into:\n- Positive\n- Negative\n- Neutral\n\n\
                 Return:\nClassification: <label>\nReason: <1 sentence>\n\n\
                 TEXT:\n{input}\n"
            ),
            Self::Rewrite => format!(
                "You are a professional editor.\n\n\
                 Rewrite the text.\n\nTone: Professional\n\n\
                 Rules:\n- Keep meaning\n- No new info\n\n\
                 TEXT:\n{input}\n"
            ),
            Self::Plan => format!(
                "You are a systems planner.\n\n\
                 GOAL:\n{input}\n\n\
                 Output:\n\nSteps:\n1. ...\n2. ...\n\n\
                 Assumptions:\n- ...\n\n\
                 Risks:\n- ...\n"
            ),
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl FromStr for PromptMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| format!("unknown prompt mode '{s}' (expected one of: summarize, qa, classify, rewrite, plan)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!("QA".parse::<PromptMode>().unwrap(), PromptMode::Qa);
        assert_eq!(" plan ".parse::<PromptMode>().unwrap(), PromptMode::Plan);
        for m in PromptMode::ALL { assert_eq!(m.to_string().parse::<PromptMode>().unwrap(), m); }
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!("poem".parse::<PromptMode>().is_err());
    }

    #[test]
    fn templates_embed_the_input() {
        let text = "The stove is too small for the cabin.";
        for m in PromptMode::ALL { assert!(m.render(text).contains(text), "{m}"); }
        assert!(PromptMode::Classify.render(text).contains("Classification: <label>"));
        assert!(PromptMode::Qa.render(text).contains("QUESTION:\nThe stove"));
    }
}
