use crate::providers::complete_with_fallback;
use crate::providers::traits::SharedProvider;
use crate::report::DocxBuilder;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Expert => "Expert",
        }
    }
}

impl FromStr for Difficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "expert" => Ok(Self::Expert),
            other => Err(anyhow!(
                "Unknown difficulty '{}' (expected beginner, intermediate or expert)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: Option<char>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
}

pub fn build_quiz_prompt(topic: &str, difficulty: Difficulty, num_questions: u32) -> String {
    format!(
        "Generate a multiple-choice quiz with the following specifications:\n\
         - Topic: \"{}\"\n\
         - Difficulty level: \"{}\"\n\
         - Number of questions: {}\n\
         - Each question must have 4 options labeled a, b, c and d.\n\
         - Each option should be brief (2-3 words).\n\
         - Clearly specify the correct answer for each question.\n\n\
         Ensure questions and options are clear, concise and relevant to the topic.\n\n\
         Example format:\n\
         Q1: What is the capital of France?\n\
         a. Berlin\n\
         b. Madrid\n\
         c. Paris\n\
         d. Rome\n\
         Answer: c\n\n\
         Quiz:",
        topic,
        difficulty.label(),
        num_questions
    )
}

/// Line-based parse of the model's quiz reply. Blocks that do not carry a
/// question line and four options are skipped rather than failing the
/// whole quiz.
pub fn parse_quiz(text: &str) -> Vec<QuizQuestion> {
    let mut questions = Vec::new();
    let mut current: Option<QuizQuestion> = None;

    for line in text.lines() {
        let line = line.trim();

        if is_question_line(line) {
            if let Some(q) = current.take() {
                push_if_complete(&mut questions, q);
            }
            current = Some(QuizQuestion {
                prompt: line.to_string(),
                options: Vec::new(),
                answer: None,
            });
        } else if is_option_line(line) {
            if let Some(q) = current.as_mut() {
                q.options.push(line.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("Answer:") {
            if let Some(q) = current.as_mut() {
                q.answer = rest.trim().chars().next().map(|c| c.to_ascii_lowercase());
            }
        }
    }

    if let Some(q) = current.take() {
        push_if_complete(&mut questions, q);
    }
    questions
}

fn push_if_complete(questions: &mut Vec<QuizQuestion>, question: QuizQuestion) {
    if question.options.len() == 4 {
        questions.push(question);
    }
}

fn is_question_line(line: &str) -> bool {
    let Some(rest) = line.strip_prefix('Q') else {
        return false;
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    !digits.is_empty() && rest[digits.len()..].starts_with(':')
}

fn is_option_line(line: &str) -> bool {
    let mut chars = line.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some('a'..='d'), Some('.'), Some(' '))
    )
}

pub async fn generate(
    provider: &SharedProvider,
    fallback: Option<&SharedProvider>,
    topic: &str,
    difficulty: Difficulty,
    num_questions: u32,
) -> Result<Quiz> {
    if topic.trim().is_empty() {
        return Err(anyhow!("Please provide a quiz topic"));
    }

    let prompt = build_quiz_prompt(topic, difficulty, num_questions);
    let response =
        complete_with_fallback(provider.as_ref(), fallback.map(|f| f.as_ref()), &prompt).await?;

    let questions = parse_quiz(&response);
    if questions.is_empty() {
        return Err(anyhow!("The model returned no parseable questions"));
    }

    Ok(Quiz {
        topic: topic.to_string(),
        questions,
    })
}

impl Quiz {
    /// Terminal rendering, correct answers included.
    pub fn render_with_answers(&self) -> String {
        let mut out = String::new();
        for question in &self.questions {
            out.push_str(&question.prompt);
            out.push('\n');
            for option in &question.options {
                out.push_str(option);
                out.push('\n');
            }
            if let Some(answer) = question.answer {
                out.push_str(&format!("Correct answer: {}\n", answer));
            }
            out.push('\n');
        }
        out
    }

    /// Printable worksheet: institute and title headings, student detail
    /// blanks, questions and options; answers stripped.
    pub fn worksheet_docx(&self, institute: &str, title: &str) -> Result<Vec<u8>> {
        let mut builder = DocxBuilder::new();

        if !institute.is_empty() {
            builder.centered_heading(1, institute);
        }
        if !title.is_empty() {
            builder.centered_heading(2, title);
        }

        builder
            .paragraph("Name:")
            .paragraph("Roll number:")
            .paragraph("Class:")
            .paragraph("Section:")
            .paragraph("");

        for question in &self.questions {
            builder.paragraph(&question.prompt);
            for option in &question.options {
                builder.paragraph(option);
            }
            builder.paragraph("");
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    const REPLY: &str = "\
Q1: What is the capital of France?
a. Berlin
b. Madrid
c. Paris
d. Rome
Answer: c

Q2: Largest planet?
a. Earth
b. Jupiter
c. Mars
d. Venus
Answer: b
";

    #[test]
    fn parses_well_formed_reply() {
        let questions = parse_quiz(REPLY);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].prompt, "Q1: What is the capital of France?");
        assert_eq!(questions[0].options.len(), 4);
        assert_eq!(questions[0].answer, Some('c'));
        assert_eq!(questions[1].answer, Some('b'));
    }

    #[test]
    fn malformed_blocks_are_skipped() {
        let reply = "\
Q1: Complete question?
a. one
b. two
c. three
d. four
Answer: a

Q2: Missing options?
a. only one

Some commentary the model added.
";
        let questions = parse_quiz(reply);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer, Some('a'));
    }

    #[test]
    fn question_line_detection_requires_q_number_colon() {
        assert!(is_question_line("Q1: hi"));
        assert!(is_question_line("Q12: hi"));
        assert!(!is_question_line("Quiz: hi"));
        assert!(!is_question_line("1: hi"));
        assert!(!is_question_line("Q: hi"));
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!(Difficulty::from_str("EXPERT").unwrap(), Difficulty::Expert);
        assert!(Difficulty::from_str("impossible").is_err());
    }

    #[test]
    fn prompt_carries_topic_and_count() {
        let prompt = build_quiz_prompt("Photosynthesis", Difficulty::Beginner, 5);
        assert!(prompt.contains("\"Photosynthesis\""));
        assert!(prompt.contains("Number of questions: 5"));
        assert!(prompt.contains("\"Beginner\""));
    }

    #[test]
    fn worksheet_strips_answers_and_keeps_blanks() {
        let quiz = Quiz {
            topic: "geo".to_string(),
            questions: parse_quiz(REPLY),
        };
        let docx = quiz.worksheet_docx("Hill Valley High", "Geography Quiz").unwrap();

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(docx)).unwrap();
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();

        assert!(document.contains("Hill Valley High"));
        assert!(document.contains("Name:"));
        assert!(document.contains("Roll number:"));
        assert!(document.contains("What is the capital of France?"));
        assert!(document.contains("c. Paris"));
        assert!(!document.contains("Answer:"));
        assert!(!document.contains("Correct answer"));
    }
}
