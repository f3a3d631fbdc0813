use crate::analysis::roster::{Roster, Student};
use crate::analysis::stats::WEAK_THRESHOLD;
use crate::providers::complete_with_fallback;
use crate::providers::traits::SharedProvider;
use anyhow::Result;

/// Suggestion paths degrade to this instead of failing the analysis when
/// the provider errors.
pub const NO_SUGGESTIONS: &str = "No suggestions generated.";

pub struct Advisor {
    provider: SharedProvider,
    fallback: Option<SharedProvider>,
}

impl Advisor {
    pub fn new(provider: SharedProvider, fallback: Option<SharedProvider>) -> Self {
        Self { provider, fallback }
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        complete_with_fallback(self.provider.as_ref(), self.fallback.as_deref(), prompt).await
    }

    async fn complete_or_default(&self, prompt: &str) -> String {
        match self.complete(prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => NO_SUGGESTIONS.to_string(),
            Err(e) => {
                log::warn!("Suggestion generation failed: {:#}", e);
                NO_SUGGESTIONS.to_string()
            }
        }
    }

    pub async fn student_suggestions(&self, student: &Student, subjects: &[String]) -> String {
        let prompt = build_student_prompt(student, subjects);
        self.complete_or_default(&prompt).await
    }

    pub async fn class_suggestions(&self, subject_means: &[(String, f64)]) -> String {
        let prompt = build_class_prompt(subject_means);
        self.complete_or_default(&prompt).await
    }

    pub async fn subject_suggestions(&self, subject: &str) -> String {
        let prompt = build_subject_prompt(subject);
        self.complete_or_default(&prompt).await
    }

    /// Free-text question over the whole gradebook. Unlike the suggestion
    /// paths, failures surface to the caller.
    pub async fn ask(&self, roster: &Roster, question: &str) -> Result<String> {
        let prompt = build_data_question_prompt(&roster.to_table_string(), question);
        self.complete(&prompt).await
    }
}

fn build_student_prompt(student: &Student, subjects: &[String]) -> String {
    let marks_line = subjects
        .iter()
        .zip(student.marks.iter())
        .map(|(subject, mark)| format!("{}: {}", subject, mark))
        .collect::<Vec<_>>()
        .join(", ");

    let strengths: Vec<String> = subjects
        .iter()
        .zip(student.marks.iter())
        .filter(|(_, &mark)| mark >= WEAK_THRESHOLD)
        .map(|(subject, mark)| format!("{}: {} marks", subject, mark))
        .collect();
    let weaknesses: Vec<String> = subjects
        .iter()
        .zip(student.marks.iter())
        .filter(|(_, &mark)| mark < WEAK_THRESHOLD)
        .map(|(subject, mark)| format!("{}: {} marks", subject, mark))
        .collect();

    format!(
        "Student Name: {}\n\
         Subject Marks: {}\n\
         Strong subjects: {}\n\
         Weak subjects: {}\n\
         Attendance: {}%\n\n\
         As a teacher, provide personalized suggestions for this student to improve \
         their performance, as at most 4 bullet points and under 100 words:\n\
         - Appreciate the subjects the student performs well in\n\
         - Recommend study strategies specific to the weak subjects\n\
         - Address attendance issues if present\n\
         - Suggest ways to maintain or boost motivation",
        student.name,
        marks_line,
        if strengths.is_empty() {
            "none".to_string()
        } else {
            strengths.join("; ")
        },
        if weaknesses.is_empty() {
            "none".to_string()
        } else {
            weaknesses.join("; ")
        },
        student.attendance,
    )
}

fn build_class_prompt(subject_means: &[(String, f64)]) -> String {
    let averages = subject_means
        .iter()
        .map(|(subject, avg)| format!("{}: {:.2}", subject, avg))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Class Subject Averages: {}\n\n\
         As a teacher, provide brief suggestions to improve overall class performance, \
         as at most 3 bullet points and under 50 words:\n\
         - Identify subjects where students are struggling\n\
         - Recommend teaching strategies to improve these subjects\n\
         - Provide general tips to maintain or boost class motivation",
        averages
    )
}

fn build_subject_prompt(subject: &str) -> String {
    format!(
        "The class is struggling in {}. Provide brief strategies to help students \
         improve in this subject, as at most 3 bullet points and under 50 words:\n\
         - Additional classes, tutoring or recommended study resources\n\
         - Tips to improve understanding and retention of the material\n\
         - Methods to boost motivation and engagement in the subject",
        subject
    )
}

fn build_data_question_prompt(table: &str, question: &str) -> String {
    format!(
        "You are a teacher who excels in statistics. After receiving the data you \
         do the calculations and answer the user's query. Do not show the working.\n\n\
         Given the following dataset:\n{}\n\n\
         Answer the following question concisely and state your final calculation:\n{}",
        table, question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::traits::CompletionProvider;
    use anyhow::anyhow;
    use std::sync::Arc;

    fn roster() -> Roster {
        Roster::from_csv(
            "Roll No,Name,Attendance,Maths,Science\n\
             1,Asha,92,78,41\n",
        )
        .unwrap()
    }

    #[test]
    fn student_prompt_splits_strengths_and_weaknesses() {
        let r = roster();
        let asha = r.student("Asha").unwrap();
        let prompt = build_student_prompt(asha, &r.subjects);

        assert!(prompt.contains("Student Name: Asha"));
        assert!(prompt.contains("Strong subjects: Maths: 78 marks"));
        assert!(prompt.contains("Weak subjects: Science: 41 marks"));
        assert!(prompt.contains("Attendance: 92%"));
    }

    #[test]
    fn data_question_prompt_carries_the_table() {
        let r = roster();
        let prompt = build_data_question_prompt(&r.to_table_string(), "who scored highest?");
        assert!(prompt.contains("Asha"));
        assert!(prompt.contains("who scored highest?"));
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl CompletionProvider for FailingProvider {
        async fn new(_api_key: String, _system_message: String) -> anyhow::Result<Self> {
            Ok(Self)
        }

        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            Err(anyhow!("provider unavailable"))
        }

        async fn generate_embedding(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Err(anyhow!("provider unavailable"))
        }

        fn embedding_dimension(&self) -> usize {
            8
        }

        fn model(&self) -> String {
            "failing".to_string()
        }

        fn get_system_message(&self) -> String {
            String::new()
        }

        fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
            Box::new(Self)
        }
    }

    #[tokio::test]
    async fn suggestions_degrade_instead_of_failing() {
        let advisor = Advisor::new(Arc::new(FailingProvider), None);
        let r = roster();
        let asha = r.student("Asha").unwrap();

        let suggestions = advisor.student_suggestions(asha, &r.subjects).await;
        assert_eq!(suggestions, NO_SUGGESTIONS);

        let class = advisor.class_suggestions(&[("Maths".to_string(), 55.0)]).await;
        assert_eq!(class, NO_SUGGESTIONS);
    }

    #[tokio::test]
    async fn ask_surfaces_provider_errors() {
        let advisor = Advisor::new(Arc::new(FailingProvider), None);
        let r = roster();
        assert!(advisor.ask(&r, "average?").await.is_err());
    }
}
