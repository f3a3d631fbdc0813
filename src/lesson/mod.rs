use crate::providers::complete_with_fallback;
use crate::providers::traits::SharedProvider;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonPlanRequest {
    pub unit_details: String,
    pub session_hours: u32,
    pub num_sessions: u32,
}

impl LessonPlanRequest {
    /// All fields are required; nothing is sent to the provider until the
    /// request is complete.
    pub fn validate(&self) -> Result<()> {
        if self.unit_details.trim().is_empty() {
            return Err(anyhow!("Please describe the unit you want to teach"));
        }
        if self.session_hours == 0 {
            return Err(anyhow!("Session duration must be at least one hour"));
        }
        if self.num_sessions == 0 {
            return Err(anyhow!("Number of sessions must be at least one"));
        }
        Ok(())
    }
}

pub fn build_plan_prompt(request: &LessonPlanRequest) -> String {
    format!(
        "Unit Details:\n{}\n\n\
         Session Duration: {} hours\n\
         Number of Sessions: {}\n\n\
         Produce a lesson plan covering the unit across the sessions. For each \
         session include:\n\
         1. Learning objectives\n\
         2. Lesson activities and descriptions\n\
         3. Teaching strategies to increase student engagement\n\
         4. Assessment methods\n\
         5. Estimated time for each section\n\
         6. One suggested reference video or resource for the session topic\n\n\
         The plan should be well structured and easy to follow.",
        request.unit_details.trim(),
        request.session_hours,
        request.num_sessions
    )
}

pub async fn generate_plan(
    provider: &SharedProvider,
    fallback: Option<&SharedProvider>,
    request: &LessonPlanRequest,
) -> Result<String> {
    request.validate()?;
    let prompt = build_plan_prompt(request);
    complete_with_fallback(provider.as_ref(), fallback.map(|f| f.as_ref()), &prompt).await
}

/// Short encouragement shown next to a finished plan.
pub async fn motivational_line(provider: &SharedProvider) -> Result<String> {
    provider
        .complete("Give a one-sentence motivational quote for a teacher who is nervous about an upcoming lesson.")
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LessonPlanRequest {
        LessonPlanRequest {
            unit_details: "Introduction to plate tectonics".to_string(),
            session_hours: 2,
            num_sessions: 3,
        }
    }

    #[test]
    fn complete_request_passes_validation() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn missing_fields_are_rejected() {
        let mut r = request();
        r.unit_details = "  ".to_string();
        assert!(r.validate().is_err());

        let mut r = request();
        r.session_hours = 0;
        assert!(r.validate().is_err());

        let mut r = request();
        r.num_sessions = 0;
        assert!(r.validate().is_err());
    }

    #[test]
    fn prompt_carries_all_inputs() {
        let prompt = build_plan_prompt(&request());
        assert!(prompt.contains("plate tectonics"));
        assert!(prompt.contains("Session Duration: 2 hours"));
        assert!(prompt.contains("Number of Sessions: 3"));
        assert!(prompt.contains("Learning objectives"));
    }
}
