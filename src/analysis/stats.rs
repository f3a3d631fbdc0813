use crate::analysis::roster::{Roster, Student};

/// A subject is weak iff its class-wide mean is strictly below this.
pub const WEAK_THRESHOLD: f64 = 60.0;

pub const CRITICAL_ATTENDANCE: f64 = 50.0;
pub const LOW_ATTENDANCE: f64 = 75.0;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Arithmetic mean of one student's subject scores.
pub fn student_average(student: &Student) -> f64 {
    mean(&student.marks)
}

/// Class-wide mean per subject, in roster subject order.
pub fn subject_means(roster: &Roster) -> Vec<(String, f64)> {
    roster
        .subjects
        .iter()
        .enumerate()
        .map(|(i, subject)| {
            let marks: Vec<f64> = roster.students.iter().map(|s| s.marks[i]).collect();
            (subject.clone(), mean(&marks))
        })
        .collect()
}

/// Exhaustive and mutually exclusive: every subject lands in exactly one
/// of the two lists.
pub fn classify_subjects(means: &[(String, f64)]) -> (Vec<(String, f64)>, Vec<(String, f64)>) {
    let mut weak = Vec::new();
    let mut strong = Vec::new();
    for (subject, avg) in means {
        if *avg < WEAK_THRESHOLD {
            weak.push((subject.clone(), *avg));
        } else {
            strong.push((subject.clone(), *avg));
        }
    }
    (weak, strong)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeBand {
    Excellent,
    Good,
    NeedsImprovement,
    Concerning,
    Failed,
}

impl GradeBand {
    pub fn for_mark(mark: f64) -> Self {
        if mark >= 90.0 {
            Self::Excellent
        } else if mark >= 80.0 {
            Self::Good
        } else if mark >= 60.0 {
            Self::NeedsImprovement
        } else if mark >= 40.0 {
            Self::Concerning
        } else {
            Self::Failed
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::NeedsImprovement => "Needs Improvement",
            Self::Concerning => "Concerning",
            Self::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceWarning {
    Critical,
    Low,
}

impl AttendanceWarning {
    pub fn for_attendance(attendance: f64) -> Option<Self> {
        if attendance < CRITICAL_ATTENDANCE {
            Some(Self::Critical)
        } else if attendance < LOW_ATTENDANCE {
            Some(Self::Low)
        } else {
            None
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Critical => {
                "CRITICAL WARNING: Attendance is dangerously low. Immediate action is required."
            }
            Self::Low => "Attendance is below 75%. This can significantly impact performance.",
        }
    }
}

/// Qualitative attendance-to-performance band; the same input always
/// yields the same band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactBand {
    Significant,
    Moderate,
    NotMajor,
}

impl ImpactBand {
    pub fn for_correlation(correlation: f64) -> Self {
        if correlation > 0.5 {
            Self::Significant
        } else if correlation > 0.0 {
            Self::Moderate
        } else {
            Self::NotMajor
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Significant => {
                "Low attendance is significantly impacting performance. Ensure regular attendance."
            }
            Self::Moderate => {
                "Attendance is moderately impacting performance. Try to attend more regularly."
            }
            Self::NotMajor => {
                "Attendance is not a major issue for performance. Focus on study habits and concentration."
            }
        }
    }
}

/// Sample Pearson correlation; 0.0 for degenerate inputs.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }
    let mx = mean(xs);
    let my = mean(ys);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        cov += (x - mx) * (y - my);
        var_x += (x - mx) * (x - mx);
        var_y += (y - my) * (y - my);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

#[derive(Debug, Clone)]
pub struct AttendanceInsights {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub lowest_student: String,
    pub highest_student: String,
    pub correlation: f64,
    pub impact: ImpactBand,
}

pub fn attendance_insights(roster: &Roster) -> AttendanceInsights {
    let attendance: Vec<f64> = roster.students.iter().map(|s| s.attendance).collect();
    let averages: Vec<f64> = roster.students.iter().map(student_average).collect();

    let min = attendance.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = attendance.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let lowest_student = roster
        .students
        .iter()
        .find(|s| s.attendance == min)
        .map(|s| s.name.clone())
        .unwrap_or_default();
    let highest_student = roster
        .students
        .iter()
        .find(|s| s.attendance == max)
        .map(|s| s.name.clone())
        .unwrap_or_default();

    let correlation = pearson(&attendance, &averages);

    AttendanceInsights {
        average: mean(&attendance),
        min,
        max,
        lowest_student,
        highest_student,
        correlation,
        impact: ImpactBand::for_correlation(correlation),
    }
}

impl AttendanceInsights {
    pub fn render_lines(&self) -> Vec<String> {
        vec![
            format!("Average Attendance: {:.2}%", self.average),
            format!(
                "Lowest Attendance: {}% (Student: {})",
                self.min, self.lowest_student
            ),
            format!(
                "Highest Attendance: {}% (Student: {})",
                self.max, self.highest_student
            ),
            format!("Insights: {}", self.impact.message()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::from_csv(
            "Roll No,Name,Attendance,Maths,Science,English\n\
             1,Asha,92,78,91,66\n\
             2,Bilal,55,42,58,71\n\
             3,Chitra,85,95,88,90\n",
        )
        .unwrap()
    }

    #[test]
    fn student_average_is_arithmetic_mean() {
        let r = roster();
        for student in &r.students {
            let expected = student.marks.iter().sum::<f64>() / student.marks.len() as f64;
            assert!((student_average(student) - expected).abs() < 1e-9);
        }
        let asha = r.student("Asha").unwrap();
        assert!((student_average(asha) - (78.0 + 91.0 + 66.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn weak_iff_mean_strictly_below_sixty() {
        let means = vec![
            ("Maths".to_string(), 59.999),
            ("Science".to_string(), 60.0),
            ("English".to_string(), 75.0),
        ];
        let (weak, strong) = classify_subjects(&means);
        assert_eq!(weak.len(), 1);
        assert_eq!(weak[0].0, "Maths");
        assert_eq!(strong.len(), 2);
    }

    #[test]
    fn classification_is_exhaustive_and_exclusive() {
        let r = roster();
        let means = subject_means(&r);
        let (weak, strong) = classify_subjects(&means);
        assert_eq!(weak.len() + strong.len(), r.subjects.len());
        for (subject, _) in &weak {
            assert!(!strong.iter().any(|(s, _)| s == subject));
        }
    }

    #[test]
    fn grade_bands_cover_every_mark() {
        assert_eq!(GradeBand::for_mark(95.0), GradeBand::Excellent);
        assert_eq!(GradeBand::for_mark(90.0), GradeBand::Excellent);
        assert_eq!(GradeBand::for_mark(89.9), GradeBand::Good);
        assert_eq!(GradeBand::for_mark(60.0), GradeBand::NeedsImprovement);
        assert_eq!(GradeBand::for_mark(59.9), GradeBand::Concerning);
        assert_eq!(GradeBand::for_mark(12.0), GradeBand::Failed);
    }

    #[test]
    fn attendance_warnings_use_original_thresholds() {
        assert_eq!(
            AttendanceWarning::for_attendance(49.9),
            Some(AttendanceWarning::Critical)
        );
        assert_eq!(
            AttendanceWarning::for_attendance(60.0),
            Some(AttendanceWarning::Low)
        );
        assert_eq!(AttendanceWarning::for_attendance(75.0), None);
    }

    #[test]
    fn pearson_sign_matches_data_shape() {
        let up = pearson(&[1.0, 2.0, 3.0, 4.0], &[10.0, 20.0, 30.0, 40.0]);
        assert!((up - 1.0).abs() < 1e-9);

        let down = pearson(&[1.0, 2.0, 3.0, 4.0], &[40.0, 30.0, 20.0, 10.0]);
        assert!((down + 1.0).abs() < 1e-9);

        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[5.0, 9.0, 2.0]), 0.0);
        assert_eq!(pearson(&[1.0], &[2.0]), 0.0);
    }

    #[test]
    fn impact_band_is_deterministic_for_same_input() {
        assert_eq!(ImpactBand::for_correlation(0.9), ImpactBand::Significant);
        assert_eq!(ImpactBand::for_correlation(0.5), ImpactBand::Moderate);
        assert_eq!(ImpactBand::for_correlation(0.2), ImpactBand::Moderate);
        assert_eq!(ImpactBand::for_correlation(0.0), ImpactBand::NotMajor);
        assert_eq!(ImpactBand::for_correlation(-0.4), ImpactBand::NotMajor);

        let r = roster();
        let first = attendance_insights(&r);
        let second = attendance_insights(&r);
        assert_eq!(first.impact, second.impact);
        assert_eq!(first.correlation, second.correlation);
    }

    #[test]
    fn attendance_insights_pick_the_right_students() {
        let r = roster();
        let insights = attendance_insights(&r);
        assert_eq!(insights.lowest_student, "Bilal");
        assert_eq!(insights.highest_student, "Asha");
        assert_eq!(insights.min, 55.0);
        assert_eq!(insights.max, 92.0);

        let lines = insights.render_lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Average Attendance"));
    }
}
