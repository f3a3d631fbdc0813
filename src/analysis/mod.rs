pub mod advisor;
pub mod roster;
pub mod stats;

pub use advisor::{Advisor, NO_SUGGESTIONS};
pub use roster::{Roster, RosterError, Student};
pub use stats::{
    attendance_insights, classify_subjects, student_average, subject_means, AttendanceInsights,
    GradeBand, ImpactBand, WEAK_THRESHOLD,
};
