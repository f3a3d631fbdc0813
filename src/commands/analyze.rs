use crate::analysis::stats::{self, AttendanceWarning, GradeBand};
use crate::analysis::{attendance_insights, classify_subjects, student_average, subject_means, Advisor, Roster};
use crate::report::chart::{bar_chart_png, CHART_HEIGHT, CHART_WIDTH};
use crate::report::DocxBuilder;
use crate::storage::Database;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;

pub async fn handle_command(
    input: &str,
    advisor: &Advisor,
    db: &Arc<Database>,
    reports_dir: &Path,
) -> Result<(), String> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.len() < 3 {
        println!("🧑‍🏫 Gradebook Commands:");
        println!("  analyze class <file>            - Class-wide performance analysis");
        println!("  analyze student <file> <name>   - One student's performance");
        println!("  analyze attendance <file>       - Attendance insights");
        println!("  analyze ask <file> <question>   - Ask a question about the data");
        println!("  analyze report <file> [name]    - Export insights as a docx report");
        return Ok(());
    }

    let command = parts[1];
    let file_path = parts[2];
    let roster = load_roster(file_path)?;

    match command {
        "class" => class_analysis(&roster, file_path, advisor, db).await,
        "student" => {
            let name = parts[3..].join(" ");
            if name.is_empty() {
                return Err("Missing student name".to_string());
            }
            student_analysis(&roster, &name, file_path, advisor, db).await
        }
        "attendance" => {
            println!("\n📊 Attendance Insights:");
            for line in attendance_insights(&roster).render_lines() {
                println!("- {}", line);
            }
            Ok(())
        }
        "ask" => {
            let question = parts[3..].join(" ");
            if question.is_empty() {
                return Err("Missing question".to_string());
            }
            let answer = advisor
                .ask(&roster, &question)
                .await
                .map_err(|e| format!("Failed to answer question: {}", e))?;
            println!("\n💬 {}", answer.bright_green());
            Ok(())
        }
        "report" => {
            let student = parts[3..].join(" ");
            if student.is_empty() {
                class_report(&roster, advisor, reports_dir).await
            } else {
                student_report(&roster, &student, advisor, reports_dir).await
            }
        }
        _ => Err(format!("Unknown analyze command: {}", command)),
    }
}

/// Gradebooks arrive as CSV or XLSX; anything else is rejected before any
/// processing happens.
fn load_roster(path: &str) -> Result<Roster, String> {
    let extension = Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path, e))?;
            Roster::from_csv(&text).map_err(|e| e.to_string())
        }
        "xlsx" => Roster::from_xlsx(path).map_err(|e| e.to_string()),
        other => Err(format!(
            "Unsupported gradebook format '{}' (expected csv or xlsx)",
            other
        )),
    }
}

async fn class_analysis(
    roster: &Roster,
    source: &str,
    advisor: &Advisor,
    db: &Arc<Database>,
) -> Result<(), String> {
    let means = subject_means(roster);
    let (weak, strong) = classify_subjects(&means);

    println!("\n📚 Subjects where students are performing well:");
    for (subject, avg) in &strong {
        println!("- {}: {:.2}/100", subject, avg);
    }

    println!("\n📉 Subjects where students are struggling:");
    for (subject, avg) in &weak {
        println!("- {}: {:.2}/100", subject, avg);
    }

    let all_marks: Vec<f64> = roster.students.iter().flat_map(|s| s.marks.clone()).collect();
    let class_avg = stats::mean(&all_marks);
    let highest = all_marks.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let lowest = all_marks.iter().cloned().fold(f64::INFINITY, f64::min);
    println!(
        "\n📊 Class average: {:.2} | Highest mark: {} | Lowest mark: {}",
        class_avg, highest, lowest
    );

    for (subject, _) in &weak {
        println!(
            "\n💡 Suggestions to improve performance in {}:",
            subject.bright_yellow()
        );
        let suggestions = advisor.subject_suggestions(subject).await;
        println!("{}", suggestions.bright_green());
    }

    println!("\n📋 Overall Class Improvement Plan:");
    let class_suggestions = advisor.class_suggestions(&means).await;
    println!("{}", class_suggestions.bright_green());

    if let Err(e) = db
        .save_insight(source.to_string(), "class".to_string(), class_suggestions)
        .await
    {
        eprintln!("Warning: Failed to save insight to database: {}", e);
    }

    Ok(())
}

async fn student_analysis(
    roster: &Roster,
    name: &str,
    source: &str,
    advisor: &Advisor,
    db: &Arc<Database>,
) -> Result<(), String> {
    let student = roster
        .student(name)
        .ok_or_else(|| format!("No student named '{}' in the gradebook", name))?;

    println!("\n🎓 {}'s Performance", student.name.bright_yellow());
    println!("Average Score: {:.2}/100", student_average(student));
    println!("Attendance: {}%", student.attendance);

    println!("\nSubject-wise Status:");
    for (subject, mark) in roster.subjects.iter().zip(student.marks.iter()) {
        println!(
            "  {}: {} ({}/100)",
            subject,
            GradeBand::for_mark(*mark).label(),
            mark
        );
    }

    if let Some(warning) = AttendanceWarning::for_attendance(student.attendance) {
        match warning {
            AttendanceWarning::Critical => println!("\n🚨 {}", warning.message().bright_red()),
            AttendanceWarning::Low => println!("\n⚠️ {}", warning.message().yellow()),
        }
    }

    println!("\n💡 Personalized Suggestions:");
    let suggestions = advisor.student_suggestions(student, &roster.subjects).await;
    println!("{}", suggestions.bright_green());

    if let Err(e) = db
        .save_insight(source.to_string(), "student".to_string(), suggestions)
        .await
    {
        eprintln!("Warning: Failed to save insight to database: {}", e);
    }

    Ok(())
}

async fn class_report(
    roster: &Roster,
    advisor: &Advisor,
    reports_dir: &Path,
) -> Result<(), String> {
    let means = subject_means(roster);
    let (weak, strong) = classify_subjects(&means);
    let class_suggestions = advisor.class_suggestions(&means).await;

    let mut builder = DocxBuilder::new();
    builder.heading(1, "Class-wide Performance Insights");
    builder.heading(2, "Subjects Analysis");

    builder.heading(3, "Subjects where students are performing well:");
    for (subject, avg) in &strong {
        builder.paragraph(&format!("- {}: {:.2}/100", subject, avg));
    }

    builder.heading(3, "Subjects where students are struggling:");
    for (subject, avg) in &weak {
        builder.paragraph(&format!("- {}: {:.2}/100", subject, avg));
    }

    builder.heading(2, "Overall Class Improvement Plan");
    for line in class_suggestions.lines().filter(|l| !l.trim().is_empty()) {
        builder.paragraph(line.trim());
    }

    let chart = bar_chart_png(&means, CHART_WIDTH, CHART_HEIGHT)
        .map_err(|e| format!("Failed to render chart: {}", e))?;
    builder.image(chart);

    write_report(&builder, reports_dir, "class_insights.docx")
}

async fn student_report(
    roster: &Roster,
    name: &str,
    advisor: &Advisor,
    reports_dir: &Path,
) -> Result<(), String> {
    let student = roster
        .student(name)
        .ok_or_else(|| format!("No student named '{}' in the gradebook", name))?;

    let suggestions = advisor.student_suggestions(student, &roster.subjects).await;

    let mut builder = DocxBuilder::new();
    builder.heading(1, &format!("{}'s Performance Insights", student.name));
    builder.paragraph(&format!("Average Score: {:.2}/100", student_average(student)));
    builder.paragraph(&format!("Attendance: {}%", student.attendance));
    for line in suggestions.lines().filter(|l| !l.trim().is_empty()) {
        builder.paragraph(line.trim());
    }

    let marks: Vec<(String, f64)> = roster
        .subjects
        .iter()
        .cloned()
        .zip(student.marks.iter().cloned())
        .collect();
    let chart = bar_chart_png(&marks, CHART_WIDTH, CHART_HEIGHT)
        .map_err(|e| format!("Failed to render chart: {}", e))?;
    builder.image(chart);

    let file_name = format!("{}_insights.docx", sanitize_filename(&student.name));
    write_report(&builder, reports_dir, &file_name)
}

fn write_report(builder: &DocxBuilder, reports_dir: &Path, file_name: &str) -> Result<(), String> {
    let bytes = builder
        .build()
        .map_err(|e| format!("Failed to build report: {}", e))?;

    std::fs::create_dir_all(reports_dir)
        .map_err(|e| format!("Failed to create {}: {}", reports_dir.display(), e))?;
    let path = reports_dir.join(file_name);
    std::fs::write(&path, bytes).map_err(|e| format!("Failed to write report: {}", e))?;

    println!("📥 Report saved to {}", path.display().to_string().cyan());
    Ok(())
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("Rao, Asha"), "Rao__Asha");
        assert_eq!(sanitize_filename("Bilal"), "Bilal");
    }

    #[test]
    fn unsupported_gradebook_format_is_rejected() {
        let err = load_roster("grades.pdf").unwrap_err();
        assert!(err.contains("Unsupported gradebook format"));
    }
}
