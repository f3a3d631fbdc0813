use calamine::{open_workbook, Reader, Xlsx};
use std::path::Path;
use thiserror::Error;

/// Identifying columns every gradebook must carry; all remaining columns
/// are treated as subjects.
pub const REQUIRED_COLUMNS: [&str; 3] = ["Roll No", "Name", "Attendance"];

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Gradebook must contain 'Roll No', 'Name' and 'Attendance' columns (missing '{0}')")]
    MissingColumn(String),
    #[error("Gradebook must contain at least one subject column")]
    NoSubjects,
    #[error("Gradebook contains no student rows")]
    Empty,
    #[error("Row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Row {row}: '{value}' in column '{column}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("Failed to read workbook: {0}")]
    Workbook(String),
}

#[derive(Debug, Clone)]
pub struct Student {
    pub roll_no: String,
    pub name: String,
    pub attendance: f64,
    /// Marks in the same order as `Roster::subjects`.
    pub marks: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Roster {
    pub subjects: Vec<String>,
    pub students: Vec<Student>,
}

impl Roster {
    /// Parse CSV text. Validation happens before any downstream
    /// processing: a missing required column rejects the whole file.
    pub fn from_csv(text: &str) -> Result<Self, RosterError> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());

        let header = match lines.next() {
            Some(line) => parse_csv_line(line),
            None => return Err(RosterError::Empty),
        };

        let rows: Vec<Vec<String>> = lines.map(parse_csv_line).collect();
        Self::from_rows(header, rows)
    }

    /// First worksheet of an XLSX workbook, mapped onto the same row model
    /// as the CSV path.
    pub fn from_xlsx<P: AsRef<Path>>(path: P) -> Result<Self, RosterError> {
        let mut workbook: Xlsx<_> =
            open_workbook::<Xlsx<std::io::BufReader<std::fs::File>>, _>(path)
                .map_err(|e| RosterError::Workbook(e.to_string()))?;

        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| RosterError::Workbook("workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet)
            .ok_or_else(|| RosterError::Workbook(format!("worksheet '{}' not found", sheet)))?
            .map_err(|e| RosterError::Workbook(e.to_string()))?;

        let mut rows = range.rows().map(|row| {
            row.iter()
                .map(|cell| format!("{}", cell).trim().to_string())
                .collect::<Vec<String>>()
        });

        let header = rows.next().ok_or(RosterError::Empty)?;
        Self::from_rows(header, rows.collect())
    }

    fn from_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, RosterError> {
        for required in REQUIRED_COLUMNS {
            if !header.iter().any(|h| h == required) {
                return Err(RosterError::MissingColumn(required.to_string()));
            }
        }

        let column_index = |name: &str| header.iter().position(|h| h == name).unwrap();
        let roll_idx = column_index("Roll No");
        let name_idx = column_index("Name");
        let attendance_idx = column_index("Attendance");

        let subject_indices: Vec<usize> = (0..header.len())
            .filter(|&i| i != roll_idx && i != name_idx && i != attendance_idx)
            .collect();
        if subject_indices.is_empty() {
            return Err(RosterError::NoSubjects);
        }
        let subjects: Vec<String> = subject_indices.iter().map(|&i| header[i].clone()).collect();

        let mut students = Vec::new();
        for (row_no, row) in rows.iter().enumerate() {
            let row_no = row_no + 2; // 1-based, counting the header
            if row.len() != header.len() {
                return Err(RosterError::RowWidth {
                    row: row_no,
                    found: row.len(),
                    expected: header.len(),
                });
            }

            let parse_number = |column: &str, value: &str| -> Result<f64, RosterError> {
                value
                    .parse::<f64>()
                    .map_err(|_| RosterError::InvalidNumber {
                        row: row_no,
                        column: column.to_string(),
                        value: value.to_string(),
                    })
            };

            let attendance = parse_number("Attendance", &row[attendance_idx])?;
            let marks = subject_indices
                .iter()
                .map(|&i| parse_number(&header[i], &row[i]))
                .collect::<Result<Vec<f64>, _>>()?;

            students.push(Student {
                roll_no: row[roll_idx].clone(),
                name: row[name_idx].clone(),
                attendance,
                marks,
            });
        }

        if students.is_empty() {
            return Err(RosterError::Empty);
        }

        Ok(Self { subjects, students })
    }

    pub fn student(&self, name: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.name == name)
    }

    /// Whole table serialized for use as LLM context, header first.
    pub fn to_table_string(&self) -> String {
        let mut out = String::new();
        out.push_str("Roll No, Name, Attendance");
        for subject in &self.subjects {
            out.push_str(", ");
            out.push_str(subject);
        }
        out.push('\n');

        for student in &self.students {
            out.push_str(&format!(
                "{}, {}, {}",
                student.roll_no, student.name, student.attendance
            ));
            for mark in &student.marks {
                out.push_str(&format!(", {}", mark));
            }
            out.push('\n');
        }
        out
    }
}

/// Minimal CSV line parser: quoted cells, doubled quotes, commas inside
/// quotes. Cell values are trimmed.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                cells.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Roll No,Name,Attendance,Maths,Science,English
1,Asha,92,78,91,66
2,Bilal,55,42,58,71
3,Chitra,85,95,88,90
";

    #[test]
    fn parses_a_valid_gradebook() {
        let roster = Roster::from_csv(SAMPLE).unwrap();
        assert_eq!(roster.subjects, vec!["Maths", "Science", "English"]);
        assert_eq!(roster.students.len(), 3);

        let bilal = roster.student("Bilal").unwrap();
        assert_eq!(bilal.roll_no, "2");
        assert_eq!(bilal.attendance, 55.0);
        assert_eq!(bilal.marks, vec![42.0, 58.0, 71.0]);
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let csv = "Roll No,Name,Maths\n1,Asha,78\n";
        match Roster::from_csv(csv) {
            Err(RosterError::MissingColumn(col)) => assert_eq!(col, "Attendance"),
            other => panic!("expected MissingColumn, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn no_subject_columns_is_rejected() {
        let csv = "Roll No,Name,Attendance\n1,Asha,92\n";
        assert!(matches!(
            Roster::from_csv(csv),
            Err(RosterError::NoSubjects)
        ));
    }

    #[test]
    fn non_numeric_mark_is_rejected() {
        let csv = "Roll No,Name,Attendance,Maths\n1,Asha,92,absent\n";
        match Roster::from_csv(csv) {
            Err(RosterError::InvalidNumber { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "Maths");
                assert_eq!(value, "absent");
            }
            other => panic!("expected InvalidNumber, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn ragged_row_is_rejected() {
        let csv = "Roll No,Name,Attendance,Maths\n1,Asha,92\n";
        assert!(matches!(
            Roster::from_csv(csv),
            Err(RosterError::RowWidth { row: 2, .. })
        ));
    }

    #[test]
    fn empty_file_is_rejected() {
        assert!(matches!(Roster::from_csv(""), Err(RosterError::Empty)));
        let header_only = "Roll No,Name,Attendance,Maths\n";
        assert!(matches!(
            Roster::from_csv(header_only),
            Err(RosterError::Empty)
        ));
    }

    #[test]
    fn quoted_cells_keep_commas() {
        let csv = "Roll No,Name,Attendance,Maths\n1,\"Rao, Asha\",92,78\n";
        let roster = Roster::from_csv(csv).unwrap();
        assert_eq!(roster.students[0].name, "Rao, Asha");
    }

    #[test]
    fn table_string_covers_every_student() {
        let roster = Roster::from_csv(SAMPLE).unwrap();
        let table = roster.to_table_string();
        for student in &roster.students {
            assert!(table.contains(&student.name));
        }
        assert!(table.starts_with("Roll No, Name, Attendance"));
    }
}
