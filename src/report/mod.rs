pub mod chart;
pub mod docx;

pub use chart::bar_chart_png;
pub use docx::DocxBuilder;
