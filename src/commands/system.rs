use colored::Colorize;

pub fn handle_command(input: &str) -> Result<(), String> {
    match input.to_lowercase().as_str() {
        "help" => {
            println!("\n{}", "🧑‍🏫 Gradebook Commands:".bold());
            println!("  analyze class <file>            - Class-wide performance analysis");
            println!("  analyze student <file> <name>   - One student's performance");
            println!("  analyze attendance <file>       - Attendance insights");
            println!("  analyze ask <file> <question>   - Ask a question about the data");
            println!("  analyze report <file> [name]    - Export insights as a docx report");
            println!("  Accepted gradebook formats: .csv, .xlsx");
            println!();

            println!("{}", "📝 Quiz Commands:".bold());
            println!("  quiz <difficulty> <count> <topic> - Generate a multiple-choice quiz");
            println!("  Difficulties: beginner, intermediate, expert");
            println!();

            println!("{}", "📋 Lesson Plan Commands:".bold());
            println!("  plan <hours> <sessions> <unit details> - Generate a lesson plan");
            println!();

            println!("{}", "📄 Lesson Summary Commands:".bold());
            println!("  summarize <pdf>  - Summarize a lesson into bullet points");
            println!();

            println!("{}", "💡 Counsellor Commands:".bold());
            println!("  Just type your message to talk to the wellness counsellor");
            println!("  corpus <pdf>     - Add a document to the counselling knowledge base");
            println!();

            println!("{}", "⚙️ System Commands:".bold());
            println!("  help  - Show this help menu");
            println!("  exit  - Exit the program");
            Ok(())
        }
        "exit" | "quit" => {
            println!("👋 Goodbye!");
            std::process::exit(0);
        }
        _ => Err("Unknown system command. Type 'help' for available commands.".to_string()),
    }
}
