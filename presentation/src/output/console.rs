//! Console output formatter for roundtable transcripts

use crate::output::formatter::TranscriptFormatter;
use colored::Colorize;
use roundtable_domain::{PersonaRegistry, Session, SessionState, Turn};

/// Formats transcripts for console display
pub struct ConsoleFormatter {
    personas: PersonaRegistry,
}

impl ConsoleFormatter {
    pub fn new(personas: PersonaRegistry) -> Self {
        Self { personas }
    }

    /// Format the panel for `--list-personas`
    pub fn format_personas(personas: &PersonaRegistry) -> String {
        let mut output = Self::section_header("Participants");
        for participant in personas.list_participants() {
            output.push_str(&format!(
                "\n{:<10} {} ({})\n{}\n",
                participant.id().as_str().yellow().bold(),
                participant.display_name(),
                participant.personality(),
                Self::indent(participant.description(), "           "),
            ));
        }
        output
    }

    fn label(&self, id: &str) -> String {
        match self.personas.get(id) {
            Some(p) => format!("{} ({})", p.id(), p.display_name()),
            None => id.to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    fn state_line(session: &Session) -> String {
        let state = session.state().as_str();
        let styled = match session.state() {
            SessionState::Completed => state.green().bold(),
            SessionState::Failed => state.red().bold(),
            SessionState::Cancelled => state.yellow().bold(),
            SessionState::Created | SessionState::Running => state.normal(),
        };
        match session.failure() {
            Some(reason) => format!("{} {} ({})", "State:".cyan().bold(), styled, reason),
            None => format!("{} {}", "State:".cyan().bold(), styled),
        }
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl TranscriptFormatter for ConsoleFormatter {
    fn format(&self, session: &Session, turns: &[Turn]) -> String {
        let mut output = Self::header("Roundtable");
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Session:".cyan().bold(),
            session.id()
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Kickoff:".cyan().bold(),
            session.kickoff().text()
        ));
        let order: Vec<_> = session
            .participant_order()
            .iter()
            .map(|id| id.as_str())
            .collect();
        output.push_str(&format!(
            "{} {}\n",
            "Order:".cyan().bold(),
            order.join(" -> ")
        ));

        output.push_str(&Self::section_header("Discussion"));
        if turns.is_empty() {
            output.push_str(&format!("\n{}\n", "(no turns)".dimmed()));
        }
        for turn in turns {
            let title = format!(
                "── {}. {} ──",
                turn.sequence_number() + 1,
                self.label(turn.recipient_id().as_str())
            );
            match turn.outcome().failure() {
                None => output.push_str(&format!(
                    "\n{}\n{}\n",
                    title.yellow().bold(),
                    turn.output_text()
                )),
                Some(reason) => output.push_str(&format!(
                    "\n{}\nError: {}\n",
                    title.red().bold(),
                    reason
                )),
            }
        }

        output.push('\n');
        output.push_str(&Self::state_line(session));
        output.push('\n');
        output.push_str(&Self::footer());
        output
    }
}
