//! Progress reporting for roundtable rounds

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use roundtable_application::ports::turn_observer::TurnObserver;
use roundtable_domain::{ParticipantId, SessionId, SessionState, Turn};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Reports progress with one progress bar per running session
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<SessionId, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn round_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn with_bar(&self, session_id: &SessionId, f: impl FnOnce(&ProgressBar)) {
        let bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pb) = bars.get(session_id) {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn state_message(state: SessionState) -> String {
    match state {
        SessionState::Completed => "Round complete!".green().to_string(),
        SessionState::Failed => "Round failed".red().to_string(),
        SessionState::Cancelled => "Round cancelled".yellow().to_string(),
        other => other.to_string(),
    }
}

impl TurnObserver for ProgressReporter {
    fn on_round_start(&self, session_id: &SessionId, order: &[ParticipantId]) {
        let pb = self.multi.add(ProgressBar::new(order.len() as u64));
        pb.set_style(Self::round_style());
        pb.set_prefix(session_id.to_string());
        pb.set_message("Starting...");

        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.clone(), pb);
    }

    fn on_turn_start(
        &self,
        session_id: &SessionId,
        _sequence_number: u64,
        _speaker: &str,
        recipient: &ParticipantId,
    ) {
        self.with_bar(session_id, |pb| {
            pb.set_message(format!("{} is thinking...", recipient));
        });
    }

    fn on_turn_complete(&self, turn: &Turn) {
        self.with_bar(turn.session_id(), |pb| {
            let status = if turn.is_ok() {
                format!("{} {}", "v".green(), turn.recipient_id())
            } else {
                format!("{} {}", "x".red(), turn.recipient_id())
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_round_complete(&self, session_id: &SessionId, state: SessionState) {
        let pb = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
        if let Some(pb) = pb {
            pb.finish_with_message(state_message(state));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl TurnObserver for SimpleProgress {
    fn on_round_start(&self, session_id: &SessionId, order: &[ParticipantId]) {
        let names: Vec<_> = order.iter().map(|id| id.as_str()).collect();
        println!(
            "{} {} ({})",
            "->".cyan(),
            format!("Roundtable {}", session_id).bold(),
            names.join(" -> ")
        );
    }

    fn on_turn_complete(&self, turn: &Turn) {
        match turn.outcome().failure() {
            None => println!("  {} {}", "v".green(), turn.recipient_id()),
            Some(reason) => println!("  {} {} ({})", "x".red(), turn.recipient_id(), reason),
        }
    }

    fn on_round_complete(&self, _session_id: &SessionId, state: SessionState) {
        println!("{}", state_message(state));
        println!();
    }
}
