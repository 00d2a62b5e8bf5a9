//! Console rendering for conversations, timelines, and deliberation traces

use colored::Colorize;
use council_application::{Notice, NoticeLevel};
use council_domain::{
    Conversation, DeliberationRecord, Message, NavigationState, Role, Stage, Step, SyncState,
    truncate_str,
};

/// Formats session state for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the conversation list with 1-based selection indices
    pub fn format_conversation_list(
        conversations: &[Conversation],
        active_id: Option<&str>,
        sync_of: impl Fn(&str) -> Option<SyncState>,
    ) -> String {
        if conversations.is_empty() {
            return format!("{}\n", "No conversations yet. /new starts one.".dimmed());
        }

        let mut output = String::new();
        output.push_str(&Self::section_header("Conversations"));
        for (i, conv) in conversations.iter().enumerate() {
            let marker = if active_id == Some(conv.id.as_str()) {
                "*".green().bold().to_string()
            } else {
                " ".to_string()
            };
            let sync_tag = match sync_of(&conv.id) {
                Some(SyncState::Failed) => format!(" {}", "[not synced]".red()),
                Some(SyncState::Pending) => format!(" {}", "[syncing]".yellow()),
                _ => String::new(),
            };
            output.push_str(&format!(
                "{} {:>3}. {} {}{}\n",
                marker,
                i + 1,
                truncate_str(&conv.title, 48).bold(),
                format!("({} messages)", conv.message_count).dimmed(),
                sync_tag,
            ));
        }
        output
    }

    /// Format the active timeline with 1-based message indices
    pub fn format_timeline(timeline: &[Message]) -> String {
        if timeline.is_empty() {
            return format!("{}\n", "No messages in this conversation.".dimmed());
        }

        let mut output = String::new();
        for (i, message) in timeline.iter().enumerate() {
            output.push_str(&Self::format_message(i + 1, message));
            output.push('\n');
        }
        output
    }

    /// Format a single timeline entry
    pub fn format_message(index: usize, message: &Message) -> String {
        let role = match message.role {
            Role::User => "You".cyan().bold(),
            Role::Assistant => "Council".yellow().bold(),
            Role::System => "System".dimmed().bold(),
        };

        let mut tags = String::new();
        if message.sync == SyncState::Failed {
            tags.push_str(&format!(" {}", "[failed]".red()));
        } else if message.sync == SyncState::Pending {
            tags.push_str(&format!(" {}", "[sending]".yellow()));
        }
        if let Some(attachment) = &message.attachment {
            tags.push_str(&format!(" {}", format!("[{}]", attachment.name).blue()));
        }
        if message.has_deliberation() {
            tags.push_str(&format!(" {}", format!("[/trace {index}]").dimmed()));
        }

        format!(
            "{:>3}. {}{}\n{}\n",
            index,
            role,
            tags,
            Self::indent(&message.content, "     "),
        )
    }

    /// Format the open deliberation trace at the current step and stage
    pub fn format_trace(record: &DeliberationRecord, navigation: &NavigationState) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header("Deliberation"));

        // Step tabs, current one highlighted
        if record.step_count() > 1 {
            let tabs: Vec<String> = record
                .steps()
                .iter()
                .enumerate()
                .map(|(i, step)| {
                    let label = format!("[{}] {}", i + 1, step.title);
                    if i == navigation.step_index() {
                        label.green().bold().to_string()
                    } else {
                        label.dimmed().to_string()
                    }
                })
                .collect();
            output.push_str(&format!("Steps: {}\n", tabs.join("  ")));
        }

        let Some(step) = record.step(navigation.step_index()) else {
            output.push_str(&format!("{}\n", "No step data.".dimmed()));
            return output;
        };

        let stage = navigation.stage();
        output.push_str(&format!(
            "{} {} {}\n\n",
            step.title.bold(),
            "/".dimmed(),
            format!("Stage {}: {}", stage.number(), stage.display_name())
                .cyan()
                .bold(),
        ));
        output.push_str(&Self::format_stage(step, stage));
        output
    }

    /// Format one stage of one step; absent data renders as a placeholder
    pub fn format_stage(step: &Step, stage: Stage) -> String {
        let mut output = String::new();
        match stage {
            Stage::Responses => {
                if step.stage1.is_empty() {
                    return Self::no_stage_data();
                }
                for response in &step.stage1 {
                    output.push_str(&format!(
                        "{}\n{}\n\n",
                        format!("── {} ──", response.model).yellow().bold(),
                        response.text,
                    ));
                }
            }
            Stage::Rankings => {
                if step.stage2.is_empty() {
                    return Self::no_stage_data();
                }
                for ranking in &step.stage2 {
                    output.push_str(&format!(
                        "{}\n{}\n\n",
                        format!("── {} ──", ranking.model).yellow().bold(),
                        ranking.ranking_text,
                    ));
                }
            }
            Stage::Synthesis => match &step.stage3 {
                Some(synthesis) => {
                    output.push_str(&format!(
                        "{}\n\n{}\n",
                        format!("Chairman: {}", synthesis.model).yellow().bold(),
                        synthesis.text,
                    ));
                }
                None => return Self::no_stage_data(),
            },
        }
        output
    }

    /// Render a transient notice with its severity color
    pub fn format_notice(notice: &Notice) -> String {
        match notice.level {
            NoticeLevel::Info => format!("{} {}", "i".blue().bold(), notice.text),
            NoticeLevel::Warning => format!("{} {}", "!".yellow().bold(), notice.text),
            NoticeLevel::Error => format!("{} {}", "x".red().bold(), notice.text),
        }
    }

    fn no_stage_data() -> String {
        format!("{}\n", "No data for this stage.".dimmed())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
