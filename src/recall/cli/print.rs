use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use recall::api::{CmdMessage, MessageLevel, Pagination, ReviewReceipt};
use recall::commands::StudyStats;
use recall::config::RecallConfig;
use recall::index::{DisplayIndex, DisplayItem};
use recall::model::{Subject, UserProfile};
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const STAGE_WIDTH: usize = 9;
const DATE_WIDTH: usize = 12;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_full_items(items: &[DisplayItem]) {
    for (i, di) in items.iter().enumerate() {
        if i > 0 {
            println!("\n================================\n");
        }
        let meta = &di.item.metadata;
        println!("{} {}", di.index.to_string().yellow(), meta.title.bold());
        let mut details = vec![
            format!("stage {}", meta.stage()),
            format!("reviews {}", meta.review_count),
            format!("next {}", format_date(meta.next_review_date)),
        ];
        if let Some(subject) = &meta.subject {
            details.push(format!("subject {}", subject.name));
        }
        if !meta.tags.is_empty() {
            details.push(format!("tags {}", meta.tags.join(", ")));
        }
        println!("{}", details.join("  ").dimmed());
        println!("--------------------------------");
        println!("{}", di.item.content);
    }
}

pub(super) fn print_items(items: &[DisplayItem], empty_message: &str) {
    if items.is_empty() {
        println!("{}", empty_message);
        return;
    }

    for di in items {
        let idx_str = format!("{}. ", di.index);
        let meta = &di.item.metadata;

        let stage = format!("{:<width$}", meta.stage().to_string(), width = STAGE_WIDTH);
        let next = format!(
            "{:<width$}",
            format_date(meta.next_review_date),
            width = DATE_WIDTH
        );
        let time_ago = format_time_ago(meta.created_at);

        let left_prefix = "    ";
        let fixed_width =
            left_prefix.width() + idx_str.width() + STAGE_WIDTH + DATE_WIDTH + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);

        let title_display = truncate_to_width(&meta.title, available);
        let padding = available.saturating_sub(title_display.width());

        let idx_colored = match di.index {
            DisplayIndex::Archived(_) => idx_str.red(),
            DisplayIndex::Active(_) => idx_str.normal(),
        };

        println!(
            "{}{}{}{}{}{}{}",
            left_prefix,
            idx_colored,
            title_display,
            " ".repeat(padding),
            stage.cyan(),
            next,
            time_ago.dimmed()
        );
    }
}

pub(super) fn print_pagination(pagination: &Pagination) {
    println!(
        "{}",
        format!(
            "page {} of {} ({} items, {} per page)",
            pagination.page, pagination.pages, pagination.total, pagination.limit
        )
        .dimmed()
    );
}

pub(super) fn print_receipts(receipts: &[ReviewReceipt]) {
    for receipt in receipts {
        let days = receipt.schedule.interval_days;
        let unit = if days == 1 { "day" } else { "days" };
        println!(
            "{} {} {} review #{}, next in {} {} ({})",
            "✓".green(),
            receipt.title.bold(),
            format!("[{}]", receipt.outcome).cyan(),
            receipt.schedule.review_count,
            days,
            unit,
            format_date(receipt.schedule.next_review_date)
        );
    }
}

pub(super) fn print_stats(stats: &StudyStats) {
    println!("{}", "Items".bold());
    println!("  active    {}", stats.active);
    println!("  archived  {}", stats.archived);
    println!("  reviews   {}", stats.total_reviews);
    println!("  due today {}", stats.due_today.to_string().yellow());
    println!("  overdue   {}", stats.overdue.to_string().red());

    println!("\n{}", "By stage".bold());
    for (stage, count) in &stats.by_stage {
        println!("  {:<10}{}", stage.to_string(), count);
    }

    println!("\n{}", "Last outcome".bold());
    for (outcome, count) in &stats.by_difficulty {
        let label = outcome
            .map(|o| o.to_string())
            .unwrap_or_else(|| "new".to_string());
        println!("  {:<10}{}", label, count);
    }

    if !stats.by_subject.is_empty() {
        println!("\n{}", "By subject".bold());
        for (subject, count) in &stats.by_subject {
            println!("  {}  {}", truncate_to_width(subject, 30), count);
        }
    }

    println!("\n{}", "Upcoming".bold());
    for (day, count) in &stats.upcoming {
        let bar = "▪".repeat((*count).min(40));
        println!("  {}  {:>3} {}", day.format("%a %m-%d"), count, bar.cyan());
    }
}

pub(super) fn print_subjects(subjects: &[Subject]) {
    for subject in subjects {
        println!(
            "  {:<20} {:<24} {}",
            subject.id,
            truncate_to_width(&subject.name, 24),
            subject.color.dimmed()
        );
    }
}

pub(super) fn print_config(config: &RecallConfig, profile: Option<&UserProfile>) {
    for (key, value) in config.list_all() {
        println!("{} = {}", key, value);
    }
    if let Some(profile) = profile {
        let flow = profile.flow();
        let marker = if profile.repetition_flow.is_some() {
            ""
        } else {
            " (default)"
        };
        println!("repetition-flow = {}{}", flow, marker.dimmed());
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate_to_width("Closures", 20), "Closures");
    }

    #[test]
    fn long_strings_get_an_ellipsis() {
        let out = truncate_to_width("Ownership and borrowing", 10);
        assert!(out.ends_with('…'));
        assert!(out.width() <= 10);
    }

    #[test]
    fn wide_characters_count_double() {
        let out = truncate_to_width("日本語の単語", 6);
        assert!(out.width() <= 6);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn time_ago_is_right_aligned() {
        let out = format_time_ago(Utc::now() - Duration::hours(3));
        assert_eq!(out.len(), TIME_WIDTH.max(out.trim().len()));
        assert!(out.trim_start().starts_with('3'));
    }
}
