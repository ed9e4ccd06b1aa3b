use chrono::NaiveDate;
use tracker_core::{
    Action, AppViewModel, ChatEntry, ChatRole, DetailView, ExtractedData, ItemRowView, Notice,
    NoticeLevel, StepView,
};

pub fn dashboard(view: &AppViewModel, today: NaiveDate) -> String {
    let stats = view.stats;
    let mut lines = vec![
        "Command Center".to_string(),
        format!(
            "Total: {} | New: {} | Processing: {} | Ready: {}",
            stats.total, stats.new, stats.processing, stats.ready
        ),
        String::new(),
        "Recent RFPs".to_string(),
    ];
    if view.recent.is_empty() {
        lines.push("  No RFPs found. Run `tracker scan`.".to_string());
    }
    for row in &view.recent {
        lines.push(format!("  {} #{} {}", status_chip(&row.status), row.id, row.title));
        lines.push(format!("      {}", client_and_deadline(row, today)));
    }
    lines.join("\n")
}

pub fn item_list(view: &AppViewModel, today: NaiveDate) -> String {
    if view.items.is_empty() {
        return "No RFPs found. Run `tracker scan`.".to_string();
    }
    let mut lines = vec![format!(
        "{:<6} {:<20} {:<18} {:<40} STATUS",
        "ID", "CLIENT", "DEADLINE", "TITLE"
    )];
    for row in &view.items {
        let deadline = match deadline_hint(&row.deadline, today) {
            Some(hint) => format!("{} ({hint})", row.deadline),
            None => row.deadline.clone(),
        };
        lines.push(format!(
            "{:<6} {:<20} {:<18} {:<40} {}",
            format!("#{}", row.id),
            truncate(&row.client_name, 20),
            truncate(&deadline, 18),
            truncate(&row.title, 40),
            status_chip(&row.status)
        ));
    }
    lines.join("\n")
}

pub fn detail(view: &DetailView, today: NaiveDate) -> String {
    if !view.loaded {
        return if view.not_found {
            format!("RFP #{} not found.", view.id)
        } else {
            format!("Loading RFP #{}...", view.id)
        };
    }

    let mut header = format!("RFP #{}  {}", view.id, status_chip(&view.status));
    if view.polling {
        header.push_str("  * live agent sync active");
    }
    let mut lines = vec![header, view.title.clone()];
    let mut meta = view.client_name.clone();
    if !view.deadline.is_empty() {
        meta.push_str(&format!(" | deadline {}", view.deadline));
        if let Some(hint) = deadline_hint(&view.deadline, today) {
            meta.push_str(&format!(" ({hint})"));
        }
    }
    lines.push(meta);
    if let Some(source) = &view.source_file {
        lines.push(format!("Source: {source}"));
    }
    if view.not_found {
        lines.push("(no longer listed by the backend; showing last known data)".to_string());
    }

    lines.push(String::new());
    lines.push("Pipeline".to_string());
    lines.extend(view.steps.iter().map(step_line));

    lines.push(String::new());
    lines.extend(extracted_sections(&view.data));

    lines.push(String::new());
    lines.push(actions_line(view));
    lines.join("\n")
}

/// One-line summary printed on every change while following an item.
pub fn progress(view: &DetailView) -> String {
    let done: Vec<&str> = view
        .steps
        .iter()
        .filter(|step| step.completed)
        .map(|step| step.label)
        .collect();
    let done = if done.is_empty() {
        "none".to_string()
    } else {
        done.join(", ")
    };
    format!(
        "RFP #{} {} (stage {}/3, done: {done})",
        view.id,
        status_chip(&view.status),
        view.stage.index()
    )
}

pub fn chat(entries: &[ChatEntry]) -> String {
    entries
        .iter()
        .map(|entry| match entry.role {
            ChatRole::User => format!("you> {}", entry.text),
            ChatRole::Assistant => format!("agent> {}", entry.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => notice.text.clone(),
        NoticeLevel::Failure => format!("error: {}", notice.text),
    }
}

fn status_chip(status: &str) -> String {
    if status.is_empty() {
        "[Unknown]".to_string()
    } else {
        format!("[{status}]")
    }
}

fn client_and_deadline(row: &ItemRowView, today: NaiveDate) -> String {
    match deadline_hint(&row.deadline, today) {
        Some(hint) => format!("{} | {} ({hint})", row.client_name, row.deadline),
        None if row.deadline.is_empty() => row.client_name.clone(),
        None => format!("{} | {}", row.client_name, row.deadline),
    }
}

fn step_line(step: &StepView) -> String {
    let state = if step.completed {
        "completed"
    } else if step.processing {
        "processing..."
    } else {
        "pending"
    };
    format!("  Step {:02} {:<20} {state}", step.number, step.label)
}

fn extracted_sections(data: &ExtractedData) -> Vec<String> {
    let mut lines = vec!["Requirements".to_string()];
    match data.requirements() {
        Some(requirements) if !requirements.is_empty() => {
            for (key, value) in requirements {
                lines.push(format!("  {}: {value}", key.replace('_', " ")));
            }
        }
        _ => lines.push("  Waiting for technical analysis...".to_string()),
    }

    lines.push(String::new());
    lines.push("Product match".to_string());
    match data.product_match() {
        Some(found) => {
            let score = found
                .match_score
                .map(|score| format!(" (confidence {score}%)"))
                .unwrap_or_default();
            lines.push(format!("  Match found: product {}{score}", found.product_id));
            if let Some(reason) = &found.reason {
                lines.push(format!("  Reasoning: {reason}"));
            }
        }
        None => lines.push("  Technical agent waiting...".to_string()),
    }

    lines.push(String::new());
    lines.push("Pricing".to_string());
    match data.pricing() {
        Some(quote) => {
            let unit = quote
                .unit
                .as_deref()
                .map(|unit| format!(" per {unit}"))
                .unwrap_or_default();
            lines.push(format!(
                "  Final unit price: {} {}{unit}",
                quote.currency,
                format_amount(quote.final_unit_price)
            ));
            let product = match &quote.product_name {
                Some(name) => format!("{} {name}", quote.sku),
                None => quote.sku.clone(),
            };
            let components = &quote.components;
            for (label, amount) in [
                (format!("Base price ({product})"), components.base_price),
                ("Logistics (5%)".to_string(), components.logistics),
                ("Margin (20%)".to_string(), components.margin),
                ("GST (18%)".to_string(), components.gst),
            ] {
                let amount = amount.map(format_amount).unwrap_or_else(|| "N/A".to_string());
                lines.push(format!("    {label:<32} {amount:>14}"));
            }
        }
        None => lines.push("  Pricing agent waiting...".to_string()),
    }
    lines
}

fn actions_line(view: &DetailView) -> String {
    if let Some(busy) = view.busy {
        return format!("Running: {}...", busy.label());
    }
    if view.polling {
        return "Agents running... manual actions are disabled.".to_string();
    }
    let mut offered: Vec<String> = view
        .permitted_actions
        .iter()
        .map(|action| match action {
            Action::Download => format!("download (tracker download {})", view.id),
            other => format!("{} (tracker run {} {})", other.label(), view.id, other.label()),
        })
        .collect();
    if view.can_start_automated_run {
        offered.push(format!("autopilot (tracker autopilot {})", view.id));
    }
    format!("Next: {}", offered.join(" | "))
}

fn deadline_hint(deadline: &str, today: NaiveDate) -> Option<String> {
    let due = NaiveDate::parse_from_str(deadline.trim(), "%Y-%m-%d").ok()?;
    let days = (due - today).num_days();
    Some(match days {
        0 => "due today".to_string(),
        1 => "due tomorrow".to_string(),
        d if d > 1 => format!("due in {d} days"),
        d => format!("overdue by {} days", -d),
    })
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn format_amount(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    format!("{sign}{}.{:02}", format_with_commas(cents / 100), cents % 100)
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
