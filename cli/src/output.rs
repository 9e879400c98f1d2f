use anyhow::Result;
use chrono::{DateTime, Utc};
use feedback_core::{Analytics, Dashboard, Feedback, HealthStatus, Metric, Trend};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Pretty-print any serializable value as JSON to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// Truncate a string to fit within max_width (respecting unicode width).
fn truncate(s: &str, max_width: usize) -> String {
    let s = s.replace(['\n', '\r'], " ");
    if UnicodeWidthStr::width(s.as_str()) <= max_width {
        return s;
    }
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + cw + 3 > max_width {
            result.push_str("...");
            break;
        }
        result.push(ch);
        width += cw;
    }
    result
}

pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn format_timestamp(item: &Feedback) -> String {
    item.created_at_utc()
        .map(|ts| ts.format("%d %b %Y, %I:%M %p UTC").to_string())
        .unwrap_or_else(|| item.created_at.clone())
}

fn trend_arrow(trend: Trend) -> &'static str {
    match trend {
        Trend::Up => "↑",
        Trend::Down => "↓",
        Trend::Stable => "→",
    }
}

pub fn print_feedback_table(items: &[&Feedback], total: usize) {
    if items.is_empty() {
        println!("No reviews matching your filters.");
        return;
    }

    println!("{} of {} review{}:\n", items.len(), total, if total == 1 { "" } else { "s" });
    println!("  {:<6} {:<7} {:<10} {:<48} {:<24}", "ID", "RATING", "SENTIMENT", "REVIEW", "CREATED");
    println!("  {}", "-".repeat(98));
    for item in items {
        println!(
            "  {:<6} {:<7} {:<10} {:<48} {:<24}",
            item.id,
            stars(item.rating),
            item.effective_sentiment().as_str(),
            truncate(&item.review_text, 48),
            format_timestamp(item),
        );
    }
}

pub fn print_feedback_detail(item: &Feedback) {
    println!("#{}  {}  ({})", item.id, stars(item.rating), item.effective_sentiment().as_str());
    println!("{}", format_timestamp(item));
    println!();
    println!("{}", item.review_text);
    if let Some(response) = &item.ai_response {
        println!("\nReply: \"{response}\"");
    }
    if let Some(summary) = &item.ai_summary {
        println!("\nAI summary: {summary}");
    }
    if let Some(keywords) = item.keywords.as_ref().filter(|k| !k.is_empty()) {
        println!("Keywords: {}", keywords.join(", "));
    }
    if let Some(actions) = item.recommended_actions.as_ref().filter(|a| !a.is_empty()) {
        println!("Recommended actions:");
        for action in actions {
            println!("  - {action}");
        }
    }
}

pub fn print_metrics(metrics: &[Metric]) {
    for metric in metrics {
        println!(
            "  {:<18} {:>8}  {} {}",
            metric.title,
            metric.value,
            trend_arrow(metric.trend),
            metric.caption
        );
    }
}

pub fn print_analytics(analytics: &Analytics) {
    let dist = &analytics.sentiment_distribution;
    println!("Sentiment");
    for (label, count) in [("positive", dist.positive), ("neutral", dist.neutral), ("negative", dist.negative)] {
        println!("  {label:<9} {count:>5}  {}", bar(count, dist.total(), 30));
    }

    if !analytics.rating_distribution.is_empty() {
        println!("\nRatings");
        for (rating, count) in analytics.rating_distribution.iter().rev() {
            println!("  {} {count:>5}", stars(*rating));
        }
    }

    println!("\nTop topics");
    if analytics.top_keywords.is_empty() {
        println!("  (none yet)");
    }
    for kw in &analytics.top_keywords {
        println!("  {:<24} {:>4}", truncate(&kw.keyword, 24), kw.count);
    }

    println!(
        "\nRecent trend: {} ({:+.2})",
        trend_arrow(analytics.recent_trend.direction),
        analytics.recent_trend.change
    );
    let peak = analytics.reviews_over_time.iter().map(|d| d.count).max().unwrap_or(0);
    for day in &analytics.reviews_over_time {
        println!("  {:<7} {:>4}  {}", day.date, day.count, bar(day.count, peak, 30));
    }
}

fn bar(value: u64, max: u64, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let filled = ((value as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}

pub fn print_dashboard(dashboard: &Dashboard) {
    let updated = dashboard
        .last_updated()
        .map(|ts: DateTime<Utc>| ts.format("%H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "...".to_string());
    println!("Feedback dashboard  (updated {updated})\n");
    print_metrics(&dashboard.metrics());
    if let Some(analytics) = dashboard.analytics() {
        println!();
        print_analytics(analytics);
    }
    println!("\nRecent reviews");
    print_feedback_table(&dashboard.recent(), dashboard.feedback().len());
}

pub fn print_health(status: HealthStatus, url: &str) {
    println!("{}  ({url})", status.as_str());
}
