use anyhow::Result;
use console::style;

use simscore_core::config::Config;
use simscore_core::models::{AnalyticsOptions, Difficulty, Guidance};
use simscore_core::services::AnalyticsService;

use super::{open_database, print_json};

async fn analytics_service() -> Result<AnalyticsService> {
    let config = Config::load()?;
    let db_manager = open_database().await?;
    Ok(AnalyticsService::new(db_manager, config.analytics_config()))
}

fn format_score(score: Option<f64>) -> String {
    score
        .map(|s| format!("{s:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

pub async fn handle_trends_command(
    user_id: String,
    since_days: Option<u32>,
    specialty: Option<String>,
    difficulty: Option<Difficulty>,
    json: bool,
) -> Result<()> {
    let options = AnalyticsOptions {
        since_days,
        specialty,
        difficulty,
    };

    let service = analytics_service().await?;
    let trends = service.performance_trends(&user_id, &options).await?;

    if json {
        return print_json(&trends);
    }

    println!(
        "{} {}",
        style("Performance trends for").bold(),
        style(&user_id).cyan()
    );
    println!(
        "  Sessions: {} ({} scored)",
        trends.total_sessions, trends.scored_sessions
    );
    println!("  Average score:   {}", format_score(trends.average_score));
    println!("  Improvement:     {:+.2}", trends.overall_improvement);
    println!("  Consistency:     {:.2}", trends.consistency_score);
    println!("  Trend:           {}", trends.trend);

    if !trends.weekly.is_empty() {
        println!();
        println!("{}", style("Weekly").bold());
        for week in &trends.weekly {
            println!(
                "  {}  {:>3} cases  {:>6.2}",
                week.label, week.case_count, week.average_score
            );
        }
    }

    for (title, buckets) in [
        ("By specialty", &trends.by_specialty),
        ("By difficulty", &trends.by_difficulty),
    ] {
        if buckets.is_empty() {
            continue;
        }
        println!();
        println!("{}", style(title).bold());
        for bucket in buckets {
            println!(
                "  {:<24} {:>3} cases  {:>6.2}",
                bucket.key, bucket.case_count, bucket.average_score
            );
        }
    }

    if !trends.weak_areas.is_empty() {
        println!();
        println!("{}", style("Weak areas").bold().yellow());
        for area in &trends.weak_areas {
            println!(
                "  {:<36} {:.2} / 5 ({} sessions)",
                area.label, area.average_points, area.rated_sessions
            );
        }
    }

    Ok(())
}

pub async fn handle_compare_command(
    user_id: String,
    specialty: Option<String>,
    json: bool,
) -> Result<()> {
    let service = analytics_service().await?;
    let comparison = service
        .compare_with_peers(&user_id, specialty.as_deref())
        .await?;

    if json {
        return print_json(&comparison);
    }

    let Some(comparison) = comparison else {
        println!(
            "{}",
            style(format!(
                "No scored sessions for '{user_id}' in the last {} days.",
                service.config().peer_window_days
            ))
            .dim()
        );
        return Ok(());
    };

    println!(
        "{} {}",
        style("Peer comparison for").bold(),
        style(&user_id).cyan()
    );
    println!("  Your average:   {:.2}", comparison.user_average);
    println!(
        "  Cohort average: {}",
        format_score(comparison.cohort_average)
    );
    println!(
        "  Rank:           {} of {}",
        comparison.rank,
        comparison.cohort_size + 1
    );
    println!("  Percentile:     {:.2}", comparison.percentile);

    if !comparison.is_reliable {
        println!();
        println!(
            "{}",
            style(format!(
                "Only {} peers in the cohort; treat this comparison as indicative.",
                comparison.cohort_size
            ))
            .yellow()
        );
    }

    Ok(())
}

fn print_guidance(title: &str, items: &[Guidance]) {
    println!("{}", style(title).bold());
    for (idx, item) in items.iter().enumerate() {
        println!("  {}. {}", idx + 1, item.text());
        println!("     {}", style(&item.context).dim());
    }
}

pub async fn handle_guidance_command(session_id: String, json: bool) -> Result<()> {
    let service = analytics_service().await?;
    let guidance = service.session_guidance(&session_id).await?;

    if json {
        return print_json(&guidance);
    }

    print_guidance("Reflection", &guidance.reflection_prompts);
    println!();
    print_guidance("Recommendations", &guidance.recommendations);

    Ok(())
}
