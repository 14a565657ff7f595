use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand};
use luna_core::dates::{format_iso, parse_iso_date, parse_year_month};
use luna_core::*;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "luna")]
#[command(about = "Private menstrual cycle tracker and predictor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override config file location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Reference day (YYYY-MM-DD) instead of the local date
    #[arg(long, global = true, value_parser = parse_date)]
    today: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a period day, or a block of days starting at DATE
    Log {
        /// Day to log (defaults to today)
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Number of consecutive days to log
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=31))]
        days: u32,
    },

    /// Remove a logged period day
    Unlog {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },

    /// List detected period episodes
    Episodes,

    /// Show predicted periods, fertile window and ovulation days
    Predict {
        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show where you are in your cycle (default)
    Status,

    /// Show a month with logged and predicted days
    Calendar {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(long)]
        month: Option<String>,
    },

    /// Record flow, symptoms and notes for a day
    Track {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,

        #[arg(long)]
        flow: Option<Flow>,

        /// Symptom (repeatable)
        #[arg(long = "symptom")]
        symptoms: Vec<Symptom>,

        /// Mood (repeatable)
        #[arg(long = "mood")]
        moods: Vec<Mood>,

        #[arg(long)]
        sex: Option<SexualActivity>,

        #[arg(long)]
        sex_drive: Option<SexDrive>,

        #[arg(long)]
        discharge: Option<Discharge>,

        #[arg(long)]
        pill: Option<PillStatus>,

        #[arg(long)]
        breast: Option<Breast>,

        /// Psychological capacity (repeatable)
        #[arg(long = "psych")]
        psychological: Vec<Psychological>,

        #[arg(long)]
        notes: Option<String>,

        /// Delete everything recorded for the day
        #[arg(long, conflicts_with_all = [
            "flow", "symptoms", "moods", "sex", "sex_drive", "discharge", "pill", "breast",
            "psychological", "notes",
        ])]
        clear: bool,
    },

    /// Show what was recorded for a day
    Show {
        #[arg(value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Export logged, tracked and predicted days to CSV
    Export {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },

    /// Save cycle settings
    Setup {
        /// Typical cycle length in days (21-45)
        #[arg(long)]
        cycle_length: i64,

        /// Typical period length in days (1-10)
        #[arg(long)]
        period_length: i64,

        /// Tracking goal (tracking, fertility)
        #[arg(long)]
        goal: Option<Goal>,

        /// First day of your most recent period
        #[arg(long, value_parser = parse_date)]
        last_period: Option<NaiveDate>,
    },
}

/// Resolved settings shared by every command
struct Env {
    paths: DataPaths,
    config: Config,
    config_path: PathBuf,
    today: NaiveDate,
}

fn main() -> Result<()> {
    // Keep stdout clean; RUST_LOG still raises the level
    luna_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Config::default_config_path);
    let config = Config::load_or_default(&config_path)?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let env = Env {
        paths: DataPaths::new(&data_dir),
        config,
        config_path,
        today: cli
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive()),
    };

    match cli.command {
        Some(Commands::Log { date, days }) => cmd_log(&env, date.unwrap_or(env.today), days),
        Some(Commands::Unlog { date }) => cmd_unlog(&env, date),
        Some(Commands::Episodes) => cmd_episodes(&env),
        Some(Commands::Predict { json }) => cmd_predict(&env, json),
        Some(Commands::Status) | None => cmd_status(&env),
        Some(Commands::Calendar { month }) => cmd_calendar(&env, month),
        Some(Commands::Track {
            date,
            flow,
            symptoms,
            moods,
            sex,
            sex_drive,
            discharge,
            pill,
            breast,
            psychological,
            notes,
            clear,
        }) => {
            let record = DayRecord {
                flow,
                symptoms,
                moods,
                sex,
                sex_drive,
                discharge,
                pill,
                breast,
                psychological,
                notes: notes.unwrap_or_default(),
            };
            cmd_track(&env, date, record, clear)
        }
        Some(Commands::Show { date }) => cmd_show(&env, date),
        Some(Commands::Export { out }) => cmd_export(&env, out),
        Some(Commands::Setup {
            cycle_length,
            period_length,
            goal,
            last_period,
        }) => cmd_setup(env, cycle_length, period_length, goal, last_period),
    }
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    parse_iso_date(s).map_err(|e| e.to_string())
}

/// Episode starts from the log, or the onboarding date if nothing is logged
fn episode_starts(env: &Env, logged: &LoggedDays) -> Vec<NaiveDate> {
    let starts = detect_episode_starts(logged);
    if starts.is_empty() {
        if let Some(last) = env.config.cycle.last_period_start {
            tracing::debug!("No logged days, anchoring on configured last period {}", last);
            return vec![last];
        }
    }
    starts
}

fn predict(env: &Env, logged: &LoggedDays) -> PredictionSet {
    let starts = episode_starts(env, logged);
    CyclePredictor::new(env.config.cycle_config())
        .with_window(env.config.prediction.cycle_window)
        .predict_from_starts(&starts, logged, env.today)
}

fn cmd_log(env: &Env, start: NaiveDate, days: u32) -> Result<()> {
    let mut added = 0;
    LoggedDays::update(&env.paths.period_days, |logged| {
        added = logged.add_block(start, days);
        Ok(())
    })?;

    if added == 0 {
        println!("Already logged - nothing changed.");
    } else if days == 1 {
        println!("✓ Logged period day {}", format_iso(start));
    } else {
        println!(
            "✓ Logged {} period days starting {} ({} new)",
            days,
            format_iso(start),
            added
        );
    }
    Ok(())
}

fn cmd_unlog(env: &Env, date: NaiveDate) -> Result<()> {
    let mut removed = false;
    LoggedDays::update(&env.paths.period_days, |logged| {
        removed = logged.remove_day(date);
        Ok(())
    })?;

    if removed {
        println!("✓ Removed period day {}", format_iso(date));
    } else {
        println!("{} was not logged.", format_iso(date));
    }
    Ok(())
}

fn cmd_episodes(env: &Env) -> Result<()> {
    let logged = LoggedDays::load(&env.paths.period_days)?;
    let episodes = detect_episodes(&logged);

    if episodes.is_empty() {
        println!("No period days logged yet.");
        return Ok(());
    }

    println!("Periods ({}):", episodes.len());
    for episode in &episodes {
        println!(
            "  {} → {}  ({} {})",
            format_iso(episode.start_date),
            format_iso(episode.end_date),
            episode.len_days(),
            if episode.len_days() == 1 { "day" } else { "days" }
        );
    }
    Ok(())
}

fn cmd_predict(env: &Env, json: bool) -> Result<()> {
    let logged = LoggedDays::load(&env.paths.period_days)?;
    let predictions = predict(env, &logged);

    if json {
        println!("{}", serde_json::to_string_pretty(&predictions)?);
        return Ok(());
    }

    if predictions.is_empty() {
        println!("Not enough data to predict yet. Log a period day with `luna log`.");
        return Ok(());
    }

    print_ranges("Predicted periods", &predictions.predicted_periods);
    print_ranges("Fertile window", &predictions.fertile_window);
    print_ranges("Ovulation", &predictions.ovulation_days);
    Ok(())
}

fn cmd_status(env: &Env) -> Result<()> {
    let logged = LoggedDays::load(&env.paths.period_days)?;
    let starts = episode_starts(env, &logged);
    let cycle = env.config.cycle_config();

    let Some(summary) = summarize(&starts, cycle, env.today) else {
        println!("Not enough data yet. Log a period day with `luna log`.");
        return Ok(());
    };

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} PHASE", summary.phase.name().to_uppercase());
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Today: {}", format_iso(env.today));
    println!(
        "  Cycle day {} of {}",
        summary.cycle_day, cycle.cycle_length
    );
    match summary.days_until_next_period {
        0 => println!("  Next period: {} (today)", format_iso(summary.next_period_start)),
        1 => println!("  Next period: {} (tomorrow)", format_iso(summary.next_period_start)),
        n => println!(
            "  Next period: {} (in {} days)",
            format_iso(summary.next_period_start),
            n
        ),
    }
    println!(
        "  Fertile window: {} to {}",
        format_iso(summary.fertile_start),
        format_iso(summary.fertile_end)
    );
    println!("  Ovulation: {}", format_iso(summary.ovulation_day));
    if env.config.cycle.goal == Goal::Fertility && summary.phase == CyclePhase::Ovulation {
        println!();
        println!("  ♥ Peak fertility today.");
    }
    println!();
    Ok(())
}

fn cmd_calendar(env: &Env, month: Option<String>) -> Result<()> {
    let (year, month) = match month {
        Some(m) => parse_year_month(&m)?,
        None => (env.today.year(), env.today.month()),
    };

    let logged = LoggedDays::load(&env.paths.period_days)?;
    let predictions = predict(env, &logged);
    let days = month_view(year, month, &logged, &predictions, env.today)?;

    let title = days
        .first()
        .map(|d| d.date.format("%B %Y").to_string())
        .unwrap_or_default();
    println!("{:^28}", title);
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");

    let mut line = String::new();
    let leading = days
        .first()
        .map(|d| d.date.weekday().num_days_from_sunday())
        .unwrap_or(0);
    for _ in 0..leading {
        line.push_str("    ");
    }
    for day in &days {
        line.push_str(&format!("{:>3}{}", day.date.day(), marker(day)));
        if day.date.weekday().num_days_from_sunday() == 6 {
            println!("{}", line.trim_end());
            line.clear();
        }
    }
    if !line.is_empty() {
        println!("{}", line.trim_end());
    }

    println!();
    println!("  P logged period   p predicted period");
    println!("  O ovulation       F fertile (lowercase: past)   ] today");
    Ok(())
}

fn marker(day: &CalendarDay) -> char {
    if day.today {
        return ']';
    }
    let mark = if day.logged {
        'P'
    } else if day.predicted_period {
        'p'
    } else if day.ovulation {
        'O'
    } else if day.fertile {
        'F'
    } else {
        return ' ';
    };
    if day.past && (mark == 'O' || mark == 'F') {
        mark.to_ascii_lowercase()
    } else {
        mark
    }
}

fn cmd_track(env: &Env, date: NaiveDate, record: DayRecord, clear: bool) -> Result<()> {
    if !clear && record.is_empty() {
        return Err(Error::Other(
            "nothing to record - pass at least one of --flow, --symptom, --mood, --sex, --sex-drive, --discharge, --pill, --breast, --psych, --notes".into(),
        ));
    }

    DayRecords::update(&env.paths.day_records, |records| {
        if clear {
            records.remove(date);
        } else {
            records.upsert(date, record);
        }
        Ok(())
    })?;

    if clear {
        println!("✓ Cleared record for {}", format_iso(date));
    } else {
        println!("✓ Saved record for {}", format_iso(date));
    }
    Ok(())
}

fn cmd_show(env: &Env, date: NaiveDate) -> Result<()> {
    let logged = LoggedDays::load(&env.paths.period_days)?;
    let records = DayRecords::load(&env.paths.day_records)?;

    println!("{}", date.format("%A, %B %-d, %Y"));
    println!(
        "  Period day: {}",
        if logged.contains(date) { "yes" } else { "no" }
    );

    let Some(record) = records.get(date) else {
        println!("  Nothing tracked for this day.");
        return Ok(());
    };

    let list = |items: Vec<&str>| items.join(", ");
    if let Some(flow) = record.flow {
        println!("  Flow: {}", flow);
    }
    if !record.symptoms.is_empty() {
        println!(
            "  Symptoms: {}",
            list(record.symptoms.iter().map(|s| s.as_str()).collect())
        );
    }
    if !record.moods.is_empty() {
        println!(
            "  Mood: {}",
            list(record.moods.iter().map(|m| m.as_str()).collect())
        );
    }
    if let Some(sex) = record.sex {
        println!("  Sex: {}", sex);
    }
    if let Some(drive) = record.sex_drive {
        println!("  Sex drive: {}", drive);
    }
    if let Some(discharge) = record.discharge {
        println!("  Discharge: {}", discharge);
    }
    if let Some(pill) = record.pill {
        println!("  Pill: {}", pill);
    }
    if let Some(breast) = record.breast {
        println!("  Breasts: {}", breast);
    }
    if !record.psychological.is_empty() {
        println!(
            "  Capacity: {}",
            list(record.psychological.iter().map(|p| p.as_str()).collect())
        );
    }
    if !record.notes.is_empty() {
        println!("  Notes: {}", record.notes);
    }
    Ok(())
}

fn cmd_export(env: &Env, out: PathBuf) -> Result<()> {
    let logged = LoggedDays::load(&env.paths.period_days)?;
    let records = DayRecords::load(&env.paths.day_records)?;
    let predictions = predict(env, &logged);

    let count = export_csv(&logged, &records, &predictions, &out)?;

    println!("✓ Exported {} days to CSV", count);
    println!("  CSV: {}", out.display());
    Ok(())
}

fn cmd_setup(
    env: Env,
    cycle_length: i64,
    period_length: i64,
    goal: Option<Goal>,
    last_period: Option<NaiveDate>,
) -> Result<()> {
    let mut config = env.config;
    config.cycle.cycle_length = cycle_length;
    config.cycle.period_length = period_length;

    if let Some(goal) = goal {
        config.cycle.goal = goal;
    }
    if last_period.is_some() {
        config.cycle.last_period_start = last_period;
    }

    config.validate()?;
    config.save_to(&env.config_path)?;

    println!("✓ Saved settings to {}", env.config_path.display());
    println!(
        "  Cycle: {} days, period: {} days",
        config.cycle.cycle_length, config.cycle.period_length
    );
    Ok(())
}

/// Print a set of days collapsed into consecutive ranges
fn print_ranges(title: &str, days: &BTreeSet<NaiveDate>) {
    println!("{}:", title);
    if days.is_empty() {
        println!("  (none)");
        return;
    }
    for (start, end) in consecutive_ranges(days) {
        if start == end {
            println!("  {}", format_iso(start));
        } else {
            println!("  {} to {}", format_iso(start), format_iso(end));
        }
    }
}

fn consecutive_ranges(days: &BTreeSet<NaiveDate>) -> Vec<(NaiveDate, NaiveDate)> {
    let mut ranges: Vec<(NaiveDate, NaiveDate)> = Vec::new();
    for &day in days {
        match ranges.last_mut() {
            Some((_, end)) if end.succ_opt() == Some(day) => *end = day,
            _ => ranges.push((day, day)),
        }
    }
    ranges
}
