use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn, Subscriber};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use studyspark::calendar::{self, ViewMode};
use studyspark::catalog::{find_book, SUBJECTS};
use studyspark::checklist::{self, group_by_section, SparkPlan, TaskFilter};
use studyspark::config::Settings;
use studyspark::goal::{self, GoalPlan};
use studyspark::profile::Profile;
use studyspark::prompt::run_picker;
use studyspark::range::select_range;
use studyspark::store::{
    load_json, save_json, KeyValueStore, SqliteStore, COACH_KEY, GOAL_KEY, PROFILE_KEY,
    SPARK_PLAN_KEY,
};
use studyspark::talk::{self, Coach, Message, Sender, TalkKind, TalkLog};
use studyspark::types::TaskStatus;

#[derive(Parser, Debug)]
#[command(name = "studyspark")]
#[command(about = "Plan a test range and track the problems in it")]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// SQLite file for saved records (overrides STUDYSPARK_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the chapters and sections of a book
    Catalog {
        #[arg(long)]
        book: Option<String>,
    },

    /// Create a Spark plan from a start and end section
    Plan {
        start_chapter: String,
        start_section: String,
        end_chapter: String,
        end_section: String,

        #[arg(long)]
        book: Option<String>,

        #[arg(long, default_value = studyspark::catalog::DEFAULT_SUBJECT)]
        subject: String,
    },

    /// Choose the range step by step on stdin
    Pick {
        #[arg(long)]
        book: Option<String>,

        #[arg(long, default_value = studyspark::catalog::DEFAULT_SUBJECT)]
        subject: String,
    },

    /// List the tasks of the saved plan by section
    Tasks {
        /// all, complete, incomplete or incorrect
        #[arg(long, default_value = "all")]
        filter: TaskFilter,
    },

    /// Set the status of one task
    Mark {
        /// Task id as shown by `tasks`
        id: String,
        /// complete, partial, incorrect or unset
        status: TaskStatus,
    },

    /// Show completion stats for the saved plan
    Progress,

    /// Set or show the test goal
    Goal {
        #[command(subcommand)]
        action: GoalCommand,
    },

    /// Show the calendar around the test
    Calendar {
        /// day, week or month
        #[arg(long, default_value = "day")]
        view: ViewMode,

        /// Focus date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Set or show the student profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommand,
    },

    /// Talk with the coach
    Talk {
        #[command(subcommand)]
        action: TalkCommand,
    },

    /// Delete every saved record
    Reset,
}

#[derive(Subcommand, Debug)]
enum GoalCommand {
    Set {
        test_name: String,

        /// First test day, defaults to the usual date for preset tests
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last test day
        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long)]
        rank: u32,

        #[arg(long)]
        total: u32,

        #[arg(long)]
        reason: Option<String>,
    },
    Show,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    Set {
        name: String,
        /// Avatar index, 0 to 5
        avatar: usize,
    },
    Show,
}

#[derive(Subcommand, Debug)]
enum TalkCommand {
    /// Choose the coach
    Coach {
        /// Coach index, 0 to 5
        index: usize,
    },

    /// Print a conversation
    Show {
        /// daily or weekly
        #[arg(long, default_value = "daily")]
        kind: TalkKind,
    },

    /// Send a message and wait for the coach's answer
    Send {
        text: String,

        /// daily or weekly
        #[arg(long, default_value = "daily")]
        kind: TalkKind,

        /// Milliseconds before the coach answers
        #[arg(long, default_value_t = talk::DEFAULT_REPLY_DELAY.as_millis() as u64)]
        delay_ms: u64,
    },
}

/// Log subscriber writing to stderr, filtered by `filter` alone
fn log_subscriber(filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static {
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .finish()
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    log_subscriber(filter).init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let settings = Settings::from_env()?;
    let db_path = args.db.unwrap_or(settings.db_path);
    let mut store = SqliteStore::open(&db_path)?;
    debug!(path = %db_path.display(), "Database opened");

    match args.command {
        Commands::Catalog { book } => {
            let name = book.unwrap_or(settings.book);
            let Some(catalog) = find_book(&name) else {
                bail!("Unknown book: {}", name);
            };
            for line in catalog_lines(catalog) {
                println!("{}", line);
            }
        }
        Commands::Plan {
            start_chapter,
            start_section,
            end_chapter,
            end_section,
            book,
            subject,
        } => {
            check_subject(&subject)?;
            let book = book.unwrap_or(settings.book);
            let catalog = checklist::usable_book(&book)?;
            let range = select_range(
                catalog,
                &start_chapter,
                &start_section,
                &end_chapter,
                &end_section,
            )?;
            let plan = SparkPlan::create(&subject, &book, range, Utc::now())?;
            save_plan(&mut store, &plan)?;
        }
        Commands::Pick { book, subject } => {
            check_subject(&subject)?;
            let book = book.unwrap_or(settings.book);
            let catalog = checklist::usable_book(&book)?;

            let stdin = io::stdin();
            match run_picker(catalog, stdin.lock(), io::stdout())? {
                Some((range, _)) => {
                    let plan = SparkPlan::create(&subject, &book, range, Utc::now())?;
                    save_plan(&mut store, &plan)?;
                }
                None => info!("Picker closed without a selection"),
            }
        }
        Commands::Tasks { filter } => {
            let plan = require_plan(&store)?;
            print_tasks(&plan, filter);
        }
        Commands::Mark { id, status } => {
            let mut plan = require_plan(&store)?;
            checklist::set_task_status(&mut plan.tasks, &id, status, Utc::now())?;
            save_json(&mut store, SPARK_PLAN_KEY, &plan)?;
            info!(id = %id, status = %status, "Task marked");
        }
        Commands::Progress => {
            let plan = require_plan(&store)?;
            let progress = plan.progress();
            println!("{} {}", plan.subject, plan.range);
            println!(
                "達成率 {}% ({}/{})",
                progress.completion_rate(),
                progress.complete,
                progress.total
            );
            println!(
                "○ {}  △ {}  × {}  未回答 {}",
                progress.complete, progress.partial, progress.incorrect, progress.unanswered
            );
        }
        Commands::Goal { action } => run_goal(&mut store, action)?,
        Commands::Calendar { view, date } => {
            let today = Local::now().date_naive();
            let saved_goal: Option<GoalPlan> = load_json(&store, GOAL_KEY)?;
            let window = saved_goal.map(|g| g.window());

            match &window {
                Some(w) => match w.days_until(today) {
                    Some(0) => println!("今日から{}!", w.name),
                    Some(days) => println!("{}まであと{}日", w.name, days),
                    None => {}
                },
                None => warn!("No goal saved, test days are not marked"),
            }

            let focus = date.unwrap_or(today);
            print_calendar(view, focus, today, window.as_ref());
        }
        Commands::Profile { action } => match action {
            ProfileCommand::Set { name, avatar } => {
                let profile = Profile::new(&name, avatar)?;
                save_json(&mut store, PROFILE_KEY, &profile)?;
                info!(name = %profile.name, avatar = profile.avatar, "Profile saved");
            }
            ProfileCommand::Show => match load_json::<Profile>(&store, PROFILE_KEY)? {
                Some(profile) => println!("{} (アバター {})", profile.name, profile.avatar),
                None => println!("プロフィールはまだありません"),
            },
        },
        Commands::Talk { action } => run_talk(&mut store, action)?,
        Commands::Reset => {
            let count = store.clear()?;
            info!(count = count, "Saved records cleared");
        }
    }

    Ok(())
}

fn check_subject(subject: &str) -> Result<()> {
    if !SUBJECTS.contains(&subject) {
        bail!("Unknown subject: {} (choose from {})", subject, SUBJECTS.join(", "));
    }
    Ok(())
}

fn save_plan(store: &mut dyn KeyValueStore, plan: &SparkPlan) -> Result<()> {
    save_json(store, SPARK_PLAN_KEY, plan)?;
    info!(
        book = %plan.book,
        range = %plan.range,
        count = plan.tasks.len(),
        "Spark plan saved"
    );
    Ok(())
}

fn require_plan(store: &dyn KeyValueStore) -> Result<SparkPlan> {
    load_json(store, SPARK_PLAN_KEY)?
        .context("No spark plan saved yet. Run `studyspark plan` or `studyspark pick` first")
}

fn run_goal(store: &mut dyn KeyValueStore, action: GoalCommand) -> Result<()> {
    match action {
        GoalCommand::Set {
            test_name,
            start,
            end,
            rank,
            total,
            reason,
        } => {
            let today = Local::now().date_naive();
            let (start, end) = match (start, end, goal::default_period_for(&test_name, today)) {
                (Some(start), Some(end), _) => (start, end),
                (start, end, Some((default_start, default_end))) => {
                    (start.unwrap_or(default_start), end.unwrap_or(default_end))
                }
                _ => bail!("No usual dates for '{}', pass --start and --end", test_name),
            };

            let mut plan = GoalPlan::new(&test_name, start, end, rank, total)?;
            if let Some(reason) = reason {
                plan.set_reason(&reason);
            }
            save_json(store, GOAL_KEY, &plan)?;
            info!(test = %plan.test_name, start = %plan.start_date, rank = plan.target_rank, "Goal saved");
        }
        GoalCommand::Show => match load_json::<GoalPlan>(store, GOAL_KEY)? {
            Some(plan) => {
                println!("{}", plan.test_name);
                println!("期間: {} 〜 {}", plan.start_date, plan.end_date);
                println!(
                    "目標: {}位 / {}人 (上位 {:.0}%)",
                    plan.target_rank,
                    plan.total_students,
                    plan.flag_position()
                );
                if let Some(reason) = &plan.reason {
                    println!("理由: {}", reason);
                }
            }
            None => println!("目標はまだありません"),
        },
    }
    Ok(())
}

fn run_talk(store: &mut dyn KeyValueStore, action: TalkCommand) -> Result<()> {
    let (kind, send) = match action {
        TalkCommand::Coach { index } => {
            let coach = Coach::new(index)?;
            save_json(store, COACH_KEY, &coach)?;
            info!(coach = coach.index(), style = coach.style().as_str(), "Coach selected");
            return Ok(());
        }
        TalkCommand::Show { kind } => (kind, None),
        TalkCommand::Send {
            text,
            kind,
            delay_ms,
        } => (kind, Some((text, delay_ms))),
    };

    let coach: Coach = load_json(store, COACH_KEY)?
        .context("No coach selected yet. Run `studyspark talk coach <0-5>` first")?;
    let mut log = match load_json::<TalkLog>(store, kind.store_key())? {
        Some(log) => log,
        None => {
            let log = TalkLog::new(kind, Utc::now());
            save_json(store, kind.store_key(), &log)?;
            log
        }
    };

    match send {
        None => {
            for message in &log.messages {
                print_message(coach, message);
            }
        }
        Some((text, delay_ms)) => {
            print_message(coach, log.send(&text, Utc::now())?);
            save_json(store, kind.store_key(), &log)?;

            thread::sleep(Duration::from_millis(delay_ms));
            let now = Utc::now();
            let seed = now.timestamp_subsec_nanos() as u64;
            print_message(coach, log.reply(seed, now));
            save_json(store, kind.store_key(), &log)?;
        }
    }
    Ok(())
}

fn print_message(coach: Coach, message: &Message) {
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");
    match message.sender {
        Sender::Coach => println!("[{}] コーチ({}): {}", time, coach.style().as_str(), message.text),
        Sender::User => println!("[{}] あなた: {}", time, message.text),
    }
}

fn catalog_lines(catalog: &studyspark::Catalog) -> Vec<String> {
    let mut lines = vec![catalog.name.to_string()];
    if !catalog.available {
        lines.push("  (準備中)".to_string());
        return lines;
    }
    for chapter in catalog.chapters {
        // Titles already start with the chapter label
        lines.push(chapter.title.to_string());
        for section in chapter.sections {
            lines.push(format!("  {}  問題{}", section.title, section.problems));
        }
    }
    lines.push(format!(
        "{}節 / {}問",
        catalog.section_count(),
        catalog.problem_count()
    ));
    lines
}

fn status_mark(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Complete => "○",
        TaskStatus::Partial => "△",
        TaskStatus::Incorrect => "×",
        TaskStatus::Unset => " ",
    }
}

fn print_tasks(plan: &SparkPlan, filter: TaskFilter) {
    println!("{} {} {}", plan.subject, plan.book, plan.range);
    for chapter in group_by_section(&plan.tasks, filter) {
        println!("{}", chapter.chapter);
        for section in chapter.sections {
            if section.tasks.is_empty() {
                continue;
            }
            println!("  {}", section.section);
            for task in section.tasks {
                println!(
                    "    [{}] 問題{:<4} {}",
                    status_mark(task.status),
                    task.problem,
                    task.id
                );
            }
        }
    }
}

fn print_calendar(
    view: ViewMode,
    focus: NaiveDate,
    today: NaiveDate,
    window: Option<&calendar::TestWindow>,
) {
    let cells = calendar::view_cells(view, focus, today, window);

    match view {
        ViewMode::Day => {
            for cell in &cells {
                let mut line = cell.date.format("%Y-%m-%d (%a)").to_string();
                if cell.is_today {
                    line.push_str(" 今日");
                }
                if cell.is_test {
                    line.push_str(" テスト");
                }
                println!("{}", line);
            }
        }
        ViewMode::Week | ViewMode::Month => {
            println!("{}", focus.format("%Y-%m"));
            println!(" Mo  Tu  We  Th  Fr  Sa  Su");
            for week in cells.chunks(7) {
                let row: Vec<String> = week
                    .iter()
                    .map(|cell| {
                        let marker = if cell.is_test {
                            '!'
                        } else if cell.is_today {
                            '*'
                        } else {
                            ' '
                        };
                        if cell.in_focus {
                            format!("{:>2}{} ", cell.date.day(), marker)
                        } else {
                            "    ".to_string()
                        }
                    })
                    .collect();
                println!("{}", row.join("").trim_end());
            }
        }
    }
}
