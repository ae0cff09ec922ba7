//! Interactive survey runner
//!
//! Walks one participant through their assigned group in the terminal:
//! demographics once, then seven scales per image, with back navigation,
//! full restart and a live summary view once everything is submitted.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use futures_util::future::join_all;
use tracing_subscriber::EnvFilter;

use kansei_survey::assignment::{assign_group, FileRotationStore};
use kansei_survey::catalog;
use kansei_survey::config::SurveyConfig;
use kansei_survey::gateway::{HttpGateway, ImageSummary, SurveyGateway};
use kansei_survey::session::journal::TrialJournal;
use kansei_survey::session::rating::{AgeBucket, Dimension, Gender, Rating};
use kansei_survey::session::{Blocker, Phase, StepOutcome, SubmissionRecord, SurveySession};

enum Flow {
    Continue,
    Quit,
}

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Quiet by default; RUST_LOG opens the taps
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = SurveyConfig::from_env();
    let explicit_group = parse_group_arg(std::env::args().skip(1));

    println!("\n{}", "═".repeat(60));
    println!("🎨 Kansei Perception Survey v0.2.0");
    println!("{}", "═".repeat(60));
    println!("Rate each image on seven scales from 1 to 5.");
    println!("Commands: 1-5 rate | Enter keep | b back | r restart | q quit");
    println!("{}\n", "═".repeat(60));

    let store = FileRotationStore::new(config.rotation_file());
    let assignment = assign_group(explicit_group, &store).await?;

    let gateway: Arc<dyn SurveyGateway> = Arc::new(HttpGateway::new(&config.api_base));
    let mut session = SurveySession::new(gateway.clone())
        .with_journal(TrialJournal::new(config.journal_file()));
    session.begin(assignment);

    println!("👤 Participant: {}", session.participant_id());
    println!(
        "🗂  Group {} ({}), {} images\n",
        assignment.group.get(),
        if assignment.locked { "fixed" } else { "rotation" },
        session.trial_count()
    );

    loop {
        match session.phase() {
            Phase::AwaitingGroup => {
                let next = assign_group(None, &store).await?;
                session.begin(next);
                println!(
                    "🗂  Group {} (rotation), {} images\n",
                    next.group.get(),
                    session.trial_count()
                );
            }
            Phase::InTrial(index) => {
                if let Flow::Quit = run_trial(&mut session, index).await? {
                    break;
                }
            }
            Phase::Complete => {
                if let Flow::Quit = completion_menu(&mut session, gateway.as_ref()).await? {
                    break;
                }
            }
        }
    }

    println!("\n👋 Goodbye!\n");
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// TRIAL LOOP
// ──────────────────────────────────────────────────────────────────────────────

async fn run_trial(session: &mut SurveySession, index: usize) -> Result<Flow> {
    let total = session.trial_count();
    let Some(stimulus) = session.current_stimulus().copied() else {
        return Ok(Flow::Quit);
    };

    println!("{}", "─".repeat(50));
    println!("📷 Image {}/{}", index + 1, total);
    println!("   {}  [{} frame]", stimulus.locator, stimulus.aspect);
    println!("{}", "─".repeat(50));

    if index == 0 {
        if session.draft().age_bucket.is_none() {
            if let Flow::Quit = prompt_demographics(session)? {
                return Ok(Flow::Quit);
            }
        } else if let Some(age) = session.draft().age_bucket {
            // Coming back to the first image: the answers are editable again.
            println!(
                "   👤 {}, {}  (d to edit)",
                session.draft().gender.label(),
                age.label()
            );
        }
    }

    for dimension in Dimension::ALL {
        loop {
            let current = session.draft().ratings.get(dimension);
            let hint = match current {
                Some(value) => format!(" [{}]", value.get()),
                None => String::new(),
            };
            let input = prompt(&format!(
                "   {} 1 · · · 5 {}{hint} > ",
                dimension.low_anchor(),
                dimension.high_anchor()
            ))?;

            match input.as_str() {
                "" if current.is_some() => break,
                "d" | "demographics" if index == 0 => {
                    if let Flow::Quit = prompt_demographics(session)? {
                        return Ok(Flow::Quit);
                    }
                    continue;
                }
                "b" | "back" => {
                    if let StepOutcome::Blocked(blocker) = session.retreat() {
                        println!("   ⚠️  {}", blocker_hint(blocker));
                    }
                    return Ok(Flow::Continue);
                }
                "r" | "restart" => {
                    session.reset();
                    println!("\n🔄 Starting over as participant {}\n", session.participant_id());
                    return Ok(Flow::Continue);
                }
                "q" | "quit" => return Ok(Flow::Quit),
                other => match other.parse::<u8>().ok().and_then(Rating::new) {
                    Some(rating) => {
                        session.set_rating(dimension, rating);
                        break;
                    }
                    None => println!("   ⚠️  please answer with 1-5"),
                },
            }
        }
    }

    match session.advance().await {
        StepOutcome::Moved(Phase::Complete) => println!("\n📨 Last answer submitted."),
        StepOutcome::Moved(_) => {}
        StepOutcome::Blocked(blocker) => println!("   ⚠️  {}", blocker_hint(blocker)),
    }
    Ok(Flow::Continue)
}

fn prompt_demographics(session: &mut SurveySession) -> Result<Flow> {
    println!("👤 Two questions before the first image (Enter keeps the shown answer):");

    loop {
        let choices: Vec<String> = Gender::ALL
            .iter()
            .map(|g| format!("{} {}", g.code(), g.label()))
            .collect();
        let current = session.draft().gender.code();
        let input = prompt(&format!("   gender ({}) [{current}] > ", choices.join(" / ")))?;
        if input.is_empty() {
            break;
        }
        if input == "q" || input == "quit" {
            return Ok(Flow::Quit);
        }
        match input.parse::<u8>().ok().and_then(Gender::from_code) {
            Some(gender) => {
                session.set_gender(gender);
                break;
            }
            None => println!("   ⚠️  please answer 0, 1 or 2"),
        }
    }

    loop {
        let choices: Vec<String> = AgeBucket::ALL
            .iter()
            .map(|b| format!("{} {}", b.code(), b.label()))
            .collect();
        let current = session.draft().age_bucket;
        let hint = match current {
            Some(bucket) => format!(" [{}]", bucket.code()),
            None => String::new(),
        };
        let input = prompt(&format!("   age range ({}){hint} > ", choices.join(" / ")))?;
        if input.is_empty() && current.is_some() {
            break;
        }
        if input == "q" || input == "quit" {
            return Ok(Flow::Quit);
        }
        match input.parse::<u8>().ok().and_then(AgeBucket::from_code) {
            Some(age_bucket) => {
                session.set_age_bucket(age_bucket);
                break;
            }
            None => println!("   ⚠️  please answer 1 through 8"),
        }
    }

    println!();
    Ok(Flow::Continue)
}

// ──────────────────────────────────────────────────────────────────────────────
// COMPLETION AND SUMMARY
// ──────────────────────────────────────────────────────────────────────────────

async fn completion_menu(
    session: &mut SurveySession,
    gateway: &dyn SurveyGateway,
) -> Result<Flow> {
    println!("\n{}", "═".repeat(60));
    println!("✅ All {} images rated. Thank you!", session.trial_count());
    println!("   Participant: {}", session.participant_id());
    println!("{}", "═".repeat(60));

    loop {
        let input = prompt("📊 [s] group summary | [b] revise last | [r] new session | [q] quit > ")?;
        match input.as_str() {
            "s" | "summary" => show_summary(session, gateway).await,
            "b" | "back" => {
                if let StepOutcome::Blocked(blocker) = session.retreat() {
                    println!("   ⚠️  {}", blocker_hint(blocker));
                    continue;
                }
                return Ok(Flow::Continue);
            }
            "r" | "restart" => {
                session.reset();
                println!("\n🔄 Starting over as participant {}\n", session.participant_id());
                return Ok(Flow::Continue);
            }
            "q" | "quit" | "" => return Ok(Flow::Quit),
            _ => println!("   ⚠️  unknown option"),
        }
    }
}

async fn show_summary(session: &SurveySession, gateway: &dyn SurveyGateway) {
    let Some(assignment) = session.assignment() else {
        return;
    };
    let group = assignment.group;

    println!("\n⏳ Fetching summary for group {group}…");
    let list = match gateway.summary_list(group).await {
        Ok(list) => list,
        Err(err) => {
            println!("   ⚠️  summary unavailable: {err}");
            return;
        }
    };
    if list.images.is_empty() {
        println!("   no responses recorded yet");
        return;
    }
    println!("   {} responses across {} images", list.total, list.images.len());

    let fetches = list
        .images
        .iter()
        .map(|image| gateway.summary_by_image(group, image.image_id));
    let summaries = join_all(fetches).await;

    for (image, summary) in list.images.iter().zip(summaries) {
        let locator = catalog::find_stimulus(image.image_id)
            .map(|s| s.locator)
            .unwrap_or("(unknown image)");
        println!("\n   🖼  {} ({} responses)", locator, image.n);
        match summary {
            Ok(summary) => {
                let own = session
                    .history()
                    .iter()
                    .find(|record| record.stimulus_id == image.image_id);
                render_histogram(&summary, own);
            }
            Err(err) => println!("      ⚠️  distribution unavailable: {err}"),
        }
    }
    println!();
}

/// One line per dimension; `*` marks this participant's own answer.
fn render_histogram(summary: &ImageSummary, own: Option<&SubmissionRecord>) {
    for dimension in Dimension::ALL {
        let own_rating = own.map(|record| record.ratings.get(dimension).get());
        let cells: Vec<String> = (1u8..=5)
            .map(|value| {
                let marker = if own_rating == Some(value) { "*" } else { "" };
                format!("{value}:{}{marker}", summary.count(dimension, value))
            })
            .collect();
        println!(
            "      {:>10} | {} | {}",
            dimension.low_anchor(),
            cells.join("  "),
            dimension.high_anchor()
        );
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// HELPERS
// ──────────────────────────────────────────────────────────────────────────────

fn prompt(text: &str) -> Result<String> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn blocker_hint(blocker: Blocker) -> String {
    match blocker {
        Blocker::NotStarted => "no group assigned yet".to_string(),
        Blocker::GroupAlreadyAssigned => "a group is already assigned".to_string(),
        Blocker::IncompleteRatings(dimension) => format!(
            "the {} / {} scale still needs an answer",
            dimension.low_anchor(),
            dimension.high_anchor()
        ),
        Blocker::MissingAgeBucket => "the age range is needed on the first image".to_string(),
        Blocker::AtFirstTrial => "already at the first image".to_string(),
        Blocker::AlreadyComplete => "the survey is already finished".to_string(),
        Blocker::EmptyCatalog => "this group has no images".to_string(),
    }
}

fn parse_group_arg<I: Iterator<Item = String>>(mut args: I) -> Option<u8> {
    while let Some(arg) = args.next() {
        if let Some(value) = arg.strip_prefix("--group=") {
            return value.parse().ok();
        }
        if arg == "--group" || arg == "-g" {
            return args.next().and_then(|v| v.parse().ok());
        }
    }
    None
}
