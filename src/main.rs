// wordbrick - main.rs
// Command-line front end: word management, scheduled review and free practice.

use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;

use chrono::Local;
use log::{error, info};

use wordbrick::clock::describe_due;
use wordbrick::config::Config;
use wordbrick::scheduler::{Judgment, LadderScheduler};
use wordbrick::selection::{GroupFilter, PracticeFilter, StageFilter};
use wordbrick::session::{PracticeSession, ReviewSession};
use wordbrick::stats::{self, word_accuracy};
use wordbrick::storage::{GroupRepository, ReviewJournal, SqliteStore, WordRepository};
use wordbrick::words::{self, import, with_default_group, NewWord, WordPatch};

const USAGE: &str = "Usage: wordbrick <command>
  add <front> <back> [--group ID] [--pronunciation TEXT] [--example TEXT]
  edit <id> [--front TEXT] [--back TEXT] [--group ID]
  list [query]
  delete <id>
  groups
  group-add <name>
  group-rename <id> <name>
  import <file.json>
  review [--group ID]
  practice [--stages 0-6] [--group ID]
  reset <id>
  stats";

/// Splits `--flag value` pairs out of the argument list.
fn take_flag(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    if pos + 1 >= args.len() {
        args.remove(pos);
        return None;
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Some(value)
}

fn prompt(lines: &mut impl Iterator<Item = io::Result<String>>, text: &str) -> Result<Option<String>, String> {
    print!("{}", text);
    io::stdout().flush().map_err(|e| e.to_string())?;
    match lines.next() {
        Some(line) => line.map(|l| Some(l.trim().to_string())).map_err(|e| e.to_string()),
        None => Ok(None),
    }
}

/// Blocks until the user asks for the answer. `false` means quit.
fn wait_for_reveal(lines: &mut impl Iterator<Item = io::Result<String>>) -> Result<bool, String> {
    loop {
        match prompt(lines, "Press Enter to show the answer (q to quit) ")?.as_deref() {
            Some("") => return Ok(true),
            Some("q") | None => return Ok(false),
            _ => continue,
        }
    }
}

fn journal_for(config: &Config) -> Option<ReviewJournal> {
    let dir = config.journal_directory.as_ref()?;
    match ReviewJournal::new(dir, &config.owner_id) {
        Ok(journal) => Some(journal),
        Err(e) => {
            error!("Review journal disabled: {}", e);
            None
        }
    }
}

fn run_review(config: &Config, store: &SqliteStore, group: GroupFilter) -> Result<(), String> {
    let scheduler = LadderScheduler::new(config.intervals().map_err(|e| e.to_string())?);
    let mut session = ReviewSession::new(&config.owner_id, store, scheduler)
        .with_group(config.review_group_filter(group));
    if let Some(journal) = journal_for(config) {
        session = session.with_journal(journal);
    }
    session.load().map_err(|e| e.to_string())?;

    let mut rng = rand::thread_rng();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let now = Local::now();
        let due = session.due_count(&now);
        let Some(presented) = session.next(&mut rng, &now) else {
            println!("All done for today! Accuracy {:.1}%", session.summary(&now).accuracy);
            return Ok(());
        };
        let presented = presented.clone();
        println!();
        println!(
            "[{} due | stage {} | accuracy {:.1}%]",
            due,
            presented.word.stage,
            word_accuracy(&presented.word)
        );
        println!("  {}", presented.question());
        if !wait_for_reveal(&mut lines)? {
            return Ok(());
        }
        println!("  {}", presented.answer());
        if let Some(pronunciation) = &presented.word.pronunciation {
            println!("  [{}]", pronunciation);
        }
        let preview = session.preview(&now).map_err(|e| e.to_string())?;
        println!(
            "  y -> {}   n -> {}",
            describe_due(preview.remembered),
            describe_due(preview.forgotten)
        );

        let judgment = loop {
            match prompt(&mut lines, "Remembered? [y/n/q] ")?.as_deref() {
                Some("y") => break Judgment::Remembered,
                Some("n") => break Judgment::Forgotten,
                Some("q") | None => return Ok(()),
                _ => continue,
            }
        };
        // A failed write leaves the word presented, so the same judgment may be retried.
        loop {
            match session.answer(judgment, &Local::now()) {
                Ok(word) => {
                    println!("  next review: {}", describe_due(word.next_review_date));
                    break;
                }
                Err(e) => {
                    error!("Could not save review: {}", e);
                    if prompt(&mut lines, "Saving failed. Retry? [y/n] ")?.as_deref() != Some("y") {
                        return Err(e.to_string());
                    }
                }
            }
        }
    }
}

fn run_practice(config: &Config, store: &SqliteStore, filter: PracticeFilter) -> Result<(), String> {
    let scheduler = LadderScheduler::new(config.intervals().map_err(|e| e.to_string())?);
    let mut session = PracticeSession::new(&config.owner_id, store, scheduler, filter);
    if let Some(journal) = journal_for(config) {
        session = session.with_journal(journal);
    }
    session.load().map_err(|e| e.to_string())?;
    println!("{} words match.", session.pool_size());

    let mut rng = rand::thread_rng();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let Some(presented) = session.next(&mut rng) else {
            println!("No words match this filter.");
            return Ok(());
        };
        let presented = presented.clone();
        println!();
        println!("[stage {} | accuracy {:.1}%]", presented.word.stage, word_accuracy(&presented.word));
        println!("  {}", presented.question());
        if !wait_for_reveal(&mut lines)? {
            return Ok(());
        }
        println!("  {}", presented.answer());
        match prompt(&mut lines, "Enter: next, r: reset to stage 0, q: quit ")?.as_deref() {
            Some("r") => {
                let word = session.reset_current(&Local::now()).map_err(|e| e.to_string())?;
                println!("  reset {} to stage {}", word.id, word.stage);
            }
            Some("q") | None => return Ok(()),
            _ => {}
        }
    }
}

pub fn main() -> Result<(), String> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{}", USAGE);
        return Err("missing command".to_string());
    }
    let command = args.remove(0);

    let config = Config::from_env().map_err(|e| e.to_string())?;
    let store = SqliteStore::open(&config.database_path).map_err(|e| e.to_string())?;
    let owner = config.owner_id.as_str();
    let now = Local::now();
    info!("Running {} for {}", command, owner);

    match command.as_str() {
        "add" => {
            let group = take_flag(&mut args, "--group");
            let pronunciation = take_flag(&mut args, "--pronunciation");
            let example = take_flag(&mut args, "--example");
            let [front, back] = args.as_slice() else {
                return Err(USAGE.to_string());
            };
            let word = NewWord::fresh(front, back, now.timestamp_millis())
                .map_err(|e| e.to_string())?
                .with_group(group.as_deref())
                .with_pronunciation(pronunciation.as_deref())
                .with_example(example.as_deref());
            let id = store.create(owner, word).map_err(|e| e.to_string())?;
            println!("Added {}", id);
        }
        "edit" => {
            let patch = WordPatch {
                front: take_flag(&mut args, "--front"),
                back: take_flag(&mut args, "--back"),
                group_id: take_flag(&mut args, "--group")
                    .map(|g| Some(g).filter(|g| g != words::DEFAULT_GROUP_ID)),
                ..WordPatch::default()
            };
            let id = args.first().ok_or(USAGE)?;
            store.update(owner, id, &patch).map_err(|e| e.to_string())?;
            println!("Updated {}", id);
        }
        "list" => {
            let all = store.list(owner).map_err(|e| e.to_string())?;
            let query = args.join(" ");
            let hits = words::search(&all, &query);
            let hits: Vec<_> = words::newest_first(&all)
                .into_iter()
                .filter(|w| hits.iter().any(|h| h.id == w.id))
                .collect();
            for word in hits {
                println!(
                    "{}  {} / {}  stage {}  next {}",
                    word.id,
                    word.front,
                    word.back,
                    word.stage,
                    describe_due(word.next_review_date)
                );
            }
        }
        "delete" => {
            let id = args.first().ok_or(USAGE)?;
            store.delete(owner, id).map_err(|e| e.to_string())?;
            println!("Deleted {}", id);
        }
        "groups" => {
            let groups = store.list_groups(owner).map_err(|e| e.to_string())?;
            for group in with_default_group(groups) {
                println!("{}  {}", group.id, group.name);
            }
        }
        "group-add" => {
            let name = args.join(" ");
            if name.trim().is_empty() {
                return Err(USAGE.to_string());
            }
            let group = store
                .create_group(owner, &name, now.timestamp_millis())
                .map_err(|e| e.to_string())?;
            println!("Created group {} ({})", group.name, group.id);
        }
        "group-rename" => {
            if args.len() < 2 {
                return Err(USAGE.to_string());
            }
            let id = args.remove(0);
            store.rename_group(owner, &id, &args.join(" ")).map_err(|e| e.to_string())?;
            println!("Renamed {}", id);
        }
        "import" => {
            let path = args.first().ok_or(USAGE)?;
            let report = import::import_file(&store, owner, Path::new(path), now.timestamp_millis())
                .map_err(|e| e.to_string())?;
            println!("Imported {} words, {} failed.", report.success, report.error);
        }
        "review" => {
            let group = GroupFilter::from_id(take_flag(&mut args, "--group").as_deref());
            run_review(&config, &store, group)?;
        }
        "practice" => {
            let stages = match take_flag(&mut args, "--stages") {
                Some(text) => StageFilter::parse(&text).ok_or_else(|| format!("invalid stage filter: {}", text))?,
                None => StageFilter::default(),
            };
            let group = GroupFilter::from_id(take_flag(&mut args, "--group").as_deref());
            run_practice(&config, &store, PracticeFilter { stages, group, direction: None })?;
        }
        "reset" => {
            let id = args.first().ok_or(USAGE)?;
            let scheduler = LadderScheduler::new(config.intervals().map_err(|e| e.to_string())?);
            let mut session = PracticeSession::new(owner, &store, scheduler, PracticeFilter::default());
            if let Some(journal) = journal_for(&config) {
                session = session.with_journal(journal);
            }
            session.load().map_err(|e| e.to_string())?;
            let word = session.reset(id, &now).map_err(|e| e.to_string())?;
            println!("Reset {} to stage {}", word.id, word.stage);
        }
        "stats" => {
            let all = store.list(owner).map_err(|e| e.to_string())?;
            let summary = stats::summarize(&all, &now);
            println!("Words:      {}", summary.total);
            println!("Due today:  {}", summary.due_today);
            println!("Completed:  {}", summary.completed);
            println!("Reviews:    {}", summary.total_reviews);
            println!("Accuracy:   {:.1}%", summary.accuracy);
            for (stage, count) in summary.stage_counts.iter().enumerate() {
                println!("  stage {}: {}", stage, count);
            }
        }
        other => {
            eprintln!("{}", USAGE);
            return Err(format!("unknown command: {}", other));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(lines: &[&str]) -> impl Iterator<Item = io::Result<String>> {
        lines.iter().map(|l| Ok(l.to_string())).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_reveal_ignores_stray_input() {
        let mut lines = input(&["x", "next", ""]);
        assert_eq!(wait_for_reveal(&mut lines), Ok(true));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_reveal_quits_on_q_or_eof() {
        assert_eq!(wait_for_reveal(&mut input(&["oops", "q", ""])), Ok(false));
        assert_eq!(wait_for_reveal(&mut input(&["oops"])), Ok(false));
    }

    #[test]
    fn test_take_flag() {
        let mut args: Vec<String> = ["a", "--group", "verbs", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(take_flag(&mut args, "--group"), Some("verbs".to_string()));
        assert_eq!(args, vec!["a", "b"]);
        assert_eq!(take_flag(&mut args, "--group"), None);
    }
}
