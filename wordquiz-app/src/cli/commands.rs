use crate::cli::opts::*;

use anyhow::{bail, Result};
use chrono::Utc;
use rand::thread_rng;
use std::io::{stdin, stdout, Write};
use std::path::{Path, PathBuf};
use wordquiz_core::{
    build_queue, category_of, counters_drift, daily_streak, is_stale, sort_by_priority,
    summarize, word_priority, wordbook_hash, GradeValue, ProgressRepository, ProgressStore,
    QuizSession, SessionPhase, SessionRecord, SessionSummary, Word, Wordbook, MS_PER_DAY,
    STALE_AFTER_DAYS,
};
use wordquiz_json::settings::{load_settings, save_settings, Settings};
use wordquiz_json::{paths, JsonStore};

pub async fn run_cli(args: Cli) -> Result<()> {
    let root = args.data_dir.clone().unwrap_or_else(paths::data_root);
    let settings = load_settings(&root);
    let (file, backups) = paths::store_file_in(&root);
    let repo = JsonStore::open_with(file, backups, 10).await?;

    match args.cmd {
        Command::Quiz(cmd) => quiz_cmd(&repo, &settings, cmd).await,
        Command::Words(cmd) => words_cmd(&repo, cmd).await,
        Command::Stats(cmd) => stats_cmd(&repo, cmd).await,
        Command::Books => books_cmd(&repo).await,
        Command::Settings(cmd) => settings_cmd(&root, settings, cmd),
        Command::Reset(cmd) => reset_cmd(&repo, cmd).await,
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Reads a 2-3 column CSV wordbook: question,answer[,reading]. Malformed
/// rows are skipped with a warning, never fatal.
fn load_wordbook(path: &Path) -> Result<(String, Vec<Word>)> {
    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("wordbook")
        .to_string();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut words = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let question = rec.get(0).unwrap_or("").to_string();
        let answer = rec.get(1).unwrap_or("").to_string();
        if question.is_empty() || answer.is_empty() {
            tracing::warn!("skipping malformed row {} in {}", i + 1, path.display());
            continue;
        }
        let reading = rec.get(2).map(|s| s.to_string()).filter(|s| !s.is_empty());
        words.push(Word {
            question,
            answer,
            reading,
        });
    }
    Ok((title, words))
}

async fn quiz_cmd(repo: &JsonStore, settings: &Settings, cmd: QuizCmd) -> Result<()> {
    let (title, words) = load_wordbook(&cmd.file)?;
    if words.is_empty() {
        bail!("no usable rows in {}", cmd.file.display());
    }
    let hash = wordbook_hash(&words);
    let book = repo.get_wordbook(&hash).await?;

    let new_quota = cmd
        .new
        .or_else(|| book.as_ref().and_then(|b| b.new_quota))
        .unwrap_or(settings.new_word_count);
    let review_quota = cmd
        .review
        .or_else(|| book.as_ref().and_then(|b| b.review_quota))
        .unwrap_or(settings.review_word_count);

    let mut store = repo.load_progress(&hash).await?;
    let queue = build_queue(
        &words,
        &store,
        new_quota,
        review_quota,
        now_ms(),
        &mut thread_rng(),
    );
    if queue.is_empty() {
        println!("nothing to study in {title}");
        return Ok(());
    }

    let mut session = QuizSession::new();
    session.start(queue, new_quota + review_quota, now_ms())?;

    while session.phase() == SessionPhase::InProgress {
        let Some(word) = session.current_word().cloned() else {
            break;
        };
        let (pos, total) = session.position();
        println!("\n[{pos}/{total}] {}", word.question);
        prompt_enter("[enter=show answer]")?;
        println!("A: {}", word.answer);
        if let Some(r) = &word.reading {
            println!("reading: {r}");
        }
        println!("[1=again, 2=hard, 3=normal, 4=easy, m=memo, m <text>=save memo, q=quit]");
        let grade = loop {
            let line = read_line("grade> ")?;
            let line = line.trim();
            match line {
                "1" | "again" => break Some(GradeValue::Again),
                "2" | "hard" => break Some(GradeValue::Hard),
                "3" | "normal" => break Some(GradeValue::Normal),
                "4" | "easy" => break Some(GradeValue::Easy),
                "q" | "quit" => break None,
                "m" | "memo" => {
                    match store.get(&word.question).and_then(|p| p.memo.as_deref()) {
                        Some(m) => println!("memo: {m}"),
                        None => println!("no memo"),
                    }
                }
                _ if line.starts_with("m ") => {
                    store.ensure(&word.question).memo = Some(line[2..].trim().to_string());
                    if let Err(e) = repo.save_progress(&hash, &store).await {
                        tracing::warn!("saving memo failed: {e}");
                    }
                    println!("memo saved");
                }
                _ => println!("enter 1/2/3/4, m, or q"),
            }
        };

        let Some(grade) = grade else {
            session.abandon()?;
            println!("session abandoned; grades already recorded are kept");
            return Ok(());
        };

        session.grade_word(&mut store, grade, now_ms())?;
        // the session keeps its in-memory view even if the durable write
        // fails; the next save retries the full store
        if let Err(e) = repo.save_progress(&hash, &store).await {
            tracing::warn!("progress save failed: {e}");
        }
    }

    if let Some(summary) = session.summary().cloned() {
        print_summary(&summary);
        let record = SessionRecord::from_summary(&hash, &title, &summary);
        repo.record_session(&record).await?;

        let mut book = book.unwrap_or_else(|| Wordbook::new(&title, &hash, words.len()));
        book.title = title.clone();
        book.word_count = words.len();
        book.last_studied_ms = Some(summary.ended_at_ms);
        // quotas passed explicitly become the book's own defaults
        if cmd.new.is_some() {
            book.new_quota = cmd.new;
        }
        if cmd.review.is_some() {
            book.review_quota = cmd.review;
        }
        repo.upsert_wordbook(&book).await?;
    }
    Ok(())
}

fn print_summary(summary: &SessionSummary) {
    println!("\n=== session complete ===");
    println!("time: {}s", summary.elapsed_ms() / 1000);
    println!("planned questions: {}", summary.planned_count);
    println!("correct: {}", summary.correct_count);
    println!("still missed: {}", summary.wrong_count);
    if let Some(t) = &summary.slowest {
        println!("slowest: {} ({}s)", t.question, t.elapsed_ms / 1000);
    }
    if let Some(m) = &summary.most_missed {
        println!("most missed: {} ({}x)", m.question, m.count);
    }
}

async fn words_cmd(repo: &JsonStore, cmd: WordsCmd) -> Result<()> {
    let (title, words) = load_wordbook(&cmd.file)?;
    let hash = wordbook_hash(&words);
    let store = repo.load_progress(&hash).await?;
    let now = now_ms();

    println!("{title} ({} words, hash {hash})", words.len());
    for word in sort_by_priority(&words, &store) {
        let priority = word_priority(&word, &store);
        let category = category_of(priority);
        match store.get(&word.question) {
            Some(p) => {
                let age_days = p
                    .last_attempt_ms()
                    .map(|last| (now - last) / MS_PER_DAY)
                    .unwrap_or(0);
                let stale = if is_stale(p, now, STALE_AFTER_DAYS) {
                    " stale"
                } else {
                    ""
                };
                let drift = if counters_drift(p) { " counters-drift" } else { "" };
                println!(
                    "{:.4}\t{} ({})\tcorrect={} wrong={}\tlast seen {}d ago{}{}\t{}",
                    priority,
                    category,
                    category.range_label(),
                    p.correct,
                    p.wrong,
                    age_days,
                    stale,
                    drift,
                    word.question
                );
            }
            None => {
                println!(
                    "{:.4}\t{} ({})\tnew\t{}",
                    priority,
                    category,
                    category.range_label(),
                    word.question
                );
            }
        }
    }
    Ok(())
}

async fn stats_cmd(repo: &JsonStore, cmd: StatsCmd) -> Result<()> {
    let (scope_hash, stores): (Option<String>, Vec<ProgressStore>) = match &cmd.file {
        Some(path) => {
            let (_, words) = load_wordbook(path)?;
            let hash = wordbook_hash(&words);
            let store = repo.load_progress(&hash).await?;
            (Some(hash), vec![store])
        }
        None => {
            let mut stores = Vec::new();
            for book in repo.list_wordbooks().await? {
                stores.push(repo.load_progress(&book.hash).await?);
            }
            (None, stores)
        }
    };

    let mut combined = ProgressStore::new();
    for store in &stores {
        for (key, progress) in store.iter() {
            *combined.ensure(key) = progress.clone();
        }
    }

    let summary = summarize(&combined);
    println!(
        "attempts: {} (again={} hard={} normal={} easy={})",
        summary.totals.total,
        summary.totals.again,
        summary.totals.hard,
        summary.totals.normal,
        summary.totals.easy
    );
    println!("accuracy: {:.0}%", summary.totals.accuracy() * 100.0);
    println!(
        "study streak: {} day(s)",
        daily_streak(&combined, Utc::now().date_naive())
    );

    let mut sessions = repo.list_sessions(scope_hash.as_deref()).await?;
    sessions.sort_by_key(|s| s.started_at_ms);
    if !sessions.is_empty() {
        println!("\nrecent sessions:");
        for s in sessions.iter().rev().take(cmd.sessions) {
            println!(
                "{}\t{}\t{}q\t{} correct\t{} missed\t{}m\t{:.0}s/q",
                wordquiz_core::date_of_ms(s.started_at_ms)
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "?".into()),
                s.title,
                s.planned_count,
                s.correct_count,
                s.wrong_count,
                s.duration_ms() / 60_000,
                s.average_answer_secs()
            );
        }
    }
    Ok(())
}

async fn books_cmd(repo: &JsonStore) -> Result<()> {
    let mut books = repo.list_wordbooks().await?;
    books.sort_by_key(|b| b.created_at);
    if books.is_empty() {
        println!("no wordbooks yet; run `wordquiz quiz <file.csv>`");
        return Ok(());
    }
    for b in books {
        let last = b
            .last_studied_ms
            .and_then(wordquiz_core::date_of_ms)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "{}\t{} words\tlast studied {}\thash {}",
            b.title, b.word_count, last, b.hash
        );
    }
    Ok(())
}

fn settings_cmd(root: &PathBuf, mut settings: Settings, cmd: SettingsCmd) -> Result<()> {
    if cmd.new.is_none() && cmd.review.is_none() {
        println!("data dir: {}", root.display());
        println!("new words per session: {}", settings.new_word_count);
        println!("review words per session: {}", settings.review_word_count);
        return Ok(());
    }
    if let Some(n) = cmd.new {
        settings.new_word_count = n;
    }
    if let Some(r) = cmd.review {
        settings.review_word_count = r;
    }
    save_settings(root, &settings)?;
    println!("ok");
    Ok(())
}

async fn reset_cmd(repo: &JsonStore, cmd: ResetCmd) -> Result<()> {
    let (title, words) = load_wordbook(&cmd.file)?;
    let hash = wordbook_hash(&words);
    if !cmd.yes {
        let line = read_line(&format!("delete all progress for {title}? [y/N] "))?;
        if !matches!(line.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("aborted");
            return Ok(());
        }
    }
    repo.delete_progress(&hash).await?;
    println!("ok");
    Ok(())
}

// ===== Helpers =====
fn prompt_enter(label: &str) -> Result<()> { print!("{label}"); stdout().flush().ok(); let mut s = String::new(); stdin().read_line(&mut s)?; Ok(()) }
fn read_line(prompt: &str) -> Result<String> { print!("{prompt}"); stdout().flush().ok(); let mut s = String::new(); stdin().read_line(&mut s)?; Ok(s) }
