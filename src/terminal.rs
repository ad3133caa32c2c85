//! Line-oriented terminal front end.
//!
//! Only renders what the core produces; every rule lives in the session,
//! the ledger and the leaderboard. Reads and writes go through tokio's
//! async I/O so a waiting prompt never parks a runtime worker.

use std::time::Instant;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

use crate::db::{ScoreRecord, ScoreStore};
use crate::{GameSession, GuessResult, MAX_NUMBER, MIN_NUMBER, Reconciliation, RoundReport, RoundService};

const QUIT: &str = "q";

/// Formats the champion banner.
pub fn render_champion(champion: Option<&ScoreRecord>) -> String {
    match champion {
        Some(record) => format!(
            "Current champion: {} ({} attempts, {:.2}s)",
            record.player_name(),
            record.attempts(),
            record.time_seconds()
        ),
        None => "No records yet. Be the first champion!".to_string(),
    }
}

/// Formats the post-round summary.
pub fn render_report(report: &RoundReport) -> String {
    let mut lines = vec![format!(
        "{} wins! {} attempts in {:.2}s.",
        report.player(),
        report.score().attempts(),
        report.score().time_seconds()
    )];

    match (report.reconciliation(), report.storage_error()) {
        (Some(Reconciliation::Inserted), _) => lines.push("First record saved.".to_string()),
        (Some(Reconciliation::Updated), _) => lines.push("New personal best saved!".to_string()),
        (Some(Reconciliation::Unchanged), _) => {
            lines.push("Your previous record is still better.".to_string())
        }
        (None, Some(e)) => lines.push(format!("Could not save the result: {}", e.message)),
        (None, None) => {}
    }

    if report.is_champion() {
        lines.push("You hold the overall best!".to_string());
    }
    lines.push(render_champion(report.champion().as_ref()));
    lines.join("\n")
}

async fn read_line<R: AsyncBufRead + Unpin>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line).await? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

async fn prompt<R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin>(
    input: &mut R,
    output: &mut W,
    text: &str,
) -> Result<Option<String>> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    read_line(input).await
}

/// Asks for a player name until a non-blank one arrives. `None` on EOF.
#[instrument(skip_all)]
async fn ask_name<S: ScoreStore, R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin>(
    service: &RoundService<S>,
    input: &mut R,
    output: &mut W,
) -> Result<Option<String>> {
    loop {
        let Some(name) = prompt(input, output, "Player name: ").await? else {
            return Ok(None);
        };
        if name.is_empty() {
            continue;
        }
        match service.is_existing_player(&name).await {
            Ok(true) => {
                let greeting = format!("Welcome back, {}. Try to beat your record!", name);
                say(output, &greeting).await?
            }
            Ok(false) => say(output, &format!("New player: {}.", name)).await?,
            Err(e) => warn!(error = %e, "Player lookup failed"),
        }
        return Ok(Some(name));
    }
}

/// Plays rounds until the player quits or input ends.
#[instrument(skip(service, input, output))]
pub async fn play<S: ScoreStore, R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin>(
    service: &RoundService<S>,
    name: Option<String>,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    say(output, &render_champion(service.champion().await.as_ref())).await?;

    let name = match name {
        Some(name) => name,
        None => match ask_name(service, input, output).await? {
            Some(name) => name,
            None => return Ok(()),
        },
    };

    loop {
        let mut session = service.start_round(&name)?;
        debug!(event = ?session.started_event(), "Round started");
        let intro = format!(
            "Guess the number between {} and {}. Type '{}' to give up.",
            MIN_NUMBER, MAX_NUMBER, QUIT
        );
        say(output, &intro).await?;
        if let Some(champion) = service.champion().await {
            let goal = format!("Beat the record: fewer than {} attempts!", champion.attempts());
            say(output, &goal).await?;
        }

        if !play_round(service, &mut session, input, output).await? {
            session.abandon();
            return Ok(());
        }

        let again = prompt(input, output, "Play again? [y/N] ").await?;
        if !matches!(again.as_deref(), Some("y" | "Y" | "yes")) {
            info!("Player left");
            return Ok(());
        }
    }
}

/// Drives one round. Returns `false` when input ended mid-round.
async fn play_round<S: ScoreStore, R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin>(
    service: &RoundService<S>,
    session: &mut GameSession,
    input: &mut R,
    output: &mut W,
) -> Result<bool> {
    loop {
        let label = format!(
            "[{} tries, {}s] Guess: ",
            session.attempts(),
            session.elapsed_whole_seconds(Instant::now())
        );
        let Some(raw) = prompt(input, output, &label).await? else {
            return Ok(false);
        };
        if raw.eq_ignore_ascii_case(QUIT) {
            say(output, "Round abandoned.").await?;
            session.clone().abandon();
            return Ok(true);
        }

        let outcome = match session.submit_guess(&raw) {
            Ok(outcome) => outcome,
            Err(e) if e.is_input_error() => {
                say(output, &e.to_string()).await?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        say(output, outcome.entry().result.hint()).await?;
        if outcome.entry().result != GuessResult::Correct {
            continue;
        }

        if let Some(target) = session.revealed_target() {
            say(output, &format!("The number was {}.", target.value())).await?;
        }
        let report = service.complete_round(session).await?;
        say(output, &render_report(&report)).await?;
        return Ok(true);
    }
}

/// Prints the champion.
pub async fn show_champion<S: ScoreStore, W: AsyncWrite + Unpin>(
    service: &RoundService<S>,
    output: &mut W,
) -> Result<()> {
    let champion = service.leaderboard().best_overall().await?;
    say(output, &render_champion(champion.as_ref())).await?;
    Ok(())
}

/// Prints a player's record, if any.
pub async fn lookup<S: ScoreStore, W: AsyncWrite + Unpin>(
    service: &RoundService<S>,
    name: &str,
    output: &mut W,
) -> Result<()> {
    let line = match service.player_record(name).await? {
        Some(record) => format!(
            "{} is a registered player. Best: {} attempts in {:.2}s.",
            record.player_name(),
            record.attempts(),
            record.time_seconds()
        ),
        None => format!("No record for '{}'.", name.trim()),
    };
    say(output, &line).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryScoreStore;
    use crate::{PlayerName, ReconcileStrategy, Score, ScoreLedger};
    use std::io::Cursor;
    use std::sync::Arc;

    fn every_number() -> String {
        (MIN_NUMBER..=MAX_NUMBER)
            .map(|n| format!("{n}\n"))
            .collect()
    }

    #[tokio::test]
    async fn test_play_round_to_win_and_store() {
        let store = Arc::new(MemoryScoreStore::new());
        let service = RoundService::new(Arc::clone(&store), ReconcileStrategy::default());
        let mut input = Cursor::new(format!("{}n\n", every_number()));
        let mut output = Vec::new();

        play(&service, Some("Ann".to_string()), &mut input, &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Correct!"));
        assert!(text.contains("First record saved."));
        let ann = PlayerName::new("Ann").unwrap();
        assert!(store.find_by_player(&ann).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_quit_writes_nothing() {
        let store = Arc::new(MemoryScoreStore::new());
        let service = RoundService::new(Arc::clone(&store), ReconcileStrategy::default());
        let mut input = Cursor::new("q\nn\n");
        let mut output = Vec::new();

        play(&service, Some("Bo".to_string()), &mut input, &mut output)
            .await
            .unwrap();

        assert!(String::from_utf8(output).unwrap().contains("Round abandoned."));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_input_is_reported() {
        let store = Arc::new(MemoryScoreStore::new());
        let service = RoundService::new(store, ReconcileStrategy::default());
        let mut input = Cursor::new("abc\n150\n");
        let mut output = Vec::new();

        play(&service, Some("Cy".to_string()), &mut input, &mut output)
            .await
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("'abc' is not a number"));
        assert!(text.contains("'150' is not a number"));
    }

    #[tokio::test]
    async fn test_lookup_and_champion() {
        let store = Arc::new(MemoryScoreStore::new());
        let ledger = ScoreLedger::new(Arc::clone(&store), ReconcileStrategy::default());
        ledger
            .reconcile(&PlayerName::new("Ann").unwrap(), Score::new(3, 12.5))
            .await
            .unwrap();
        let service = RoundService::new(store, ReconcileStrategy::default());

        let mut output = Vec::new();
        lookup(&service, " Ann ", &mut output).await.unwrap();
        lookup(&service, "Zed", &mut output).await.unwrap();
        show_champion(&service, &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Ann is a registered player. Best: 3 attempts in 12.50s."));
        assert!(text.contains("No record for 'Zed'."));
        assert!(text.contains("Current champion: Ann (3 attempts, 12.50s)"));
    }

    #[tokio::test]
    async fn test_prompts_wait_on_async_input() {
        let service = RoundService::new(Arc::new(MemoryScoreStore::new()), ReconcileStrategy::default());
        let (mut keyboard, terminal_side) = tokio::io::duplex(64);
        let mut input = tokio::io::BufReader::new(terminal_side);
        let mut output = Vec::new();

        let typist = tokio::spawn(async move {
            for line in ["Dee\n", "q\n", "n\n"] {
                tokio::task::yield_now().await;
                keyboard.write_all(line.as_bytes()).await.unwrap();
            }
        });

        play(&service, None, &mut input, &mut output).await.unwrap();
        typist.await.unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Player name: New player: Dee."));
        assert!(text.contains("Round abandoned."));
    }
}
