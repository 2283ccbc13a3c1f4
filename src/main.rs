//! Headless board service (default binary).
//!
//! Runs one board on a fixed 16 ms timestep and exposes it to external
//! clients through the TCP adapter. There is no local rendering or input;
//! the adapter protocol is the only surface.

use std::env;
use std::time::{Duration, Instant};

use anyhow::Result;

use tilematch::adapter::{
    build_observation, create_ack, create_error, current_timestamp_ms, Adapter, ClientCommand,
    ErrorCode, InboundPayload, OutboundMessage, SuggestedSwap, SuggestionMessage, SuggestionType,
};
use tilematch::core::{Board, ScoreBoard};
use tilematch::engine;
use tilematch::types::{BoardConfig, SelectOutcome, TICK_MS};

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

/// Session configuration from environment variables, defaulting per field.
fn config_from_env() -> BoardConfig {
    let defaults = BoardConfig::default();
    BoardConfig {
        rows: env_parse("TILEMATCH_ROWS").unwrap_or(defaults.rows),
        cols: env_parse("TILEMATCH_COLS").unwrap_or(defaults.cols),
        variant_count: env_parse("TILEMATCH_VARIANTS").unwrap_or(defaults.variant_count),
        cell_size: env_parse("TILEMATCH_CELL_SIZE").unwrap_or(defaults.cell_size),
        switch_duration_ms: env_parse("TILEMATCH_SWITCH_MS").unwrap_or(defaults.switch_duration_ms),
        fall_duration_ms: env_parse("TILEMATCH_FALL_MS").unwrap_or(defaults.fall_duration_ms),
        assemble_duration_ms: env_parse("TILEMATCH_ASSEMBLE_MS")
            .unwrap_or(defaults.assemble_duration_ms),
        win_score: env_parse("TILEMATCH_WIN_SCORE").unwrap_or(defaults.win_score),
    }
}

fn main() -> Result<()> {
    let config = config_from_env();
    let seed: u32 = env_parse("TILEMATCH_SEED").unwrap_or(1);

    let mut board = Board::new(config, seed)?;
    let mut score = ScoreBoard::new(config.win_score);

    let Some(mut adapter) = Adapter::start_from_env() else {
        println!("[Service] external control disabled via TILEMATCH_AI_DISABLED; nothing to drive");
        return Ok(());
    };

    println!(
        "[Service] board {}x{} with {} variants, seed {}, win at {}",
        config.rows, config.cols, config.variant_count, seed, config.win_score
    );

    let mut seq: u64 = 0;
    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Apply pending client commands.
        while let Some(inbound) = adapter.try_recv() {
            match inbound.payload {
                InboundPayload::SnapshotRequest => {
                    seq += 1;
                    let obs = build_observation(&board, &score, seq, &[]);
                    adapter.send(OutboundMessage::ToClientObservation {
                        client_id: inbound.client_id,
                        obs,
                    });
                }
                InboundPayload::Command(command) => {
                    apply_command(
                        &mut board,
                        &mut score,
                        &adapter,
                        inbound.client_id,
                        inbound.seq,
                        command,
                    )?;
                }
            }
        }

        // Fixed timestep.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            board.tick(TICK_MS);
            score.tick(TICK_MS);

            let events = board.take_directives();
            if !events.is_empty() {
                for directive in &events {
                    score.apply(directive);
                }
                board.set_win_reached(score.is_win());

                seq += 1;
                let obs = build_observation(&board, &score, seq, &events);
                adapter.send(OutboundMessage::BroadcastObservation { obs });
            }
        } else {
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

/// Apply one validated client command to the board, answering with an ack,
/// an error, or a suggestion list.
fn apply_command(
    board: &mut Board,
    score: &mut ScoreBoard,
    adapter: &Adapter,
    client_id: usize,
    seq: u64,
    command: ClientCommand,
) -> Result<()> {
    match command {
        ClientCommand::Swap { from, to } => {
            let first = board.select(from);
            let second = if first == SelectOutcome::Ignored {
                SelectOutcome::Ignored
            } else {
                board.select(to)
            };
            if second == SelectOutcome::SwapStarted {
                adapter.send(OutboundMessage::ToClientAck {
                    client_id,
                    ack: create_ack(seq),
                });
            } else {
                adapter.send(OutboundMessage::ToClientError {
                    client_id,
                    err: create_error(seq, ErrorCode::InvalidSwap, "Swap not accepted"),
                });
            }
        }
        ClientCommand::Select { at } => {
            if board.select(at) == SelectOutcome::Ignored {
                adapter.send(OutboundMessage::ToClientError {
                    client_id,
                    err: create_error(seq, ErrorCode::InvalidCommand, "Selection ignored"),
                });
            } else {
                adapter.send(OutboundMessage::ToClientAck {
                    client_id,
                    ack: create_ack(seq),
                });
            }
        }
        ClientCommand::Restart => {
            board.restart()?;
            *score = ScoreBoard::new(board.config().win_score);
            board.set_win_reached(false);
            adapter.send(OutboundMessage::ToClientAck {
                client_id,
                ack: create_ack(seq),
            });
            let obs = build_observation(board, score, seq, &[]);
            adapter.send(OutboundMessage::BroadcastObservation { obs });
        }
        ClientCommand::Suggest => {
            let swaps = engine::find_swaps(board.grid())
                .into_iter()
                .map(|hint| SuggestedSwap {
                    from: [hint.from.row, hint.from.col],
                    to: [hint.to.row, hint.to.col],
                    effect: hint.effect.as_str().to_string(),
                })
                .collect();
            adapter.send(OutboundMessage::ToClientSuggestion {
                client_id,
                msg: SuggestionMessage {
                    msg_type: SuggestionType::Suggestion,
                    seq,
                    ts: current_timestamp_ms(),
                    swaps,
                },
            });
        }
    }
    Ok(())
}
