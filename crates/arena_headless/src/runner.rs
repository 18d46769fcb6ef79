//! Interactive encounter runner.
//!
//! Drives an [`Encounter`] over a JSON-lines channel. One side is played by
//! the remote controller; the other is driven by the built-in AI.

use std::io::{self, BufRead, Write};

use arena_core::ai::AiController;
use arena_core::combatant::{CombatantId, Side};
use arena_core::encounter::Encounter;
use arena_core::error::CombatError;
use arena_core::report::CombatEvent;
use arena_core::resolution::{valid_targets, Action};
use arena_core::rng::RandomSource;
use thiserror::Error;
use tracing::{debug, info};

use crate::protocol::{Command, Response, SkillOption};
use crate::render::CombatLog;

/// Errors that end a session.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Reading commands or writing responses failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// The engine rejected a step.
    #[error(transparent)]
    Core(#[from] CombatError),
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The encounter finished.
    Finished,
    /// The controller sent `quit`.
    Quit,
    /// Input closed before the encounter finished.
    InputClosed,
}

/// Configuration for the interactive runner.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name reported in `ready`.
    pub scenario: String,
    /// Seed reported in `ready`.
    pub seed: u64,
    /// Side played by the controller.
    pub player_side: Side,
}

/// One interactive encounter.
pub struct PlaySession<R> {
    encounter: Encounter<R>,
    config: SessionConfig,
    log: CombatLog,
    emitted: usize,
    last_round: Option<u32>,
}

impl<R: RandomSource> PlaySession<R> {
    /// Wrap an encounter that has not started yet.
    #[must_use]
    pub fn new(encounter: Encounter<R>, config: SessionConfig) -> Self {
        let log = CombatLog::new(encounter.roster());
        Self {
            encounter,
            config,
            log,
            emitted: 0,
            last_round: None,
        }
    }

    /// The wrapped encounter.
    #[must_use]
    pub const fn encounter(&self) -> &Encounter<R> {
        &self.encounter
    }

    /// Run until the encounter ends, the controller quits or input closes.
    ///
    /// # Errors
    ///
    /// Returns IO errors from either stream, or engine errors from steps
    /// driven by the AI.
    pub fn run(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<SessionEnd, RunnerError> {
        send(
            output,
            &Response::ready(
                &self.config.scenario,
                self.config.seed,
                self.config.player_side,
            ),
        )?;

        while !self.encounter.is_over() {
            let Some(actor) = self.player_decision() else {
                self.encounter.advance(&mut AiController)?;
                continue;
            };

            self.flush_events(output)?;
            send(output, &self.decision(actor))?;
            match self.read_decision(actor, input, output)? {
                Some(end) => return Ok(end),
                None => continue,
            }
        }

        self.flush_events(output)?;
        let report = self.encounter.report()?;
        info!(outcome = %report.outcome, rounds = report.rounds_played(), "Session finished");
        send(
            output,
            &Response::GameOver {
                outcome: report.outcome,
                rounds: report.rounds_played(),
                survivors: report
                    .survivors_a
                    .iter()
                    .chain(&report.survivors_b)
                    .cloned()
                    .collect(),
                leveling: report.leveling,
            },
        )?;
        send(output, &Response::Bye)?;
        Ok(SessionEnd::Finished)
    }

    fn player_decision(&self) -> Option<CombatantId> {
        let player = self.config.player_side;
        self.encounter
            .awaiting_decision()
            .filter(|id| self.encounter.combatant(*id).map(|c| c.side()) == Some(player))
    }

    /// Read commands until one consumes the turn.
    ///
    /// Returns `Some` when the session should end.
    fn read_decision(
        &mut self,
        actor: CombatantId,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<Option<SessionEnd>, RunnerError> {
        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                debug!("Input closed");
                return Ok(Some(SessionEnd::InputClosed));
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let command = match Command::from_json(trimmed) {
                Ok(command) => command,
                Err(e) => {
                    send(output, &Response::error(format!("Invalid command: {e}"), None))?;
                    continue;
                }
            };
            let name = command.name();
            debug!(cmd = name, actor = %actor, "Command received");

            let result = match command {
                Command::Act {
                    skill_id,
                    target,
                    secondary,
                } => {
                    let action = Action::new(skill_id, CombatantId(target))
                        .with_secondary(secondary.map(CombatantId));
                    self.encounter.submit(Some(action))
                }
                Command::Pass => self.encounter.submit(None),
                Command::Auto => self.encounter.advance(&mut AiController).map(|_| ()),
                Command::Query => {
                    send(output, &self.state())?;
                    continue;
                }
                Command::Quit => {
                    send(output, &Response::Bye)?;
                    return Ok(Some(SessionEnd::Quit));
                }
            };

            match result {
                Ok(()) => return Ok(None),
                Err(e) => send(output, &Response::error(e.to_string(), Some(name)))?,
            }
        }
    }

    fn decision(&self, actor: CombatantId) -> Response {
        let view = self.encounter.view(actor);
        let options = view
            .usable_skills()
            .into_iter()
            .map(|skill| SkillOption {
                skill_id: skill.id.clone(),
                name: skill.name.clone(),
                cost: skill.cost,
                targets: valid_targets(self.encounter.roster(), actor, skill)
                    .into_iter()
                    .map(|id| id.0)
                    .collect(),
            })
            .collect();
        Response::Decision {
            round: self.encounter.round(),
            actor: actor.0,
            name: view.actor().name().to_string(),
            options,
        }
    }

    fn state(&self) -> Response {
        Response::State {
            round: self.encounter.round(),
            phase: self.encounter.phase(),
            combatants: self
                .encounter
                .roster()
                .iter()
                .map(arena_core::combatant::CombatantState::snapshot)
                .collect(),
        }
    }

    /// Send every event recorded since the last flush.
    fn flush_events(&mut self, output: &mut impl Write) -> Result<(), RunnerError> {
        let rounds = self
            .encounter
            .rounds()
            .iter()
            .chain(self.encounter.current_round());

        let mut events: Vec<CombatEvent> = Vec::new();
        let mut log = Vec::new();
        let mut seen = 0;
        for round in rounds {
            for event in &round.events {
                if seen >= self.emitted {
                    if self.last_round != Some(round.round) {
                        log.push(format!("=== Round {} ===", round.round));
                        self.last_round = Some(round.round);
                    }
                    log.push(self.log.render_event(event));
                    events.push(event.clone());
                }
                seen += 1;
            }
        }
        self.emitted = seen;

        if events.is_empty() {
            return Ok(());
        }
        send(output, &Response::Events { events, log })?;
        Ok(())
    }
}

fn send(output: &mut impl Write, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::report::Outcome;
    use arena_core::rng::SeededRandom;
    use arena_test_utils::fixtures::{krieger_vs_goblin, GOBLIN};
    use std::io::Cursor;

    fn session(seed: u64) -> PlaySession<SeededRandom> {
        PlaySession::new(
            krieger_vs_goblin(SeededRandom::new(seed)),
            SessionConfig {
                scenario: "Duel".to_string(),
                seed,
                player_side: Side::A,
            },
        )
    }

    fn responses(output: &[u8]) -> Vec<Response> {
        String::from_utf8_lossy(output)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_session_starts_with_ready_and_prompts() {
        let mut session = session(1);
        let mut input = Cursor::new(b"{\"cmd\":\"quit\"}\n".to_vec());
        let mut output = Vec::new();

        let end = session.run(&mut input, &mut output).unwrap();
        assert_eq!(end, SessionEnd::Quit);

        let responses = responses(&output);
        assert!(matches!(responses[0], Response::Ready { .. }));
        let decision = responses
            .iter()
            .find_map(|r| match r {
                Response::Decision { actor, options, .. } => Some((*actor, options.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(decision.0, 0);
        let strike = decision
            .1
            .iter()
            .find(|o| o.skill_id == "basic_strike_phys")
            .unwrap();
        assert_eq!(strike.targets, vec![GOBLIN.0]);
        assert_eq!(responses.last(), Some(&Response::Bye));
    }

    #[test]
    fn test_bad_commands_reprompt() {
        let mut session = session(2);
        let script = concat!(
            "not json\n",
            "{\"cmd\":\"act\",\"skill_id\":\"fireball\",\"target\":1}\n",
            "{\"cmd\":\"query\"}\n",
            "{\"cmd\":\"quit\"}\n",
        );
        let mut input = Cursor::new(script.as_bytes().to_vec());
        let mut output = Vec::new();
        session.run(&mut input, &mut output).unwrap();

        let responses = responses(&output);
        let errors = responses
            .iter()
            .filter(|r| matches!(r, Response::Error { .. }))
            .count();
        assert_eq!(errors, 2);
        assert!(responses
            .iter()
            .any(|r| matches!(r, Response::State { combatants, .. } if combatants.len() == 2)));
    }

    #[test]
    fn test_auto_plays_to_game_over() {
        let mut session = session(3);
        let script = "{\"cmd\":\"auto\"}\n".repeat(200);
        let mut input = Cursor::new(script.into_bytes());
        let mut output = Vec::new();

        let end = session.run(&mut input, &mut output).unwrap();
        assert_eq!(end, SessionEnd::Finished);
        let responses = responses(&output);
        assert!(responses.iter().any(|r| matches!(
            r,
            Response::GameOver { outcome, .. } if *outcome != Outcome::Draw
        )));
        assert_eq!(responses.last(), Some(&Response::Bye));
    }

    #[test]
    fn test_closed_input_ends_session() {
        let mut session = session(4);
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        assert_eq!(
            session.run(&mut input, &mut output).unwrap(),
            SessionEnd::InputClosed
        );
        assert!(!session.encounter().is_over());
    }
}
