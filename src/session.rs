//! Request boundary
//!
//! A `Session` owns everything one front end needs between requests: the
//! simulator, the history store, the RNG and the game in progress. Taking a
//! shot needs `&mut self`, so shots within a session never interleave.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::Coordinate;
use crate::error::{SessionError, SettingsError, ShotError};
use crate::game::{Game, Seat, new_rack};
use crate::persistence::{GameId, ShotHistory, ShotId, ShotRecord};
use crate::renderer::{animation_svg, frame_id, table_svg};
use crate::settings::Settings;
use crate::sim::{CompletedShot, EventStepper, PhysicsEngine, ShotOutcome, ShotSimulator, Table};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartRequest {
    pub p1: String,
    pub p2: String,
    pub game: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartResponse {
    /// Name of the player to break
    pub current: String,
    /// Groups are never assigned at the start
    pub low: Option<String>,
}

/// Cue ball velocity
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ShotRequest {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotResponse {
    /// Simulated seconds, or -1 when the shot was abandoned
    pub elapsed: f64,
    /// Group ids inside `animation`, in play order
    pub frames: Vec<String>,
    pub sunk: Vec<u8>,
    /// Who shoots next; the winner once the game is over
    pub current: String,
    pub winner: Option<String>,
    /// Owner of balls 1-7, once assigned
    pub low: Option<String>,
    pub ongoing: bool,
    /// History row of the shot; absent when abandoned
    pub shot_id: Option<ShotId>,
    /// Animation document for the frames
    #[serde(skip)]
    pub animation: String,
}

#[derive(Debug, Clone)]
struct ActiveGame {
    id: GameId,
    game: Game,
    table: Table,
    current: Seat,
}

impl ActiveGame {
    fn low(&self) -> Option<String> {
        self.game
            .low_owner()
            .map(|seat| self.game.player(seat).to_string())
    }

    /// Response for a shot that changed nothing
    fn abandoned(&self) -> ShotResponse {
        ShotResponse {
            elapsed: -1.0,
            frames: Vec::new(),
            sunk: Vec::new(),
            current: self.game.player(self.current).to_string(),
            winner: None,
            low: self.low(),
            ongoing: true,
            shot_id: None,
            animation: String::new(),
        }
    }
}

pub struct Session<H, E = EventStepper> {
    settings: Settings,
    simulator: ShotSimulator<E>,
    history: H,
    rng: Pcg32,
    active: Option<ActiveGame>,
}

impl<H: ShotHistory> Session<H> {
    /// Session running the native engine with `settings`
    pub fn new(settings: Settings, history: H) -> Result<Self, SettingsError> {
        let engine = EventStepper::new(settings.physics);
        Self::with_engine(settings, history, engine)
    }
}

impl<H: ShotHistory, E: PhysicsEngine> Session<H, E> {
    /// Fails if `settings` would stall or break a shot
    pub fn with_engine(settings: Settings, history: H, engine: E) -> Result<Self, SettingsError> {
        settings.validate()?;
        let seed = settings.seed.unwrap_or_else(rand::random);
        log::info!("Session seeded with {seed}");
        Ok(Self {
            simulator: ShotSimulator::with_limits(engine, settings.frame_rate, settings.max_events),
            settings,
            history,
            rng: Pcg32::seed_from_u64(seed),
            active: None,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn game(&self) -> Option<&Game> {
        self.active.as_ref().map(|active| &active.game)
    }

    pub fn game_id(&self) -> Option<GameId> {
        self.active.as_ref().map(|active| active.id)
    }

    /// Table the next shot will be played from
    pub fn table(&self) -> Option<&Table> {
        self.active.as_ref().map(|active| &active.table)
    }

    /// Player due to shoot
    pub fn current_player(&self) -> Option<&str> {
        self.active
            .as_ref()
            .map(|active| active.game.player(active.current))
    }

    /// The current table as a document with the cue ball tagged
    pub fn table_svg(&self) -> Option<String> {
        self.table().map(|table| table_svg(table, true))
    }

    /// Start a new game, replacing any game in progress.
    pub fn start_game(&mut self, request: &StartRequest) -> Result<StartResponse, SessionError> {
        let (p1, p2) = (request.p1.trim(), request.p2.trim());
        if p1.is_empty() || p2.is_empty() {
            return Err(SessionError::InvalidPlayers("player names must not be empty".into()));
        }
        if p1 == p2 {
            return Err(SessionError::InvalidPlayers(format!("both players are named {p1}")));
        }

        let table = new_rack(&mut self.rng, self.settings.rack_nudge)?;
        let id = self.history.record_game(&request.game, [p1, p2])?;
        let current = Seat::toss(&mut self.rng);
        let game = Game::new(request.game.as_str(), p1, p2);
        log::info!("Game {} ({id}): {p1} vs {p2}, {} breaks", game.name, game.player(current));

        let response = StartResponse {
            current: game.player(current).to_string(),
            low: None,
        };
        if let Some(previous) = self.active.replace(ActiveGame {
            id,
            game,
            table,
            current,
        }) {
            log::info!("Abandoned game {} ({})", previous.game.name, previous.id);
        }
        Ok(response)
    }

    /// Strike the cue ball for the current player.
    ///
    /// An abandoned shot leaves the game exactly as it was. A completed shot
    /// is stored before the turn is resolved; if storing fails the game is
    /// also left untouched.
    pub fn take_shot(&mut self, request: ShotRequest) -> Result<ShotResponse, SessionError> {
        let active = self.active.as_mut().ok_or(SessionError::NoActiveGame)?;
        if active.game.is_over() {
            return Err(SessionError::GameOver);
        }

        let velocity = Coordinate::new(request.x, request.y);
        let shot = match self.simulator.simulate(&active.table, velocity) {
            Ok(ShotOutcome::Completed(shot)) => shot,
            Ok(ShotOutcome::Aborted { events, .. }) => {
                log::warn!(
                    "Shot by {} abandoned after {events} events",
                    active.game.player(active.current)
                );
                return Ok(active.abandoned());
            }
            Err(ShotError::Physics(e)) => {
                log::warn!("Shot by {} abandoned: {e}", active.game.player(active.current));
                return Ok(active.abandoned());
            }
            Err(e) => return Err(e.into()),
        };

        let shooter = active.current;
        let shot_id = self.history.record(&ShotRecord::new(
            active.id,
            active.game.player(shooter),
            &shot.frames,
        ))?;

        let resting = shot
            .resting_table()
            .cloned()
            .unwrap_or_else(|| active.table.clone());
        let CompletedShot {
            frames,
            sunk,
            elapsed,
            ..
        } = shot;

        let mut game = active.game.clone();
        let outcome = game.resolve_shot(shooter, &sunk, &resting.balls_remaining());
        let next = outcome.next_shooter().or(outcome.winner()).unwrap_or(shooter);
        log::info!(
            "{} shot {shot_id}: sunk {sunk:?}, {:?}",
            game.player(shooter),
            outcome
        );

        active.game = game;
        active.table = resting;
        active.current = next;

        Ok(ShotResponse {
            elapsed,
            frames: (0..frames.len()).map(frame_id).collect(),
            sunk,
            current: active.game.player(next).to_string(),
            winner: outcome
                .winner()
                .map(|seat| active.game.player(seat).to_string()),
            low: active.low(),
            ongoing: !active.game.is_over(),
            shot_id: Some(shot_id),
            animation: animation_svg(&frames),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HistoryError, PhysicsError};
    use crate::persistence::{MemoryHistory, TableId};
    use crate::sim::{Ball, PhysicsParams};

    /// Drops the listed balls and stops everything else in one event
    struct SinkingEngine {
        sink: Vec<u8>,
        params: PhysicsParams,
    }

    impl SinkingEngine {
        fn new(sink: &[u8]) -> Self {
            Self {
                sink: sink.to_vec(),
                params: PhysicsParams::default(),
            }
        }
    }

    impl PhysicsEngine for SinkingEngine {
        fn advance(&self, table: &Table) -> Result<Option<Table>, PhysicsError> {
            if table.rolling_count() == 0 {
                return Ok(None);
            }
            let mut next = table.without_balls();
            next.time = table.time + 0.5;
            for ball in table.balls().filter(|b| !self.sink.contains(&b.number)) {
                next.add_ball(Ball::still(ball.number, ball.pos)).unwrap();
            }
            Ok(Some(next))
        }

        fn interpolate(&self, table: &Table, dt: f64) -> Table {
            let mut rolled = table.clone();
            rolled.time = table.time + dt;
            rolled
        }

        fn params(&self) -> &PhysicsParams {
            &self.params
        }
    }

    struct BrokenEngine(PhysicsParams);

    impl PhysicsEngine for BrokenEngine {
        fn advance(&self, _table: &Table) -> Result<Option<Table>, PhysicsError> {
            Err(PhysicsError::NonFinite { number: 0, time: 0.0 })
        }

        fn interpolate(&self, table: &Table, _dt: f64) -> Table {
            table.clone()
        }

        fn params(&self) -> &PhysicsParams {
            &self.0
        }
    }

    /// Reports rest before anything moves
    struct QuietEngine(PhysicsParams);

    impl PhysicsEngine for QuietEngine {
        fn advance(&self, _table: &Table) -> Result<Option<Table>, PhysicsError> {
            Ok(None)
        }

        fn interpolate(&self, table: &Table, _dt: f64) -> Table {
            table.clone()
        }

        fn params(&self) -> &PhysicsParams {
            &self.0
        }
    }

    /// Rejects every shot
    struct FullHistory;

    impl ShotHistory for FullHistory {
        fn record_game(&mut self, _name: &str, _players: [&str; 2]) -> Result<GameId, HistoryError> {
            Ok(GameId(1))
        }

        fn record(&mut self, _shot: &ShotRecord) -> Result<ShotId, HistoryError> {
            Err(HistoryError::Corrupt("disk full".into()))
        }

        fn load(&self, id: ShotId) -> Result<Vec<Table>, HistoryError> {
            Err(HistoryError::NotFound { kind: "shot", id: id.0 })
        }

        fn load_table(&self, id: TableId) -> Result<Table, HistoryError> {
            Err(HistoryError::NotFound { kind: "table", id: id.0 })
        }

        fn shots_for_game(&self, game: GameId) -> Result<Vec<ShotId>, HistoryError> {
            Err(HistoryError::NotFound { kind: "game", id: game.0 })
        }
    }

    fn settings() -> Settings {
        Settings {
            seed: Some(11),
            ..Settings::default()
        }
    }

    fn start() -> StartRequest {
        StartRequest {
            p1: "ana".into(),
            p2: "ben".into(),
            game: "friday".into(),
        }
    }

    fn session(sink: &[u8]) -> Session<MemoryHistory, SinkingEngine> {
        let mut session =
            Session::with_engine(settings(), MemoryHistory::default(), SinkingEngine::new(sink)).unwrap();
        session.start_game(&start()).unwrap();
        session
    }

    const SHOT: ShotRequest = ShotRequest { x: 0.0, y: -1000.0 };

    #[test]
    fn test_start_game_picks_a_shooter() {
        let mut session = Session::new(settings(), MemoryHistory::default()).unwrap();
        let response = session.start_game(&start()).unwrap();
        assert!(response.current == "ana" || response.current == "ben");
        assert_eq!(response.low, None);
        assert_eq!(session.current_player(), Some(response.current.as_str()));
        assert_eq!(session.table().unwrap().ball_count(), 16);
        assert!(session.table_svg().unwrap().contains("id=\"cue\""));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["low"].is_null());
    }

    #[test]
    fn test_start_game_rejects_bad_names() {
        let mut session = Session::new(settings(), MemoryHistory::default()).unwrap();
        for (p1, p2) in [("", "ben"), ("ana", "  "), ("ana", "ana")] {
            let request = StartRequest {
                p1: p1.into(),
                p2: p2.into(),
                game: "g".into(),
            };
            assert!(matches!(session.start_game(&request), Err(SessionError::InvalidPlayers(_))));
        }
        assert!(session.game().is_none());
        assert_eq!(session.history().log().game_count(), 0);
    }

    #[test]
    fn test_shot_without_game_is_rejected() {
        let mut session = Session::new(settings(), MemoryHistory::default()).unwrap();
        assert!(matches!(session.take_shot(SHOT), Err(SessionError::NoActiveGame)));
    }

    #[test]
    fn test_first_low_ball_assigns_groups_and_shoots_again() {
        let mut session = session(&[3]);
        let shooter = session.current_player().unwrap().to_string();

        let response = session.take_shot(SHOT).unwrap();
        assert_eq!(response.sunk, vec![3]);
        assert_eq!(response.current, shooter);
        assert_eq!(response.low.as_deref(), Some(shooter.as_str()));
        assert!(response.ongoing);
        assert_eq!(response.winner, None);
        assert_eq!(response.shot_id, Some(ShotId(1)));
        assert_eq!(session.table().unwrap().ball_count(), 15);
    }

    #[test]
    fn test_empty_shot_passes_the_turn() {
        let mut session = session(&[]);
        let shooter = session.current_player().unwrap().to_string();

        let response = session.take_shot(SHOT).unwrap();
        assert!(response.sunk.is_empty());
        assert_ne!(response.current, shooter);
        assert_eq!(response.low, None);
        assert_eq!(response.elapsed, 0.5);
        assert_eq!(response.frames.len(), response.animation.matches("<g id=").count());
        assert_eq!(response.frames[0], "frame-0");
    }

    #[test]
    fn test_frames_are_stored_for_replay() {
        let mut session = session(&[12]);
        let response = session.take_shot(SHOT).unwrap();
        let frames = session.history().load(response.shot_id.unwrap()).unwrap();
        assert_eq!(frames.len(), response.frames.len());
        assert_eq!(frames.last().unwrap().ball(12), None);
    }

    #[test]
    fn test_scratch_respots_cue_and_passes() {
        let mut session = session(&[0]);
        let shooter = session.current_player().unwrap().to_string();

        let response = session.take_shot(SHOT).unwrap();
        assert_eq!(response.sunk, vec![0]);
        assert_ne!(response.current, shooter);
        assert!(session.table().unwrap().still_cue().is_some());
    }

    #[test]
    fn test_early_eight_loses_and_ends_the_game() {
        let mut session = session(&[8]);
        let shooter = session.current_player().unwrap().to_string();

        let response = session.take_shot(SHOT).unwrap();
        assert!(!response.ongoing);
        let winner = response.winner.clone().unwrap();
        assert_ne!(winner, shooter);
        assert_eq!(response.current, winner);
        assert!(matches!(session.take_shot(SHOT), Err(SessionError::GameOver)));
    }

    #[test]
    fn test_abandoned_shot_changes_nothing() {
        let mut settings = settings();
        settings.max_events = 1;
        let mut session =
            Session::with_engine(settings, MemoryHistory::default(), SinkingEngine::new(&[3])).unwrap();
        session.start_game(&start()).unwrap();
        let before = session.table().cloned();
        let shooter = session.current_player().unwrap().to_string();

        let response = session.take_shot(SHOT).unwrap();
        assert_eq!(response.elapsed, -1.0);
        assert!(response.frames.is_empty());
        assert_eq!(response.current, shooter);
        assert!(response.ongoing);
        assert_eq!(response.shot_id, None);
        assert_eq!(session.table().cloned(), before);
        assert_eq!(session.history().log().shot_count(), 0);
    }

    #[test]
    fn test_physics_failure_is_treated_as_abandoned() {
        let mut session = Session::with_engine(
            settings(),
            MemoryHistory::default(),
            BrokenEngine(PhysicsParams::default()),
        )
        .unwrap();
        session.start_game(&start()).unwrap();
        let response = session.take_shot(SHOT).unwrap();
        assert_eq!(response.elapsed, -1.0);
        assert_eq!(session.game().unwrap().low_owner(), None);
    }

    #[test]
    fn test_invalid_velocity_is_an_error() {
        let mut session = session(&[]);
        let result = session.take_shot(ShotRequest { x: f64::NAN, y: 0.0 });
        assert!(matches!(result, Err(SessionError::Shot(ShotError::InvalidVelocity { .. }))));
    }

    #[test]
    fn test_history_failure_leaves_game_untouched() {
        let mut session = Session::with_engine(settings(), FullHistory, SinkingEngine::new(&[3])).unwrap();
        session.start_game(&start()).unwrap();
        let shooter = session.current_player().unwrap().to_string();

        assert!(matches!(session.take_shot(SHOT), Err(SessionError::History(_))));
        assert_eq!(session.current_player(), Some(shooter.as_str()));
        assert_eq!(session.table().unwrap().ball_count(), 16);
        assert_eq!(session.game().unwrap().low_owner(), None);
    }

    #[test]
    fn test_motionless_shot_keeps_every_ball() {
        let mut session =
            Session::with_engine(settings(), MemoryHistory::default(), QuietEngine(PhysicsParams::default()))
                .unwrap();
        session.start_game(&start()).unwrap();
        let before = session.table().cloned();

        let response = session.take_shot(ShotRequest { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(response.frames, vec!["frame-0".to_string()]);
        assert_eq!(response.elapsed, 0.0);
        assert_eq!(session.table().cloned(), before);
        assert_eq!(session.table().unwrap().ball_count(), 16);

        // the next shooter can still play
        assert!(session.take_shot(ShotRequest { x: 0.0, y: 0.0 }).is_ok());
    }

    #[test]
    fn test_invalid_settings_are_rejected_up_front() {
        let mut zero_rate = settings();
        zero_rate.frame_rate = 0.0;
        assert!(matches!(
            Session::new(zero_rate, MemoryHistory::default()),
            Err(SettingsError::Invalid { name: "frame_rate", .. })
        ));

        let mut negative_nudge = settings();
        negative_nudge.rack_nudge = -1.0;
        assert!(matches!(
            Session::with_engine(negative_nudge, MemoryHistory::default(), SinkingEngine::new(&[])),
            Err(SettingsError::Invalid { name: "rack_nudge", .. })
        ));
    }

    #[test]
    fn test_same_seed_same_opening() {
        let mut a = Session::new(settings(), MemoryHistory::default()).unwrap();
        let mut b = Session::new(settings(), MemoryHistory::default()).unwrap();
        assert_eq!(a.start_game(&start()).unwrap(), b.start_game(&start()).unwrap());
        assert_eq!(a.table(), b.table());
    }

    #[test]
    fn test_response_serializes_without_animation() {
        let mut session = session(&[]);
        let json = serde_json::to_value(session.take_shot(SHOT).unwrap()).unwrap();
        assert!(json.get("animation").is_none());
        assert!(json["frames"].is_array());
        assert!(json["ongoing"].as_bool().unwrap());
    }
}
