//! Turn and scoring state machine
//!
//! Owns the whole game session: who is swinging, the recorded scores, the
//! one-/two-player mode and the handover between players. Every transition
//! takes `now_ms` explicitly and returns an immutable [`Snapshot`], so the
//! front-end renders from value state and never reaches into the machine.
//!
//! Misuse (stopping while not swinging, the wrong player's trigger) is an
//! ignored no-op, never an error: the machine has no failure surface.

use serde::Serialize;

use super::oscillator::Oscillator;
use super::scoring::score;
use crate::consts::{DEFAULT_ADVANCE_DELAY_MS, DEFAULT_PERIOD_MS, MAX_SCORE, PERFECT_ANGLE_DEG};

/// One- or two-player session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    Single,
    TwoPlayer,
}

/// Player identity, doubling as the score slot index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Player::One => "Player 1",
            Player::Two => "Player 2",
        }
    }
}

/// The two discrete stop actions.
///
/// Which trigger may stop the needle is this machine's contract, not the
/// input layer's: in two-player mode `Left` belongs to Player 1 and `Right`
/// to Player 2, while in single-player mode either one stops the swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopTrigger {
    Left,
    Right,
}

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// No round started (or just reset)
    Idle,
    /// Needle moving, waiting for the active player's stop
    Swinging,
    /// Two-player only: brief pause before Player 2's swing starts
    AwaitingNextPlayer,
    /// Score(s) recorded, waiting for a restart
    RoundComplete,
}

/// Outcome of a finished two-player round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Winner {
    PlayerOne,
    PlayerTwo,
    Tie,
}

impl Winner {
    fn from_scores(p1: u32, p2: u32) -> Self {
        match p1.cmp(&p2) {
            std::cmp::Ordering::Greater => Winner::PlayerOne,
            std::cmp::Ordering::Less => Winner::PlayerTwo,
            std::cmp::Ordering::Equal => Winner::Tie,
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Winner::PlayerOne => "P1 wins",
            Winner::PlayerTwo => "P2 wins",
            Winner::Tie => "tie",
        }
    }
}

/// Session tunables
#[derive(Debug, Clone, Copy)]
pub struct SwingConfig {
    /// Full back-and-forth swing period, ms
    pub period_ms: f64,
    /// Two-player handover delay before Player 2's swing, ms
    pub advance_delay_ms: f64,
}

impl Default for SwingConfig {
    fn default() -> Self {
        Self {
            period_ms: DEFAULT_PERIOD_MS,
            advance_delay_ms: DEFAULT_ADVANCE_DELAY_MS,
        }
    }
}

/// Deferred player handover, honored only while `epoch` still matches
#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    at_ms: f64,
    epoch: u64,
}

/// Immutable observable state, rebuilt after every transition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub mode: Mode,
    pub active_player: Player,
    pub scores: [Option<u32>; 2],
    pub winner: Option<Winner>,
    /// Last recorded score hit the center exactly
    pub perfect: bool,
    pub is_swinging: bool,
    pub stop_enabled: bool,
    pub restart_visible: bool,
    pub score_text: String,
    pub turn_text: String,
    pub winner_text: String,
}

/// The turn/scoring state machine
#[derive(Debug, Clone)]
pub struct Controller {
    config: SwingConfig,
    phase: Phase,
    mode: Mode,
    active_player: Player,
    scores: [Option<u32>; 2],
    winner: Option<Winner>,
    /// Live swing while `phase == Swinging`, `None` otherwise
    swing: Option<Oscillator>,
    /// Where the needle froze after the last stop
    stopped_angle: Option<f32>,
    pending_advance: Option<PendingAdvance>,
    /// Bumped on every externally visible transition; invalidates any
    /// handover (or host-side callback) scheduled under an older value
    epoch: u64,
}

impl Controller {
    pub fn new(config: SwingConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            mode: Mode::Single,
            active_player: Player::One,
            scores: [None, None],
            winner: None,
            swing: None,
            stopped_angle: None,
            pending_advance: None,
            epoch: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Current epoch, for hosts that schedule their own deferred callbacks.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current needle angle for rendering: live while swinging, frozen at
    /// the stopped angle afterwards, resting at the center otherwise.
    pub fn angle_at(&self, now_ms: f64) -> f32 {
        match &self.swing {
            Some(swing) => swing.angle_at(now_ms),
            None => self.stopped_angle.unwrap_or(PERFECT_ANGLE_DEG),
        }
    }

    /// Begin a round. Valid from `Idle` or `RoundComplete`; ignored elsewhere.
    pub fn start(&mut self, now_ms: f64) -> Snapshot {
        match self.phase {
            Phase::Idle | Phase::RoundComplete => {
                self.epoch += 1;
                self.scores = [None, None];
                self.winner = None;
                self.active_player = Player::One;
                self.pending_advance = None;
                self.begin_swing(now_ms);
                log::info!("round started ({:?})", self.mode);
            }
            _ => log::debug!("start ignored in {:?}", self.phase),
        }
        self.snapshot()
    }

    fn begin_swing(&mut self, now_ms: f64) {
        self.swing = Some(Oscillator::new(now_ms, self.config.period_ms));
        self.stopped_angle = None;
        self.phase = Phase::Swinging;
    }

    /// Stop the needle. Only acts while swinging and only for the trigger
    /// assigned to the active player; anything else is an ignored no-op.
    pub fn stop(&mut self, trigger: StopTrigger, now_ms: f64) -> Snapshot {
        if self.phase != Phase::Swinging {
            log::debug!("stop ignored in {:?}", self.phase);
            return self.snapshot();
        }
        if !self.trigger_matches(trigger) {
            log::debug!(
                "stop ignored: {:?} is not {}'s trigger",
                trigger,
                self.active_player.label()
            );
            return self.snapshot();
        }
        let Some(swing) = self.swing.take() else {
            // Unreachable while Swinging; treated as the same no-op
            return self.snapshot();
        };

        let angle = swing.angle_at(now_ms);
        let points = score(angle);
        self.stopped_angle = Some(angle);
        self.scores[self.active_player.index()] = Some(points);
        self.epoch += 1;
        log::info!(
            "{} stopped at {:.1}° for {} points",
            self.active_player.label(),
            angle,
            points
        );

        match (self.mode, self.active_player) {
            (Mode::Single, _) => self.phase = Phase::RoundComplete,
            (Mode::TwoPlayer, Player::One) => {
                self.phase = Phase::AwaitingNextPlayer;
                self.pending_advance = Some(PendingAdvance {
                    at_ms: now_ms + self.config.advance_delay_ms,
                    epoch: self.epoch,
                });
            }
            (Mode::TwoPlayer, Player::Two) => {
                self.phase = Phase::RoundComplete;
                let p1 = self.scores[0].unwrap_or(0);
                self.winner = Some(Winner::from_scores(p1, points));
            }
        }
        self.snapshot()
    }

    fn trigger_matches(&self, trigger: StopTrigger) -> bool {
        match self.mode {
            Mode::Single => true,
            Mode::TwoPlayer => match self.active_player {
                Player::One => trigger == StopTrigger::Left,
                Player::Two => trigger == StopTrigger::Right,
            },
        }
    }

    /// Drive deferred work; call once per host frame.
    ///
    /// A handover scheduled before a reset or mode toggle carries a stale
    /// epoch and is dropped without acting.
    pub fn tick(&mut self, now_ms: f64) -> Snapshot {
        if self.phase == Phase::AwaitingNextPlayer {
            if let Some(pending) = self.pending_advance {
                if pending.epoch != self.epoch {
                    log::debug!(
                        "dropping stale handover (epoch {} != {})",
                        pending.epoch,
                        self.epoch
                    );
                    self.pending_advance = None;
                } else if now_ms >= pending.at_ms {
                    self.pending_advance = None;
                    self.active_player = Player::Two;
                    self.epoch += 1;
                    self.begin_swing(now_ms);
                    log::info!("handover: {} swinging", self.active_player.label());
                }
            }
        }
        self.snapshot()
    }

    /// Flip one-/two-player. Always forces a full reset: an in-flight swing
    /// is cancelled and scores are cleared.
    pub fn toggle_mode(&mut self, _now_ms: f64) -> Snapshot {
        self.mode = match self.mode {
            Mode::Single => Mode::TwoPlayer,
            Mode::TwoPlayer => Mode::Single,
        };
        log::info!("mode -> {:?}", self.mode);
        self.reset_session()
    }

    /// Back to `Idle` with everything cleared. Idempotent: consecutive
    /// resets yield identical snapshots.
    pub fn reset(&mut self, _now_ms: f64) -> Snapshot {
        self.reset_session()
    }

    fn reset_session(&mut self) -> Snapshot {
        self.epoch += 1;
        self.phase = Phase::Idle;
        self.active_player = Player::One;
        self.scores = [None, None];
        self.winner = None;
        self.swing = None;
        self.stopped_angle = None;
        self.pending_advance = None;
        self.snapshot()
    }

    /// Build the observable state for the front-end.
    pub fn snapshot(&self) -> Snapshot {
        let is_swinging = self.phase == Phase::Swinging;
        // The active player flips only at handover, so after a stop this
        // slot still holds the score just recorded.
        let last_score = match self.phase {
            Phase::AwaitingNextPlayer | Phase::RoundComplete => {
                self.scores[self.active_player.index()]
            }
            _ => None,
        };
        let perfect = last_score == Some(MAX_SCORE);

        let score_text = match (self.mode, self.phase) {
            (Mode::TwoPlayer, Phase::RoundComplete) => format!(
                "P1: {}  P2: {}",
                self.scores[0].unwrap_or(0),
                self.scores[1].unwrap_or(0)
            ),
            _ => match last_score {
                Some(s) if perfect => format!("Score: {} (perfect!)", s),
                Some(s) => format!("Score: {}", s),
                None => String::new(),
            },
        };

        let turn_text = match self.mode {
            Mode::Single => String::new(),
            Mode::TwoPlayer => match self.phase {
                Phase::RoundComplete => String::new(),
                Phase::AwaitingNextPlayer => format!("{}'s turn", Player::Two.label()),
                _ => format!("{}'s turn", self.active_player.label()),
            },
        };

        let winner_text = self
            .winner
            .map(|w| w.text().to_string())
            .unwrap_or_default();

        Snapshot {
            phase: self.phase,
            mode: self.mode,
            active_player: self.active_player,
            scores: self.scores,
            winner: self.winner,
            perfect,
            is_swinging,
            stop_enabled: is_swinging,
            restart_visible: self.phase == Phase::RoundComplete,
            score_text,
            turn_text,
            winner_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctl() -> Controller {
        Controller::new(SwingConfig {
            period_ms: 1800.0,
            advance_delay_ms: 1000.0,
        })
    }

    fn two_player() -> Controller {
        let mut c = ctl();
        c.toggle_mode(0.0);
        c
    }

    #[test]
    fn single_player_quarter_period_scores_zero() {
        let mut c = ctl();
        c.start(0.0);
        // Quarter period: sin(π/2) puts the needle at the 180° extreme
        let snap = c.stop(StopTrigger::Left, 450.0);
        assert_eq!(snap.phase, Phase::RoundComplete);
        assert_eq!(snap.scores, [Some(0), None]);
        assert_eq!(snap.score_text, "Score: 0");
        assert!(!snap.perfect);
        assert!(snap.restart_visible);
    }

    #[test]
    fn single_player_perfect_stop() {
        let mut c = ctl();
        c.start(0.0);
        let snap = c.stop(StopTrigger::Right, 900.0); // half period = back at center
        assert_eq!(snap.scores[0], Some(100));
        assert!(snap.perfect);
        assert_eq!(snap.score_text, "Score: 100 (perfect!)");
    }

    #[test]
    fn stop_outside_swinging_is_noop() {
        let mut c = ctl();
        let before = c.snapshot();
        let after = c.stop(StopTrigger::Left, 500.0);
        assert_eq!(before, after);
        assert_eq!(after.phase, Phase::Idle);
    }

    #[test]
    fn start_ignored_mid_swing() {
        let mut c = ctl();
        c.start(0.0);
        c.start(100.0); // must not restart the oscillator
        assert!((c.angle_at(450.0) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn needle_freezes_after_stop() {
        let mut c = ctl();
        c.start(0.0);
        c.stop(StopTrigger::Left, 450.0);
        assert!((c.angle_at(1000.0) - 180.0).abs() < 1e-3);
        assert!((c.angle_at(9999.0) - 180.0).abs() < 1e-3);
    }

    #[test]
    fn two_player_full_round() {
        let mut c = two_player();
        assert_eq!(c.snapshot().turn_text, "Player 1's turn");

        c.start(0.0);
        let snap = c.stop(StopTrigger::Left, 900.0); // center, 100 points
        assert_eq!(snap.phase, Phase::AwaitingNextPlayer);
        assert_eq!(snap.turn_text, "Player 2's turn");

        // Stops during the handover delay are not swings yet
        let snap = c.stop(StopTrigger::Right, 1200.0);
        assert_eq!(snap.phase, Phase::AwaitingNextPlayer);
        assert_eq!(snap.scores[1], None);

        // Delay not elapsed
        let snap = c.tick(1500.0);
        assert_eq!(snap.phase, Phase::AwaitingNextPlayer);

        // Delay elapsed: Player 2 swings
        let snap = c.tick(1900.0);
        assert_eq!(snap.phase, Phase::Swinging);
        assert_eq!(snap.active_player, Player::Two);
        assert_eq!(snap.turn_text, "Player 2's turn");

        // Player 1's trigger no longer stops anything
        let snap = c.stop(StopTrigger::Left, 2000.0);
        assert!(snap.is_swinging);

        // 150 ms in: sin(π/6) puts the needle at 135°, 50 points
        let snap = c.stop(StopTrigger::Right, 2050.0);
        assert_eq!(snap.phase, Phase::RoundComplete);
        assert_eq!(snap.scores, [Some(100), Some(50)]);
        assert_eq!(snap.winner, Some(Winner::PlayerOne));
        assert_eq!(snap.winner_text, "P1 wins");
        assert_eq!(snap.score_text, "P1: 100  P2: 50");
    }

    #[test]
    fn two_player_wrong_trigger_rejected_for_player_one() {
        let mut c = two_player();
        c.start(0.0);
        let snap = c.stop(StopTrigger::Right, 450.0);
        assert!(snap.is_swinging);
        assert_eq!(snap.scores, [None, None]);
    }

    #[test]
    fn two_player_tie() {
        let mut c = two_player();
        c.start(0.0);
        c.stop(StopTrigger::Left, 900.0);
        c.tick(1900.0);
        let snap = c.stop(StopTrigger::Right, 1900.0 + 900.0);
        assert_eq!(snap.winner, Some(Winner::Tie));
        assert_eq!(snap.winner_text, "tie");
    }

    #[test]
    fn two_player_p2_wins() {
        let mut c = two_player();
        c.start(0.0);
        c.stop(StopTrigger::Left, 450.0); // 180°, 0 points
        c.tick(1450.0);
        let snap = c.stop(StopTrigger::Right, 1450.0 + 900.0); // center, 100
        assert_eq!(snap.winner, Some(Winner::PlayerTwo));
        assert_eq!(snap.winner_text, "P2 wins");
    }

    #[test]
    fn reset_is_idempotent() {
        let mut c = two_player();
        c.start(0.0);
        c.stop(StopTrigger::Left, 450.0);
        let once = c.reset(500.0);
        let twice = c.reset(600.0);
        assert_eq!(once, twice);
        assert_eq!(once.phase, Phase::Idle);
        assert_eq!(once.scores, [None, None]);
        assert_eq!(once.turn_text, "Player 1's turn");
    }

    #[test]
    fn reset_cancels_pending_handover() {
        let mut c = two_player();
        c.start(0.0);
        c.stop(StopTrigger::Left, 900.0);
        c.reset(1000.0);
        // Well past the original handover target: nothing may start
        let snap = c.tick(5000.0);
        assert_eq!(snap.phase, Phase::Idle);
        assert!(!snap.is_swinging);
    }

    #[test]
    fn mode_toggle_mid_swing_cancels_and_clears() {
        let mut c = ctl();
        c.start(0.0);
        let snap = c.toggle_mode(300.0);
        assert_eq!(snap.mode, Mode::TwoPlayer);
        assert_eq!(snap.phase, Phase::Idle);
        assert!(!snap.is_swinging);
        assert_eq!(snap.scores, [None, None]);
        assert_eq!(snap.turn_text, "Player 1's turn");
    }

    #[test]
    fn mode_toggle_during_handover_cancels_advance() {
        let mut c = two_player();
        c.start(0.0);
        c.stop(StopTrigger::Left, 900.0);
        c.toggle_mode(1000.0); // back to single-player
        let snap = c.tick(5000.0);
        assert_eq!(snap.mode, Mode::Single);
        assert_eq!(snap.phase, Phase::Idle);
    }

    #[test]
    fn restart_after_round_clears_scores() {
        let mut c = ctl();
        c.start(0.0);
        c.stop(StopTrigger::Left, 450.0);
        let snap = c.start(1000.0);
        assert_eq!(snap.phase, Phase::Swinging);
        assert_eq!(snap.scores, [None, None]);
        assert!(snap.score_text.is_empty());
    }

    #[test]
    fn single_player_accepts_either_trigger() {
        let mut c = ctl();
        c.start(0.0);
        let snap = c.stop(StopTrigger::Right, 900.0);
        assert_eq!(snap.phase, Phase::RoundComplete);

        c.start(2000.0);
        let snap = c.stop(StopTrigger::Left, 2900.0);
        assert_eq!(snap.phase, Phase::RoundComplete);
    }

    #[test]
    fn stop_button_state_follows_phase() {
        let mut c = two_player();
        assert!(!c.snapshot().stop_enabled);
        c.start(0.0);
        assert!(c.snapshot().stop_enabled);
        c.stop(StopTrigger::Left, 900.0);
        assert!(!c.snapshot().stop_enabled);
        c.tick(1900.0);
        assert!(c.snapshot().stop_enabled);
    }
}
