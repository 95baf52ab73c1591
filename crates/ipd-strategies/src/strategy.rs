//! Strategy definitions and execution

use std::fmt;
use std::str::FromStr;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::action::{Action, Attitude};
use crate::context::MatchContext;
use crate::error::StrategyError;
use crate::state::{Advance, StrategyState, Streak};

/// Base strategy type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Always cooperate, never defect.
    AlwaysCooperate,
    /// Always defect, never cooperate.
    AlwaysDefect,
    /// Copy opponent's last move. Start with cooperate.
    TitForTat,
    /// Tit-for-Tat but start with defect.
    SuspiciousTitForTat,
    /// Defect only if opponent defected twice in a row.
    TitForTwoTats,
    /// Tit-for-Tat that sometimes lets a defection go.
    GenerousTitForTat,
    /// Cooperate until opponent defects once, then always defect.
    GrimTrigger,
    /// Win-stay, lose-switch.
    Pavlov,
    /// Random choice each round.
    Random,
    /// Retaliate with increasing defection streaks, then calm down.
    Gradual,
    /// Fixed punishment after a run of opponent defections.
    Punisher,
    /// Tit-for-Tat with scheduled forgiveness.
    PeriodicForgiver,
    /// Cooperate while the opponent's recent cooperation rate is high enough.
    ThresholdCooperator,
    /// Tit-for-Tat that defects through the final rounds.
    EndgameDefector,
    /// Tit-for-Tat unless falling too far behind on score.
    ScoreGuard,
    /// Probe with D, C, C and exploit unconditional cooperators.
    Prober,
    /// Breaks mutual defection with a truce; a broken truce is never forgiven.
    ForgivingGrudger,
    /// Follow the opponent's majority move over a recent window.
    MajorityRule,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 18] = [
        StrategyKind::AlwaysCooperate,
        StrategyKind::AlwaysDefect,
        StrategyKind::TitForTat,
        StrategyKind::SuspiciousTitForTat,
        StrategyKind::TitForTwoTats,
        StrategyKind::GenerousTitForTat,
        StrategyKind::GrimTrigger,
        StrategyKind::Pavlov,
        StrategyKind::Random,
        StrategyKind::Gradual,
        StrategyKind::Punisher,
        StrategyKind::PeriodicForgiver,
        StrategyKind::ThresholdCooperator,
        StrategyKind::EndgameDefector,
        StrategyKind::ScoreGuard,
        StrategyKind::Prober,
        StrategyKind::ForgivingGrudger,
        StrategyKind::MajorityRule,
    ];

    /// Stable identifier, identical to the serialized form
    pub fn id(self) -> &'static str {
        match self {
            StrategyKind::AlwaysCooperate => "AlwaysCooperate",
            StrategyKind::AlwaysDefect => "AlwaysDefect",
            StrategyKind::TitForTat => "TitForTat",
            StrategyKind::SuspiciousTitForTat => "SuspiciousTitForTat",
            StrategyKind::TitForTwoTats => "TitForTwoTats",
            StrategyKind::GenerousTitForTat => "GenerousTitForTat",
            StrategyKind::GrimTrigger => "GrimTrigger",
            StrategyKind::Pavlov => "Pavlov",
            StrategyKind::Random => "Random",
            StrategyKind::Gradual => "Gradual",
            StrategyKind::Punisher => "Punisher",
            StrategyKind::PeriodicForgiver => "PeriodicForgiver",
            StrategyKind::ThresholdCooperator => "ThresholdCooperator",
            StrategyKind::EndgameDefector => "EndgameDefector",
            StrategyKind::ScoreGuard => "ScoreGuard",
            StrategyKind::Prober => "Prober",
            StrategyKind::ForgivingGrudger => "ForgivingGrudger",
            StrategyKind::MajorityRule => "MajorityRule",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StrategyKind::AlwaysCooperate => "Always Cooperate",
            StrategyKind::AlwaysDefect => "Always Defect",
            StrategyKind::TitForTat => "Tit for Tat",
            StrategyKind::SuspiciousTitForTat => "Suspicious Tit for Tat",
            StrategyKind::TitForTwoTats => "Tit for Two Tats",
            StrategyKind::GenerousTitForTat => "Generous Tit for Tat",
            StrategyKind::GrimTrigger => "Grim Trigger",
            StrategyKind::Pavlov => "Pavlov",
            StrategyKind::Random => "Random",
            StrategyKind::Gradual => "Gradual",
            StrategyKind::Punisher => "Punisher",
            StrategyKind::PeriodicForgiver => "Periodic Forgiver",
            StrategyKind::ThresholdCooperator => "Threshold Cooperator",
            StrategyKind::EndgameDefector => "Endgame Defector",
            StrategyKind::ScoreGuard => "Score Guard",
            StrategyKind::Prober => "Prober",
            StrategyKind::ForgivingGrudger => "Forgiving Grudger",
            StrategyKind::MajorityRule => "Majority Rule",
        }
    }

    /// Static classification label
    pub fn attitude(self) -> Attitude {
        match self {
            StrategyKind::AlwaysCooperate
            | StrategyKind::TitForTat
            | StrategyKind::TitForTwoTats
            | StrategyKind::GenerousTitForTat
            | StrategyKind::PeriodicForgiver
            | StrategyKind::ThresholdCooperator
            | StrategyKind::ForgivingGrudger => Attitude::Cooperative,
            StrategyKind::AlwaysDefect
            | StrategyKind::SuspiciousTitForTat
            | StrategyKind::Punisher
            | StrategyKind::EndgameDefector
            | StrategyKind::Prober => Attitude::Aggressive,
            StrategyKind::GrimTrigger
            | StrategyKind::Pavlov
            | StrategyKind::Random
            | StrategyKind::Gradual
            | StrategyKind::ScoreGuard
            | StrategyKind::MajorityRule => Attitude::Neutral,
        }
    }

    /// Move played in round 0
    pub fn opening(self) -> Action {
        match self {
            StrategyKind::AlwaysDefect
            | StrategyKind::SuspiciousTitForTat
            | StrategyKind::Prober => Action::Defect,
            _ => Action::Cooperate,
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            StrategyKind::AlwaysCooperate => "Never defects. Always cooperates.",
            StrategyKind::AlwaysDefect => "Never cooperates. Always defects.",
            StrategyKind::TitForTat => "Copies opponent's last move. Starts by cooperating.",
            StrategyKind::SuspiciousTitForTat => "Like Tit for Tat, but starts with defect.",
            StrategyKind::TitForTwoTats => "Only retaliates after two consecutive defections.",
            StrategyKind::GenerousTitForTat => "Like Tit for Tat, but sometimes forgives a defection.",
            StrategyKind::GrimTrigger => "Cooperates until betrayed, then always defects.",
            StrategyKind::Pavlov => "Cooperates after matching moves, defects after mismatched ones.",
            StrategyKind::Random => "Randomly cooperates or defects each round.",
            StrategyKind::Gradual => "Retaliates with increasing severity, then calms down.",
            StrategyKind::Punisher => "Answers a run of defections with a fixed punishment.",
            StrategyKind::PeriodicForgiver => "Like Tit for Tat, but cooperates on a fixed schedule.",
            StrategyKind::ThresholdCooperator => "Cooperates while the opponent cooperates often enough.",
            StrategyKind::EndgameDefector => "Like Tit for Tat, but defects in the final rounds.",
            StrategyKind::ScoreGuard => "Like Tit for Tat, but defects while trailing on score.",
            StrategyKind::Prober => "Probes with defect, cooperate, cooperate and exploits pushovers.",
            StrategyKind::ForgivingGrudger => "Offers a truce after mutual defection; never forgives a broken one.",
            StrategyKind::MajorityRule => "Plays the opponent's majority move over recent rounds.",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| StrategyError::UnknownStrategy(s.to_string()))
    }
}

/// Strategy parameters for fine-tuning behavior
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    /// Replaces the strategy's declared opening move
    pub opening: Option<Action>,
    /// Percentage chance to cooperate after opponent defects (0-100)
    pub forgiveness: u8,
    /// Rounds of lag before reacting to an opponent's move
    pub retaliation_delay: u8,
    /// Number of defections to ignore before retaliating
    pub noise_tolerance: u8,
    /// Bias toward cooperation for Random strategy (0-100)
    pub cooperate_bias: u8,
    /// Percentage chance Generous Tit for Tat forgives (0-100)
    pub generosity: u8,
    /// Consecutive opponent defections that trigger a punishment
    pub trigger_streak: u32,
    /// Length of a fixed punishment
    pub punish_rounds: u32,
    /// Cooperative rounds after a Gradual punishment
    pub calm_rounds: u32,
    /// Rounds of mutual defection before a truce is offered
    pub truce_after: u32,
    /// Length of an offered truce
    pub forgive_rounds: u32,
    /// Cooperate unconditionally every this many rounds
    pub forgive_period: u32,
    /// Minimum opponent cooperation percentage, inclusive (0-100)
    pub cooperation_threshold: u8,
    /// Rounds looked back by windowed rules
    pub window: u32,
    /// Final rounds in which endgame rules apply
    pub endgame_rounds: u32,
    /// Score deficit tolerated before defecting
    pub score_margin: u32,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            opening: None,
            forgiveness: 0,
            retaliation_delay: 0,
            noise_tolerance: 0,
            cooperate_bias: 50,
            generosity: 10,
            trigger_streak: 3,
            punish_rounds: 5,
            calm_rounds: 2,
            truce_after: 3,
            forgive_rounds: 2,
            forgive_period: 10,
            cooperation_threshold: 60,
            window: 10,
            endgame_rounds: 10,
            score_margin: 10,
        }
    }
}

impl StrategyParams {
    /// Reject values no strategy can run with
    pub fn validate(&self) -> Result<(), StrategyError> {
        let percents = [
            ("forgiveness", self.forgiveness),
            ("cooperate_bias", self.cooperate_bias),
            ("generosity", self.generosity),
            ("cooperation_threshold", self.cooperation_threshold),
        ];
        for (name, value) in percents {
            if value > 100 {
                return Err(invalid(name, format!("{} is not a percentage", value)));
            }
        }

        let counts = [
            ("trigger_streak", self.trigger_streak),
            ("punish_rounds", self.punish_rounds),
            ("calm_rounds", self.calm_rounds),
            ("truce_after", self.truce_after),
            ("forgive_rounds", self.forgive_rounds),
            ("forgive_period", self.forgive_period),
            ("window", self.window),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(invalid(name, "must be at least 1".to_string()));
            }
        }

        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> StrategyError {
    warn!("rejecting strategy parameter {}: {}", name, reason);
    StrategyError::InvalidParameter { name, reason }
}

/// Complete strategy with base type and parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub kind: StrategyKind,
    #[serde(default)]
    pub params: StrategyParams,
}

impl Strategy {
    /// Create a new strategy with default parameters
    pub fn new(kind: StrategyKind) -> Self {
        Self {
            kind,
            params: StrategyParams::default(),
        }
    }

    /// Create with custom parameters
    pub fn with_params(kind: StrategyKind, params: StrategyParams) -> Self {
        Self { kind, params }
    }

    /// Parse and validate a strategy from JSON such as
    /// `{"kind": "Punisher", "params": {"punish_rounds": 3}}`
    pub fn from_json(json: &str) -> Result<Self, StrategyError> {
        let strategy: Strategy = serde_json::from_str(json)?;
        strategy.params.validate()?;
        Ok(strategy)
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn attitude(&self) -> Attitude {
        self.kind.attitude()
    }

    /// Declared first-round move
    pub fn opening(&self) -> Action {
        self.params.opening.unwrap_or_else(|| self.kind.opening())
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::new(StrategyKind::TitForTat)
    }
}

/// Decide one round.
///
/// Returns the move for the current round and the state to pass into the
/// next call. Total for every context whose two histories have equal length.
pub fn decide(
    strategy: &Strategy,
    state: StrategyState,
    ctx: &mut MatchContext<'_>,
) -> (Action, StrategyState) {
    if ctx.is_first_round() {
        return (strategy.opening(), StrategyState::Normal);
    }

    let params = &strategy.params;
    match strategy.kind {
        StrategyKind::AlwaysCooperate => (Action::Cooperate, state),
        StrategyKind::AlwaysDefect => (Action::Defect, state),
        StrategyKind::TitForTat => (reciprocate(ctx, params, Action::Cooperate), state),
        StrategyKind::SuspiciousTitForTat => (reciprocate(ctx, params, Action::Defect), state),
        StrategyKind::TitForTwoTats => (execute_tit_for_two_tats(ctx), state),
        StrategyKind::GenerousTitForTat => (execute_generous(ctx, params), state),
        StrategyKind::GrimTrigger => execute_grim_trigger(state, ctx, params),
        StrategyKind::Pavlov => (execute_pavlov(ctx), state),
        StrategyKind::Random => {
            let p = params.cooperate_bias as f64 / 100.0;
            (ctx.random_choice(p), state)
        }
        StrategyKind::Gradual => execute_gradual(state, ctx, params),
        StrategyKind::Punisher => execute_punisher(state, ctx, params),
        StrategyKind::PeriodicForgiver => (execute_periodic_forgiver(ctx, params), state),
        StrategyKind::ThresholdCooperator => (execute_threshold(ctx, params), state),
        StrategyKind::EndgameDefector => (execute_endgame(ctx, params), state),
        StrategyKind::ScoreGuard => (execute_score_guard(ctx, params), state),
        StrategyKind::Prober => (execute_prober(ctx), state),
        StrategyKind::ForgivingGrudger => execute_forgiving_grudger(state, ctx, params),
        StrategyKind::MajorityRule => (execute_majority(ctx, params), state),
    }
}

/// Plain Tit-for-Tat reaction to the previous round
fn copy_last(ctx: &MatchContext<'_>) -> Action {
    ctx.opponent_history().last().unwrap_or(Action::Cooperate)
}

/// Tit-for-Tat with optional lag and forgiveness.
///
/// With a delay of `d`, reacts to the opponent's move `d + 1` rounds ago;
/// `fallback` covers rounds before that move exists.
fn reciprocate(ctx: &mut MatchContext<'_>, params: &StrategyParams, fallback: Action) -> Action {
    let lag = params.retaliation_delay as usize + 1;
    match ctx.opponent_history().ago(lag) {
        None => fallback,
        Some(Action::Cooperate) => Action::Cooperate,
        Some(Action::Defect) => {
            if params.forgiveness > 0 && ctx.chance_percent(params.forgiveness) {
                Action::Cooperate
            } else {
                Action::Defect
            }
        }
    }
}

/// Tit-for-Two-Tats: Only defect if opponent defected twice in a row
fn execute_tit_for_two_tats(ctx: &MatchContext<'_>) -> Action {
    if ctx.opponent_history().trailing(Action::Defect) >= 2 {
        Action::Defect
    } else {
        Action::Cooperate
    }
}

fn execute_generous(ctx: &mut MatchContext<'_>, params: &StrategyParams) -> Action {
    match ctx.opponent_history().last() {
        Some(Action::Defect) => ctx.random_choice(params.generosity as f64 / 100.0),
        _ => Action::Cooperate,
    }
}

/// Grim Trigger: lock into defection once defections exceed the tolerance
fn execute_grim_trigger(
    state: StrategyState,
    ctx: &MatchContext<'_>,
    params: &StrategyParams,
) -> (Action, StrategyState) {
    if let Advance::Forced { action, next } = state.advance() {
        return (action, next);
    }

    let defections = ctx.opponent_history().defections();
    if defections > params.noise_tolerance as usize {
        info!(
            "Grim Trigger: locked after {} opponent defections in round {}",
            defections,
            ctx.round_index()
        );
        (Action::Defect, StrategyState::Locked)
    } else {
        (Action::Cooperate, StrategyState::Normal)
    }
}

/// Pavlov: cooperate if both players made the same move last round.
///
/// Under the usual payoff ordering this is win-stay, lose-switch.
fn execute_pavlov(ctx: &MatchContext<'_>) -> Action {
    match (ctx.own_history().last(), ctx.opponent_history().last()) {
        (Some(mine), Some(theirs)) if mine == theirs => Action::Cooperate,
        (Some(_), Some(_)) => Action::Defect,
        _ => Action::Cooperate,
    }
}

/// Gradual: the n-th opponent defection costs n defections, followed by
/// a calm phase of cooperation.
fn execute_gradual(
    state: StrategyState,
    ctx: &MatchContext<'_>,
    params: &StrategyParams,
) -> (Action, StrategyState) {
    match state.advance() {
        Advance::Forced { action, next } => (action, next),
        Advance::Finished(Streak::Punishment) => {
            debug!("Gradual: punishment over, calming for {} rounds", params.calm_rounds);
            StrategyState::forgive(params.calm_rounds)
        }
        Advance::Finished(Streak::Forgiveness) | Advance::Free => {
            let opponent = ctx.opponent_history();
            if opponent.last() == Some(Action::Defect) {
                let rounds = opponent.defections() as u32;
                debug!("Gradual: entering punishment for {} rounds", rounds);
                StrategyState::punish(rounds)
            } else {
                (Action::Cooperate, StrategyState::Normal)
            }
        }
    }
}

/// Punisher: a run of `trigger_streak` defections earns `punish_rounds`
/// defections back, otherwise Tit-for-Tat.
fn execute_punisher(
    state: StrategyState,
    ctx: &MatchContext<'_>,
    params: &StrategyParams,
) -> (Action, StrategyState) {
    if let Advance::Forced { action, next } = state.advance() {
        return (action, next);
    }

    let streak = ctx.opponent_history().trailing(Action::Defect);
    if streak >= params.trigger_streak as usize {
        debug!(
            "Punisher: {} consecutive defections, entering punishment for {} rounds",
            streak, params.punish_rounds
        );
        StrategyState::punish(params.punish_rounds)
    } else {
        (copy_last(ctx), StrategyState::Normal)
    }
}

fn execute_periodic_forgiver(ctx: &MatchContext<'_>, params: &StrategyParams) -> Action {
    let round = ctx.round_index();
    if round > 0 && round % params.forgive_period.max(1) == 0 {
        return Action::Cooperate;
    }
    copy_last(ctx)
}

fn execute_threshold(ctx: &MatchContext<'_>, params: &StrategyParams) -> Action {
    let recent = ctx.opponent_history().recent(params.window as usize);
    if recent.cooperation_at_least(params.cooperation_threshold) {
        Action::Cooperate
    } else {
        Action::Defect
    }
}

/// Endgame rule applies only when the match length is known
fn execute_endgame(ctx: &MatchContext<'_>, params: &StrategyParams) -> Action {
    if ctx.in_final_rounds(params.endgame_rounds) {
        return Action::Defect;
    }
    copy_last(ctx)
}

fn execute_score_guard(ctx: &MatchContext<'_>, params: &StrategyParams) -> Action {
    if ctx.score_lead() < -(params.score_margin as i64) {
        return Action::Defect;
    }
    copy_last(ctx)
}

/// Prober: D, C, C, then defect forever against an opponent that
/// cooperated through both probes, Tit-for-Tat otherwise.
fn execute_prober(ctx: &MatchContext<'_>) -> Action {
    let opponent = ctx.opponent_history();
    match ctx.round_index() {
        1 | 2 => Action::Cooperate,
        _ => {
            let pushover = opponent.at(1) == Some(Action::Cooperate)
                && opponent.at(2) == Some(Action::Cooperate);
            if pushover {
                Action::Defect
            } else {
                copy_last(ctx)
            }
        }
    }
}

/// Forgiving Grudger: Tit-for-Tat that offers a truce after `truce_after`
/// rounds of mutual defection. An opponent that answers any truce
/// cooperation with a defection is locked out for good.
fn execute_forgiving_grudger(
    state: StrategyState,
    ctx: &MatchContext<'_>,
    params: &StrategyParams,
) -> (Action, StrategyState) {
    if let StrategyState::Forgiving { rounds_left } = state {
        // Opponent moves played after our first truce cooperation. The move
        // made alongside it is simultaneous, not an answer.
        let answers = params.forgive_rounds.saturating_sub(rounds_left.saturating_add(1)) as usize;
        if ctx.opponent_history().recent(answers).defections() > 0 {
            info!(
                "Forgiving Grudger: truce broken in round {}, locking",
                ctx.round_index()
            );
            return (Action::Defect, StrategyState::Locked);
        }
    }

    match state.advance() {
        Advance::Forced { action, next } => return (action, next),
        Advance::Finished(_) | Advance::Free => {}
    }

    let truce_after = params.truce_after as usize;
    let mutual = ctx.own_history().trailing(Action::Defect) >= truce_after
        && ctx.opponent_history().trailing(Action::Defect) >= truce_after;
    if mutual {
        debug!("Forgiving Grudger: offering a {} round truce", params.forgive_rounds);
        StrategyState::forgive(params.forgive_rounds)
    } else {
        (copy_last(ctx), StrategyState::Normal)
    }
}

fn execute_majority(ctx: &MatchContext<'_>, params: &StrategyParams) -> Action {
    let recent = ctx.opponent_history().recent(params.window as usize);
    if recent.cooperation_at_least(50) {
        Action::Cooperate
    } else {
        Action::Defect
    }
}

/// Get a human-readable description of a strategy
pub fn describe_strategy(strategy: &Strategy) -> String {
    let mut desc = strategy.kind.summary().to_string();
    let params = &strategy.params;

    if let Some(opening) = params.opening {
        if opening != strategy.kind.opening() {
            desc.push_str(&format!(" Opens with {:?}.", opening));
        }
    }

    let reciprocal = matches!(
        strategy.kind,
        StrategyKind::TitForTat | StrategyKind::SuspiciousTitForTat
    );
    if reciprocal && params.forgiveness > 0 {
        desc.push_str(&format!(" {}% chance to forgive.", params.forgiveness));
    }

    if reciprocal && params.retaliation_delay > 0 {
        desc.push_str(&format!(" Reacts {} rounds late.", params.retaliation_delay));
    }

    if params.noise_tolerance > 0 && strategy.kind == StrategyKind::GrimTrigger {
        desc.push_str(&format!(" Tolerates {} accidental defections.", params.noise_tolerance));
    }

    match strategy.kind {
        StrategyKind::Random => {
            desc.push_str(&format!(" Cooperates {}% of the time.", params.cooperate_bias));
        }
        StrategyKind::GenerousTitForTat => {
            desc.push_str(&format!(" Forgives {}% of defections.", params.generosity));
        }
        StrategyKind::Punisher => {
            desc.push_str(&format!(
                " {} defections in a row cost {} rounds of defection.",
                params.trigger_streak, params.punish_rounds
            ));
        }
        StrategyKind::PeriodicForgiver => {
            desc.push_str(&format!(" Forgives every {} rounds.", params.forgive_period));
        }
        StrategyKind::ThresholdCooperator => {
            desc.push_str(&format!(
                " Needs {}% cooperation over the last {} rounds.",
                params.cooperation_threshold, params.window
            ));
        }
        StrategyKind::EndgameDefector => {
            desc.push_str(&format!(" Defects in the last {} rounds.", params.endgame_rounds));
        }
        StrategyKind::ScoreGuard => {
            desc.push_str(&format!(" Tolerates trailing by {} points.", params.score_margin));
        }
        _ => {}
    }

    desc
}
