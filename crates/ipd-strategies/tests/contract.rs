use ipd_strategies::{
    decide, Action, History, MatchAttributes, MatchContext, MatchLog, OpponentView, Player,
    RoundRecord, Seat, SeededRng, Strategy, StrategyKind, StrategyParams, StrategyState,
};
use proptest::prelude::*;
use proptest::strategy::Strategy as _;

use Action::{Cooperate as C, Defect as D};

fn payoffs(a: Action, b: Action) -> [u32; 2] {
    match (a, b) {
        (C, C) => [3, 3],
        (C, D) => [0, 5],
        (D, C) => [5, 0],
        (D, D) => [1, 1],
    }
}

/// Play a whole match and return the log plus seat A's state after each round
fn play(
    a: Strategy,
    b: Strategy,
    attributes: MatchAttributes,
    rounds: u32,
    match_index: u32,
) -> (MatchLog, Vec<StrategyState>) {
    let mut log = MatchLog::new(attributes, &[42u8; 32], match_index);
    let mut player_a = Player::new(a);
    let mut player_b = Player::new(b);
    let mut states = Vec::with_capacity(rounds as usize);

    for _ in 0..rounds {
        let move_a = player_a.decide(&mut log.context(Seat::A));
        let move_b = player_b.decide(&mut log.context(Seat::B));
        log.record(RoundRecord { moves: [move_a, move_b], payoffs: payoffs(move_a, move_b) });
        states.push(player_a.state());
    }

    (log, states)
}

/// Drive `strategy` against a fixed opponent script
fn against_script(strategy: Strategy, script: &[Action]) -> (Vec<Action>, Vec<StrategyState>) {
    let mut log = MatchLog::new(MatchAttributes::default(), &[9u8; 32], 0);
    let mut player = Player::new(strategy);
    let mut moves = Vec::new();
    let mut states = Vec::new();

    for theirs in script {
        let mine = player.decide(&mut log.context(Seat::A));
        log.record(RoundRecord { moves: [mine, *theirs], payoffs: payoffs(mine, *theirs) });
        moves.push(mine);
        states.push(player.state());
    }

    (moves, states)
}

fn context<'a>(
    own: &'a [Action],
    opponent: &'a [Action],
    scores: (u32, u32),
    length: Option<u32>,
) -> MatchContext<'a> {
    MatchContext::new(
        own,
        scores.0,
        OpponentView::new(opponent, scores.1),
        MatchAttributes { length, noise: 0.0 },
        SeededRng::new(&[1u8; 32], 0).for_turn(own.len() as u32, 0),
    )
}

fn action() -> impl proptest::strategy::Strategy<Value = Action> {
    prop_oneof![Just(C), Just(D)]
}

fn kind() -> impl proptest::strategy::Strategy<Value = StrategyKind> {
    (0..StrategyKind::ALL.len()).prop_map(|i| StrategyKind::ALL[i])
}

fn state() -> impl proptest::strategy::Strategy<Value = StrategyState> {
    prop_oneof![
        Just(StrategyState::Normal),
        (0u32..20).prop_map(|rounds_left| StrategyState::Punishing { rounds_left }),
        (0u32..20).prop_map(|rounds_left| StrategyState::Forgiving { rounds_left }),
        Just(StrategyState::Locked),
    ]
}

fn params() -> impl proptest::strategy::Strategy<Value = StrategyParams> {
    (0u8..=100, 0u8..5, 0u8..=100, 1u32..8, 1u32..15, 0u8..=100).prop_map(
        |(forgiveness, retaliation_delay, cooperate_bias, trigger_streak, window, threshold)| {
            StrategyParams {
                forgiveness,
                retaliation_delay,
                cooperate_bias,
                trigger_streak,
                window,
                cooperation_threshold: threshold,
                ..Default::default()
            }
        },
    )
}

proptest! {
    #[test]
    fn decide_is_total(
        kind in kind(),
        params in params(),
        state in state(),
        rounds in prop::collection::vec((action(), action()), 0..80),
        scores in (0u32..500, 0u32..500),
        length in prop::option::of(0u32..120),
    ) {
        let own: Vec<Action> = rounds.iter().map(|r| r.0).collect();
        let opponent: Vec<Action> = rounds.iter().map(|r| r.1).collect();
        let strategy = Strategy::with_params(kind, params);
        let mut ctx = context(&own, &opponent, scores, length);
        let (action, _) = decide(&strategy, state, &mut ctx);
        prop_assert!(action == C || action == D);
    }

    #[test]
    fn first_round_plays_opening(kind in kind(), state in state()) {
        let strategy = Strategy::new(kind);
        let mut ctx = context(&[], &[], (0, 0), Some(100));
        let (action, next) = decide(&strategy, state, &mut ctx);
        prop_assert_eq!(action, kind.opening());
        prop_assert_eq!(next, StrategyState::Normal);
    }

    #[test]
    fn windowed_rules_read_only_existing_rounds(window in 1u32..30, seed in any::<u8>()) {
        let strategy = Strategy::with_params(
            StrategyKind::ThresholdCooperator,
            StrategyParams { window, ..Default::default() },
        );
        let mut rng = SeededRng::new(&[seed; 32], window);
        let opponent: Vec<Action> = (0..window).map(|_| rng.choose(0.5)).collect();
        for played in 0..window as usize {
            let own = vec![C; played];
            let mut ctx = context(&own, &opponent[..played], (0, 0), None);
            let (action, _) = decide(&strategy, StrategyState::Normal, &mut ctx);
            if played > 0 {
                let expected = if History::new(&opponent[..played]).cooperation_at_least(60) { C } else { D };
                prop_assert_eq!(action, expected);
            }
        }
    }

    #[test]
    fn punishment_counts_down_then_returns_to_normal(
        punish_rounds in 1u32..12,
        trigger_streak in 1u32..5,
    ) {
        let strategy = Strategy::with_params(
            StrategyKind::Punisher,
            StrategyParams { punish_rounds, trigger_streak, ..Default::default() },
        );
        let mut script = vec![D; trigger_streak as usize];
        script.extend(vec![C; punish_rounds as usize + 5]);
        let (moves, states) = against_script(strategy, &script);

        // Punishment is entered right after the streak is observed
        let start = trigger_streak as usize;
        prop_assert_eq!(states[start], StrategyState::Punishing { rounds_left: punish_rounds - 1 });
        for i in start..start + punish_rounds as usize {
            prop_assert_eq!(moves[i], D);
        }
        for pair in states[start..].windows(2) {
            if let StrategyState::Punishing { rounds_left } = pair[0] {
                if rounds_left > 0 {
                    prop_assert_eq!(pair[1], StrategyState::Punishing { rounds_left: rounds_left - 1 });
                } else {
                    prop_assert_eq!(pair[1], StrategyState::Normal);
                }
            }
        }
        // First free round after the countdown cooperates
        prop_assert_eq!(moves[start + punish_rounds as usize], C);
    }

    #[test]
    fn endgame_rule_needs_known_length(
        opponent in prop::collection::vec(action(), 990),
    ) {
        let strategy = Strategy::new(StrategyKind::EndgameDefector);
        let own = vec![C; 990];
        let mut unknown = context(&own, &opponent, (0, 0), None);
        let (action, _) = decide(&strategy, StrategyState::Normal, &mut unknown);
        prop_assert_eq!(action, opponent[989]);

        let mut known = context(&own, &opponent, (0, 0), Some(1000));
        let (action, _) = decide(&strategy, StrategyState::Normal, &mut known);
        prop_assert_eq!(action, D);
    }
}

#[test]
fn cooperation_rate_defaults_to_one() {
    assert_eq!(History::new(&[]).cooperation_rate(), 1.0);
}

#[test]
fn tit_for_tat_copies_cooperation() {
    let strategy = Strategy::new(StrategyKind::TitForTat);
    let mut ctx = context(&[C], &[C], (3, 3), None);
    assert_eq!(decide(&strategy, StrategyState::Normal, &mut ctx).0, C);
}

#[test]
fn tit_for_tat_copies_defection() {
    let strategy = Strategy::new(StrategyKind::TitForTat);
    let mut ctx = context(&[C], &[D], (0, 5), None);
    assert_eq!(decide(&strategy, StrategyState::Normal, &mut ctx).0, D);
}

#[test]
fn periodic_forgiver_cooperates_on_schedule() {
    let strategy = Strategy::new(StrategyKind::PeriodicForgiver);
    let own = vec![D; 10];
    for last in [C, D] {
        let mut opponent = vec![D; 9];
        opponent.push(last);
        let mut ctx = context(&own, &opponent, (10, 10), None);
        assert_eq!(decide(&strategy, StrategyState::Normal, &mut ctx).0, C);
    }
}

#[test]
fn threshold_boundary_is_inclusive() {
    let strategy = Strategy::new(StrategyKind::ThresholdCooperator);
    let own = vec![C; 10];
    let opponent = [C, D, C, D, C, D, C, D, C, C];
    assert_eq!(History::new(&opponent).cooperations(), 6);
    let mut ctx = context(&own, &opponent, (0, 0), None);
    assert_eq!(decide(&strategy, StrategyState::Normal, &mut ctx).0, C);
}

#[test]
fn endgame_defects_only_with_known_length() {
    let strategy = Strategy::new(StrategyKind::EndgameDefector);
    let history = vec![C; 990];

    let mut known = context(&history, &history, (2970, 2970), Some(1000));
    assert_eq!(decide(&strategy, StrategyState::Normal, &mut known).0, D);

    let mut unknown = context(&history, &history, (2970, 2970), None);
    assert_eq!(decide(&strategy, StrategyState::Normal, &mut unknown).0, C);
}

#[test]
fn tft_vs_tft_cooperates_throughout() {
    let tft = Strategy::new(StrategyKind::TitForTat);
    let (log, _) = play(tft, tft, MatchAttributes::with_length(50), 50, 0);
    assert!(log.history(Seat::A).iter().all(|m| *m == C));
    assert!(log.history(Seat::B).iter().all(|m| *m == C));
    assert_eq!(log.score(Seat::A), 150);
}

#[test]
fn tft_vs_always_defect() {
    let (log, _) = play(
        Strategy::new(StrategyKind::TitForTat),
        Strategy::new(StrategyKind::AlwaysDefect),
        MatchAttributes::default(),
        20,
        0,
    );
    let tft = log.history(Seat::A);
    assert_eq!(tft[0], C);
    assert!(tft[1..].iter().all(|m| *m == D));
    assert_eq!(log.score(Seat::A), 19);
    assert_eq!(log.score(Seat::B), 24);
}

#[test]
fn grim_trigger_locks_for_rest_of_match() {
    let (log, states) = play(
        Strategy::new(StrategyKind::GrimTrigger),
        Strategy::new(StrategyKind::Prober),
        MatchAttributes::default(),
        30,
        0,
    );
    assert_eq!(states[1], StrategyState::Locked);
    assert!(states[1..].iter().all(|s| s.is_locked()));
    assert!(log.history(Seat::A)[1..].iter().all(|m| *m == D));
}

#[test]
fn matches_replay_from_seed() {
    let random = Strategy::new(StrategyKind::Random);
    let (first, _) = play(random, random, MatchAttributes::default(), 100, 7);
    let (second, _) = play(random, random, MatchAttributes::default(), 100, 7);
    let (other, _) = play(random, random, MatchAttributes::default(), 100, 8);

    assert_eq!(first.history(Seat::A), second.history(Seat::A));
    assert_eq!(first.history(Seat::B), second.history(Seat::B));
    assert_ne!(first.history(Seat::A), other.history(Seat::A));
}

#[test]
fn concurrent_matches_do_not_interfere() {
    let pairs = [
        (StrategyKind::Gradual, StrategyKind::Random),
        (StrategyKind::ForgivingGrudger, StrategyKind::AlwaysDefect),
        (StrategyKind::Punisher, StrategyKind::GenerousTitForTat),
        (StrategyKind::EndgameDefector, StrategyKind::Pavlov),
    ];
    let attributes = MatchAttributes::with_length(200);

    let sequential: Vec<Vec<Action>> = pairs
        .iter()
        .enumerate()
        .map(|(i, (a, b))| {
            let (log, _) = play(Strategy::new(*a), Strategy::new(*b), attributes, 200, i as u32);
            log.history(Seat::A).to_vec()
        })
        .collect();

    let handles: Vec<_> = pairs
        .iter()
        .enumerate()
        .map(|(i, (a, b))| {
            let (a, b) = (*a, *b);
            std::thread::spawn(move || {
                let (log, _) = play(Strategy::new(a), Strategy::new(b), attributes, 200, i as u32);
                log.history(Seat::A).to_vec()
            })
        })
        .collect();
    let parallel: Vec<Vec<Action>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(sequential, parallel);
}

#[test]
fn forgiving_grudger_locks_against_always_defect() {
    let (log, states) = play(
        Strategy::new(StrategyKind::ForgivingGrudger),
        Strategy::new(StrategyKind::AlwaysDefect),
        MatchAttributes::default(),
        30,
        0,
    );
    // C, then D x3 of mutual defection, a 2 round truce, then locked
    let grudger = log.history(Seat::A);
    assert_eq!(&grudger[..7], &[C, D, D, D, C, C, D]);
    assert_eq!(states[6], StrategyState::Locked);
    assert!(grudger[6..].iter().all(|m| *m == D));
}

#[test]
fn forgiving_grudger_truce_restores_cooperation() {
    let mut script = vec![D; 4];
    script.extend(vec![C; 8]);
    let (moves, states) = against_script(Strategy::new(StrategyKind::ForgivingGrudger), &script);

    assert_eq!(&moves[..4], &[C, D, D, D]);
    assert_eq!(states[4], StrategyState::Forgiving { rounds_left: 1 });
    assert!(moves[4..].iter().all(|m| *m == C));
    assert!(states.iter().all(|s| !s.is_locked()));
}

proptest! {
    #[test]
    fn grudger_locks_on_betrayal_inside_truce(
        truce_after in 1u32..5,
        forgive_rounds in 2u32..6,
    ) {
        let strategy = Strategy::with_params(
            StrategyKind::ForgivingGrudger,
            StrategyParams { truce_after, forgive_rounds, ..Default::default() },
        );
        // Truce starts in round truce_after + 1; the opponent defects through
        // the round after it, answering our first truce cooperation with D
        let start = truce_after as usize + 1;
        let mut script = vec![D; start + 2];
        script.extend(vec![C; forgive_rounds as usize + 4]);
        let (moves, states) = against_script(strategy, &script);

        prop_assert_eq!(moves[start], C);
        prop_assert_eq!(states[start + 2], StrategyState::Locked);
        prop_assert!(states[start + 2..].iter().all(|s| s.is_locked()));
        prop_assert!(moves[start + 2..].iter().all(|m| *m == D));
    }

    #[test]
    fn grudger_never_locks_an_accepted_truce(
        truce_after in 1u32..5,
        forgive_rounds in 1u32..6,
    ) {
        let strategy = Strategy::with_params(
            StrategyKind::ForgivingGrudger,
            StrategyParams { truce_after, forgive_rounds, ..Default::default() },
        );
        // Last opponent D is played alongside our first truce cooperation
        let start = truce_after as usize + 1;
        let mut script = vec![D; start + 1];
        script.extend(vec![C; forgive_rounds as usize + 6]);
        let (moves, states) = against_script(strategy, &script);

        prop_assert_eq!(
            states[start],
            StrategyState::Forgiving { rounds_left: forgive_rounds - 1 }
        );
        prop_assert!(states.iter().all(|s| !s.is_locked()));
        prop_assert_eq!(*moves.last().unwrap(), C);
    }
}
