use super::*;

const CEILING: u32 = 1500;

#[test]
fn test_sentinel_winner_ids() {
    let parser = VerdictParser::default();
    let win = parser.parse("loading map\nWINNER: 0\nFINAL_TICK: 640\n", CEILING);
    assert_eq!(win, MatchResult::win(640));

    let loss = parser.parse("WINNER:1\nFINAL_TICK:1499", CEILING);
    assert_eq!(loss, MatchResult::loss(1499));

    let draw = parser.parse("WINNER: -1\nFINAL_TICK: 1500", CEILING);
    assert_eq!(draw, MatchResult::draw(1500));
}

#[test]
fn test_sentinel_beats_phrase() {
    let output = "Player 0 wins\nWINNER: 1\nFINAL_TICK: 900\n";
    assert_eq!(VerdictParser::default().parse(output, CEILING), MatchResult::loss(900));
}

#[test]
fn test_phrase_fallback_uses_ceiling_without_tick() {
    let parser = VerdictParser::default();
    assert_eq!(parser.parse("Game over. Player 0 wins!", CEILING), MatchResult::win(CEILING));
    assert_eq!(parser.parse("Player 1 wins", CEILING), MatchResult::loss(CEILING));
    // Player 0 is checked first
    assert_eq!(
        parser.parse("Player 1 wins\nPlayer 0 wins", CEILING).outcome,
        Outcome::Win
    );
}

#[test]
fn test_phrase_keeps_final_tick() {
    let output = "FINAL_TICK: 321\nPlayer 1 wins\n";
    assert_eq!(VerdictParser::default().parse(output, CEILING), MatchResult::loss(321));
}

#[test]
fn test_no_signal_is_draw() {
    let parser = VerdictParser::default();
    assert_eq!(parser.parse("", CEILING), MatchResult::draw(CEILING));
    assert_eq!(parser.parse("Exception in thread main", CEILING), MatchResult::draw(CEILING));
    assert!(parser.winner("WINNER: none").is_none());
}

#[test]
fn test_custom_chain_order() {
    let parser = VerdictParser::new(vec![Box::new(PhraseStrategy)]);
    assert_eq!(parser.winner("WINNER: 1"), None);
    assert_eq!(parser.winner("Player 0 wins"), Some(Outcome::Win));
}

#[test]
fn test_final_tick() {
    assert_eq!(final_tick("FINAL_TICK: 12"), Some(12));
    assert_eq!(final_tick("FINAL_TICK: -3"), None);
    assert_eq!(final_tick("nothing"), None);
}

#[test]
fn test_phrase_matches_literal_text_only() {
    assert_eq!(
        PhraseStrategy.outcome("[INFO] Player 1 wins by elimination"),
        Some(Outcome::Loss)
    );
    assert_eq!(PhraseStrategy.outcome("Player 01 wins"), None);
    assert_eq!(PhraseStrategy.outcome("player 0 wins"), None);
}
