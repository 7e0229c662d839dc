//! Unit tests for command-name resolution, argument parsing, and the
//! error-to-reply mapping.

use group_organizer::commands::{
    corrective_reply, remind, vote, ChatKind, Command, Visibility,
};
use group_organizer::scheduler::reminder_scheduler::NONEXISTENT_TIME;
use group_organizer::slack::commands::chat_kind_for;
use group_organizer::slack::handlers::poll::parse_poll_action;
use group_organizer::AppError;

// ── Command::parse ───────────────────────────────────────────

#[test]
fn builtin_names_resolve_with_or_without_slash() {
    let cases = [
        ("/start", Command::Start),
        ("help", Command::Help),
        ("/idea", Command::Idea),
        ("/ideas", Command::Ideas),
        ("/vote", Command::Vote),
        ("/random", Command::Random),
        ("/remind", Command::Remind),
        ("/duty", Command::Duty),
        ("/DUTY", Command::Duty),
    ];
    for (name, expected) in cases {
        assert_eq!(Command::parse(name, "dtek"), Some(expected), "{name}");
    }
}

#[test]
fn info_command_resolves_from_configuration() {
    assert_eq!(Command::parse("/dtek", "dtek"), Some(Command::Info));
    assert_eq!(Command::parse("/links", "links"), Some(Command::Info));
    assert_eq!(Command::parse("/dtek", "links"), None);
}

#[test]
fn builtin_names_take_precedence_over_info_command() {
    assert_eq!(Command::parse("/help", "help"), Some(Command::Help));
}

#[test]
fn unknown_or_empty_names_are_rejected() {
    assert_eq!(Command::parse("/nope", "dtek"), None);
    assert_eq!(Command::parse("/", ""), None);
    assert_eq!(Command::parse("", ""), None);
}

// ── /vote arguments ──────────────────────────────────────────

#[test]
fn vote_position_uses_first_token() {
    assert_eq!(vote::parse_position("2").expect("number"), 2);
    assert_eq!(vote::parse_position("  3 extra words").expect("number"), 3);
    assert_eq!(vote::parse_position("+4").expect("number"), 4);
}

#[test]
fn vote_position_non_numeric_is_validation() {
    for args in ["", "   ", "two", "2.5", "-", "+", "1e3"] {
        let err = vote::parse_position(args).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{args:?}: {err:?}");
    }
}

#[test]
fn vote_position_below_one_is_not_found() {
    for args in ["0", "-1", "-0", "99999999999999999999", "-99999999999999999999"] {
        let err = vote::parse_position(args).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{args:?}: {err:?}");
    }
}

// ── /remind arguments ────────────────────────────────────────

#[test]
fn remind_args_split_time_and_text() {
    let (time, text) = remind::parse_args("19:00 chai u Tani").expect("valid");
    assert_eq!(time.to_string(), "19:00");
    assert_eq!(text, "chai u Tani");

    let (time, text) = remind::parse_args("  7:30   morning run  ").expect("valid");
    assert_eq!(time.to_string(), "07:30");
    assert_eq!(text, "morning run");
}

#[test]
fn remind_args_reject_malformed_input() {
    for args in ["", "19:00", "tea at 19:00", "1900 tea", "25:00 tea", "19:61 tea"] {
        let err = remind::parse_args(args).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)), "{args:?}: {err:?}");
    }
}

#[test]
fn remind_pattern_is_shared_across_threads() {
    let handles: Vec<_> = (0..4)
        .map(|hour| {
            std::thread::spawn(move || remind::parse_args(&format!("1{hour}:15 walk")))
        })
        .collect();
    for (hour, handle) in handles.into_iter().enumerate() {
        let (time, text) = handle.join().expect("thread").expect("valid");
        assert_eq!(time.to_string(), format!("1{hour}:15"));
        assert_eq!(text, "walk");
    }
}

// ── Transport helpers ────────────────────────────────────────

#[test]
fn direct_message_channels_are_private() {
    assert_eq!(chat_kind_for("D024BE91L"), ChatKind::Private);
    assert_eq!(chat_kind_for("C024BE91L"), ChatKind::Group);
    assert_eq!(chat_kind_for("G024BE91L"), ChatKind::Group);
}

#[test]
fn poll_action_ids_carry_option_index() {
    assert_eq!(parse_poll_action("poll_vote_0"), Some(0));
    assert_eq!(parse_poll_action("poll_vote_2"), Some(2));
    assert_eq!(parse_poll_action("poll_vote_x"), None);
    assert_eq!(parse_poll_action("open_link"), None);
}

// ── corrective_reply ─────────────────────────────────────────

#[test]
fn corrective_replies_are_ephemeral_and_command_specific() {
    let idea = corrective_reply(Command::Idea, &AppError::Validation("empty".into()));
    assert_eq!(idea.visibility, Visibility::Ephemeral);
    assert!(idea.text.starts_with("Example: /idea"));

    let vote = corrective_reply(Command::Vote, &AppError::Validation("nan".into()));
    assert!(vote.text.contains("/vote 2"));

    let remind = corrective_reply(Command::Remind, &AppError::Validation("bad".into()));
    assert!(remind.text.starts_with("Format: /remind HH:MM text"));
}

#[test]
fn corrective_replies_cover_every_error_kind() {
    let not_found = corrective_reply(Command::Vote, &AppError::NotFound("idea 9".into()));
    assert_eq!(not_found.text, "No such idea. List: /ideas");

    let past = corrective_reply(Command::Remind, &AppError::PastTime("19:00".into()));
    assert!(past.text.contains("already passed"));

    let roster = corrective_reply(Command::Duty, &AppError::Config("empty".into()));
    assert!(roster.text.contains("duty_roster"));

    let corrupt = corrective_reply(Command::Ideas, &AppError::DataCorruption("bad".into()));
    assert!(corrupt.text.contains("damaged"));

    let io = corrective_reply(Command::Idea, &AppError::Io("disk".into()));
    assert!(io.text.contains("try again"));

    for reply in [not_found, past, roster, corrupt, io] {
        assert_eq!(reply.visibility, Visibility::Ephemeral);
        assert!(!reply.text.contains("disk"), "internal detail leaked");
    }
}

#[test]
fn missing_vote_number_gets_bare_example() {
    let err = vote::parse_position("").unwrap_err();
    let reply = corrective_reply(Command::Vote, &err);
    assert_eq!(reply.text, "Example: /vote 2");

    let err = vote::parse_position("abc").unwrap_err();
    let reply = corrective_reply(Command::Vote, &err);
    assert_eq!(reply.text, "The idea number must be a number. Example: /vote 2");
}

#[test]
fn skipped_reminder_time_is_not_reported_as_bad_format() {
    let err = AppError::Validation(format!("03:30 {NONEXISTENT_TIME} in Europe/Zaporozhye"));
    let reply = corrective_reply(Command::Remind, &err);

    assert_eq!(reply.visibility, Visibility::Ephemeral);
    assert!(reply.text.contains("clock change"), "{}", reply.text);
    assert!(!reply.text.starts_with("Format:"));
}
