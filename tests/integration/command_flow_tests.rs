//! End-to-end command flows through `commands::dispatch`.
//!
//! Exercises the user-visible replies and the persisted record for the
//! idea list, duty rotation, random plans, the info link, the DM redirect,
//! and the corrective replies produced for each error kind.

use group_organizer::commands::{self, Attachment, ChatKind, Command, CommandContext, Visibility};
use group_organizer::models::group_state::GroupState;

use super::test_helpers::{group_ctx, local, run, test_state};

#[tokio::test]
async fn add_then_list_ideas() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    let reply = run(&state, "C1", Command::Ideas, "").await;
    assert_eq!(reply.text, "No ideas yet. Add one: /idea <text>");

    let reply = run(&state, "C1", Command::Idea, "picnic").await;
    assert_eq!(reply.text, "✅ Idea #1 added: picnic");
    assert_eq!(reply.visibility, Visibility::InChannel);

    let reply = run(&state, "C1", Command::Ideas, "").await;
    assert_eq!(reply.text, "📌 Your ideas:\n1) picnic — Tanya");
    ct.cancel();
}

#[tokio::test]
async fn idea_text_is_trimmed_and_ordered() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    run(&state, "C1", Command::Idea, "  tea at 19:00  ").await;
    let reply = run(&state, "C1", Command::Idea, "ride along the embankment").await;
    assert_eq!(reply.text, "✅ Idea #2 added: ride along the embankment");

    let reply = run(&state, "C1", Command::Ideas, "").await;
    assert_eq!(
        reply.text,
        "📌 Your ideas:\n1) tea at 19:00 — Tanya\n2) ride along the embankment — Tanya"
    );
    ct.cancel();
}

#[tokio::test]
async fn unresolved_author_falls_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    let ctx = group_ctx("C1", None);
    commands::dispatch(&state, &ctx, Command::Idea, "picnic").await;

    let ideas = state.stores.for_channel("C1").list_ideas().await.expect("list");
    assert_eq!(ideas[0].author, "Someone");
    ct.cancel();
}

#[tokio::test]
async fn empty_idea_is_rejected_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    let reply = run(&state, "C1", Command::Idea, "   ").await;
    assert_eq!(reply.visibility, Visibility::Ephemeral);
    assert!(reply.text.starts_with("Example: /idea"));

    let path = state.config.state_path("C1");
    assert!(!path.exists(), "no record should be written");
    ct.cancel();
}

#[tokio::test]
async fn duty_rotates_and_persists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    let mut people = Vec::new();
    for _ in 0..5 {
        let reply = run(&state, "C1", Command::Duty, "").await;
        let first_line = reply.text.lines().next().expect("line").to_owned();
        people.push(first_line);
    }
    assert_eq!(
        people,
        [
            "🫡 On duty this week: Tanya",
            "🫡 On duty this week: Lena",
            "🫡 On duty this week: Ira",
            "🫡 On duty this week: Ellada",
            "🫡 On duty this week: Tanya",
        ]
    );

    let raw = std::fs::read_to_string(state.config.state_path("C1")).expect("record");
    let saved: GroupState = serde_json::from_str(&raw).expect("parse");
    assert_eq!(saved.duty_index, 5);
    ct.cancel();
}

#[tokio::test]
async fn empty_roster_reports_configuration_problem() {
    let dir = tempfile::tempdir().expect("tempdir");
    let toml = format!(
        "data_dir = '{}'\nduty_roster = []\n",
        dir.path().display()
    );
    let config = group_organizer::GlobalConfig::from_toml_str(&toml).expect("config");
    let (state, _rx, ct) = super::test_helpers::test_app_state(
        config,
        std::sync::Arc::new(super::test_helpers::FixedClock(local(18, 0))),
    );

    let reply = run(&state, "C1", Command::Duty, "").await;
    assert_eq!(reply.visibility, Visibility::Ephemeral);
    assert!(reply.text.contains("duty_roster"));
    ct.cancel();
}

#[tokio::test]
async fn random_plan_without_ideas() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    let reply = run(&state, "C1", Command::Random, "").await;
    let plan = reply
        .text
        .strip_prefix("🎲 Random plan for the week: ")
        .expect("prefix");
    assert!(state.config.random_plans.iter().any(|p| p == plan));
    assert!(!reply.text.contains("From your ideas"));
    ct.cancel();
}

#[tokio::test]
async fn random_plan_with_idea_mentions_it() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    run(&state, "C1", Command::Idea, "picnic").await;
    let reply = run(&state, "C1", Command::Random, "").await;

    assert!(reply.text.starts_with("🎲 Random plan for the week: "));
    assert!(reply.text.ends_with("\n💡 From your ideas: picnic"));
    ct.cancel();
}

#[tokio::test]
async fn vote_errors_are_corrective() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));
    run(&state, "C1", Command::Idea, "picnic").await;

    let reply = run(&state, "C1", Command::Vote, "abc").await;
    assert_eq!(reply.text, "The idea number must be a number. Example: /vote 2");

    let reply = run(&state, "C1", Command::Vote, "5").await;
    assert_eq!(reply.text, "No such idea. List: /ideas");

    let reply = run(&state, "C1", Command::Vote, "0").await;
    assert_eq!(reply.text, "No such idea. List: /ideas");

    assert!(state.polls.lock().await.is_empty());
    ct.cancel();
}

#[tokio::test]
async fn help_and_start_list_commands() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    let help = run(&state, "C1", Command::Help, "").await;
    let start = run(&state, "C1", Command::Start, "").await;
    assert_eq!(help, start);
    for command in ["/idea", "/ideas", "/vote", "/random", "/remind", "/duty", "/dtek"] {
        assert!(help.text.contains(command), "overview misses {command}");
    }
    ct.cancel();
}

#[tokio::test]
async fn info_command_replies_with_link_button() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    let reply = run(&state, "C1", Command::Info, "").await;
    let info = &state.config.info_link;
    assert!(reply.text.starts_with(&info.title));
    assert_eq!(
        reply.attachment,
        Some(Attachment::Link {
            label: info.button_label.clone(),
            url: info.url.clone(),
        })
    );
    ct.cancel();
}

#[tokio::test]
async fn private_chat_gets_redirect_for_every_command() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));
    let ctx = CommandContext {
        channel_id: "D1".into(),
        chat_kind: ChatKind::Private,
        user_id: "U1".into(),
        user_name: None,
    };

    for command in [Command::Start, Command::Idea, Command::Duty, Command::Remind] {
        let reply = commands::dispatch(&state, &ctx, command, "19:00 tea").await;
        assert_eq!(reply.text, "Add me to your group — that's where I work 🙂");
    }
    assert!(!state.config.state_path("D1").exists());
    assert_eq!(state.scheduler.pending_count(), 0);
    ct.cancel();
}

#[tokio::test]
async fn channels_keep_separate_state() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));

    run(&state, "C1", Command::Idea, "picnic").await;
    run(&state, "C1", Command::Duty, "").await;

    let reply = run(&state, "C2", Command::Ideas, "").await;
    assert_eq!(reply.text, "No ideas yet. Add one: /idea <text>");
    let reply = run(&state, "C2", Command::Duty, "").await;
    assert!(reply.text.starts_with("🫡 On duty this week: Tanya"));
    ct.cancel();
}

#[tokio::test]
async fn corrupted_record_is_reported_not_overwritten() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));
    let path = state.config.state_path("C1");
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&path, "{ not json").expect("write");

    let reply = run(&state, "C1", Command::Idea, "picnic").await;
    assert_eq!(reply.visibility, Visibility::Ephemeral);
    assert!(reply.text.contains("damaged"));

    let raw = std::fs::read_to_string(&path).expect("read");
    assert_eq!(raw, "{ not json");
    ct.cancel();
}

#[tokio::test]
async fn state_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let (state, _rx, ct) = test_state(dir.path(), local(18, 0));
        run(&state, "C1", Command::Idea, "picnic").await;
        run(&state, "C1", Command::Duty, "").await;
        ct.cancel();
    }

    let (state, _rx, ct) = test_state(dir.path(), local(18, 0));
    let reply = run(&state, "C1", Command::Ideas, "").await;
    assert_eq!(reply.text, "📌 Your ideas:\n1) picnic — Tanya");
    let reply = run(&state, "C1", Command::Duty, "").await;
    assert!(reply.text.starts_with("🫡 On duty this week: Lena"));
    ct.cancel();
}
