#![allow(missing_docs)]

//! Stdio console: command parsing and rendering (no stdin loop).

use std::sync::Arc;

use counsel_lab::test_support::ScriptedCompletion;
use counsel_lab::{
    ConsoleCommand, CredentialMode, CredentialSource, Interaction, Lab, LabConfig, LabelSide,
    Notice, Outcome, SessionState, SessionView, parse_console_command, render_notices,
    render_options, render_update, render_view,
};
use tempfile::TempDir;

#[test]
fn blank_lines_are_ignored_and_text_is_a_message() {
    assert_eq!(parse_console_command("   "), None);
    assert_eq!(
        parse_console_command("  what about bonds?  "),
        Some(ConsoleCommand::Interaction(Interaction::Message {
            text: "what about bonds?".to_string()
        }))
    );
}

#[test]
fn label_commands_use_one_based_numbers() {
    assert_eq!(
        parse_console_command("/good 1 very clear"),
        Some(ConsoleCommand::Interaction(Interaction::Mark {
            side: LabelSide::Good,
            index: 0,
            reason: Some("very clear".to_string()),
        }))
    );
    assert_eq!(
        parse_console_command("/bad 3"),
        Some(ConsoleCommand::Interaction(Interaction::Mark {
            side: LabelSide::Bad,
            index: 2,
            reason: None,
        }))
    );
    assert_eq!(
        parse_console_command("/pick 2"),
        Some(ConsoleCommand::Interaction(Interaction::Finalize { choice: 1 }))
    );
    assert!(matches!(
        parse_console_command("/pick 0"),
        Some(ConsoleCommand::Invalid(_))
    ));
    assert!(matches!(
        parse_console_command("/good"),
        Some(ConsoleCommand::Invalid(_))
    ));
}

#[test]
fn session_and_meta_commands() {
    assert_eq!(
        parse_console_command("/start Alice Kim"),
        Some(ConsoleCommand::Interaction(Interaction::Start {
            name: "Alice Kim".to_string()
        }))
    );
    assert_eq!(
        parse_console_command("/bad-reason too generic"),
        Some(ConsoleCommand::Interaction(Interaction::SetReason {
            side: LabelSide::Bad,
            reason: "too generic".to_string(),
        }))
    );
    assert_eq!(
        parse_console_command("/next"),
        Some(ConsoleCommand::Interaction(Interaction::Advance))
    );
    assert_eq!(
        parse_console_command("/export"),
        Some(ConsoleCommand::Interaction(Interaction::Export { target: None }))
    );
    assert_eq!(
        parse_console_command("/export out/turns.csv"),
        Some(ConsoleCommand::Interaction(Interaction::Export {
            target: Some("out/turns.csv".into())
        }))
    );
    assert_eq!(parse_console_command("/state"), Some(ConsoleCommand::ShowState));
    assert_eq!(parse_console_command("/HELP"), Some(ConsoleCommand::Help));
    assert_eq!(parse_console_command("/exit"), Some(ConsoleCommand::Quit));
    assert!(matches!(
        parse_console_command("/dance"),
        Some(ConsoleCommand::Invalid(hint)) if hint.contains("/dance")
    ));
}

#[test]
fn notices_are_tagged_by_level() {
    let outcome = Outcome {
        accepted: false,
        notices: vec![Notice::warning("label first"), Notice::error("log failed")],
    };
    assert_eq!(
        render_notices(&outcome),
        "(warning) label first\n(error) log failed\n"
    );
}

#[tokio::test]
async fn options_render_with_label_markers() {
    let tmp = TempDir::new().expect("tempdir");
    let key_file = tmp.path().join("api_key.txt");
    let prompt_file = tmp.path().join("prompt.txt");
    std::fs::write(&key_file, "sk-test").expect("write key");
    std::fs::write(&prompt_file, "prompt").expect("write prompt");
    let config = LabConfig {
        credential: CredentialSource {
            mode: CredentialMode::File,
            env_var: "COUNSEL_LAB_TEST_UNUSED_KEY".to_string(),
            file: key_file,
        },
        prompt_path: prompt_file,
        log_path: tmp.path().join("turns.jsonl"),
        reasoning_path: None,
        ..LabConfig::default()
    };
    let service = ScriptedCompletion::new().three_options(["Stocks", "Bonds", "Cash"], "r");
    let lab = Lab::with_service(config, Arc::new(service));
    let mut state = SessionState::new();

    let view = SessionView::build(&lab, &state);
    assert!(render_view(&view).contains("/start <name>"));

    state.start("Alice").expect("start");
    let before = (state.messages().len(), state.session().number());
    lab.handle(
        &mut state,
        Interaction::Message {
            text: "spare money".to_string(),
        },
    )
    .await;
    state
        .mark(LabelSide::Good, 0, Some("clear"))
        .expect("mark good");
    state.mark(LabelSide::Bad, 2, None).expect("mark bad");

    let view = SessionView::build(&lab, &state);
    let options = render_options(&view);
    assert!(options.contains("  1. Stocks [good]\n"));
    assert!(options.contains("  2. Bonds\n"));
    assert!(options.contains("  3. Cash [bad]\n"));
    assert!(options.contains("good reason: clear"));
    assert!(!options.contains("bad reason:"));

    let update = render_update(before, &view);
    assert!(!update.contains("you: spare money"));
    assert!(update.contains("1. Stocks"));

    let full = render_view(&view);
    assert!(full.starts_with("[session 1] "));
    assert!(full.contains("you: spare money\n"));
}
