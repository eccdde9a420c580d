use std::sync::Arc;
use std::time::Duration;

use chatbot_llm::{ResponseGenerator, SimulatedResponder, create_generator};
use chatbot_overlay::app::HostShell;
use chatbot_overlay::chat::{
    ChatSession, MessageId, MessageList, PRECONFIGURED_QUERIES, SessionChange, SubmitOutcome,
    SubmitRejection, UnavailableSpeech, suggestion_strip,
};
use chatbot_overlay::settings::{ChatSettings, SettingsStore};
use snafu::{ResultExt, Snafu};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Snafu)]
enum HostError {
    #[snafu(display("failed to read terminal input on `{stage}`: {source}"))]
    ReadInput {
        stage: &'static str,
        source: std::io::Error,
    },
}

enum Flow {
    Continue,
    Quit,
}

/// Terminal host for the chat overlay.
///
/// Plain lines are typed into the draft and sent; lines starting with `:` are
/// host commands. The transcript goes to stdout and logs go to stderr.
#[tokio::main]
async fn main() -> Result<(), HostError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = SettingsStore::load();
    let settings = store.settings();
    tracing::info!(path = ?store.config_path(), "settings loaded");

    let generator = build_generator(&settings);
    tracing::info!(
        provider_id = generator.id(),
        provider = generator.name(),
        "response generator ready"
    );

    let mut shell = HostShell::from_settings(&settings, generator, Arc::new(UnavailableSpeech));
    let mut transcript = MessageList::new();
    if shell.is_visible() {
        print_header(shell.session());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context(ReadInputSnafu { stage: "read-stdin-line" })? else {
                    break;
                };
                if let Flow::Quit = handle_line(&mut shell, line.trim()) {
                    break;
                }
                render_new_messages(&shell, &mut transcript);
            }
            Some(event) = shell.next_event() => {
                match shell.dispatch(event) {
                    SessionChange::LoadingText => print_loading(shell.session()),
                    SessionChange::Messages => render_new_messages(&shell, &mut transcript),
                    SessionChange::Speech => print_speech_state(shell.session()),
                    SessionChange::None => {}
                }
            }
        }
    }

    tracing::info!("chat host exiting");
    Ok(())
}

fn build_generator(settings: &ChatSettings) -> Arc<dyn ResponseGenerator> {
    match create_generator(settings.generator.to_generator_config()) {
        Ok(generator) => generator,
        Err(error) => {
            tracing::warn!(error = %error, "falling back to the simulated responder");
            Arc::new(SimulatedResponder::new(
                Duration::from_millis(settings.generator.simulated_delay_ms),
                settings.generator.simulated_max_chars,
            ))
        }
    }
}

fn handle_line(shell: &mut HostShell, line: &str) -> Flow {
    if line.is_empty() {
        return Flow::Continue;
    }

    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, argument)) => (command, argument.trim()),
        None => (line, ""),
    };

    match command {
        ":quit" | ":q" => return Flow::Quit,
        ":open" => {
            if !shell.is_visible() {
                shell.show();
                print_header(shell.session());
            }
        }
        ":close" => {
            shell.hide();
            println!("(chat closed)");
        }
        ":toggle" => {
            if shell.toggle() {
                print_header(shell.session());
            } else {
                println!("(chat closed)");
            }
        }
        ":scroll" => match argument.parse::<f32>() {
            Ok(offset) => {
                shell.set_scroll_offset(offset);
                println!(
                    "(scroll {offset:.0}, toggle shifted by {:.1})",
                    shell.toggle_displacement()
                );
            }
            Err(_) => println!("usage: :scroll <offset>"),
        },
        ":queries" => print_queries(),
        _ if !shell.is_visible() => println!("(chat is closed, use :open)"),
        ":ask" => match argument.parse::<usize>() {
            Ok(index) => {
                let outcome = shell.session_mut().submit_preconfigured_query(index);
                report_outcome(shell.session(), outcome);
            }
            Err(_) => println!("usage: :ask <n>"),
        },
        ":mic" => {
            let session = shell.session_mut();
            if session.stop_recording() {
                println!("(recording stopped)");
            } else {
                match session.start_recording() {
                    Ok(_) => println!("(listening...)"),
                    Err(error) => println!("(microphone unavailable: {error})"),
                }
            }
        }
        ":speak" => match argument.parse::<u64>() {
            Ok(id) => {
                if let Err(error) = shell.session_mut().press_message(MessageId::new(id)) {
                    println!("(cannot speak: {error})");
                } else {
                    print_speech_state(shell.session());
                }
            }
            Err(_) => println!("usage: :speak <message id>"),
        },
        _ if command.starts_with(':') => println!("(unknown command {command})"),
        _ => {
            let session = shell.session_mut();
            session.set_draft(line);
            let outcome = session.send_draft();
            report_outcome(shell.session(), outcome);
        }
    }

    Flow::Continue
}

fn report_outcome(session: &ChatSession, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Accepted(_) => print_loading(session),
        SubmitOutcome::Rejected(SubmitRejection::AlreadyLoading) => {
            println!("(still waiting for the previous answer)");
        }
        SubmitOutcome::Rejected(SubmitRejection::UnknownQuery) => {
            println!("(no such query, see :queries)");
        }
        SubmitOutcome::Rejected(SubmitRejection::EmptyText) => {}
    }
}

fn render_new_messages(shell: &HostShell, transcript: &mut MessageList) {
    if !shell.is_visible() {
        return;
    }
    for line in transcript.sync(shell.session()) {
        println!("{line}");
    }
}

fn print_header(session: &ChatSession) {
    let overlay = &session.config().overlay;
    println!("== {} ==", overlay.title);
    if let Some(greeting) = &overlay.greeting {
        println!("{greeting}");
    }
    if session.suggestions_visible() {
        let strip = suggestion_strip(1)
            .map(|suggestion| format!("[{}] {}", suggestion.index, suggestion.text))
            .collect::<Vec<_>>();
        println!("{}", strip.join(" | "));
    }
    println!("({})", overlay.placeholder);
}

fn print_queries() {
    for (index, query) in PRECONFIGURED_QUERIES.iter().enumerate() {
        println!("  {index}: {query}");
    }
}

fn print_loading(session: &ChatSession) {
    if let Some(text) = session.loading_text() {
        println!("  ... {text}");
    }
}

fn print_speech_state(session: &ChatSession) {
    match session.speaking_message() {
        Some(id) => println!("(speaking message {id})"),
        None if session.is_recording() => println!("(listening...)"),
        None => println!("(speech idle)"),
    }
}
