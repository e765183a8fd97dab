//! utsusu - turn a video into an X thread and a note article

mod clipboard;
mod commands;
mod config;
mod landing;
mod report;
mod ui;
mod utils;

use clap::Parser;
use std::io::{self, Write};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use utsusu_core::{
    EmojiUsage, Error, GenerationEvent, PostConfig, PostType, Session, SessionOptions, Tone,
};
use utsusu_tui::Theme;

/// utsusu - 動画を、投稿にうつす。
#[derive(Parser, Debug)]
#[command(name = "utsusu")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Convert this YouTube URL, print the result and exit
    #[arg(short, long)]
    url: Option<String>,

    /// Post type (learning, story, howto)
    #[arg(short, long)]
    post_type: Option<PostType>,

    /// Tone (soft, normal, biz)
    #[arg(short, long)]
    tone: Option<Tone>,

    /// Emoji usage (on, off)
    #[arg(short, long)]
    emoji: Option<EmojiUsage>,

    /// Start with the monthly plan active
    #[arg(long)]
    paid: bool,

    /// How long each phase is shown, in milliseconds
    #[arg(long)]
    phase_ms: Option<u64>,

    /// Disable TUI mode (line-mode shell on stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Show the product page instead of the app
    #[arg(long)]
    landing: bool,

    /// Use the light color theme
    #[arg(long)]
    light: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output (logs to stderr)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("utsusu=debug,utsusu_core=debug")
            .with_writer(io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    // Merge config with CLI args (CLI takes precedence)
    let post = PostConfig::new(
        args.post_type.or(cfg.post_type).unwrap_or_default(),
        args.tone.or(cfg.tone).unwrap_or_default(),
        args.emoji.or(cfg.emoji).unwrap_or_default(),
    );

    let theme = if args.light || cfg.theme == Some(config::ThemeName::Light) {
        Theme::light()
    } else {
        Theme::dark()
    };

    if args.landing {
        return landing::run_landing(theme).await;
    }

    let options = SessionOptions {
        limits: cfg.gate_limits(),
        pipeline: cfg.pipeline_config(args.phase_ms),
    };
    tracing::debug!(?options, post = %post, "Starting session");

    let mut session = Session::demo(options);
    if args.paid {
        session.confirm_upgrade();
    }

    // Non-interactive mode
    if let Some(url) = args.url {
        return run_once(&mut session, &url, post).await;
    }

    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true);
    if use_tui {
        return ui::run_tui(&mut session, post, theme).await;
    }

    run_interactive(&mut session, post).await
}

/// Print phase progress as it is broadcast. The task ends with the run.
fn spawn_progress_printer(mut receiver: broadcast::Receiver<GenerationEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            match &event {
                GenerationEvent::PhaseStarted {
                    phase,
                    index,
                    total,
                } => {
                    println!("[{}/{}] {}…", index + 1, total, phase.label());
                }
                GenerationEvent::RegenerateStarted { .. } => {
                    println!("言い回しを調整しています…");
                }
                GenerationEvent::RegenerateFinished { changed, .. } => {
                    if !changed {
                        println!("（内容は変わりませんでした）");
                    }
                }
                GenerationEvent::Failed { message } => {
                    eprintln!("Error: {}", message);
                }
                _ => {}
            }
            if event.is_terminal() {
                break;
            }
        }
    })
}

/// Errors raised before the pipeline starts, so no terminal event follows
fn rejected_before_start(err: &Error) -> bool {
    matches!(
        err,
        Error::InvalidInput(_) | Error::EntitlementDenied { .. } | Error::Busy | Error::NoActiveRecord
    )
}

/// Wait for the progress printer to catch up with a finished run
async fn finish_progress<T>(printer: JoinHandle<()>, result: &utsusu_core::Result<T>) {
    match result {
        Err(e) if rejected_before_start(e) => printer.abort(),
        _ => {
            let _ = printer.await;
        }
    }
}

/// Run one conversion, with Ctrl+C aborting it
async fn convert(session: &mut Session, url: &str, post: PostConfig) -> utsusu_core::Result<()> {
    let printer = spawn_progress_printer(session.subscribe());
    let handle = session.handle();

    let result = {
        let run = session.submit(url, post);
        tokio::pin!(run);
        loop {
            tokio::select! {
                result = &mut run => break result,
                _ = tokio::signal::ctrl_c() => handle.abort(),
            }
        }
    };

    finish_progress(printer, &result).await;
    result.map(|_| ())
}

async fn run_once(session: &mut Session, url: &str, post: PostConfig) -> anyhow::Result<()> {
    println!("utsusu> {}", url);
    println!();

    if let Err(e) = convert(session, url, post).await {
        eprintln!("Error: {}", utils::error_message(&e));
        std::process::exit(if e.requires_upgrade() { 2 } else { 1 });
    }

    if let Some(record) = session.active() {
        println!();
        println!("{}", report::record_report(record, session.store().selected_title_index()));
    }
    Ok(())
}

async fn run_interactive(session: &mut Session, mut post: PostConfig) -> anyhow::Result<()> {
    use commands::{CommandResult, copy_text, execute_command};

    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!("utsusu ({}) {}", post, session.gate().summary().label());
        eprintln!("YouTube の URL を貼り付けてください。/help でコマンド一覧");
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(result) = execute_command(input, session, post) {
            match result {
                CommandResult::Exit => break,
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
                CommandResult::NewConversion => {
                    session.start_new();
                    println!("新しく変換します。URL を貼り付けてください。");
                }
                CommandResult::Open(id) => {
                    session.select_active(id);
                    print_active(session);
                }
                CommandResult::Delete(id) => {
                    if session.delete_record(id) {
                        println!("削除しました");
                    }
                }
                CommandResult::SelectTitle(index) => {
                    session.select_title(index);
                    if let Some(title) = session.store().selected_title() {
                        println!("タイトル: {}", title);
                    }
                }
                CommandResult::Copy(target) => {
                    let text = session.active().and_then(|record| {
                        let title = session.store().selected_title().unwrap_or_default();
                        copy_text(record, title, target)
                    });
                    if let Some(text) = text {
                        clipboard::copy_to_clipboard(&mut io::stdout(), &text)?;
                        println!("コピーしました");
                    }
                }
                CommandResult::Regenerate => {
                    let printer = spawn_progress_printer(session.subscribe());
                    let result = session.regenerate(post).await;
                    finish_progress(printer, &result).await;
                    match result {
                        Ok(Some(_)) => print_active(session),
                        Ok(None) => {}
                        Err(e) => eprintln!("Error: {}", utils::error_message(&e)),
                    }
                }
                CommandResult::OpenUpgrade => prompt_upgrade(session)?,
                CommandResult::ChangeOptions(next) => {
                    post = next;
                    println!("投稿設定: {}", post);
                }
            }
            println!();
            continue;
        }

        println!();
        match convert(session, input, post).await {
            Ok(()) => print_active(session),
            Err(e) => {
                eprintln!("Error: {}", utils::error_message(&e));
                if session.is_upgrade_prompt_open() {
                    prompt_upgrade(session)?;
                }
            }
        }
        println!();
    }

    Ok(())
}

fn print_active(session: &Session) {
    if let Some(record) = session.active() {
        println!();
        println!("{}", report::record_report(record, session.store().selected_title_index()));
    }
}

/// Line-mode version of the plan dialog
fn prompt_upgrade(session: &mut Session) -> anyhow::Result<()> {
    session.open_upgrade_prompt();
    println!();
    println!("{}", ui::UPGRADE_HEADLINE);
    println!("  {}", ui::UPGRADE_PRICE);
    println!("  {}", ui::upgrade_allowance(session.gate().limits().monthly_limit));
    for feature in ui::UPGRADE_FEATURES {
        println!("  - {}", feature);
    }
    print!("登録しますか？ [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    if matches!(answer.trim(), "y" | "Y" | "yes") {
        session.confirm_upgrade();
        println!("登録しました。{}", session.gate().summary().label());
    } else {
        session.dismiss_upgrade_prompt();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_options() {
        let args = Args::parse_from([
            "utsusu",
            "--url",
            "https://youtu.be/x",
            "--post-type",
            "howto",
            "--tone",
            "biz",
            "--emoji",
            "on",
            "--phase-ms",
            "0",
        ]);
        assert_eq!(args.post_type, Some(PostType::HowTo));
        assert_eq!(args.tone, Some(Tone::Biz));
        assert_eq!(args.emoji, Some(EmojiUsage::On));
        assert_eq!(args.phase_ms, Some(0));
    }

    #[test]
    fn test_args_reject_unknown_tone() {
        assert!(Args::try_parse_from(["utsusu", "--tone", "loud"]).is_err());
    }

    #[test]
    fn test_rejected_before_start() {
        assert!(rejected_before_start(&Error::EntitlementDenied { used: 1, limit: 1 }));
        assert!(!rejected_before_start(&Error::Cancelled));
    }

    #[tokio::test]
    async fn test_convert_counts_usage_once() {
        let mut session = commands::tests::fast_session(1);
        convert(&mut session, "https://youtu.be/abc", PostConfig::default())
            .await
            .unwrap();
        assert_eq!(session.gate().usage_count(), 1);

        let err = convert(&mut session, "https://youtu.be/def", PostConfig::default())
            .await
            .unwrap_err();
        assert!(err.requires_upgrade());
        assert!(session.is_upgrade_prompt_open());
        assert_eq!(session.store().len(), 1);
    }
}
