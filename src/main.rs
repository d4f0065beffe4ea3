use anyhow::Result;
use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use ttsfront::cli::{Cli, Commands, NormalizeArgs, TranscribeArgs};
use ttsfront::config::Config;
use ttsfront::daemon::run_daemon;
use ttsfront::ipc::client::send_request;
use ttsfront::ipc::protocol::{
    G2pRequest, NormalizeRequest, PreprocessRequest, Request, Response, TextCleanRequest,
};
use ttsfront::ipc::server::IpcServer;
use ttsfront::params::{NormalizeOptions, PhonemeDescription};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone();
    let socket_arg = cli.socket.clone();
    let json = cli.json;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Daemon { timeout } => {
            let mut config = load_config(config_path.as_deref())?;
            if let Some(timeout_ms) = timeout {
                config.service.stage_timeout_ms = timeout_ms;
            }
            let socket = socket_arg.or_else(|| config.service.socket_path.clone());
            run_daemon(config, socket, quiet).await?;
        }
        Commands::Clean {
            content,
            parse_html,
            no_tags,
        } => {
            let request = Request::Clean(TextCleanRequest {
                content,
                parse_html,
                no_tag_tokens_in_content: no_tags,
                ..Default::default()
            });
            let socket = resolve_socket(socket_arg, config_path.as_deref())?;
            run_request(&socket, request, json).await?;
        }
        Commands::Normalize {
            content,
            parse_html,
            no_tags,
            normalize,
        } => {
            let request = Request::Normalize(NormalizeRequest {
                content,
                parse_html,
                options: normalize_options(&normalize),
                no_tag_tokens_in_content: no_tags,
                ..Default::default()
            });
            let socket = resolve_socket(socket_arg, config_path.as_deref())?;
            run_request(&socket, request, json).await?;
        }
        Commands::Transcribe {
            content,
            transcribe,
        } => {
            let request = Request::Transcribe(G2pRequest {
                content,
                description: phoneme_description(&transcribe),
                pronunciation_dict: load_dictionary(transcribe.dict.as_deref())?,
                ..Default::default()
            });
            let socket = resolve_socket(socket_arg, config_path.as_deref())?;
            run_request(&socket, request, json).await?;
        }
        Commands::Preprocess {
            content,
            parse_html,
            no_tags,
            normalize,
            transcribe,
        } => {
            let request = Request::Preprocess(PreprocessRequest {
                content,
                parse_html,
                options: normalize_options(&normalize),
                description: phoneme_description(&transcribe),
                pronunciation_dict: load_dictionary(transcribe.dict.as_deref())?,
                no_tag_tokens_in_content: no_tags,
                ..Default::default()
            });
            let socket = resolve_socket(socket_arg, config_path.as_deref())?;
            run_request(&socket, request, json).await?;
        }
        Commands::Defaults => {
            let socket = resolve_socket(socket_arg, config_path.as_deref())?;
            run_request(&socket, Request::GetDefaultParameters, json).await?;
        }
        Commands::Version => {
            let socket = resolve_socket(socket_arg, config_path.as_deref())?;
            run_request(&socket, Request::GetVersion, json).await?;
        }
        Commands::Status => {
            let socket = resolve_socket(socket_arg, config_path.as_deref())?;
            run_request(&socket, Request::Status, json).await?;
        }
        Commands::Shutdown => {
            let socket = resolve_socket(socket_arg, config_path.as_deref())?;
            run_request(&socket, Request::Shutdown, json).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "ttsfront",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. Custom config path from CLI (--config)
/// 2. Default config path (~/.config/ttsfront/config.toml)
/// 3. Built-in defaults with environment variable overrides
fn load_config(custom_path: Option<&Path>) -> Result<Config> {
    let config = if let Some(path) = custom_path {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    };
    Ok(config.with_env_overrides())
}

/// Resolve the socket path for client commands.
fn resolve_socket(socket_arg: Option<PathBuf>, config_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(socket) = socket_arg {
        return Ok(socket);
    }
    let config = load_config(config_path)?;
    Ok(config
        .service
        .socket_path
        .unwrap_or_else(IpcServer::default_socket_path))
}

fn normalize_options(args: &NormalizeArgs) -> NormalizeOptions {
    NormalizeOptions {
        domain: args.domain,
        do_spellcorrect: args.spellcorrect.then_some(true),
        phrasing: args.phrasing.then_some(true),
        sentence_split: args.sentence_split.then_some(true),
        max_characters_in_chunk: args.max_chunk.filter(|&n| n > 0),
    }
}

fn phoneme_description(args: &TranscribeArgs) -> Option<PhonemeDescription> {
    if args.alphabet.is_none()
        && args.dialect.is_none()
        && args.syllable_separator.is_none()
        && args.word_separator.is_none()
        && !args.stress
    {
        return None;
    }
    Some(PhonemeDescription {
        alphabet: args.alphabet.unwrap_or_default(),
        dialect: args.dialect.unwrap_or_default(),
        syllable_separator: args.syllable_separator.clone().unwrap_or_default(),
        stress_labels: args.stress,
        word_separator: args.word_separator.clone().unwrap_or_default(),
        ..Default::default()
    })
}

/// Load a pronunciation dictionary from a JSON file.
fn load_dictionary(path: Option<&Path>) -> Result<HashMap<String, String>> {
    match path {
        None => Ok(HashMap::new()),
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
    }
}

/// Send a request to the daemon and render the response.
async fn run_request(socket_path: &Path, request: Request, json: bool) -> Result<()> {
    match send_request(socket_path, request).await {
        Ok(response) => {
            print_response(&response, json);
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "{}",
                format!("Failed to communicate with daemon: {}", e).red()
            );
            eprintln!("Is the daemon running? Start it with: ttsfront daemon");
            std::process::exit(1);
        }
    }
}

fn print_response(response: &Response, json: bool) {
    if json {
        match serde_json::to_string_pretty(response) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => eprintln!("{}", format!("Failed to render response: {}", e).red()),
        }
        if matches!(response, Response::Error { .. }) {
            std::process::exit(1);
        }
        return;
    }

    match response {
        Response::Ok => println!("{}", "ok".green()),
        Response::Cleaned(cleaned) => println!("{}", cleaned.processed_content),
        Response::Normalized(normalized) => {
            for chunk in &normalized.processed_content {
                println!("{}", chunk);
            }
        }
        Response::Preprocessed(preprocessed) => {
            for chunk in &preprocessed.processed_content {
                println!("{}", chunk);
            }
        }
        Response::DefaultParameters(defaults) => {
            match serde_json::to_string_pretty(defaults) {
                Ok(rendered) => println!("{}", rendered),
                Err(e) => eprintln!("{}", format!("Failed to render defaults: {}", e).red()),
            }
        }
        Response::AbiVersion(version) => println!("{}", version.version),
        Response::Status {
            ready,
            daemon_version,
            abi_version,
        } => {
            println!("Status:");
            println!("  {}  {}", "Client:".dimmed(), ttsfront::version_string());
            println!("  {}  {}", "Daemon:".dimmed(), daemon_version);
            println!("  {}     {}", "ABI:".dimmed(), abi_version);
            println!(
                "  {}   {}",
                "Ready:".dimmed(),
                if *ready { "yes" } else { "no" }
            );
        }
        Response::Error {
            kind,
            message,
            stage,
        } => {
            match stage {
                Some(stage) => eprintln!(
                    "{}",
                    format!("Error ({}, stage {}): {}", kind, stage, message).red()
                ),
                None => eprintln!("{}", format!("Error ({}): {}", kind, message).red()),
            }
            std::process::exit(1);
        }
    }
}
