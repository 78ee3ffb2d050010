use std::io::Write;
use std::panic;

// Import everything from the lib version of ourselves
use binfetch::*;
use binfetch::backend::installer::ScriptSettings;
use clap::Parser;
use cli::{Cli, Commands, ConfigSchemaArgs};
use console::Term;
use miette::{Diagnostic, IntoDiagnostic};
use thiserror::Error;
use tracing::error;

mod cli;

fn report_error(error: &miette::Report) {
    error!("{:?}", error);
}

fn main() {
    let cli = Cli::parse();
    // Init the logger
    tracing_subscriber::fmt::fmt()
        .with_max_level(cli.verbose)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .with_ansi(console::colors_enabled_stderr())
        .init();

    // Control how errors are formatted by setting the miette hook.
    miette::set_hook(Box::new(move |_| {
        let graphical_theme = if console::colors_enabled_stderr() {
            miette::GraphicalTheme::unicode()
        } else {
            miette::GraphicalTheme::unicode_nocolor()
        };
        Box::new(
            miette::MietteHandlerOpts::new()
                .graphical_theme(graphical_theme)
                .build(),
        )
    }))
    .expect("failed to initialize error handler");

    // Now that miette is set up, use it to format panics.
    panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info.payload();
        let message = if let Some(msg) = payload.downcast_ref::<&str>() {
            msg
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            &msg[..]
        } else {
            "something went wrong"
        };

        #[derive(Debug, Error, Diagnostic)]
        #[error("{message}")]
        pub struct PanicError {
            pub message: String,
            #[help]
            pub help: Option<String>,
        }

        report_error(
            &miette::Report::from(PanicError {
                message: message.to_owned(),
                help: panic_info
                    .location()
                    .map(|loc| format!("at {}:{}:{}", loc.file(), loc.line(), loc.column())),
            })
            .wrap_err("binfetch panicked"),
        );
    }));

    let main_result = real_main(&cli);

    let _ = main_result.map_err(|e| {
        report_error(&e);
        std::process::exit(1);
    });
}

fn real_main(cli: &Cli) -> Result<(), miette::Report> {
    match &cli.command {
        Some(Commands::Generate(args)) => cmd_generate(args),
        Some(Commands::ConfigSchema(args)) => cmd_config_schema(args),
        None => cmd_generate(&cli.generate),
    }
}

fn cmd_generate(args: &cli::GenerateArgs) -> Result<(), miette::Report> {
    let generated_at = if args.no_timestamp {
        None
    } else {
        Some(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    };
    let args = GenerateArgs {
        file: args.file.clone(),
        repo: args.repo.clone(),
        config_name: args.config_name.clone(),
        output: args.output.clone(),
        force: args.force,
        check: args.check,
        settings: ScriptSettings { generated_at },
    };

    let mut out = Term::stdout();
    match do_generate(&args)? {
        GenerateOutcome::Script(script) => {
            write!(out, "{script}").into_diagnostic()?;
        }
        GenerateOutcome::Wrote(path) => eprintln!("wrote {path}"),
        GenerateOutcome::Unchanged(path) => eprintln!("{path} is already up to date"),
        GenerateOutcome::UpToDate(path) => eprintln!("{path} is up to date"),
    }
    Ok(())
}

fn cmd_config_schema(_args: &ConfigSchemaArgs) -> Result<(), miette::Report> {
    let schema = do_config_schema()?;
    writeln!(&mut Term::stdout(), "{schema}").into_diagnostic()?;
    Ok(())
}
