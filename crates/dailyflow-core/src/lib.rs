pub mod app;
pub mod calendar;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod focus;
pub mod haptics;
pub mod loading;
pub mod notify;
pub mod onboarding;
pub mod plans;
pub mod progress;
pub mod render;
pub mod routes;
pub mod sequence;
pub mod settings;
pub mod storage;
pub mod task;
pub mod task_list;
pub mod theme;
pub mod wheel;

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting dailyflow"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let ctx =
    app::AppContext::open(
      &cfg, &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open dailyflow data \
         at {}",
        data_dir.display()
      )
    })?;

  let renderer = render::Renderer::new(
    &cfg,
    ctx.theme.theme()
  )?;
  let inv =
    cli::Invocation::parse(cli.rest)?;

  let mut session =
    commands::Session::new(
      ctx,
      renderer,
      io::stdin().lock(),
      io::stdout().lock()
    )
    .with_splash(
      cfg.splash_enabled()
    );
  session.launch()?;

  if inv.command
    == cli::Invocation::SHELL
  {
    session.run_shell()?;
  } else {
    session.dispatch(&inv)?;
  }

  info!("done");
  Ok(())
}
