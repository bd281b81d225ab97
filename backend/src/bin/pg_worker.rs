//! Privilege-dropping helper for the embedded PostgreSQL test cluster.
//!
//! `pg_embedded_setup_unpriv` re-executes this binary when the test suite
//! runs as root. Usage: `pg_worker <setup|start|stop> <payload.json>`, where
//! the payload is a serialised [`pg_embedded_setup_unpriv::worker::WorkerPayload`].

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Report, Result, eyre};
use pg_embedded_setup_unpriv::worker::WorkerPayload;
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    run(env::args_os())
}

fn run(mut args: impl Iterator<Item = OsString>) -> Result<()> {
    let _program = args.next();
    let operation = Operation::parse(&args.next().ok_or_else(|| eyre!("missing operation"))?)?;
    let payload_path = args.next().ok_or_else(|| eyre!("missing payload path"))?;
    if let Some(extra) = args.next() {
        return Err(eyre!(
            "unexpected argument '{}'; expected an operation and a payload path",
            extra.to_string_lossy()
        ));
    }

    let payload = read_payload(Path::new(&payload_path))?;
    execute(operation, payload)
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = fs::read(path).with_context(|| format!("failed to read payload {path:?}"))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse payload {path:?}"))
}

fn execute(operation: Operation, payload: WorkerPayload) -> Result<()> {
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| Report::new(err).wrap_err("failed to rebuild postgres settings"))?;
    for (key, value) in payload.environment {
        // SAFETY: single-threaded until the runtime below is built.
        match value {
            Some(value) => unsafe { env::set_var(&key, value.expose()) },
            None => unsafe { env::remove_var(&key) },
        }
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build worker runtime")?;
    let mut postgres = PostgreSQL::new(settings);
    runtime
        .block_on(async move {
            match operation {
                Operation::Setup => postgres.setup().await,
                Operation::Start => postgres.start().await,
                Operation::Stop => postgres.stop().await,
            }
        })
        .with_context(|| format!("postgres {operation} failed"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operation {
    Setup,
    Start,
    Stop,
}

impl Operation {
    fn parse(raw: &OsStr) -> Result<Self> {
        match raw.to_string_lossy().as_ref() {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!(
                "unknown operation '{other}'; expected setup, start or stop"
            )),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}
