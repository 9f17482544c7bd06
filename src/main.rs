//! `smf-property`: converge one SMF service property.
//!
//! Reads a resource document such as
//!
//! ```json
//! {"name": "network/dns/client#config/nameserver", "value": ["8.8.8.8", "8.8.4.4"]}
//! ```
//!
//! from a file or stdin, converges it and prints the report as JSON on
//! stdout. Logs go to stderr.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use smf_property::{
    init_logging_with_default, CommandRunner, PropertyReconciler, ReconcilerConfig, SmfProperty,
    SystemRunner,
};

#[derive(Debug, Parser)]
#[command(name = "smf-property", version, about = "Converge a single SMF service property")]
struct Cli {
    /// Resource document (JSON). Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// svccfg binary to run.
    #[arg(long, env = "SMF_PROPERTY_SVCCFG", default_value = smf_property::config::DEFAULT_SVCCFG)]
    svccfg: String,

    /// Report what would change without running setprop.
    #[arg(long)]
    dry_run: bool,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print the resource schema as JSON and exit.
    #[arg(long)]
    schema: bool,
}

/// Parse the resource document from `input`, or from `stdin` when `input`
/// is absent or `-`.
fn read_document(input: Option<&Path>, mut stdin: impl Read) -> Result<serde_json::Value> {
    let (text, source) = match input {
        Some(path) if path.as_os_str() != "-" => (
            std::fs::read_to_string(path)
                .with_context(|| format!("Unable to read {}", path.display()))?,
            path.display().to_string(),
        ),
        _ => {
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .context("Unable to read stdin")?;
            (text, "stdin".to_string())
        },
    };
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", source))
}

async fn run<R: CommandRunner>(
    cli: Cli,
    runner: R,
    stdin: impl Read,
    mut out: impl Write,
) -> Result<()> {
    if cli.schema {
        serde_json::to_writer_pretty(&mut out, &SmfProperty::schema())?;
        writeln!(out)?;
        return Ok(());
    }

    let document = read_document(cli.input.as_deref(), stdin)?;
    let resource = SmfProperty::from_json(&document)?;

    let config = ReconcilerConfig::new()
        .with_svccfg(cli.svccfg)
        .with_dry_run(cli.dry_run);
    let reconciler = PropertyReconciler::with_config(runner, config);

    let report = reconciler
        .converge(&resource)
        .await
        .with_context(|| format!("Unable to converge {}", resource.target()))?;

    if report.is_updated() {
        info!(resource = %report.target, dry_run = cli.dry_run, "Property converged");
    } else {
        info!(resource = %report.target, "Property already up to date");
    }

    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging_with_default(&cli.log_level);

    match run(cli, SystemRunner::new(), std::io::stdin(), std::io::stdout()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("smf-property: {:#}", err);
            ExitCode::FAILURE
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use smf_property::testing::{assert_not_ran, MockRunner};
    use smf_property::SmfError;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    const DNS_DOCUMENT: &str =
        r#"{"name": "network/dns/client#config/nameserver", "value": ["8.8.8.8", "8.8.4.4"]}"#;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["smf-property"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["smf-property", "resource.json"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("resource.json")));
        assert!(!cli.dry_run);
        assert!(!cli.schema);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "smf-property",
            "--dry-run",
            "--svccfg",
            "/usr/sbin/svccfg",
            "-",
        ])
        .unwrap();
        assert!(cli.dry_run);
        assert_eq!(cli.svccfg, "/usr/sbin/svccfg");
        assert_eq!(cli.input, Some(PathBuf::from("-")));
    }

    #[test]
    fn test_read_document_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(DNS_DOCUMENT.as_bytes()).unwrap();

        let document = read_document(Some(file.path()), std::io::empty()).unwrap();
        assert_eq!(document["name"], "network/dns/client#config/nameserver");
        assert_eq!(document["value"][1], "8.8.4.4");
    }

    #[test]
    fn test_read_document_from_stdin() {
        let document =
            read_document(Some(Path::new("-")), Cursor::new(DNS_DOCUMENT)).unwrap();
        assert_eq!(document["value"][0], "8.8.8.8");

        let document = read_document(None, Cursor::new(r#"{"name": "a#b/c"}"#)).unwrap();
        assert_eq!(document["name"], "a#b/c");
    }

    #[test]
    fn test_read_document_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{\"name\": ").unwrap();

        let err = read_document(Some(file.path()), std::io::empty()).unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON in"), "{:#}", err);
        assert!(err.downcast_ref::<serde_json::Error>().is_some());
    }

    #[test]
    fn test_read_document_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = read_document(Some(&path), std::io::empty()).unwrap_err();
        assert!(err.to_string().starts_with("Unable to read"), "{:#}", err);
        assert!(err.downcast_ref::<std::io::Error>().is_some());
    }

    #[tokio::test]
    async fn test_run_prints_schema() {
        let runner = MockRunner::new();
        let mut out = Vec::new();

        run(cli(&["--schema"]), runner.clone(), std::io::empty(), &mut out)
            .await
            .unwrap();

        let schema: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(schema["attributes"]["name"]["required"], true);
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_document() {
        let runner = MockRunner::new();
        let mut out = Vec::new();

        let err = run(
            cli(&["-"]),
            runner.clone(),
            Cursor::new(r#"{"name": "network/dns/client#config/nameserver"}"#),
            &mut out,
        )
        .await
        .unwrap_err();

        assert!(matches!(err.downcast_ref::<SmfError>(), Some(SmfError::Validation(_))));
        assert!(format!("{:#}", err).contains("Missing required attribute 'value'"));
        assert_eq!(runner.call_count(), 0);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_converges_and_prints_report() {
        let runner = MockRunner::new()
            .on_listprop(
                "network/dns/client",
                "config/nameserver",
                "config/nameserver net_address 10.0.0.1\n",
            )
            .on_setprop(
                "network/dns/client",
                "config/nameserver",
                "net_address",
                "(8.8.8.8 8.8.4.4)",
            );
        let mut out = Vec::new();

        run(cli(&[]), runner.clone(), Cursor::new(DNS_DOCUMENT), &mut out)
            .await
            .unwrap();

        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(report["mutation"]["type"], "net_address");
        assert_eq!(report["mutation"]["applied"], true);
        assert_eq!(runner.call_count(), 2);
    }

    #[tokio::test]
    async fn test_run_dry_run_skips_setprop() {
        let runner = MockRunner::new().on_listprop(
            "network/dns/client",
            "config/nameserver",
            "config/nameserver net_address 10.0.0.1\n",
        );
        let mut out = Vec::new();

        run(cli(&["--dry-run"]), runner.clone(), Cursor::new(DNS_DOCUMENT), &mut out)
            .await
            .unwrap();

        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(report["mutation"]["applied"], false);
        assert_not_ran(&runner, "setprop");
    }

    #[tokio::test]
    async fn test_run_reports_converge_failure_with_target() {
        let runner = MockRunner::new().on_listprop("network/dns/client", "config/nameserver", "");
        let mut out = Vec::new();

        let err = run(cli(&[]), runner, Cursor::new(DNS_DOCUMENT), &mut out)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unable to converge network/dns/client#config/nameserver"
        );
        assert!(matches!(
            err.downcast_ref::<SmfError>(),
            Some(SmfError::PropertyNotFound { .. })
        ));
    }
}
