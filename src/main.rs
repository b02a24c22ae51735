use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

use dm_core::export::FormKind;
use docmat_lib::bootstrap::config::locate_config;
use docmat_lib::bootstrap::run::{run_export, run_preview, run_print, run_resolve_upload};
use docmat_lib::bootstrap::{effective_config, load_config, ExportTarget, Overrides};

#[derive(Parser)]
#[command(name = "docmat")]
#[command(about = "Preview and export HTML document snapshots", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/docmat/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OverrideArgs {
    /// REST API base URL, e.g. https://host/api
    #[arg(long, global = true)]
    api_base_url: Option<String>,

    /// Bearer token for asset fetches
    #[arg(long, global = true)]
    auth_token: Option<String>,

    /// Directory exported documents are saved to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Directory the preview is written to
    #[arg(long, global = true)]
    preview_dir: Option<PathBuf>,

    /// HTML → PDF command line with {input} / {output} placeholders
    #[arg(long, global = true)]
    rasterizer: Option<String>,

    /// Print command; the document path is appended
    #[arg(long, global = true)]
    print_command: Option<String>,
}

impl From<OverrideArgs> for Overrides {
    fn from(args: OverrideArgs) -> Self {
        Self {
            api_base_url: args.api_base_url,
            auth_token: args.auth_token,
            output_dir: args.output_dir,
            preview_dir: args.preview_dir,
            rasterizer_command: args.rasterizer,
            print_command: args.print_command,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormArg {
    Application,
    Undertaking,
}

impl From<FormArg> for FormKind {
    fn from(arg: FormArg) -> Self {
        match arg {
            FormArg::Application => FormKind::Application,
            FormArg::Undertaking => FormKind::Undertaking,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render the normalized snapshot into the preview directory
    Preview {
        /// Snapshot HTML file
        snapshot: PathBuf,
        /// Zoom percentage (50-200)
        #[arg(short, long)]
        zoom: Option<u16>,
    },
    /// Materialize images and export the snapshot as PDF
    Export {
        /// Snapshot HTML file
        snapshot: PathBuf,
        /// Explicit output filename
        #[arg(short, long, conflicts_with_all = ["form", "certificate"])]
        filename: Option<String>,
        /// Name the file after a candidate form
        #[arg(long, value_enum)]
        form: Option<FormArg>,
        /// Candidate id used with --form
        #[arg(long, requires = "form")]
        candidate_id: Option<String>,
        /// Name the file after a certificate
        #[arg(long, conflicts_with = "form")]
        certificate: Option<String>,
        /// Send the preview to the printer if the export fails
        #[arg(long)]
        print_on_failure: bool,
    },
    /// Render the preview and send it to the print command
    Print {
        /// Snapshot HTML file
        snapshot: PathBuf,
    },
    /// Resolve a stored upload path to its file URL
    ResolveUpload {
        /// Stored path, e.g. uploads/candidate_forms/sig.png
        path: String,
    },
}

fn export_target(
    filename: Option<String>,
    form: Option<FormArg>,
    candidate_id: Option<String>,
    certificate: Option<String>,
) -> ExportTarget {
    if let Some(filename) = filename {
        return ExportTarget::Filename(filename);
    }
    if let Some(name) = certificate {
        return ExportTarget::Certificate(name);
    }
    ExportTarget::Form {
        kind: form.map(FormKind::from).unwrap_or(FormKind::Application),
        candidate_id,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    docmat_lib::bootstrap::tracing::init_tracing_subscriber()?;

    let file_config = match locate_config(cli.config.as_deref()) {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let config = effective_config(file_config, &cli.overrides.into())?;

    match cli.command {
        Commands::Preview { snapshot, zoom } => {
            run_preview(&config, &snapshot, zoom).await?;
        }
        Commands::Export {
            snapshot,
            filename,
            form,
            candidate_id,
            certificate,
            print_on_failure,
        } => {
            let target = export_target(filename, form, candidate_id, certificate);
            run_export(&config, &snapshot, &target, print_on_failure).await?;
        }
        Commands::Print { snapshot } => {
            run_print(&config, &snapshot).await?;
        }
        Commands::ResolveUpload { path } => {
            println!("{}", run_resolve_upload(&config, &path)?);
        }
    }

    Ok(())
}
