use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use backerwall::{
    AvatarReply, AvatarRequest, BadgeRequest, BannerConfig, BannerEngine, MontageRequest,
    OrderMode, OutputFormat, RenderedDocument, SupporterRecord,
};

/// Render supporter avatar banners, thumbnails and badges from a JSON
/// supporter list.
#[derive(Parser)]
#[command(name = "backerwall", version, about)]
struct Cli {
    /// Path to a JSON array of supporter records
    #[arg(short, long)]
    supporters: PathBuf,

    /// Write the rendered document here instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Override the site base URL used for static images and landing links
    #[arg(long)]
    site_url: Option<String>,

    /// Override the collective slug used for fallback landing links
    #[arg(long)]
    slug: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the multi-avatar montage banner for a tier
    Montage {
        #[arg(long)]
        tier: String,
        /// Output format: svg or png
        #[arg(long, default_value = "svg")]
        format: String,
        /// Maximum number of supporters to place (0 = unlimited)
        #[arg(long, default_value_t = 0)]
        limit: usize,
        /// Explicit canvas width; 0 auto-sizes and disables wrapping
        #[arg(long, default_value_t = 0)]
        width: u32,
        /// Explicit canvas height; 0 auto-sizes
        #[arg(long, default_value_t = 0)]
        height: u32,
        /// Per-avatar row height override
        #[arg(long)]
        avatar_height: Option<u32>,
        #[arg(long, default_value_t = 5)]
        margin: u32,
        /// Order supporters most-recent first
        #[arg(long)]
        recent: bool,
        /// Skip the trailing call-to-action image
        #[arg(long)]
        no_button: bool,
    },

    /// Render a single supporter's avatar thumbnail
    Avatar {
        #[arg(long)]
        tier: String,
        /// Ordinal position within the tier's supporters
        #[arg(long, default_value_t = 0)]
        position: usize,
        /// Output format: svg or png
        #[arg(long, default_value = "svg")]
        format: String,
        #[arg(long)]
        avatar_height: Option<u32>,
    },

    /// Render a supporter-count badge for a tier
    Badge {
        #[arg(long)]
        tier: String,
        #[arg(long, default_value = "brightgreen")]
        color: String,
        #[arg(long)]
        style: Option<String>,
    },
}

fn parse_format(format: &str) -> anyhow::Result<OutputFormat> {
    match format {
        "svg" => Ok(OutputFormat::Svg),
        "png" => Ok(OutputFormat::Png),
        other => bail!("unsupported format {other:?}, expected svg or png"),
    }
}

fn write_document(out: Option<&PathBuf>, document: &RenderedDocument) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, &document.bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} ({}, {} bytes)",
                path.display(),
                document.content_type,
                document.bytes.len()
            );
        }
        None => std::io::stdout().write_all(&document.bytes)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data = std::fs::read_to_string(&cli.supporters)
        .with_context(|| format!("failed to read {}", cli.supporters.display()))?;
    let supporters: Vec<SupporterRecord> =
        serde_json::from_str(&data).context("supporters file is not a valid record list")?;

    let mut config = BannerConfig::default();
    if let Some(site_url) = cli.site_url {
        config.site_url = site_url;
    }
    if let Some(slug) = cli.slug {
        config.slug = slug;
    }
    let engine = BannerEngine::new(config)?;

    match cli.command {
        Command::Montage {
            tier,
            format,
            limit,
            width,
            height,
            avatar_height,
            margin,
            recent,
            no_button,
        } => {
            let request = MontageRequest {
                tier,
                format: parse_format(&format)?,
                count_limit: limit,
                width,
                height,
                avatar_height,
                margin,
                order: recent.then_some(OrderMode::Recent),
                button: !no_button,
            };
            let document = engine.montage(&supporters, &request).await?;
            write_document(cli.out.as_ref(), &document)?;
        }

        Command::Avatar {
            tier,
            position,
            format,
            avatar_height,
        } => {
            let request = AvatarRequest {
                tier,
                position,
                format: parse_format(&format)?,
                avatar_height,
            };
            match engine.avatar(&supporters, &request).await? {
                AvatarReply::Redirect(path) => println!("redirect: {path}"),
                AvatarReply::Document(document) => write_document(cli.out.as_ref(), &document)?,
            }
        }

        Command::Badge { tier, color, style } => {
            let request = BadgeRequest { tier, color, style };
            let document = engine.badge(&supporters, &request).await?;
            write_document(cli.out.as_ref(), &document)?;
        }
    }

    Ok(())
}
